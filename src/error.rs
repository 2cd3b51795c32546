//! The error reported when an empty wrapper is called.

use polyfn_internals::signature::Signature;

/// Error returned when calling a wrapper that holds no target.
///
/// [`Function::try_call`](crate::Function::try_call) returns this error
/// instead of panicking. Calling an empty [`Function`](crate::Function) or a
/// null [`MoveFunction`](crate::MoveFunction) with `call` panics with the
/// same message.
///
/// # Examples
///
/// ```
/// use polyfn::{BadCall, Function};
///
/// let mut function: Function<fn(i32) -> i32> = Function::null();
/// let error: BadCall = function.try_call(1).unwrap_err();
/// assert_eq!(error.signature(), "fn(i32) -> i32");
/// assert_eq!(
///     error.to_string(),
///     "bad function call: the callable is empty (signature `fn(i32) -> i32`)"
/// );
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BadCall {
    /// The type name of the signature of the wrapper that was called.
    signature: &'static str,
}

impl BadCall {
    /// Creates the error for a wrapper with signature `S`.
    #[inline]
    pub fn new<S: Signature>() -> Self {
        Self {
            signature: core::any::type_name::<S>(),
        }
    }

    /// Returns the type name of the signature of the wrapper that was called.
    #[inline]
    pub fn signature(&self) -> &'static str {
        self.signature
    }
}

impl core::fmt::Debug for BadCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BadCall")
            .field("signature", &self.signature)
            .finish()
    }
}

impl core::fmt::Display for BadCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "bad function call: the callable is empty (signature `{}`)",
            self.signature
        )
    }
}

impl core::error::Error for BadCall {}

/// Panics with a [`BadCall`] for the signature `S`.
#[cold]
#[track_caller]
pub(crate) fn bad_call<S: Signature>() -> ! {
    let error = BadCall::new::<S>();
    trace_event!(error, signature = error.signature(), "called an empty callable");
    panic!("{error}")
}
