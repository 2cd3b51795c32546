//! Marker types for the call qualification of a [`MoveFunction`] and for the
//! null state shared by the owning wrappers.
//!
//! The second type parameter of [`MoveFunction<S, Q>`](crate::MoveFunction)
//! decides both which targets it accepts and how its `call` method takes
//! `self`:
//!
//! | qualifier         | target must implement | `call` receiver | unwinding |
//! |-------------------|-----------------------|-----------------|-----------|
//! | [`Mut`]           | [`CallMut`]           | `&mut self`     | propagates |
//! | [`Const`]         | [`CallRef`]           | `&self`         | propagates |
//! | [`Once`]          | [`CallOnce`]          | `self`          | propagates |
//! | [`NoUnwind<Q>`]   | as `Q`                | as `Q`          | aborts     |
//!
//! There is exactly one `call` per qualifier, so a `MoveFunction<_, Const>`
//! can never be called through `&mut self` with different semantics than
//! through `&self`.
//!
//! # Examples
//!
//! ```
//! use polyfn::{MoveFunction, markers::{Const, Once}};
//!
//! let name = String::from("polyfn");
//!
//! // `Const` only accepts targets that can be called through `&self`
//! let shared: MoveFunction<fn() -> usize, Const> = MoveFunction::new(move || name.len());
//! assert_eq!(shared.call(), 6);
//! assert_eq!(shared.call(), 6);
//!
//! // `Once` accepts targets that consume their captures, and is consumed itself
//! let greeting = String::from("hello");
//! let once: MoveFunction<fn() -> String, Once> = MoveFunction::new(move || greeting);
//! assert_eq!(once.call(), "hello");
//! ```
//!
//! [`MoveFunction`]: crate::MoveFunction
//! [`CallMut`]: polyfn_internals::invoke::CallMut
//! [`CallRef`]: polyfn_internals::invoke::CallRef
//! [`CallOnce`]: polyfn_internals::invoke::CallOnce

use core::{marker::PhantomData, ptr::NonNull};

use polyfn_internals::{
    handlers::CallHandler,
    invoke::{CallMut, CallOnce, CallRef},
    signature::Signature,
};

mod sealed {
    /// Prevents implementations of [`Qualifier`](super::Qualifier) outside
    /// this crate.
    pub trait Sealed {}
}

/// Call qualifications of a [`MoveFunction`](crate::MoveFunction).
///
/// This trait is sealed. It is implemented by [`Mut`], [`Const`], [`Once`]
/// and [`NoUnwind<Q>`] for each of them.
pub trait Qualifier: sealed::Sealed + 'static {
    /// A short name for diagnostics.
    const NAME: &'static str;
}

/// The target is called through an exclusive reference.
///
/// This is the default qualification, and the equivalent of a callable that
/// may only be invoked as an lvalue.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Mut;

/// The target is called through a shared reference.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Const;

/// The target is called once, by value, consuming the wrapper.
///
/// This is the equivalent of a callable that may only be invoked as an
/// rvalue.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Once;

/// The target is called like `Q`, but must not unwind.
///
/// If the target panics, the process is aborted instead of letting the panic
/// propagate out of `call`.
pub struct NoUnwind<Q>(PhantomData<Q>);

impl<Q> Clone for NoUnwind<Q> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q> Copy for NoUnwind<Q> {}

impl<Q: Qualifier> core::fmt::Debug for NoUnwind<Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NoUnwind<{}>", Q::NAME)
    }
}

impl sealed::Sealed for Mut {}
impl sealed::Sealed for Const {}
impl sealed::Sealed for Once {}
impl<Q: Qualifier> sealed::Sealed for NoUnwind<Q> {}

impl Qualifier for Mut {
    const NAME: &'static str = "mut";
}

impl Qualifier for Const {
    const NAME: &'static str = "const";
}

impl Qualifier for Once {
    const NAME: &'static str = "once";
}

impl<Q: Qualifier> Qualifier for NoUnwind<Q> {
    const NAME: &'static str = "no-unwind";
}

impl<S: Signature, F: CallMut<S>> CallHandler<S, F> for Mut {
    const CONSUMING: bool = false;

    #[inline]
    unsafe fn call(mut target: NonNull<F>, args: S::Args) -> S::Output {
        // SAFETY: The pointer is valid for exclusive access (guaranteed by the
        // caller, since this handler is not consuming)
        let target = unsafe { target.as_mut() };
        target.call_mut(args)
    }
}

impl<S: Signature, F: CallRef<S>> CallHandler<S, F> for Const {
    const CONSUMING: bool = false;

    #[inline]
    unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
        // SAFETY: The pointer is valid for shared access (guaranteed by the
        // caller, since this handler requires `CallRef`)
        let target = unsafe { target.as_ref() };
        target.call_ref(args)
    }
}

impl<S: Signature, F: CallOnce<S>> CallHandler<S, F> for Once {
    const CONSUMING: bool = true;

    #[inline]
    unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
        // SAFETY: The caller transfers ownership of the value and treats it as
        // moved-from afterwards (guaranteed by the caller, since this handler
        // is consuming)
        let target = unsafe { target.read() };
        target.call_once(args)
    }
}

impl<S, F, Q> CallHandler<S, F> for NoUnwind<Q>
where
    S: Signature,
    Q: Qualifier + CallHandler<S, F>,
{
    const CONSUMING: bool = Q::CONSUMING;

    #[inline]
    unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
        let guard = AbortOnUnwind;
        // SAFETY: Forwarded unchanged, so the caller's guarantees for `Q`
        // are the ones given for this handler
        let output = unsafe { Q::call(target, args) };
        core::mem::forget(guard);
        output
    }
}

/// Aborts the process if dropped, which only happens while unwinding.
///
/// Panicking inside a destructor that runs during unwinding is a double panic,
/// which the runtime turns into an abort. This works without `std`.
struct AbortOnUnwind;

impl Drop for AbortOnUnwind {
    fn drop(&mut self) {
        trace_event!(error, "a no-unwind callable panicked, aborting");
        panic!("a no-unwind callable panicked");
    }
}

/// The null value of the owning wrappers.
///
/// Every [`Function`](crate::Function) and
/// [`MoveFunction`](crate::MoveFunction) can be created from `Null` and
/// compared with it. Comparing equal to `Null` means that no target is
/// stored.
///
/// # Examples
///
/// ```
/// use polyfn::{Function, markers::Null};
///
/// let mut function: Function<fn(i32) -> i32> = Null.into();
/// assert!(function == Null);
///
/// function = Function::new(|x: i32| x + 1);
/// assert!(function != Null);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Null;
