/// Builds a [`VarArgs`] pack for a [`Variadic`] signature.
///
/// Every argument is converted with [`VarArg::from`], which applies the usual
/// promotions: small integers are widened to 64 bits and `f32` becomes `f64`.
///
/// [`VarArgs`]: crate::signature::VarArgs
/// [`Variadic`]: crate::signature::Variadic
/// [`VarArg::from`]: crate::signature::VarArg
///
/// # Examples
///
/// ```
/// use polyfn::{FunctionRef, signature::{VarArgs, Variadic}, varargs};
///
/// fn sum(count: usize, mut rest: VarArgs) -> i64 {
///     (0..count).filter_map(|_| rest.arg::<i64>()).sum()
/// }
///
/// let function = FunctionRef::<Variadic<fn(usize) -> i64>>::from_fn(sum);
/// assert_eq!(function.call(3, varargs![1i32, 2i8, 3i64]), 6);
/// assert_eq!(function.call(0, varargs![]), 0);
/// ```
#[macro_export]
macro_rules! varargs {
    () => {
        $crate::signature::VarArgs::new()
    };
    ($($arg:expr),+ $(,)?) => {
        {
            let mut pack = $crate::signature::VarArgs::new();
            $(
                pack.push($crate::signature::VarArg::from($arg));
            )+
            pack
        }
    };
}

/// Emits a `tracing` event when the `tracing` feature is enabled, and
/// nothing otherwise.
///
/// The arguments are not evaluated when the feature is disabled.
macro_rules! trace_event {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            ::tracing::$level!(target: "polyfn", $($arg)+);
        }
    };
}
