//! Internal utility types and macros.

/// Marker type used when type-erasing the target of a callable wrapper.
///
/// This zero-sized type serves as a placeholder in pointer types when the
/// actual concrete target type has been erased. For example, a
/// `NonNull<Erased>` pointing into an inline buffer stands for a pointer to
/// whatever target the paired vtable was generated for.
///
/// Using a distinct marker type (rather than `()`) makes the intent clearer
/// in type signatures.
pub(crate) struct Erased;

/// Invokes the macro `$mac` once for every supported arity.
///
/// Each invocation receives a comma-separated list of `Type value` identifier
/// pairs, from the empty list up to six parameters:
///
/// ```ignore
/// impl_something!();
/// impl_something!(A1 a1);
/// impl_something!(A1 a1, A2 a2);
/// // ...
/// ```
///
/// This is shared with the `polyfn` crate, which generates its per-arity
/// `call` methods the same way.
#[doc(hidden)]
#[macro_export]
macro_rules! for_each_arity {
    ($mac:ident) => {
        $mac!();
        $mac!(A1 a1);
        $mac!(A1 a1, A2 a2);
        $mac!(A1 a1, A2 a2, A3 a3);
        $mac!(A1 a1, A2 a2, A3 a3, A4 a4);
        $mac!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
        $mac!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
    };
}

/// Counts the identifiers passed to it, as a `usize` constant expression.
macro_rules! count_idents {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_idents!($($tail)*) };
}

pub(crate) use count_idents;
