//! Handlers that decide how a stored target is accessed when it is called.
//!
//! The move-only wrapper shares one vtable layout between all of its
//! qualifications. What differs between a shared, an exclusive and a consuming
//! wrapper is only how the dispatch function reaches the target before calling
//! it. That decision is made by a [`CallHandler`], which is chosen when the
//! vtable is generated and baked into its `call` entry.

use core::ptr::NonNull;

use crate::signature::Signature;

/// Trait for the access policy used when a wrapper calls its target of type `F`.
///
/// Handlers are zero-sized marker types. The `polyfn` crate implements this
/// trait for its qualifier markers (`Mut`, `Const`, `Once` and `NoUnwind<Q>`),
/// each of which requires the matching invocability contract from
/// [`invoke`](crate::invoke).
///
/// # Examples
///
/// ```
/// use core::ptr::NonNull;
///
/// use polyfn_internals::{handlers::CallHandler, invoke::CallRef, signature::Signature};
///
/// struct Shared;
///
/// impl<S: Signature, F: CallRef<S>> CallHandler<S, F> for Shared {
///     const CONSUMING: bool = false;
///
///     unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
///         // SAFETY: Guaranteed by the caller
///         let target = unsafe { target.as_ref() };
///         target.call_ref(args)
///     }
/// }
/// ```
pub trait CallHandler<S: Signature, F>: 'static {
    /// Whether [`call`](CallHandler::call) moves the target out of its
    /// storage.
    ///
    /// Dispatch functions generated for a consuming handler release the
    /// storage of the target without dropping it, since ownership of the value
    /// has been transferred to the handler.
    const CONSUMING: bool;

    /// Calls the target behind `target` with `args`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `target` points to a valid, initialized `F`.
    /// 2. If [`CONSUMING`](CallHandler::CONSUMING) is `false`, `target` is
    ///    valid for the kind of access the handler performs for the duration
    ///    of the call (shared access for handlers requiring
    ///    [`CallRef`](crate::invoke::CallRef), exclusive access otherwise).
    /// 3. If [`CONSUMING`](CallHandler::CONSUMING) is `true`, the caller owns
    ///    the value behind `target`, and treats it as moved-from (neither
    ///    reads nor drops it) after this method returns or unwinds.
    unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output;
}
