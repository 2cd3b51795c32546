//! Vtable for the move-only wrapper.
//!
//! This module encapsulates the fields of [`MoveVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's target type and handler must match the target
//! actually referenced by the handle stored next to it**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`MoveVtable::boxed`] or [`MoveVtable::pointer`], which pair
//! the function pointers with one specific target type and handler at compile
//! time, and because [`RawMoveFunction`] only ever stores a vtable together
//! with a handle created for it.
//!
//! The null vtable plays the role of an abstract base: its `call` entry panics
//! and its `destroy` entry does nothing. Since Rust does not guarantee that two
//! references to the same promoted constant compare equal, emptiness is read
//! from the vtable's `null` flag instead of from its address.
//!
//! [`RawMoveFunction`]: super::RawMoveFunction

use alloc::boxed::Box;
use core::{any::TypeId, mem::ManuallyDrop, ptr::NonNull};

use crate::{handle::RawHandle, handlers::CallHandler, signature::Signature, util::Erased};

/// Vtable for the type-erased operations of a [`RawMoveFunction`].
///
/// # Safety Invariant
///
/// Unless `null` is `true`, the fields `call`, `destroy` and `payload` point to
/// the functions defined below, instantiated with the target type `F` and
/// handler `H` that were used to create this [`MoveVtable`].
///
/// [`RawMoveFunction`]: super::RawMoveFunction
pub(super) struct MoveVtable<S: Signature> {
    /// Gets the [`TypeId`] of the target.
    type_id: fn() -> TypeId,
    /// Gets the type name of the target.
    type_name: fn() -> &'static str,
    /// Whether this is the null vtable.
    null: bool,
    /// Whether `call` takes ownership of the target.
    consuming: bool,
    /// Calls the target.
    call: unsafe fn(RawHandle, S::Args) -> S::Output,
    /// Releases the target.
    destroy: unsafe fn(RawHandle),
    /// Gets a pointer to the target.
    payload: unsafe fn(&RawHandle) -> NonNull<Erased>,
}

impl<S: Signature> MoveVtable<S> {
    /// Creates the [`MoveVtable`] for a target of type `F` stored in a box
    /// and called through the handler `H`.
    pub(super) const fn boxed<F, H>() -> &'static Self
    where
        F: 'static,
        H: CallHandler<S, F>,
    {
        const {
            &Self {
                type_id: TypeId::of::<F>,
                type_name: core::any::type_name::<F>,
                null: false,
                consuming: H::CONSUMING,
                call: call_boxed::<S, F, H>,
                destroy: destroy_boxed::<F>,
                payload: payload_boxed::<F>,
            }
        }
    }

    /// Creates the [`MoveVtable`] for a bare function pointer stored in the
    /// handle and called through the handler `H`.
    pub(super) const fn pointer<H>() -> &'static Self
    where
        H: CallHandler<S, S::Pointer>,
    {
        const {
            &Self {
                type_id: TypeId::of::<S::Pointer>,
                type_name: core::any::type_name::<S::Pointer>,
                null: false,
                consuming: H::CONSUMING,
                call: call_pointer::<S, H>,
                destroy: destroy_nothing,
                payload: payload_pointer,
            }
        }
    }

    /// Returns the null vtable.
    pub(super) const fn null() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<Erased>,
                type_name: core::any::type_name::<Erased>,
                null: true,
                consuming: false,
                call: call_null::<S>,
                destroy: destroy_nothing,
                payload: payload_pointer,
            }
        }
    }

    /// Whether this is the null vtable.
    #[inline]
    pub(super) fn is_null(&self) -> bool {
        self.null
    }

    /// Whether calling through this vtable takes ownership of the target.
    #[inline]
    pub(super) fn is_consuming(&self) -> bool {
        self.consuming
    }

    /// Gets the [`TypeId`] of the target.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the type name of the target.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Calls the target referenced by `handle`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `handle` was created together with this vtable and its target is
    ///    still alive.
    /// 2. The access performed by the handler this vtable was created with is
    ///    valid for the duration of the call (see [`CallHandler::call`]).
    /// 3. If this vtable [`is_consuming`](Self::is_consuming), the caller
    ///    gives up ownership of the target: the handle is neither used nor
    ///    destroyed afterwards, even if the call unwinds.
    #[inline]
    pub(super) unsafe fn call(&self, handle: RawHandle, args: S::Args) -> S::Output {
        // SAFETY: We know that `self.call` points to `call_boxed::<S, F, H>`,
        // `call_pointer::<S, H>` or `call_null::<S>`. Their safety
        // requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe { (self.call)(handle, args) }
    }

    /// Releases the target referenced by `handle`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `handle` was created together with this vtable and its target is
    ///    still alive.
    /// 2. The handle is neither used nor destroyed afterwards.
    #[inline]
    pub(super) unsafe fn destroy(&self, handle: RawHandle) {
        // SAFETY: We know that `self.destroy` points to `destroy_boxed::<F>`
        // or `destroy_nothing`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.destroy)(handle) }
    }

    /// Returns a pointer to the target referenced by `handle`.
    ///
    /// The pointer is valid for reads for as long as `handle` is borrowed and
    /// the target is alive.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `handle` was created together with this vtable and its target is
    ///    still alive.
    #[inline]
    pub(super) unsafe fn payload(&self, handle: &RawHandle) -> NonNull<Erased> {
        // SAFETY: We know that `self.payload` points to `payload_boxed::<F>`
        // or `payload_pointer`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.payload)(handle) }
    }
}

/// Calls a boxed `F` through the handler `H`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` holds a pointer created by `Box::<F>::into_raw`, whose
///    target is still alive.
/// 2. The access `H` performs is valid for the duration of the call.
/// 3. If `H` is consuming, the caller treats the handle as moved-from
///    afterwards.
unsafe fn call_boxed<S, F, H>(handle: RawHandle, args: S::Args) -> S::Output
where
    S: Signature,
    F: 'static,
    H: CallHandler<S, F>,
{
    // SAFETY: The handle holds an object pointer to an `F` (guaranteed by the
    // caller)
    let ptr: NonNull<F> = unsafe { handle.object::<F>() };

    if H::CONSUMING {
        // SAFETY: The pointer comes from `Box::<F>::into_raw`, and ownership
        // is transferred to us (guaranteed by the caller)
        let boxed: Box<F> = unsafe { Box::from_raw(ptr.as_ptr()) };
        let mut target = ManuallyDrop::new(*boxed);

        // SAFETY:
        // 1. `target` is a valid, initialized `F`
        // 2. Not applicable, since `H` is consuming
        // 3. We own `target`, and it is wrapped in `ManuallyDrop`, so it is
        //    neither read nor dropped after the handler takes it
        unsafe { H::call(NonNull::from(&mut *target), args) }
    } else {
        // SAFETY:
        // 1. The pointer points to a live `F` (guaranteed by the caller)
        // 2. Guaranteed by the caller
        // 3. Not applicable, since `H` is not consuming
        unsafe { H::call(ptr, args) }
    }
}

/// Calls a function pointer stored in the handle through the handler `H`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` was created by [`RawHandle::from_function`] with an
///    `S::Pointer`.
unsafe fn call_pointer<S, H>(handle: RawHandle, args: S::Args) -> S::Output
where
    S: Signature,
    H: CallHandler<S, S::Pointer>,
{
    // SAFETY: Guaranteed by the caller
    let mut pointer: S::Pointer = unsafe { handle.function::<S::Pointer>() };

    // SAFETY:
    // 1. `pointer` is a valid, initialized local
    // 2. We have exclusive access to the local
    // 3. Function pointers are `Copy`, so a handler moving it out leaves
    //    nothing behind that needs to be dropped
    unsafe { H::call(NonNull::from(&mut pointer), args) }
}

/// Call entry of the null vtable.
unsafe fn call_null<S: Signature>(_handle: RawHandle, _args: S::Args) -> S::Output {
    panic!("bad function call: the callable is null")
}

/// Drops a boxed `F`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` holds a pointer created by `Box::<F>::into_raw`, whose
///    target is still alive.
/// 2. The handle is not used afterwards.
unsafe fn destroy_boxed<F>(handle: RawHandle) {
    // SAFETY: Guaranteed by the caller
    let ptr: NonNull<F> = unsafe { handle.object::<F>() };
    // SAFETY: The pointer comes from `Box::into_raw` and ownership is
    // transferred to us (guaranteed by the caller)
    let boxed: Box<F> = unsafe { Box::from_raw(ptr.as_ptr()) };
    core::mem::drop(boxed);
}

/// Destroy entry for targets that own nothing.
unsafe fn destroy_nothing(_handle: RawHandle) {}

/// Returns the pointer to a boxed `F`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` holds a pointer created by `Box::<F>::into_raw`.
unsafe fn payload_boxed<F>(handle: &RawHandle) -> NonNull<Erased> {
    // SAFETY: Guaranteed by the caller
    let ptr: NonNull<F> = unsafe { handle.object::<F>() };
    ptr.cast::<Erased>()
}

/// Returns a pointer to the handle itself, which holds the function pointer.
unsafe fn payload_pointer(handle: &RawHandle) -> NonNull<Erased> {
    handle.as_ptr().cast::<Erased>()
}
