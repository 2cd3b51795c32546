//! The type-erased, non-owning wrapper.
//!
//! This module encapsulates the `handle` and `dispatch` fields of
//! [`RawFunctionRef`], ensuring they are only ever set together. This
//! guarantees the safety invariant: **the dispatch function was generated for
//! the kind of handle stored next to it**.

use core::marker::PhantomData;

use crate::{
    binding::{BoundRef, NonType},
    handle::RawHandle,
    invoke::CallRef,
    signature::Signature,
};

/// A borrowed, type-erased callable with signature `S`.
///
/// A [`RawFunctionRef`] is two words: a [`RawHandle`] to the target and the
/// dispatch function generated for it. It never owns its target, so copying
/// it is free and dropping it does nothing. The lifetime `'a` ties it to the
/// referenced target.
///
/// # Safety Invariant
///
/// `dispatch` was generated together with `handle` by one of the constructors
/// below, and whatever `handle` refers to stays alive and shared for `'a`.
pub struct RawFunctionRef<'a, S: Signature> {
    /// The handle to the target.
    handle: RawHandle,
    /// Calls the target behind `handle`.
    dispatch: unsafe fn(RawHandle, S::Args) -> S::Output,
    /// Borrows the target for `'a`, and is neither `Send` nor `Sync`.
    _marker: PhantomData<(&'a (), *mut ())>,
}

impl<'a, S: Signature> RawFunctionRef<'a, S> {
    /// Creates a [`RawFunctionRef`] referencing `target`.
    #[inline]
    pub fn new<F>(target: &'a F) -> Self
    where
        F: CallRef<S>,
    {
        Self {
            handle: RawHandle::from_const_object(target),
            dispatch: dispatch_object::<S, F>,
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawFunctionRef`] holding a bare function pointer.
    ///
    /// The pointer is stored in the handle itself, so the result does not
    /// borrow anything.
    #[inline]
    pub fn from_fn(pointer: S::Pointer) -> Self {
        Self {
            handle: RawHandle::from_function(pointer),
            dispatch: dispatch_pointer::<S>,
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawFunctionRef`] calling a compile-time entity.
    ///
    /// Nothing is referenced: the entity is recreated from its type on every
    /// call.
    #[inline]
    pub fn from_entity<F>(_entity: NonType<F>) -> Self
    where
        F: Copy,
        NonType<F>: CallRef<S>,
    {
        Self {
            handle: RawHandle::null(),
            dispatch: dispatch_entity::<S, F>,
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawFunctionRef`] calling a compile-time entity on
    /// `receiver`.
    ///
    /// Only the receiver pointer is stored.
    #[inline]
    pub fn bind_ref<F, T>(_entity: NonType<F>, receiver: &'a T) -> Self
    where
        F: Copy,
        BoundRef<F, &'a T>: CallRef<S>,
    {
        Self {
            handle: RawHandle::from_const_object(receiver),
            dispatch: dispatch_bound::<'a, S, F, T>,
            _marker: PhantomData,
        }
    }

    /// Calls the target with an argument tuple.
    #[inline]
    pub fn call(&self, args: S::Args) -> S::Output {
        // SAFETY:
        // 1. `dispatch` was generated together with `handle` (struct
        //    invariant)
        // 2. The target is alive and shared for `'a`, which outlives `&self`
        //    (struct invariant)
        unsafe { (self.dispatch)(self.handle, args) }
    }
}

impl<S: Signature> Clone for RawFunctionRef<'_, S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Signature> Copy for RawFunctionRef<'_, S> {}

impl<S: Signature> core::fmt::Debug for RawFunctionRef<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawFunctionRef")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Calls a referenced `F`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` was created by [`RawHandle::from_const_object`] from an `&F`.
/// 2. The referenced `F` is alive for the duration of the call.
unsafe fn dispatch_object<S, F>(handle: RawHandle, args: S::Args) -> S::Output
where
    S: Signature,
    F: CallRef<S>,
{
    // SAFETY: Guaranteed by the caller
    let target = unsafe { handle.const_object::<F>() };
    // SAFETY: The pointer comes from a reference to a live `F` (guaranteed by
    // the caller), and is only used for shared access
    let target: &F = unsafe { target.as_ref() };
    target.call_ref(args)
}

/// Calls a function pointer stored in the handle.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `handle` was created by [`RawHandle::from_function`] from an
///    `S::Pointer`.
unsafe fn dispatch_pointer<S: Signature>(handle: RawHandle, args: S::Args) -> S::Output {
    // SAFETY: Guaranteed by the caller
    let pointer = unsafe { handle.function::<S::Pointer>() };
    S::invoke_pointer(pointer, args)
}

/// Calls the compile-time entity `F`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. A `NonType<F>` was created for this `F`.
unsafe fn dispatch_entity<S, F>(_handle: RawHandle, args: S::Args) -> S::Output
where
    S: Signature,
    F: Copy,
    NonType<F>: CallRef<S>,
{
    // SAFETY: Guaranteed by the caller
    let entity = unsafe { NonType::<F>::conjure() };
    crate::binding::nontype(entity).call_ref(args)
}

/// Calls the compile-time entity `F` on a referenced `T`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. A `NonType<F>` was created for this `F`.
/// 2. `handle` was created by [`RawHandle::from_const_object`] from an
///    `&'a T`, and the `T` is alive for `'a`.
unsafe fn dispatch_bound<'a, S, F, T>(handle: RawHandle, args: S::Args) -> S::Output
where
    S: Signature,
    F: Copy,
    T: 'a,
    BoundRef<F, &'a T>: CallRef<S>,
{
    // SAFETY: Guaranteed by the caller
    let entity = unsafe { NonType::<F>::conjure() };
    // SAFETY: Guaranteed by the caller
    let receiver = unsafe { handle.const_object::<T>() };
    // SAFETY: The pointer comes from an `&'a T` whose target is alive for `'a`
    // (guaranteed by the caller)
    let receiver: &'a T = unsafe { receiver.as_ref() };
    BoundRef::new(crate::binding::nontype(entity), receiver).call_ref(args)
}
