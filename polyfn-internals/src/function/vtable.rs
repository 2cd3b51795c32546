//! Vtable for the copyable wrapper.
//!
//! This module encapsulates the fields of [`FunctionVtable`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the vtable's slot type must match the slot actually stored in
//! the inline buffer of the [`RawFunction`]**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because vtables are created as `&'static`
//! references via [`FunctionVtable::new`], which pairs the function pointers
//! with one specific slot type `P` at compile time, and because
//! [`RawFunction`] only ever stores a vtable together with a slot of the type
//! it was created for.
//!
//! [`RawFunction`]: super::RawFunction

use core::{any::TypeId, ptr::NonNull};

use super::storage::Slot;
use crate::{invoke::CallMut, signature::Signature, util::Erased};

/// Vtable for the type-erased operations of a [`RawFunction`].
///
/// # Safety Invariant
///
/// Unless `empty` is `true`, the fields `call`, `clone_into`, `relocate`,
/// `drop` and `payload` point to the functions defined below instantiated with
/// the slot type `P` that was used to create this [`FunctionVtable`]. For the
/// empty vtable they point to the `empty_*` functions, which never touch the
/// buffer.
///
/// [`RawFunction`]: super::RawFunction
pub(super) struct FunctionVtable<S: Signature> {
    /// Gets the [`TypeId`] of the payload.
    type_id: fn() -> TypeId,
    /// Gets the type name of the payload.
    type_name: fn() -> &'static str,
    /// Whether this is the vtable of an empty wrapper.
    empty: bool,
    /// Whether the payload is stored behind a box.
    boxed: bool,
    /// Calls the payload mutably.
    call: unsafe fn(NonNull<Erased>, S::Args) -> S::Output,
    /// Clones the slot into uninitialized storage.
    clone_into: unsafe fn(NonNull<Erased>, NonNull<Erased>),
    /// Moves the slot into uninitialized storage.
    relocate: unsafe fn(NonNull<Erased>, NonNull<Erased>),
    /// Drops the slot in place.
    drop: unsafe fn(NonNull<Erased>),
    /// Gets a pointer to the payload, which may live on the heap.
    payload: unsafe fn(NonNull<Erased>) -> NonNull<Erased>,
}

impl<S: Signature> FunctionVtable<S> {
    /// Creates the [`FunctionVtable`] for the slot type `P`.
    pub(super) const fn new<P>() -> &'static Self
    where
        P: Slot + Clone,
        P::Payload: CallMut<S>,
    {
        const {
            &Self {
                type_id: TypeId::of::<P::Payload>,
                type_name: core::any::type_name::<P::Payload>,
                empty: false,
                boxed: P::BOXED,
                call: call::<S, P>,
                clone_into: clone_into::<P>,
                relocate: relocate::<P>,
                drop: drop::<P>,
                payload: payload::<P>,
            }
        }
    }

    /// Returns the vtable of an empty wrapper.
    ///
    /// Calling through it panics. Every other operation is a no-op.
    pub(super) const fn empty() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<Erased>,
                type_name: core::any::type_name::<Erased>,
                empty: true,
                boxed: false,
                call: empty_call::<S>,
                clone_into: empty_transfer,
                relocate: empty_transfer,
                drop: empty_drop,
                payload: empty_payload,
            }
        }
    }

    /// Whether this is the vtable of an empty wrapper.
    #[inline]
    pub(super) fn is_empty(&self) -> bool {
        self.empty
    }

    /// Whether the payload is stored behind a box.
    #[inline]
    pub(super) fn is_boxed(&self) -> bool {
        self.boxed
    }

    /// Gets the [`TypeId`] of the payload.
    #[inline]
    pub(super) fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// Gets the type name of the payload.
    #[inline]
    pub(super) fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// Calls the payload stored at `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to the inline buffer holding the slot this vtable was
    ///    created for.
    /// 2. `ptr` is valid for reads and writes for the duration of the call.
    #[inline]
    pub(super) unsafe fn call(&self, ptr: NonNull<Erased>, args: S::Args) -> S::Output {
        // SAFETY: We know that `self.call` points to `call::<S, P>` or to
        // `empty_call::<S>`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.call)(ptr, args) }
    }

    /// Clones the slot stored at `src` into `dst`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `src` points to an inline buffer holding the slot this vtable was
    ///    created for, valid for reads.
    /// 2. `dst` points to an inline buffer of the same capacity that holds no
    ///    slot, valid for writes.
    #[inline]
    pub(super) unsafe fn clone_into(&self, src: NonNull<Erased>, dst: NonNull<Erased>) {
        // SAFETY: We know that `self.clone_into` points to `clone_into::<P>`
        // or to `empty_transfer`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.clone_into)(src, dst) }
    }

    /// Moves the slot stored at `src` into `dst`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `src` points to an inline buffer holding the slot this vtable was
    ///    created for, valid for reads.
    /// 2. `dst` points to an inline buffer of the same capacity that holds no
    ///    slot, valid for writes.
    /// 3. The slot at `src` is treated as moved-from afterwards: it is neither
    ///    used nor dropped again.
    #[inline]
    pub(super) unsafe fn relocate(&self, src: NonNull<Erased>, dst: NonNull<Erased>) {
        // SAFETY: We know that `self.relocate` points to `relocate::<P>` or to
        // `empty_transfer`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        // 3. Guaranteed by the caller
        unsafe { (self.relocate)(src, dst) }
    }

    /// Drops the slot stored at `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an inline buffer holding the slot this vtable was
    ///    created for, valid for reads and writes.
    /// 2. The slot is treated as moved-from afterwards: it is neither used nor
    ///    dropped again.
    #[inline]
    pub(super) unsafe fn drop(&self, ptr: NonNull<Erased>) {
        // SAFETY: We know that `self.drop` points to `drop::<P>` or to
        // `empty_drop`. Their safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe { (self.drop)(ptr) }
    }

    /// Returns a pointer to the payload of the slot stored at `ptr`.
    ///
    /// The returned pointer carries the same permissions as `ptr`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an inline buffer holding the slot this vtable was
    ///    created for, valid for reads.
    /// 2. This is not the empty vtable.
    #[inline]
    pub(super) unsafe fn payload(&self, ptr: NonNull<Erased>) -> NonNull<Erased> {
        // SAFETY: We know that `self.payload` points to `payload::<P>`, since
        // this is not the empty vtable (guaranteed by the caller). Its safety
        // requirements are upheld:
        // 1. Guaranteed by the caller
        unsafe { (self.payload)(ptr) }
    }
}

/// Calls the payload of the slot `P` stored at `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `P`.
/// 2. `ptr` is valid for reads and writes for the duration of the call.
unsafe fn call<S, P>(ptr: NonNull<Erased>, args: S::Args) -> S::Output
where
    S: Signature,
    P: Slot,
    P::Payload: CallMut<S>,
{
    // SAFETY:
    // 1. The pointer points to an initialized `P` (guaranteed by the caller)
    // 2. Exclusive access is guaranteed by the caller
    let slot: &mut P = unsafe { ptr.cast::<P>().as_mut() };
    slot.payload_mut().call_mut(args)
}

/// Clones the `P` stored at `src` into `dst`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `src` points to an initialized `P`, valid for reads.
/// 2. `dst` is valid for writes of a `P`.
unsafe fn clone_into<P: Slot + Clone>(src: NonNull<Erased>, dst: NonNull<Erased>) {
    // SAFETY: Guaranteed by the caller
    let src: &P = unsafe { src.cast::<P>().as_ref() };
    let cloned = src.clone();
    // SAFETY: Guaranteed by the caller
    unsafe { dst.cast::<P>().write(cloned) };
}

/// Moves the `P` stored at `src` into `dst`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `src` points to an initialized `P`, valid for reads.
/// 2. `dst` is valid for writes of a `P`.
/// 3. The caller treats `src` as moved-from afterwards.
unsafe fn relocate<P: Slot>(src: NonNull<Erased>, dst: NonNull<Erased>) {
    // SAFETY: Guaranteed by the caller
    let value = unsafe { src.cast::<P>().read() };
    // SAFETY: Guaranteed by the caller
    unsafe { dst.cast::<P>().write(value) };
}

/// Drops the `P` stored at `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `P`, valid for reads and writes.
/// 2. The caller treats `ptr` as moved-from afterwards.
unsafe fn drop<P: Slot>(ptr: NonNull<Erased>) {
    // SAFETY: Guaranteed by the caller
    unsafe { ptr.cast::<P>().drop_in_place() };
}

/// Returns a pointer to the payload of the `P` stored at `ptr`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `ptr` points to an initialized `P`, valid for reads.
unsafe fn payload<P: Slot>(ptr: NonNull<Erased>) -> NonNull<Erased> {
    // SAFETY: Guaranteed by the caller
    let slot: &P = unsafe { ptr.cast::<P>().as_ref() };
    NonNull::from(slot.payload()).cast::<Erased>()
}

/// Call entry of the empty vtable.
unsafe fn empty_call<S: Signature>(_ptr: NonNull<Erased>, _args: S::Args) -> S::Output {
    panic!("bad function call: the callable is empty")
}

/// Clone and relocate entry of the empty vtable.
unsafe fn empty_transfer(_src: NonNull<Erased>, _dst: NonNull<Erased>) {}

/// Drop entry of the empty vtable.
unsafe fn empty_drop(_ptr: NonNull<Erased>) {}

/// Payload entry of the empty vtable.
unsafe fn empty_payload(ptr: NonNull<Erased>) -> NonNull<Erased> {
    ptr
}
