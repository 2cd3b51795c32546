//! The type-erased, copyable wrapper with inline storage.
//!
//! This module encapsulates the `vtable` and `storage` fields of
//! [`RawFunction`], ensuring they are only ever changed together. This
//! guarantees the safety invariant: **the vtable always matches the slot held
//! in the buffer**, or is the empty vtable while the buffer holds nothing.

use alloc::boxed::Box;
use core::{any::TypeId, marker::PhantomData};

use super::{
    storage::{Boxed, Inline, InlineBuffer, Slot, fits_inline},
    vtable::FunctionVtable,
};
use crate::{invoke::CallMut, signature::Signature};

/// A type-erased callable with signature `S`, stored in `WORDS` inline words.
///
/// Targets that fit in the buffer are stored without indirection. Larger or
/// over-aligned targets are boxed, and only the box is stored inline.
///
/// A `RawFunction` is either empty or holds exactly one target. Calling an
/// empty `RawFunction` panics.
///
/// `WORDS` must be at least 1, so that a boxed target always fits. Creating a
/// `RawFunction` with no inline words fails to compile, even for zero-sized
/// targets:
///
/// ```compile_fail
/// use polyfn_internals::RawFunction;
///
/// let _ = RawFunction::<fn(), 0>::new(|| {});
/// ```
///
/// # Safety Invariant
///
/// Unless `vtable` is the empty vtable, `storage` holds an initialized slot of
/// the type `vtable` was created for. While `vtable` is the empty vtable,
/// `storage` holds nothing that needs to be dropped.
pub struct RawFunction<S: Signature, const WORDS: usize> {
    /// The operations for the slot in `storage`.
    vtable: &'static FunctionVtable<S>,
    /// The slot itself.
    storage: InlineBuffer<WORDS>,
    /// Payloads are erased and may be neither `Send` nor `Sync`.
    _marker: PhantomData<*mut ()>,
}

impl<S: Signature, const WORDS: usize> RawFunction<S, WORDS> {
    /// Creates an empty [`RawFunction`].
    #[inline]
    pub const fn empty() -> Self {
        const {
            assert!(WORDS >= 1, "the inline buffer must hold at least one word");
        }
        Self {
            vtable: FunctionVtable::empty(),
            storage: InlineBuffer::uninit(),
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawFunction`] holding `target`.
    ///
    /// The target is stored inline if [`fits_inline`] allows it, and boxed
    /// otherwise.
    pub fn new<F>(target: F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        if fits_inline::<F, WORDS>() {
            // SAFETY:
            // 1. `Inline<F>` is `repr(transparent)`, so it fits exactly when
            //    `F` does, which was just checked
            unsafe { Self::with_slot(Inline(target)) }
        } else {
            Self::boxed(Box::new(target))
        }
    }

    /// Creates a [`RawFunction`] holding `target` inline.
    ///
    /// Fails to compile if `F` does not fit in `WORDS` words.
    pub fn new_inline<F>(target: F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        const {
            assert!(
                fits_inline::<F, WORDS>(),
                "the target does not fit in the inline buffer"
            );
        }

        // SAFETY:
        // 1. `F` fits (asserted at compile time above)
        unsafe { Self::with_slot(Inline(target)) }
    }

    /// Creates a [`RawFunction`] whose target is produced by `init` directly
    /// in its final location.
    ///
    /// If `init` panics, nothing is allocated or leaked.
    pub fn in_place<F>(init: impl FnOnce() -> F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        let mut this = Self::empty();
        if fits_inline::<F, WORDS>() {
            let ptr = this.storage.as_mut_ptr().cast::<F>();
            // SAFETY: `F` fits in the buffer (just checked), and the buffer
            // holds nothing since `this` is empty
            unsafe { ptr.write(init()) };
            this.vtable = FunctionVtable::new::<Inline<F>>();
        } else {
            let mut uninit = Box::<F>::new_uninit();
            uninit.write(init());
            // SAFETY: The box was initialized on the previous line
            let boxed = unsafe { uninit.assume_init() };
            Self::assert_box_fits::<F>();
            let ptr = this.storage.as_mut_ptr().cast::<Boxed<F>>();
            // SAFETY: A `Boxed<F>` fits in the buffer (asserted above), and
            // the buffer holds nothing since `this` is empty
            unsafe { ptr.write(Boxed(boxed)) };
            this.vtable = FunctionVtable::new::<Boxed<F>>();
        }
        this
    }

    /// Creates a [`RawFunction`] holding an already boxed target.
    fn boxed<F>(target: Box<F>) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        Self::assert_box_fits::<F>();

        // SAFETY:
        // 1. A `Boxed<F>` fits (asserted at compile time above)
        unsafe { Self::with_slot(Boxed(target)) }
    }

    /// Fails to compile if `WORDS` cannot even hold a box.
    #[inline]
    fn assert_box_fits<F>() {
        const {
            assert!(
                fits_inline::<Boxed<F>, WORDS>(),
                "the inline buffer cannot hold a single pointer"
            );
        }
    }

    /// Creates a [`RawFunction`] holding `slot`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `P` fits in `WORDS` words, as reported by [`fits_inline`].
    #[inline]
    unsafe fn with_slot<P>(slot: P) -> Self
    where
        P: Slot + Clone,
        P::Payload: CallMut<S>,
    {
        let mut this = Self::empty();
        let ptr = this.storage.as_mut_ptr().cast::<P>();
        // SAFETY: `P` fits in the buffer (guaranteed by the caller), and the
        // buffer holds nothing since `this` is empty
        unsafe { ptr.write(slot) };
        this.vtable = FunctionVtable::new::<P>();
        this
    }

    /// Returns `true` if no target is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vtable.is_empty()
    }

    /// Returns `true` if a target is stored and lives on the heap.
    #[inline]
    pub fn is_boxed(&self) -> bool {
        self.vtable.is_boxed()
    }

    /// Calls the target with an argument tuple.
    ///
    /// # Panics
    ///
    /// Panics if this [`RawFunction`] is empty.
    #[inline]
    pub fn call(&mut self, args: S::Args) -> S::Output {
        let ptr = self.storage.as_mut_ptr();
        // SAFETY:
        // 1. The vtable matches the slot in the buffer (struct invariant)
        // 2. `ptr` was derived from `&mut self`, so it is valid for reads and
        //    writes for the duration of the call
        unsafe { self.vtable.call(ptr, args) }
    }

    /// Moves the target out, leaving this [`RawFunction`] empty.
    pub fn take(&mut self) -> Self {
        let mut out = Self::empty();
        let src = self.storage.as_mut_ptr();
        let dst = out.storage.as_mut_ptr();
        // SAFETY:
        // 1. The vtable matches the slot in `self.storage` (struct invariant)
        // 2. `out` is empty and has the same capacity
        // 3. `self.vtable` is replaced with the empty vtable right below, so
        //    the moved-from slot is never used or dropped again
        unsafe { self.vtable.relocate(src, dst) };
        out.vtable = core::mem::replace(&mut self.vtable, FunctionVtable::empty());
        out
    }

    /// Drops the target, leaving this [`RawFunction`] empty.
    ///
    /// The wrapper is already empty while the target's destructor runs.
    pub fn clear(&mut self) {
        let vtable = core::mem::replace(&mut self.vtable, FunctionVtable::empty());
        let ptr = self.storage.as_mut_ptr();
        // SAFETY:
        // 1. `vtable` matches the slot in the buffer (struct invariant)
        // 2. `self.vtable` is already the empty vtable, so the slot is never
        //    used or dropped again
        unsafe { vtable.drop(ptr) };
    }

    /// Returns the [`TypeId`] of the target, or [`None`] if empty.
    #[inline]
    pub fn target_type_id(&self) -> Option<TypeId> {
        (!self.is_empty()).then(|| self.vtable.type_id())
    }

    /// Returns the type name of the target, or [`None`] if empty.
    #[inline]
    pub fn target_type_name(&self) -> Option<&'static str> {
        (!self.is_empty()).then(|| self.vtable.type_name())
    }

    /// Returns a reference to the target if it is a `T`.
    pub fn target<T: 'static>(&self) -> Option<&T> {
        if self.target_type_id() != Some(TypeId::of::<T>()) {
            return None;
        }

        // SAFETY:
        // 1. The vtable matches the slot in the buffer (struct invariant), and
        //    the pointer is valid for reads since it comes from `&self`
        // 2. The vtable is not empty, since a target type id was returned
        let payload = unsafe { self.vtable.payload(self.storage.as_ptr()) };

        // SAFETY: The payload is a `T`, since its type id matches, and it
        // lives at least as long as `&self`
        Some(unsafe { payload.cast::<T>().as_ref() })
    }
}

impl<S: Signature, const WORDS: usize> Clone for RawFunction<S, WORDS> {
    fn clone(&self) -> Self {
        let mut out = Self::empty();
        let src = self.storage.as_ptr();
        let dst = out.storage.as_mut_ptr();
        // SAFETY:
        // 1. The vtable matches the slot in `self.storage` (struct invariant)
        // 2. `out` is empty and has the same capacity
        unsafe { self.vtable.clone_into(src, dst) };
        out.vtable = self.vtable;
        out
    }
}

impl<S: Signature, const WORDS: usize> Drop for RawFunction<S, WORDS> {
    fn drop(&mut self) {
        let ptr = self.storage.as_mut_ptr();
        // SAFETY:
        // 1. The vtable matches the slot in the buffer (struct invariant)
        // 2. The wrapper is being dropped, so the slot is never used again
        unsafe { self.vtable.drop(ptr) };
    }
}

impl<S: Signature, const WORDS: usize> Default for RawFunction<S, WORDS> {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Signature, const WORDS: usize> core::fmt::Debug for RawFunction<S, WORDS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawFunction")
            .field("target", &self.target_type_name())
            .field("boxed", &self.is_boxed())
            .finish()
    }
}
