//! Inline storage for the copyable wrapper.
//!
//! A [`RawFunction`] owns a fixed-size [`InlineBuffer`]. Every target is
//! stored inside it as a [`Slot`]: either the payload itself ([`Inline`]) when
//! it fits, or a [`Boxed`] pointer to it when it does not. The slot type is
//! what the vtable is generated for, so the vtable always knows whether it is
//! reaching through a box.
//!
//! [`RawFunction`]: super::RawFunction

use alloc::boxed::Box;
use core::{mem::MaybeUninit, ptr::NonNull};

use crate::util::Erased;

/// The inline capacity, in machine words, used when none is specified.
///
/// Three words are enough for a closure capturing a `String`, a `Vec` or
/// a pair of references. Larger targets are boxed.
pub const DEFAULT_INLINE_WORDS: usize = 3;

/// Returns whether a `T` can be stored directly in a buffer of `WORDS` words.
///
/// Both the size and the alignment have to fit: the buffer is aligned like a
/// `usize`, so over-aligned types are always boxed.
#[inline]
pub const fn fits_inline<T, const WORDS: usize>() -> bool {
    size_of::<T>() <= WORDS * size_of::<usize>() && align_of::<T>() <= align_of::<usize>()
}

/// A buffer of `WORDS` possibly uninitialized machine words.
///
/// Storing the words as `MaybeUninit<usize>` keeps pointer provenance intact
/// when the buffer is moved, so a [`Boxed`] slot stays valid across moves of
/// the wrapper.
#[repr(C)]
pub(super) struct InlineBuffer<const WORDS: usize> {
    /// The raw storage.
    words: [MaybeUninit<usize>; WORDS],
}

impl<const WORDS: usize> InlineBuffer<WORDS> {
    /// Creates an uninitialized buffer.
    #[inline]
    pub(super) const fn uninit() -> Self {
        Self {
            words: [MaybeUninit::uninit(); WORDS],
        }
    }

    /// Returns a pointer to the start of the buffer, valid for reads.
    #[inline]
    pub(super) fn as_ptr(&self) -> NonNull<Erased> {
        NonNull::from(&self.words).cast::<Erased>()
    }

    /// Returns a pointer to the start of the buffer, valid for reads and
    /// writes.
    #[inline]
    pub(super) fn as_mut_ptr(&mut self) -> NonNull<Erased> {
        NonNull::from(&mut self.words).cast::<Erased>()
    }
}

/// The representation of a target inside an [`InlineBuffer`].
pub(super) trait Slot: Sized + 'static {
    /// The user-visible callable held by this slot.
    type Payload: 'static;

    /// Whether the payload lives on the heap.
    const BOXED: bool;

    /// Returns the payload.
    fn payload(&self) -> &Self::Payload;

    /// Returns the payload mutably.
    fn payload_mut(&mut self) -> &mut Self::Payload;
}

/// A payload stored directly in the buffer.
#[derive(Clone)]
#[repr(transparent)]
pub(super) struct Inline<F>(pub(super) F);

impl<F: 'static> Slot for Inline<F> {
    type Payload = F;

    const BOXED: bool = false;

    #[inline]
    fn payload(&self) -> &F {
        &self.0
    }

    #[inline]
    fn payload_mut(&mut self) -> &mut F {
        &mut self.0
    }
}

/// A payload stored behind a box, with only the box in the buffer.
#[derive(Clone)]
#[repr(transparent)]
pub(super) struct Boxed<F>(pub(super) Box<F>);

impl<F: 'static> Slot for Boxed<F> {
    type Payload = F;

    const BOXED: bool = true;

    #[inline]
    fn payload(&self) -> &F {
        &self.0
    }

    #[inline]
    fn payload_mut(&mut self) -> &mut F {
        &mut self.0
    }
}
