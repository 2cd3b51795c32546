//! The single-word untyped handle used by the borrowed and move-only wrappers.
//!
//! A [`RawHandle`] is one machine word that can mean an object pointer, a
//! const object pointer or a function pointer. Which one it is, and what type
//! it points to, is known only to the dispatch function that was generated
//! together with it. The handle is never inspected anywhere else.

use core::ptr::NonNull;

use crate::signature::FnPointer;

/// An untyped, pointer-sized handle to a target.
///
/// The three fields share one word. The dispatch function that was selected
/// when the handle was created is the only code that knows which field is
/// active and what it points to.
///
/// A handle created by [`RawHandle::null`] has its object field active and
/// set to the null pointer.
#[derive(Clone, Copy)]
#[repr(C)]
pub union RawHandle {
    /// A pointer to a target the holder may mutate (or owns).
    object: *mut (),
    /// A pointer to a target the holder may only read.
    const_object: *const (),
    /// A function pointer, transmuted to a common type.
    function: unsafe fn(),
}

impl RawHandle {
    /// Creates the null handle.
    #[inline]
    pub const fn null() -> Self {
        Self {
            object: core::ptr::null_mut(),
        }
    }

    /// Creates a handle holding a mutable object pointer.
    #[inline]
    pub const fn from_object<T>(ptr: NonNull<T>) -> Self {
        Self {
            object: ptr.as_ptr().cast::<()>(),
        }
    }

    /// Creates a handle holding a const object pointer.
    #[inline]
    pub const fn from_const_object<T>(ptr: &T) -> Self {
        Self {
            const_object: core::ptr::from_ref(ptr).cast::<()>(),
        }
    }

    /// Creates a handle holding a function pointer of type `P`.
    #[inline]
    pub fn from_function<P: FnPointer>(pointer: P) -> Self {
        // SAFETY: `P` is a function-pointer type (guaranteed by the sealed
        // `FnPointer` bound), so it has the size of `unsafe fn()` and is
        // never null
        let function = unsafe { core::mem::transmute_copy::<P, unsafe fn()>(&pointer) };
        Self { function }
    }

    /// Returns the object pointer stored in this handle.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The handle was created by [`RawHandle::from_object`] with a pointer
    ///    to a `T`.
    #[inline]
    pub unsafe fn object<T>(self) -> NonNull<T> {
        // SAFETY: The object field is active (guaranteed by the caller)
        let ptr = unsafe { self.object };

        // SAFETY: `from_object` only ever stores non-null pointers
        unsafe { NonNull::new_unchecked(ptr.cast::<T>()) }
    }

    /// Returns the const object pointer stored in this handle.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The handle was created by [`RawHandle::from_const_object`] with a
    ///    reference to a `T`.
    #[inline]
    pub unsafe fn const_object<T>(self) -> NonNull<T> {
        // SAFETY: The const object field is active (guaranteed by the caller)
        let ptr = unsafe { self.const_object };

        // SAFETY: `from_const_object` only ever stores pointers derived from
        // references, which are never null
        unsafe { NonNull::new_unchecked(ptr.cast_mut().cast::<T>()) }
    }

    /// Returns the function pointer stored in this handle as a `P`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The handle was created by [`RawHandle::from_function`] with a value
    ///    of type `P`.
    #[inline]
    pub unsafe fn function<P: FnPointer>(self) -> P {
        // SAFETY: The function field is active (guaranteed by the caller)
        let function = unsafe { self.function };

        // SAFETY: The bits were produced by transmuting a `P` (guaranteed by
        // the caller), so transmuting them back yields the original value
        unsafe { core::mem::transmute_copy::<unsafe fn(), P>(&function) }
    }

    /// Returns a pointer to the handle's own storage.
    ///
    /// Since every field of a `#[repr(C)]` union lives at offset zero, a
    /// handle created by [`RawHandle::from_function`] with a value of type `P`
    /// can be read through this pointer as a `P`.
    #[inline]
    pub fn as_ptr(&self) -> NonNull<()> {
        NonNull::from(self).cast::<()>()
    }

    /// Returns the handle as an untyped address, for diagnostics.
    #[inline]
    pub fn addr(self) -> usize {
        // SAFETY: Every field is a pointer-sized value without invalid bit
        // patterns when read as a raw data pointer, so reading the object field
        // is valid no matter which field was written.
        let ptr = unsafe { self.object };
        ptr.addr()
    }
}

impl core::fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RawHandle")
            .field(&format_args!("{:#x}", self.addr()))
            .finish()
    }
}
