//! The type-erased, move-only wrapper behind a single handle.
//!
//! This module encapsulates the `handle` and `vtable` fields of
//! [`RawMoveFunction`], ensuring they are only ever set together. This
//! guarantees the safety invariant: **the handle was created together with the
//! vtable**, and owns the target the vtable describes.

use alloc::boxed::Box;
use core::{any::TypeId, marker::PhantomData, mem::ManuallyDrop, ptr::NonNull};

use super::vtable::MoveVtable;
use crate::{handle::RawHandle, handlers::CallHandler, signature::Signature};

/// A type-erased, move-only callable with signature `S`.
///
/// The target is referenced by one [`RawHandle`]: a box pointer for callable
/// objects, or the function pointer itself for bare function pointers.
/// Zero-sized targets are "boxed" without allocating.
///
/// The handler chosen at construction decides how the target is accessed when
/// called. [`RawMoveFunction`] does not record it in its type, so the unsafe
/// call methods require the caller to know which handler was used.
///
/// # Safety Invariant
///
/// `handle` was created together with `vtable` and exclusively owns the
/// target it references, or `vtable` is the null vtable and `handle` is the
/// null handle.
pub struct RawMoveFunction<S: Signature> {
    /// The handle to the target.
    handle: RawHandle,
    /// The operations for the target.
    vtable: &'static MoveVtable<S>,
    /// Targets are erased and may be neither `Send` nor `Sync`.
    _marker: PhantomData<*mut ()>,
}

impl<S: Signature> RawMoveFunction<S> {
    /// Creates a null [`RawMoveFunction`].
    #[inline]
    pub const fn null() -> Self {
        Self {
            handle: RawHandle::null(),
            vtable: MoveVtable::null(),
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawMoveFunction`] owning `target`, called through the
    /// handler `H`.
    #[inline]
    pub fn new<F, H>(target: F) -> Self
    where
        F: 'static,
        H: CallHandler<S, F>,
    {
        Self::from_box::<F, H>(Box::new(target))
    }

    /// Creates a [`RawMoveFunction`] whose target is produced by `init`
    /// directly in its heap allocation.
    pub fn in_place<F, H>(init: impl FnOnce() -> F) -> Self
    where
        F: 'static,
        H: CallHandler<S, F>,
    {
        let mut uninit = Box::<F>::new_uninit();
        uninit.write(init());
        // SAFETY: The box was initialized on the previous line
        let boxed = unsafe { uninit.assume_init() };
        Self::from_box::<F, H>(boxed)
    }

    /// Creates a [`RawMoveFunction`] owning a boxed target.
    #[inline]
    pub fn from_box<F, H>(target: Box<F>) -> Self
    where
        F: 'static,
        H: CallHandler<S, F>,
    {
        let ptr: *mut F = Box::into_raw(target);
        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<F> = unsafe { NonNull::new_unchecked(ptr) };

        Self {
            handle: RawHandle::from_object(ptr),
            vtable: MoveVtable::boxed::<F, H>(),
            _marker: PhantomData,
        }
    }

    /// Creates a [`RawMoveFunction`] holding a bare function pointer, called
    /// through the handler `H`.
    ///
    /// The pointer is stored in the handle, so this never allocates.
    #[inline]
    pub fn from_fn<H>(pointer: S::Pointer) -> Self
    where
        H: CallHandler<S, S::Pointer>,
    {
        Self {
            handle: RawHandle::from_function(pointer),
            vtable: MoveVtable::pointer::<H>(),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if no target is stored.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.vtable.is_null()
    }

    /// Calls the target through a shared reference.
    ///
    /// # Panics
    ///
    /// Panics if this [`RawMoveFunction`] is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`RawMoveFunction`] is null, or was created with a
    ///    non-consuming handler that only needs shared access to the target.
    #[inline]
    pub unsafe fn call_ref(&self, args: S::Args) -> S::Output {
        // SAFETY:
        // 1. The handle was created with the vtable (struct invariant)
        // 2. The handler only needs shared access (guaranteed by the caller),
        //    which `&self` provides
        // 3. The handler is not consuming (guaranteed by the caller)
        unsafe { self.vtable.call(self.handle, args) }
    }

    /// Calls the target through an exclusive reference.
    ///
    /// # Panics
    ///
    /// Panics if this [`RawMoveFunction`] is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This [`RawMoveFunction`] was not created with a consuming handler.
    #[inline]
    pub unsafe fn call_mut(&mut self, args: S::Args) -> S::Output {
        // SAFETY:
        // 1. The handle was created with the vtable (struct invariant)
        // 2. `&mut self` gives exclusive access to the owned target
        // 3. The handler is not consuming (guaranteed by the caller)
        unsafe { self.vtable.call(self.handle, args) }
    }

    /// Calls the target by value, consuming this [`RawMoveFunction`].
    ///
    /// The target is released exactly once: by the handler if it is
    /// consuming, and right after the call otherwise.
    ///
    /// # Panics
    ///
    /// Panics if this [`RawMoveFunction`] is null.
    pub fn call_once(self, args: S::Args) -> S::Output {
        if self.vtable.is_consuming() {
            let this = ManuallyDrop::new(self);
            // SAFETY:
            // 1. The handle was created with the vtable (struct invariant)
            // 2. Not applicable, since the handler is consuming
            // 3. `this` is never dropped, so the handle is not used again
            unsafe { this.vtable.call(this.handle, args) }
        } else {
            let this = self;
            // SAFETY:
            // 1. The handle was created with the vtable (struct invariant)
            // 2. We own `this`, so the access is exclusive
            // 3. Not applicable, since the handler is not consuming
            unsafe { this.vtable.call(this.handle, args) }
        }
    }

    /// Moves the target out, leaving this [`RawMoveFunction`] null.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::replace(self, Self::null())
    }

    /// Returns the [`TypeId`] of the target, or [`None`] if null.
    #[inline]
    pub fn target_type_id(&self) -> Option<TypeId> {
        (!self.is_null()).then(|| self.vtable.type_id())
    }

    /// Returns the type name of the target, or [`None`] if null.
    #[inline]
    pub fn target_type_name(&self) -> Option<&'static str> {
        (!self.is_null()).then(|| self.vtable.type_name())
    }

    /// Returns a reference to the target if it is a `T`.
    ///
    /// A function-pointer target is reported as `S::Pointer`.
    pub fn target<T: 'static>(&self) -> Option<&T> {
        if self.target_type_id() != Some(TypeId::of::<T>()) {
            return None;
        }

        // SAFETY:
        // 1. The handle was created with the vtable (struct invariant), and
        //    the target is alive as long as `self`
        let payload = unsafe { self.vtable.payload(&self.handle) };

        // SAFETY: The target is a `T`, since its type id matches, and it is
        // valid for reads for as long as `&self`
        Some(unsafe { payload.cast::<T>().as_ref() })
    }
}

impl<S: Signature> Drop for RawMoveFunction<S> {
    fn drop(&mut self) {
        // SAFETY:
        // 1. The handle was created with the vtable and owns the target
        //    (struct invariant)
        // 2. The wrapper is being dropped, so the handle is never used again
        unsafe { self.vtable.destroy(self.handle) };
    }
}

impl<S: Signature> Default for RawMoveFunction<S> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<S: Signature> core::fmt::Debug for RawMoveFunction<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawMoveFunction")
            .field("target", &self.target_type_name())
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{
        format,
        rc::Rc,
        string::{String, ToString},
        vec,
        vec::Vec,
    };
    use core::cell::RefCell;

    use super::*;
    use crate::invoke::{CallMut, CallOnce, CallRef};

    type Inc = fn(i32) -> i32;

    struct Shared;

    impl<S: Signature, F: CallRef<S>> CallHandler<S, F> for Shared {
        const CONSUMING: bool = false;

        unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
            // SAFETY: Guaranteed by the caller
            let target = unsafe { target.as_ref() };
            target.call_ref(args)
        }
    }

    struct Exclusive;

    impl<S: Signature, F: CallMut<S>> CallHandler<S, F> for Exclusive {
        const CONSUMING: bool = false;

        unsafe fn call(mut target: NonNull<F>, args: S::Args) -> S::Output {
            // SAFETY: Guaranteed by the caller
            let target = unsafe { target.as_mut() };
            target.call_mut(args)
        }
    }

    struct Consuming;

    impl<S: Signature, F: CallOnce<S>> CallHandler<S, F> for Consuming {
        const CONSUMING: bool = true;

        unsafe fn call(target: NonNull<F>, args: S::Args) -> S::Output {
            // SAFETY: Guaranteed by the caller
            let target = unsafe { target.read() };
            target.call_once(args)
        }
    }

    struct LogOnDrop {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Drop for LogOnDrop {
        fn drop(&mut self) {
            self.log.borrow_mut().push("drop".to_string());
        }
    }

    #[test]
    fn test_move_function_size() {
        assert_eq!(
            size_of::<RawMoveFunction<Inc>>(),
            2 * size_of::<usize>()
        );
        static_assertions::assert_not_impl_any!(RawMoveFunction<Inc>: Send, Sync, Clone);
    }

    #[test]
    fn test_null() {
        let function = RawMoveFunction::<Inc>::null();
        assert!(function.is_null());
        assert_eq!(function.target_type_id(), None);
        assert!(function.target::<Inc>().is_none());
        assert!(RawMoveFunction::<Inc>::default().is_null());
    }

    #[test]
    #[should_panic(expected = "bad function call")]
    fn test_null_call_panics() {
        let mut function = RawMoveFunction::<Inc>::null();
        // SAFETY: The function is null
        let _ = unsafe { function.call_mut((1,)) };
    }

    #[test]
    fn test_shared_call() {
        let offset = 2;
        let function = RawMoveFunction::<Inc>::new::<_, Shared>(move |x: i32| x + offset);
        // SAFETY: Created with a shared handler
        assert_eq!(unsafe { function.call_ref((40,)) }, 42);
        // SAFETY: Created with a shared handler
        assert_eq!(unsafe { function.call_ref((0,)) }, 2);
    }

    #[test]
    fn test_exclusive_call() {
        let mut total = 0;
        let mut function = RawMoveFunction::<Inc>::new::<_, Exclusive>(move |x: i32| {
            total += x;
            total
        });
        // SAFETY: Created with a non-consuming handler
        assert_eq!(unsafe { function.call_mut((1,)) }, 1);
        // SAFETY: Created with a non-consuming handler
        assert_eq!(unsafe { function.call_mut((2,)) }, 3);
        assert_eq!(function.call_once((3,)), 6);
    }

    #[test]
    fn test_consuming_call_drops_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let guard = LogOnDrop { log: log.clone() };
        let function = RawMoveFunction::<fn() -> usize>::new::<_, Consuming>(move || {
            let guard = guard;
            guard.log.borrow().len()
        });
        assert_eq!(function.call_once(()), 0);
        assert_eq!(*log.borrow(), vec!["drop".to_string()]);
    }

    #[test]
    fn test_destroy_drops_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let guard = LogOnDrop { log: log.clone() };
        let mut function = RawMoveFunction::<fn() -> usize>::new::<_, Consuming>(move || {
            let guard = guard;
            guard.log.borrow().len()
        });

        let taken = function.take();
        assert!(function.is_null());
        drop(function);
        assert!(log.borrow().is_empty());

        drop(taken);
        assert_eq!(*log.borrow(), vec!["drop".to_string()]);
    }

    #[test]
    fn test_function_pointer_target() {
        fn double(x: i32) -> i32 {
            x * 2
        }
        let function = RawMoveFunction::<Inc>::from_fn::<Shared>(double);
        assert_eq!(function.target_type_id(), Some(TypeId::of::<Inc>()));
        let stored = function.target::<Inc>().copied();
        assert_eq!(stored.map(|p| p(4)), Some(8));
        // SAFETY: Created with a shared handler
        assert_eq!(unsafe { function.call_ref((21,)) }, 42);

        let function = RawMoveFunction::<Inc>::from_fn::<Consuming>(double);
        assert_eq!(function.call_once((5,)), 10);
    }

    #[test]
    fn test_in_place_and_target() {
        #[derive(Debug, PartialEq)]
        struct Adder(i32);

        impl CallRef<Inc> for Adder {
            fn call_ref(&self, (x,): (i32,)) -> i32 {
                x + self.0
            }
        }

        let function = RawMoveFunction::<Inc>::in_place::<_, Shared>(|| Adder(5));
        assert_eq!(function.target::<Adder>(), Some(&Adder(5)));
        assert!(function.target_type_name().is_some_and(|name| name.ends_with("Adder")));
        // SAFETY: Created with a shared handler
        assert_eq!(unsafe { function.call_ref((1,)) }, 6);
    }

    #[test]
    fn test_debug() {
        let function = RawMoveFunction::<Inc>::null();
        assert!(format!("{function:?}").contains("target: None"));
    }
}
