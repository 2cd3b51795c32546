//! Binding strategies: the ways a concrete callable becomes a target.
//!
//! Besides plain closures and function pointers (which satisfy the contracts
//! in [`invoke`](crate::invoke) directly), a target can be built by combining
//! an entity that is fixed at compile time with a receiver that is only known
//! at runtime:
//!
//! - [`NonType<F>`] wraps a zero-sized entity, such as a function item or a
//!   capture-less closure. Because the entity has no state, the whole target is
//!   determined by its type and nothing needs to be stored for it.
//! - [`Bound<F, R>`] prepends a receiver, reached through
//!   [`ReceiverMut::target_mut`], to the arguments of every call.
//! - [`BoundRef<F, R>`] does the same through [`Receiver::target`], for
//!   entities that only need shared access to the receiver.
//!
//! The receiver may be the object itself ([`ByValue`]), a reference to it, or
//! an owning pointer such as a [`Box`] or an `Arc`.
//!
//! # Examples
//!
//! ```
//! use polyfn_internals::{
//!     binding::{Bound, nontype},
//!     invoke::CallMut,
//! };
//!
//! struct Counter {
//!     n: i32,
//! }
//!
//! impl Counter {
//!     fn add(&mut self, by: i32) -> i32 {
//!         self.n += by;
//!         self.n
//!     }
//! }
//!
//! let mut bound = Bound::new(nontype(Counter::add), Box::new(Counter { n: 0 }));
//! assert_eq!(CallMut::<fn(i32) -> i32>::call_mut(&mut bound, (2,)), 2);
//! assert_eq!(CallMut::<fn(i32) -> i32>::call_mut(&mut bound, (3,)), 5);
//! assert_eq!(bound.receiver().n, 5);
//! ```

use alloc::{boxed::Box, rc::Rc};

use crate::{
    invoke::{CallMut, CallOnce, CallRef},
    signature::{VarArgs, Variadic},
};

/// An entity bound at compile time.
///
/// Created with [`nontype`], which rejects entities that carry state. A
/// `NonType<F>` is itself a target: calling it calls the entity with the
/// forwarded arguments.
#[derive(Clone, Copy, Debug)]
pub struct NonType<F>(F);

/// Binds `entity` at compile time.
///
/// The entity must be zero-sized, which holds for function items and for
/// closures that capture nothing. Passing anything else (for example a
/// function pointer, whose value is only known at runtime) fails to compile.
///
/// ```compile_fail
/// let pointer: fn() = || {};
/// let _ = polyfn_internals::binding::nontype(pointer);
/// ```
#[inline]
pub const fn nontype<F: Copy>(entity: F) -> NonType<F> {
    const {
        assert!(
            size_of::<F>() == 0,
            "`nontype` requires a zero-sized entity such as a function item"
        );
    }
    NonType(entity)
}

impl<F: Copy> NonType<F> {
    /// Returns the bound entity.
    #[inline]
    pub const fn get(self) -> F {
        self.0
    }

    /// Produces the entity without having a value of it at hand.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. A `NonType<F>` was created for this `F` at some point, so `F` is a
    ///    zero-sized `Copy` type of which a value exists.
    #[inline]
    pub unsafe fn conjure() -> F {
        debug_assert_eq!(size_of::<F>(), 0);
        // SAFETY: `F` is zero-sized (guaranteed by the caller through
        // `nontype`), so reading it from a dangling, well-aligned pointer
        // reads no memory. `F: Copy` and a value of it exists, so duplicating
        // it is allowed.
        unsafe { core::ptr::NonNull::<F>::dangling().read() }
    }
}

/// Access to the object a bound entity is invoked on.
///
/// Implemented for references, owning pointers and [`ByValue`].
pub trait Receiver {
    /// The type the entity receives a reference to.
    type Target: ?Sized;

    /// Returns a shared reference to the receiver object.
    fn target(&self) -> &Self::Target;
}

/// Receivers which also give exclusive access to the object.
pub trait ReceiverMut: Receiver {
    /// Returns an exclusive reference to the receiver object.
    fn target_mut(&mut self) -> &mut Self::Target;
}

/// A receiver object stored by value.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct ByValue<T>(pub T);

impl<T> Receiver for ByValue<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        &self.0
    }
}

impl<T> ReceiverMut for ByValue<T> {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: ?Sized> Receiver for &T {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> Receiver for &mut T {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> ReceiverMut for &mut T {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        self
    }
}

impl<T: ?Sized> Receiver for Box<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> ReceiverMut for Box<T> {
    #[inline]
    fn target_mut(&mut self) -> &mut T {
        self
    }
}

impl<T: ?Sized> Receiver for Rc<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> Receiver for alloc::sync::Arc<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

impl<T: ?Sized> Receiver for triomphe::Arc<T> {
    type Target = T;

    #[inline]
    fn target(&self) -> &T {
        self
    }
}

/// A compile-time entity bound to a receiver it mutates.
///
/// Calling a `Bound<F, R>` with arguments `(a, b)` calls
/// `entity(receiver.target_mut(), a, b)`.
#[derive(Clone, Copy, Debug)]
pub struct Bound<F, R> {
    /// The compile-time entity.
    entity: F,
    /// The runtime receiver.
    receiver: R,
}

impl<F, R: ReceiverMut> Bound<F, R> {
    /// Binds `entity` to `receiver`.
    #[inline]
    pub fn new(entity: NonType<F>, receiver: R) -> Self {
        Self {
            entity: entity.0,
            receiver,
        }
    }

    /// Returns the receiver object.
    #[inline]
    pub fn receiver(&self) -> &R::Target {
        self.receiver.target()
    }

    /// Returns the receiver object mutably.
    #[inline]
    pub fn receiver_mut(&mut self) -> &mut R::Target {
        self.receiver.target_mut()
    }

    /// Consumes the binding, returning the receiver.
    #[inline]
    pub fn into_receiver(self) -> R {
        self.receiver
    }
}

/// A compile-time entity bound to a receiver it only reads.
///
/// Calling a `BoundRef<F, R>` with arguments `(a, b)` calls
/// `entity(receiver.target(), a, b)`.
#[derive(Clone, Copy, Debug)]
pub struct BoundRef<F, R> {
    /// The compile-time entity.
    entity: F,
    /// The runtime receiver.
    receiver: R,
}

impl<F, R: Receiver> BoundRef<F, R> {
    /// Binds `entity` to `receiver`.
    #[inline]
    pub fn new(entity: NonType<F>, receiver: R) -> Self {
        Self {
            entity: entity.0,
            receiver,
        }
    }

    /// Returns the receiver object.
    #[inline]
    pub fn receiver(&self) -> &R::Target {
        self.receiver.target()
    }

    /// Consumes the binding, returning the receiver.
    #[inline]
    pub fn into_receiver(self) -> R {
        self.receiver
    }
}

macro_rules! impl_binding {
    ($($A:ident $a:ident),*) => {
        impl_binding!(@contracts [fn($($A),*) -> R] [$($A),*] [$($A),*] [$($a),*]);
        impl_binding!(
            @contracts [Variadic<fn($($A),*) -> R>] [$($A),*] [$($A,)* VarArgs] [$($a,)* rest]
        );
    };
    (@contracts [$($sig:tt)*] [$($A:ident),*] [$($P:ty),*] [$($a:ident),*]) => {
        impl<F, R: 'static, $($A: 'static),*> CallRef<$($sig)*> for NonType<F>
        where
            F: Fn($($P),*) -> R,
        {
            #[inline]
            fn call_ref(&self, ($($a,)*): ($($P,)*)) -> R {
                (self.0)($($a),*)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallMut<$($sig)*> for NonType<F>
        where
            F: Fn($($P),*) -> R,
        {
            #[inline]
            fn call_mut(&mut self, ($($a,)*): ($($P,)*)) -> R {
                (self.0)($($a),*)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallOnce<$($sig)*> for NonType<F>
        where
            F: Fn($($P),*) -> R,
        {
            #[inline]
            fn call_once(self, ($($a,)*): ($($P,)*)) -> R {
                (self.0)($($a),*)
            }
        }

        impl<F, Recv, R: 'static, $($A: 'static),*> CallMut<$($sig)*> for Bound<F, Recv>
        where
            Recv: ReceiverMut,
            F: Fn(&mut Recv::Target, $($P),*) -> R,
        {
            #[inline]
            fn call_mut(&mut self, ($($a,)*): ($($P,)*)) -> R {
                (self.entity)(self.receiver.target_mut(), $($a),*)
            }
        }

        impl<F, Recv, R: 'static, $($A: 'static),*> CallOnce<$($sig)*> for Bound<F, Recv>
        where
            Recv: ReceiverMut,
            F: Fn(&mut Recv::Target, $($P),*) -> R,
        {
            #[inline]
            fn call_once(mut self, ($($a,)*): ($($P,)*)) -> R {
                (self.entity)(self.receiver.target_mut(), $($a),*)
            }
        }

        impl<F, Recv, R: 'static, $($A: 'static),*> CallRef<$($sig)*> for BoundRef<F, Recv>
        where
            Recv: Receiver,
            F: Fn(&Recv::Target, $($P),*) -> R,
        {
            #[inline]
            fn call_ref(&self, ($($a,)*): ($($P,)*)) -> R {
                (self.entity)(self.receiver.target(), $($a),*)
            }
        }

        impl<F, Recv, R: 'static, $($A: 'static),*> CallMut<$($sig)*> for BoundRef<F, Recv>
        where
            Recv: Receiver,
            F: Fn(&Recv::Target, $($P),*) -> R,
        {
            #[inline]
            fn call_mut(&mut self, ($($a,)*): ($($P,)*)) -> R {
                (self.entity)(self.receiver.target(), $($a),*)
            }
        }

        impl<F, Recv, R: 'static, $($A: 'static),*> CallOnce<$($sig)*> for BoundRef<F, Recv>
        where
            Recv: Receiver,
            F: Fn(&Recv::Target, $($P),*) -> R,
        {
            #[inline]
            fn call_once(self, ($($a,)*): ($($P,)*)) -> R {
                (self.entity)(self.receiver.target(), $($a),*)
            }
        }
    };
}

crate::for_each_arity!(impl_binding);

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};
    use core::cell::Cell;

    use super::*;

    #[derive(Clone)]
    struct Counter {
        n: i32,
    }

    impl Counter {
        fn increment(&mut self) {
            self.n += 1;
        }

        fn get(&self) -> i32 {
            self.n
        }

        fn scaled(&self, factor: i32) -> i32 {
            self.n * factor
        }
    }

    #[test]
    fn test_nontype_is_zero_sized() {
        fn free(x: u8) -> u8 {
            x + 1
        }
        let entity = nontype(free);
        assert_eq!(size_of_val(&entity), 0);
        assert_eq!(CallRef::<fn(u8) -> u8>::call_ref(&entity, (1,)), 2);

        fn conjure_from<F: Copy>(_proof: NonType<F>) -> F {
            // SAFETY: The `NonType<F>` passed in proves one was created
            unsafe { NonType::<F>::conjure() }
        }
        let free_again = conjure_from(entity);
        assert_eq!(free_again(4), 5);
        assert_eq!(entity.get()(9), 10);
    }

    #[test]
    fn test_bound_receivers() {
        let mut boxed = Bound::new(nontype(Counter::increment), Box::new(Counter { n: 0 }));
        CallMut::<fn()>::call_mut(&mut boxed, ());
        CallMut::<fn()>::call_mut(&mut boxed, ());
        assert_eq!(boxed.receiver().n, 2);

        let mut local = Counter { n: 10 };
        {
            let mut by_ref = Bound::new(nontype(Counter::increment), &mut local);
            CallMut::<fn()>::call_mut(&mut by_ref, ());
        }
        assert_eq!(local.n, 11);

        let by_value = Bound::new(nontype(Counter::increment), ByValue(Counter { n: 0 }));
        let mut copy = by_value.clone();
        CallMut::<fn()>::call_mut(&mut copy, ());
        assert_eq!(copy.receiver().n, 1);
        assert_eq!(by_value.receiver().n, 0);
    }

    #[test]
    fn test_bound_ref_receivers() {
        let shared = Rc::new(Counter { n: 3 });
        let get = BoundRef::new(nontype(Counter::get), Rc::clone(&shared));
        assert_eq!(CallRef::<fn() -> i32>::call_ref(&get, ()), 3);

        let scaled = BoundRef::new(nontype(Counter::scaled), triomphe::Arc::new(Counter { n: 4 }));
        assert_eq!(CallRef::<fn(i32) -> i32>::call_ref(&scaled, (5,)), 20);

        let local = Counter { n: 9 };
        let by_ref = BoundRef::new(nontype(Counter::get), &local);
        assert_eq!(CallOnce::<fn() -> i32>::call_once(by_ref, ()), 9);
    }

    #[test]
    fn test_capture_less_closure_entity() {
        let log = Cell::new(0);
        let push = nontype(|cell: &Cell<i32>, by: i32| cell.set(cell.get() + by));
        let bound = BoundRef::new(push, &log);
        CallRef::<fn(i32)>::call_ref(&bound, (4,));
        CallRef::<fn(i32)>::call_ref(&bound, (5,));
        assert_eq!(log.get(), 9);

        let names: Vec<String> = Vec::new();
        let mut push_name = Bound::new(
            nontype(|names: &mut Vec<String>, name: &'static str| names.push(String::from(name))),
            ByValue(names),
        );
        CallMut::<fn(&'static str)>::call_mut(&mut push_name, ("a",));
        assert_eq!(push_name.into_receiver().0, ["a"]);
    }

    #[test]
    fn test_variadic_bindings() {
        fn total(counter: &mut Counter, mut rest: VarArgs) -> i32 {
            while let Some(by) = rest.arg::<i64>() {
                counter.n += by as i32;
            }
            counter.n
        }

        fn describe(counter: &Counter, label: char, rest: VarArgs) -> String {
            alloc::format!("{label}{} +{}", counter.n, rest.len())
        }

        let pack = |values: &[i64]| {
            values
                .iter()
                .copied()
                .map(crate::signature::VarArg::from)
                .collect::<VarArgs>()
        };

        let mut bound = Bound::new(nontype(total), ByValue(Counter { n: 1 }));
        let sum = CallMut::<Variadic<fn() -> i32>>::call_mut(&mut bound, (pack(&[2, 3]),));
        assert_eq!(sum, 6);
        assert_eq!(bound.receiver().n, 6);

        let counter = Counter { n: 4 };
        let shared = BoundRef::new(nontype(describe), &counter);
        let text = CallRef::<Variadic<fn(char) -> String>>::call_ref(&shared, ('#', pack(&[7])));
        assert_eq!(text, "#4 +1");

        let entity = nontype(|rest: VarArgs| rest.len());
        assert_eq!(CallOnce::<Variadic<fn() -> usize>>::call_once(entity, (pack(&[1, 2]),)), 2);
    }
}
