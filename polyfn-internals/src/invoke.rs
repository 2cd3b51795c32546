//! Invocability contracts.
//!
//! A type can only become the target of a wrapper with signature `S` if it
//! satisfies one of the three contracts below. The contract required depends
//! on how the wrapper accesses its target when called:
//!
//! | contract       | access      | closure trait | used by                              |
//! |----------------|-------------|---------------|--------------------------------------|
//! | [`CallRef`]    | `&self`     | `Fn`          | `FunctionRef`, `MoveFunction<_, Const>` |
//! | [`CallMut`]    | `&mut self` | `FnMut`       | `Function`, `MoveFunction<_, Mut>`   |
//! | [`CallOnce`]   | `self`      | `FnOnce`      | `MoveFunction<_, Once>`              |
//!
//! Every closure and function type of the matching shape implements these
//! through blanket implementations. The binding types in
//! [`binding`](crate::binding) implement them by hand.
//!
//! A candidate which does not satisfy the contract is rejected at compile time,
//! at the construction site of the wrapper.

use crate::signature::{Signature, VarArgs, Variadic};

/// Callables that can be invoked through a shared reference.
pub trait CallRef<S: Signature> {
    /// Calls the target with an argument tuple.
    fn call_ref(&self, args: S::Args) -> S::Output;
}

/// Callables that can be invoked through an exclusive reference.
pub trait CallMut<S: Signature> {
    /// Calls the target with an argument tuple.
    fn call_mut(&mut self, args: S::Args) -> S::Output;
}

/// Callables that can be invoked once, by value.
pub trait CallOnce<S: Signature> {
    /// Calls the target with an argument tuple, consuming it.
    fn call_once(self, args: S::Args) -> S::Output;
}

macro_rules! impl_invoke {
    ($($A:ident $a:ident),*) => {
        impl<F, R: 'static, $($A: 'static),*> CallRef<fn($($A),*) -> R> for F
        where
            F: Fn($($A),*) -> R,
        {
            #[inline]
            fn call_ref(&self, ($($a,)*): ($($A,)*)) -> R {
                self($($a),*)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallMut<fn($($A),*) -> R> for F
        where
            F: FnMut($($A),*) -> R,
        {
            #[inline]
            fn call_mut(&mut self, ($($a,)*): ($($A,)*)) -> R {
                self($($a),*)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallOnce<fn($($A),*) -> R> for F
        where
            F: FnOnce($($A),*) -> R,
        {
            #[inline]
            fn call_once(self, ($($a,)*): ($($A,)*)) -> R {
                self($($a),*)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallRef<Variadic<fn($($A),*) -> R>> for F
        where
            F: Fn($($A,)* VarArgs) -> R,
        {
            #[inline]
            fn call_ref(&self, ($($a,)* rest,): ($($A,)* VarArgs,)) -> R {
                self($($a,)* rest)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallMut<Variadic<fn($($A),*) -> R>> for F
        where
            F: FnMut($($A,)* VarArgs) -> R,
        {
            #[inline]
            fn call_mut(&mut self, ($($a,)* rest,): ($($A,)* VarArgs,)) -> R {
                self($($a,)* rest)
            }
        }

        impl<F, R: 'static, $($A: 'static),*> CallOnce<Variadic<fn($($A),*) -> R>> for F
        where
            F: FnOnce($($A,)* VarArgs) -> R,
        {
            #[inline]
            fn call_once(self, ($($a,)* rest,): ($($A,)* VarArgs,)) -> R {
                self($($a,)* rest)
            }
        }
    };
}

crate::for_each_arity!(impl_invoke);
