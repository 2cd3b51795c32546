use polyfn_internals::{
    RawFunctionRef,
    binding::{BoundRef, NonType},
    invoke::{CallMut, CallOnce, CallRef},
    signature::{Signature, VarArgs, Variadic},
};

/// A borrowed callable value with signature `S`.
///
/// A `FunctionRef` is two words: a pointer to the referenced callable (or the
/// function pointer itself) and a dispatch function. It never owns anything,
/// is `Copy`, and cannot outlive the callable it references.
///
/// A `FunctionRef` is never empty. There is no null reference to construct it
/// from.
///
/// # Examples
///
/// ```
/// use polyfn::FunctionRef;
///
/// fn apply_twice(f: FunctionRef<'_, fn(i32) -> i32>, x: i32) -> i32 {
///     f.call(f.call(x))
/// }
///
/// fn inc(x: i32) -> i32 {
///     x + 1
/// }
///
/// let offset = 10;
/// let add = |x: i32| x + offset;
///
/// assert_eq!(apply_twice(FunctionRef::<fn(i32) -> i32>::from_fn(inc), 40), 42);
/// assert_eq!(apply_twice(FunctionRef::new(&add), 1), 21);
/// ```
pub struct FunctionRef<'a, S: Signature> {
    /// The erased reference.
    raw: RawFunctionRef<'a, S>,
}

impl<'a, S: Signature> FunctionRef<'a, S> {
    /// Creates a `FunctionRef` referencing `target`.
    #[inline]
    pub fn new<F>(target: &'a F) -> Self
    where
        F: CallRef<S>,
    {
        Self {
            raw: RawFunctionRef::new(target),
        }
    }

    /// Creates a `FunctionRef` holding a bare function pointer.
    ///
    /// The pointer is copied into the `FunctionRef`, so the result can have
    /// any lifetime.
    #[inline]
    pub fn from_fn(pointer: S::Pointer) -> Self {
        Self {
            raw: RawFunctionRef::from_fn(pointer),
        }
    }

    /// Creates a `FunctionRef` calling a compile-time entity.
    #[inline]
    pub fn from_entity<F>(entity: NonType<F>) -> Self
    where
        F: Copy,
        NonType<F>: CallRef<S>,
    {
        Self {
            raw: RawFunctionRef::from_entity(entity),
        }
    }

    /// Creates a `FunctionRef` calling `entity` on `receiver`.
    ///
    /// Only the receiver is referenced; the entity is part of the dispatch
    /// function.
    ///
    /// # Examples
    ///
    /// ```
    /// use polyfn::{FunctionRef, nontype};
    ///
    /// struct Greeter {
    ///     greeting: &'static str,
    /// }
    ///
    /// impl Greeter {
    ///     fn greet(&self, name: &'static str) -> String {
    ///         format!("{}, {name}!", self.greeting)
    ///     }
    /// }
    ///
    /// let greeter = Greeter { greeting: "Hello" };
    /// let function: FunctionRef<'_, fn(&'static str) -> String> =
    ///     FunctionRef::bind_ref(nontype(Greeter::greet), &greeter);
    /// assert_eq!(function.call("world"), "Hello, world!");
    /// ```
    #[inline]
    pub fn bind_ref<F, T>(entity: NonType<F>, receiver: &'a T) -> Self
    where
        F: Copy,
        BoundRef<F, &'a T>: CallRef<S>,
    {
        Self {
            raw: RawFunctionRef::bind_ref(entity, receiver),
        }
    }
}

macro_rules! impl_function_ref_call {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static),*> FunctionRef<'_, fn($($A),*) -> R> {
            /// Calls the referenced target.
            #[inline]
            pub fn call(&self, $($a: $A),*) -> R {
                self.raw.call(($($a,)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> FunctionRef<'_, Variadic<fn($($A),*) -> R>> {
            /// Calls the referenced target, forwarding `rest` as the trailing
            /// pack.
            #[inline]
            pub fn call(&self, $($a: $A,)* rest: VarArgs) -> R {
                self.raw.call(($($a,)* rest,))
            }
        }

        impl<R: 'static, $($A: 'static),*> From<fn($($A),*) -> R>
            for FunctionRef<'_, fn($($A),*) -> R>
        {
            #[inline]
            fn from(pointer: fn($($A),*) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }

        impl<R: 'static, $($A: 'static),*> From<fn($($A,)* VarArgs) -> R>
            for FunctionRef<'_, Variadic<fn($($A),*) -> R>>
        {
            #[inline]
            fn from(pointer: fn($($A,)* VarArgs) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }
    };
}

polyfn_internals::for_each_arity!(impl_function_ref_call);

impl<'a, S: Signature, F: CallRef<S>> From<&'a F> for FunctionRef<'a, S> {
    #[inline]
    fn from(target: &'a F) -> Self {
        Self::new(target)
    }
}

impl<S: Signature> CallRef<S> for FunctionRef<'_, S> {
    #[inline]
    fn call_ref(&self, args: S::Args) -> S::Output {
        self.raw.call(args)
    }
}

impl<S: Signature> CallMut<S> for FunctionRef<'_, S> {
    #[inline]
    fn call_mut(&mut self, args: S::Args) -> S::Output {
        self.raw.call(args)
    }
}

impl<S: Signature> CallOnce<S> for FunctionRef<'_, S> {
    #[inline]
    fn call_once(self, args: S::Args) -> S::Output {
        self.raw.call(args)
    }
}

impl<S: Signature> Clone for FunctionRef<'_, S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Signature> Copy for FunctionRef<'_, S> {}

impl<S: Signature> core::fmt::Debug for FunctionRef<'_, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionRef")
            .field("signature", &core::any::type_name::<S>())
            .field("raw", &self.raw)
            .finish()
    }
}
