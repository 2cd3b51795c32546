use core::any::{Any, TypeId};

use polyfn_internals::{
    DEFAULT_INLINE_WORDS, RawFunction,
    binding::{Bound, BoundRef, NonType, Receiver, ReceiverMut},
    fits_inline,
    invoke::CallMut,
    signature::{Signature, VarArgs, Variadic},
};

use crate::{
    error::{BadCall, bad_call},
    markers::Null,
};

/// A copyable, owning callable value with signature `S`.
///
/// A `Function` stores its target in an inline buffer of `WORDS` machine
/// words. Targets that fit are stored without any indirection; larger or
/// over-aligned targets are boxed and only the box is stored inline. Cloning a
/// `Function` clones its target, so a clone never shares state with the
/// original. `WORDS` must be at least 1; a `Function` with no inline words
/// cannot be created.
///
/// A `Function` may also be empty (see [`Function::null`]). Calling an empty
/// `Function` panics with a [`BadCall`] message; [`try_call`] reports the
/// error instead.
///
/// `call` and `try_call` take the arguments of `S` as separate parameters and
/// are available for every supported arity, plain or [`Variadic`].
///
/// [`try_call`]: Function::try_call
///
/// # Examples
///
/// ```
/// use polyfn::Function;
///
/// let mut count = 0;
/// let mut counter: Function<fn(i32) -> i32> = Function::new(move |by: i32| {
///     count += by;
///     count
/// });
/// assert_eq!(counter.call(2), 2);
///
/// // The clone has its own copy of `count`
/// let mut copy = counter.clone();
/// assert_eq!(copy.call(10), 12);
/// assert_eq!(counter.call(1), 3);
/// ```
pub struct Function<S: Signature, const WORDS: usize = DEFAULT_INLINE_WORDS> {
    /// The erased target.
    raw: RawFunction<S, WORDS>,
}

impl<S: Signature, const WORDS: usize> Function<S, WORDS> {
    /// Creates an empty `Function`.
    #[inline]
    pub const fn null() -> Self {
        Self {
            raw: RawFunction::empty(),
        }
    }

    /// Creates a `Function` owning `target`.
    ///
    /// The target is boxed if it does not fit in `WORDS` words. An empty
    /// `Function` of the same type produces an empty `Function` rather than
    /// a nested one.
    pub fn new<F>(target: F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        if Self::is_empty_wrapper(&target) {
            trace_event!(
                trace,
                signature = core::any::type_name::<S>(),
                "empty function target, creating an empty function"
            );
            return Self::null();
        }
        trace_spill::<F, WORDS>();
        Self {
            raw: RawFunction::new(target),
        }
    }

    /// Creates a `Function` owning `target`, which must fit inline.
    ///
    /// Targets that do not fit fail to compile:
    ///
    /// ```compile_fail
    /// use polyfn::Function;
    ///
    /// let table = [0u64; 16];
    /// let _: Function<fn() -> u64> = Function::new_inline(move || table[3]);
    /// ```
    #[inline]
    pub fn new_inline<F>(target: F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        Self {
            raw: RawFunction::new_inline(target),
        }
    }

    /// Creates a `Function` whose target is constructed by `init` directly in
    /// its final location.
    ///
    /// # Examples
    ///
    /// ```
    /// use polyfn::Function;
    ///
    /// let mut function: Function<fn() -> usize> = Function::in_place(|| {
    ///     let words = vec!["in", "place"];
    ///     move || words.len()
    /// });
    /// assert_eq!(function.call(), 2);
    /// ```
    pub fn in_place<F>(init: impl FnOnce() -> F) -> Self
    where
        F: CallMut<S> + Clone + 'static,
    {
        if TypeId::of::<F>() == TypeId::of::<Self>() {
            return Self::new(init());
        }
        trace_spill::<F, WORDS>();
        Self {
            raw: RawFunction::in_place(init),
        }
    }

    /// Returns `true` if `target` is an empty `Function` of this type.
    fn is_empty_wrapper<F: 'static>(target: &F) -> bool {
        (target as &dyn Any)
            .downcast_ref::<Self>()
            .is_some_and(|function| function.is_null())
    }

    /// Creates a `Function` calling a bare function pointer.
    #[inline]
    pub fn from_fn(pointer: S::Pointer) -> Self
    where
        S::Pointer: CallMut<S>,
    {
        Self::new(pointer)
    }

    /// Creates a `Function` calling `pointer`, or an empty one for [`None`].
    #[inline]
    pub fn from_option(pointer: Option<S::Pointer>) -> Self
    where
        S::Pointer: CallMut<S>,
    {
        match pointer {
            Some(pointer) => Self::from_fn(pointer),
            None => {
                trace_event!(
                    trace,
                    signature = core::any::type_name::<S>(),
                    "null function pointer, creating an empty function"
                );
                Self::null()
            }
        }
    }

    /// Creates a `Function` calling a compile-time entity.
    ///
    /// The entity is zero-sized, so nothing but the vtable is stored.
    #[inline]
    pub fn from_entity<F>(entity: NonType<F>) -> Self
    where
        F: Copy + 'static,
        NonType<F>: CallMut<S>,
    {
        Self::new_inline(entity)
    }

    /// Creates a `Function` calling `entity` with exclusive access to
    /// `receiver` prepended to the arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use polyfn::{Function, nontype};
    ///
    /// #[derive(Clone)]
    /// struct Counter {
    ///     n: u32,
    /// }
    ///
    /// fn bump(counter: &mut Counter, by: u32) -> u32 {
    ///     counter.n += by;
    ///     counter.n
    /// }
    ///
    /// let mut function: Function<fn(u32) -> u32> =
    ///     Function::bind(nontype(bump), Box::new(Counter { n: 1 }));
    /// assert_eq!(function.call(1), 2);
    /// assert_eq!(function.call(2), 4);
    /// ```
    #[inline]
    pub fn bind<F, R>(entity: NonType<F>, receiver: R) -> Self
    where
        F: Copy + 'static,
        R: ReceiverMut + Clone + 'static,
        Bound<F, R>: CallMut<S>,
    {
        Self::new(Bound::new(entity, receiver))
    }

    /// Creates a `Function` calling `entity` with shared access to `receiver`
    /// prepended to the arguments.
    #[inline]
    pub fn bind_ref<F, R>(entity: NonType<F>, receiver: R) -> Self
    where
        F: Copy + 'static,
        R: Receiver + Clone + 'static,
        BoundRef<F, R>: CallMut<S>,
    {
        Self::new(BoundRef::new(entity, receiver))
    }

    /// Returns `true` if no target is stored.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns `true` if a target is stored directly in the inline buffer.
    #[inline]
    pub fn is_inline(&self) -> bool {
        !self.raw.is_empty() && !self.raw.is_boxed()
    }

    /// Moves the target out into a new `Function`, leaving `self` empty.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self {
            raw: self.raw.take(),
        }
    }

    /// Exchanges the targets of `self` and `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Replaces the target with `target`.
    ///
    /// The old target is dropped before the new one is stored. An empty
    /// `Function` of the same type leaves `self` empty.
    pub fn set<F>(&mut self, target: F)
    where
        F: CallMut<S> + Clone + 'static,
    {
        self.raw.clear();
        if Self::is_empty_wrapper(&target) {
            return;
        }
        trace_spill::<F, WORDS>();
        self.raw = RawFunction::new(target);
    }

    /// Replaces the target with a bare function pointer.
    #[inline]
    pub fn set_fn(&mut self, pointer: S::Pointer)
    where
        S::Pointer: CallMut<S>,
    {
        self.set(pointer);
    }

    /// Drops the target, leaving `self` empty.
    #[inline]
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the [`TypeId`] of the target, or [`None`] if empty.
    #[inline]
    pub fn target_type_id(&self) -> Option<TypeId> {
        self.raw.target_type_id()
    }

    /// Returns the type name of the target, or [`None`] if empty.
    #[inline]
    pub fn target_type_name(&self) -> Option<&'static str> {
        self.raw.target_type_name()
    }

    /// Returns a reference to the target if it is a `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use polyfn::Function;
    ///
    /// fn double(x: i32) -> i32 {
    ///     x * 2
    /// }
    ///
    /// let function: Function<fn(i32) -> i32> = Function::from(double as fn(i32) -> i32);
    /// let target: Option<&fn(i32) -> i32> = function.target();
    /// assert_eq!(target.map(|f| f(4)), Some(8));
    /// assert!(function.target::<u8>().is_none());
    /// ```
    #[inline]
    pub fn target<T: 'static>(&self) -> Option<&T> {
        self.raw.target::<T>()
    }

    /// Calls the target with an argument tuple.
    #[inline]
    fn call_tuple(&mut self, args: S::Args) -> S::Output {
        if self.is_null() {
            bad_call::<S>()
        }
        self.raw.call(args)
    }

    /// Calls the target with an argument tuple, if there is one.
    #[inline]
    fn try_call_tuple(&mut self, args: S::Args) -> Result<S::Output, BadCall> {
        if self.is_null() {
            return Err(BadCall::new::<S>());
        }
        Ok(self.raw.call(args))
    }
}

/// Emits a trace event when `F` is too large to be stored inline.
#[inline]
fn trace_spill<F, const WORDS: usize>() {
    if !fits_inline::<F, WORDS>() {
        trace_event!(
            trace,
            target_type = core::any::type_name::<F>(),
            size = size_of::<F>(),
            words = WORDS,
            "callable does not fit inline, storing it on the heap"
        );
    }
}

macro_rules! impl_function_call {
    ($($A:ident $a:ident),*) => {
        impl<R: 'static, $($A: 'static,)* const WORDS: usize> Function<fn($($A),*) -> R, WORDS> {
            /// Calls the target.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`] message if the function is empty.
            #[inline]
            pub fn call(&mut self, $($a: $A),*) -> R {
                self.call_tuple(($($a,)*))
            }

            /// Calls the target, or returns [`BadCall`] if the function is
            /// empty.
            #[inline]
            pub fn try_call(&mut self, $($a: $A),*) -> Result<R, BadCall> {
                self.try_call_tuple(($($a,)*))
            }
        }

        impl<R: 'static, $($A: 'static,)* const WORDS: usize> Function<Variadic<fn($($A),*) -> R>, WORDS> {
            /// Calls the target, forwarding `rest` as the trailing pack.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`] message if the function is empty.
            #[inline]
            pub fn call(&mut self, $($a: $A,)* rest: VarArgs) -> R {
                self.call_tuple(($($a,)* rest,))
            }

            /// Calls the target, forwarding `rest` as the trailing pack, or
            /// returns [`BadCall`] if the function is empty.
            #[inline]
            pub fn try_call(&mut self, $($a: $A,)* rest: VarArgs) -> Result<R, BadCall> {
                self.try_call_tuple(($($a,)* rest,))
            }
        }

        impl<R: 'static, $($A: 'static,)* const WORDS: usize> From<fn($($A),*) -> R>
            for Function<fn($($A),*) -> R, WORDS>
        {
            #[inline]
            fn from(pointer: fn($($A),*) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* const WORDS: usize> From<Option<fn($($A),*) -> R>>
            for Function<fn($($A),*) -> R, WORDS>
        {
            #[inline]
            fn from(pointer: Option<fn($($A),*) -> R>) -> Self {
                Self::from_option(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* const WORDS: usize> From<fn($($A,)* VarArgs) -> R>
            for Function<Variadic<fn($($A),*) -> R>, WORDS>
        {
            #[inline]
            fn from(pointer: fn($($A,)* VarArgs) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* const WORDS: usize> From<Option<fn($($A,)* VarArgs) -> R>>
            for Function<Variadic<fn($($A),*) -> R>, WORDS>
        {
            #[inline]
            fn from(pointer: Option<fn($($A,)* VarArgs) -> R>) -> Self {
                Self::from_option(pointer)
            }
        }
    };
}

polyfn_internals::for_each_arity!(impl_function_call);

impl<S: Signature, const WORDS: usize> CallMut<S> for Function<S, WORDS> {
    #[inline]
    fn call_mut(&mut self, args: S::Args) -> S::Output {
        self.call_tuple(args)
    }
}

impl<S: Signature, const WORDS: usize> Clone for Function<S, WORDS> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
        }
    }
}

impl<S: Signature, const WORDS: usize> Default for Function<S, WORDS> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<S: Signature, const WORDS: usize> From<Null> for Function<S, WORDS> {
    #[inline]
    fn from(_: Null) -> Self {
        Self::null()
    }
}

impl<S: Signature, const WORDS: usize> PartialEq<Null> for Function<S, WORDS> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<S: Signature, const WORDS: usize> PartialEq<Function<S, WORDS>> for Null {
    #[inline]
    fn eq(&self, function: &Function<S, WORDS>) -> bool {
        function.is_null()
    }
}

impl<S: Signature, const WORDS: usize> core::fmt::Debug for Function<S, WORDS> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Function")
            .field("signature", &core::any::type_name::<S>())
            .field("target", &self.target_type_name())
            .field("inline", &self.is_inline())
            .finish()
    }
}
