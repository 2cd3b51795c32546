use alloc::boxed::Box;
use core::{
    any::{Any, TypeId},
    marker::PhantomData,
};

use polyfn_internals::{
    RawMoveFunction,
    binding::{Bound, BoundRef, NonType, Receiver, ReceiverMut},
    handlers::CallHandler,
    invoke::{CallMut, CallOnce, CallRef},
    signature::{Signature, VarArgs, Variadic},
};

use crate::{
    Function,
    error::bad_call,
    markers::{Const, Mut, NoUnwind, Null, Once, Qualifier},
};

/// A move-only, owning callable value with signature `S` and call
/// qualification `Q`.
///
/// A `MoveFunction` is two words: a handle to its target and a reference to a
/// shared, static vtable. Callable objects are stored on the heap (zero-sized
/// ones without allocating), and bare function pointers are stored in the
/// handle itself. Because the target is never copied, it does not need to be
/// [`Clone`], and neither is the `MoveFunction`.
///
/// The qualifier `Q` (see [`markers`](crate::markers)) decides which targets
/// are accepted and how `call` takes `self`:
///
/// - [`Mut`] (the default): `call(&mut self, ..)`, targets implement
///   [`CallMut`]
/// - [`Const`]: `call(&self, ..)`, targets implement [`CallRef`]
/// - [`Once`]: `call(self, ..)`, targets implement [`CallOnce`]
/// - [`NoUnwind<Q>`]: like `Q`, but aborts if the target panics
///
/// A `MoveFunction` may be null. Calling a null `MoveFunction` panics with a
/// [`BadCall`](crate::BadCall) message.
///
/// # Examples
///
/// ```
/// use polyfn::{MoveFunction, nontype};
///
/// struct Counter {
///     n: u32,
/// }
///
/// impl Counter {
///     fn incr(&mut self) -> u32 {
///         self.n += 1;
///         self.n
///     }
/// }
///
/// // `Counter` is not `Clone`, which a `MoveFunction` does not need
/// let mut function: MoveFunction<fn() -> u32> =
///     MoveFunction::bind(nontype(Counter::incr), Box::new(Counter { n: 0 }));
/// assert_eq!(function.call(), 1);
/// assert_eq!(function.call(), 2);
///
/// let moved = function.take();
/// assert!(function.is_null());
/// assert!(!moved.is_null());
/// ```
///
/// # Safety Invariant
///
/// `raw` is null or was created with the handler `Q`.
pub struct MoveFunction<S: Signature, Q: Qualifier = Mut> {
    /// The erased target.
    raw: RawMoveFunction<S>,
    /// The handler `raw` was created with.
    _qualifier: PhantomData<Q>,
}

impl<S: Signature, Q: Qualifier> MoveFunction<S, Q> {
    /// Wraps `raw`, which must be null or have been created with the handler
    /// `Q`.
    #[inline]
    const fn from_raw(raw: RawMoveFunction<S>) -> Self {
        Self {
            raw,
            _qualifier: PhantomData,
        }
    }

    /// Creates a null `MoveFunction`.
    #[inline]
    pub const fn null() -> Self {
        Self::from_raw(RawMoveFunction::null())
    }

    /// Creates a `MoveFunction` owning `target`.
    ///
    /// A null `MoveFunction` of the same type produces a null `MoveFunction`
    /// rather than a nested one.
    #[inline]
    pub fn new<F>(target: F) -> Self
    where
        F: 'static,
        Q: CallHandler<S, F>,
    {
        if Self::is_null_wrapper(&target) {
            trace_event!(
                trace,
                signature = core::any::type_name::<S>(),
                qualifier = Q::NAME,
                "null move function target, creating a null move function"
            );
            return Self::null();
        }
        Self::from_raw(RawMoveFunction::new::<F, Q>(target))
    }

    /// Creates a `MoveFunction` owning an already boxed target, without
    /// allocating again.
    #[inline]
    pub fn from_box<F>(target: Box<F>) -> Self
    where
        F: 'static,
        Q: CallHandler<S, F>,
    {
        Self::from_raw(RawMoveFunction::from_box::<F, Q>(target))
    }

    /// Creates a `MoveFunction` whose target is constructed by `init`
    /// directly in its heap allocation.
    #[inline]
    pub fn in_place<F>(init: impl FnOnce() -> F) -> Self
    where
        F: 'static,
        Q: CallHandler<S, F>,
    {
        if TypeId::of::<F>() == TypeId::of::<Self>() {
            return Self::new(init());
        }
        Self::from_raw(RawMoveFunction::in_place::<F, Q>(init))
    }

    /// Returns `true` if `target` is a null `MoveFunction` of this type.
    fn is_null_wrapper<F: 'static>(target: &F) -> bool {
        (target as &dyn Any)
            .downcast_ref::<Self>()
            .is_some_and(|function| function.is_null())
    }

    /// Creates a `MoveFunction` calling a bare function pointer.
    ///
    /// The pointer is stored in the handle, so this never allocates.
    #[inline]
    pub fn from_fn(pointer: S::Pointer) -> Self
    where
        Q: CallHandler<S, S::Pointer>,
    {
        Self::from_raw(RawMoveFunction::from_fn::<Q>(pointer))
    }

    /// Creates a `MoveFunction` calling `pointer`, or a null one for [`None`].
    #[inline]
    pub fn from_option(pointer: Option<S::Pointer>) -> Self
    where
        Q: CallHandler<S, S::Pointer>,
    {
        match pointer {
            Some(pointer) => Self::from_fn(pointer),
            None => {
                trace_event!(
                    trace,
                    signature = core::any::type_name::<S>(),
                    "null function pointer, creating a null move function"
                );
                Self::null()
            }
        }
    }

    /// Creates a `MoveFunction` calling a compile-time entity.
    ///
    /// The entity is zero-sized, so this never allocates.
    #[inline]
    pub fn from_entity<F>(entity: NonType<F>) -> Self
    where
        F: Copy + 'static,
        Q: CallHandler<S, NonType<F>>,
    {
        Self::new(entity)
    }

    /// Creates a `MoveFunction` calling `entity` with exclusive access to
    /// `receiver` prepended to the arguments.
    #[inline]
    pub fn bind<F, R>(entity: NonType<F>, receiver: R) -> Self
    where
        F: Copy + 'static,
        R: ReceiverMut + 'static,
        Q: CallHandler<S, Bound<F, R>>,
    {
        Self::new(Bound::new(entity, receiver))
    }

    /// Creates a `MoveFunction` calling `entity` with shared access to
    /// `receiver` prepended to the arguments.
    #[inline]
    pub fn bind_ref<F, R>(entity: NonType<F>, receiver: R) -> Self
    where
        F: Copy + 'static,
        R: Receiver + 'static,
        Q: CallHandler<S, BoundRef<F, R>>,
    {
        Self::new(BoundRef::new(entity, receiver))
    }

    /// Returns `true` if no target is stored.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.raw.is_null()
    }

    /// Moves the target out into a new `MoveFunction`, leaving `self` null.
    #[inline]
    pub fn take(&mut self) -> Self {
        Self::from_raw(self.raw.take())
    }

    /// Exchanges the targets of `self` and `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.raw, &mut other.raw);
    }

    /// Replaces the target with `target`.
    ///
    /// The old target is dropped before the new one is stored. A null
    /// `MoveFunction` of the same type leaves `self` null.
    pub fn set<F>(&mut self, target: F)
    where
        F: 'static,
        Q: CallHandler<S, F>,
    {
        self.clear();
        if Self::is_null_wrapper(&target) {
            return;
        }
        self.raw = RawMoveFunction::new::<F, Q>(target);
    }

    /// Replaces the target with a bare function pointer.
    pub fn set_fn(&mut self, pointer: S::Pointer)
    where
        Q: CallHandler<S, S::Pointer>,
    {
        self.clear();
        self.raw = RawMoveFunction::from_fn::<Q>(pointer);
    }

    /// Drops the target, leaving `self` null.
    ///
    /// The `MoveFunction` is already null while the target's destructor runs.
    #[inline]
    pub fn clear(&mut self) {
        drop(self.raw.take());
    }

    /// Returns the [`TypeId`] of the target, or [`None`] if null.
    ///
    /// A function-pointer target is reported as `S::Pointer`.
    #[inline]
    pub fn target_type_id(&self) -> Option<TypeId> {
        self.raw.target_type_id()
    }

    /// Returns the type name of the target, or [`None`] if null.
    #[inline]
    pub fn target_type_name(&self) -> Option<&'static str> {
        self.raw.target_type_name()
    }

    /// Returns a reference to the target if it is a `T`.
    #[inline]
    pub fn target<T: 'static>(&self) -> Option<&T> {
        self.raw.target::<T>()
    }

    /// Panics with a [`BadCall`](crate::BadCall) message if null.
    #[inline]
    #[track_caller]
    fn ensure_not_null(&self) {
        if self.is_null() {
            bad_call::<S>()
        }
    }

    /// Calls the target by value with an argument tuple.
    #[inline]
    fn call_once_tuple(self, args: S::Args) -> S::Output {
        self.ensure_not_null();
        self.raw.call_once(args)
    }
}

macro_rules! impl_shared_access {
    ($($Q:ty),*) => {$(
        impl<S: Signature> MoveFunction<S, $Q> {
            /// Calls the target through `&self` with an argument tuple.
            #[inline]
            fn call_ref_tuple(&self, args: S::Args) -> S::Output {
                self.ensure_not_null();
                // SAFETY:
                // 1. `raw` was created with this qualifier's handler (struct
                //    invariant), which only needs shared access
                unsafe { self.raw.call_ref(args) }
            }
        }

        impl<S: Signature> CallRef<S> for MoveFunction<S, $Q> {
            #[inline]
            fn call_ref(&self, args: S::Args) -> S::Output {
                self.call_ref_tuple(args)
            }
        }
    )*};
}

macro_rules! impl_exclusive_access {
    ($($Q:ty),*) => {$(
        impl<S: Signature> MoveFunction<S, $Q> {
            /// Calls the target through `&mut self` with an argument tuple.
            #[inline]
            fn call_mut_tuple(&mut self, args: S::Args) -> S::Output {
                self.ensure_not_null();
                // SAFETY:
                // 1. `raw` was created with this qualifier's handler (struct
                //    invariant), which is not consuming
                unsafe { self.raw.call_mut(args) }
            }
        }

        impl<S: Signature> CallMut<S> for MoveFunction<S, $Q> {
            #[inline]
            fn call_mut(&mut self, args: S::Args) -> S::Output {
                self.call_mut_tuple(args)
            }
        }
    )*};
}

impl_shared_access!(Const, NoUnwind<Const>);
impl_exclusive_access!(Mut, Const, NoUnwind<Mut>, NoUnwind<Const>);

macro_rules! impl_move_function_call {
    ($($A:ident $a:ident),*) => {
        impl_move_function_call!(
            @qualified [fn($($A),*) -> R] [$($A),*] [$($a: $A),*] [$($a,)*]
        );
        impl_move_function_call!(
            @qualified [Variadic<fn($($A),*) -> R>] [$($A),*] [$($a: $A,)* rest: VarArgs] [$($a,)* rest,]
        );

        impl<R: 'static, $($A: 'static,)* Q> From<fn($($A),*) -> R>
            for MoveFunction<fn($($A),*) -> R, Q>
        where
            Q: Qualifier + CallHandler<fn($($A),*) -> R, fn($($A),*) -> R>,
        {
            #[inline]
            fn from(pointer: fn($($A),*) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* Q> From<Option<fn($($A),*) -> R>>
            for MoveFunction<fn($($A),*) -> R, Q>
        where
            Q: Qualifier + CallHandler<fn($($A),*) -> R, fn($($A),*) -> R>,
        {
            #[inline]
            fn from(pointer: Option<fn($($A),*) -> R>) -> Self {
                Self::from_option(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* Q> From<fn($($A,)* VarArgs) -> R>
            for MoveFunction<Variadic<fn($($A),*) -> R>, Q>
        where
            Q: Qualifier + CallHandler<Variadic<fn($($A),*) -> R>, fn($($A,)* VarArgs) -> R>,
        {
            #[inline]
            fn from(pointer: fn($($A,)* VarArgs) -> R) -> Self {
                Self::from_fn(pointer)
            }
        }

        impl<R: 'static, $($A: 'static,)* Q> From<Option<fn($($A,)* VarArgs) -> R>>
            for MoveFunction<Variadic<fn($($A),*) -> R>, Q>
        where
            Q: Qualifier + CallHandler<Variadic<fn($($A),*) -> R>, fn($($A,)* VarArgs) -> R>,
        {
            #[inline]
            fn from(pointer: Option<fn($($A,)* VarArgs) -> R>) -> Self {
                Self::from_option(pointer)
            }
        }
    };
    (@qualified [$($sig:tt)*] [$($A:ident),*] [$($param:tt)*] [$($arg:tt)*]) => {
        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, Mut> {
            /// Calls the target through an exclusive reference.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(&mut self, $($param)*) -> R {
                self.call_mut_tuple(($($arg)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, NoUnwind<Mut>> {
            /// Calls the target through an exclusive reference, aborting if it
            /// panics.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(&mut self, $($param)*) -> R {
                self.call_mut_tuple(($($arg)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, Const> {
            /// Calls the target through a shared reference.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(&self, $($param)*) -> R {
                self.call_ref_tuple(($($arg)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, NoUnwind<Const>> {
            /// Calls the target through a shared reference, aborting if it
            /// panics.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(&self, $($param)*) -> R {
                self.call_ref_tuple(($($arg)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, Once> {
            /// Calls the target by value, consuming the `MoveFunction`.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(self, $($param)*) -> R {
                self.call_once_tuple(($($arg)*))
            }
        }

        impl<R: 'static, $($A: 'static),*> MoveFunction<$($sig)*, NoUnwind<Once>> {
            /// Calls the target by value, consuming the `MoveFunction` and
            /// aborting if the target panics.
            ///
            /// # Panics
            ///
            /// Panics with a [`BadCall`](crate::BadCall) message if null.
            #[inline]
            pub fn call(self, $($param)*) -> R {
                self.call_once_tuple(($($arg)*))
            }
        }
    };
}

polyfn_internals::for_each_arity!(impl_move_function_call);

impl<S: Signature, Q: Qualifier> CallOnce<S> for MoveFunction<S, Q> {
    #[inline]
    fn call_once(self, args: S::Args) -> S::Output {
        self.call_once_tuple(args)
    }
}

impl<S: Signature, const WORDS: usize> From<Function<S, WORDS>> for MoveFunction<S, Mut> {
    /// Wraps a [`Function`], or creates a null `MoveFunction` if it is empty.
    fn from(function: Function<S, WORDS>) -> Self {
        if function.is_null() {
            trace_event!(
                trace,
                signature = core::any::type_name::<S>(),
                "empty function, creating a null move function"
            );
            return Self::null();
        }
        Self::new(function)
    }
}

impl<S: Signature, Q: Qualifier> Default for MoveFunction<S, Q> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<S: Signature, Q: Qualifier> From<Null> for MoveFunction<S, Q> {
    #[inline]
    fn from(_: Null) -> Self {
        Self::null()
    }
}

impl<S: Signature, Q: Qualifier> PartialEq<Null> for MoveFunction<S, Q> {
    #[inline]
    fn eq(&self, _: &Null) -> bool {
        self.is_null()
    }
}

impl<S: Signature, Q: Qualifier> PartialEq<MoveFunction<S, Q>> for Null {
    #[inline]
    fn eq(&self, function: &MoveFunction<S, Q>) -> bool {
        function.is_null()
    }
}

impl<S: Signature, Q: Qualifier> core::fmt::Debug for MoveFunction<S, Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MoveFunction")
            .field("signature", &core::any::type_name::<S>())
            .field("qualifier", &Q::NAME)
            .field("target", &self.target_type_name())
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
    use crate::nontype;

    type Inc = fn(i32) -> i32;

    fn inc(x: i32) -> i32 {
        x + 1
    }

    struct Counter {
        n: i32,
    }

    impl Counter {
        fn incr(&mut self) {
            self.n += 1;
        }
    }

    /// Looks up the binding of `entity` stored in `function`.
    fn bound_target<'f, F: 'static, R: 'static, S: Signature, Q: Qualifier>(
        function: &'f MoveFunction<S, Q>,
        _entity: NonType<F>,
    ) -> Option<&'f Bound<F, R>> {
        function.target::<Bound<F, R>>()
    }

    #[test]
    fn test_move_function_traits() {
        static_assertions::assert_not_impl_any!(MoveFunction<Inc>: Clone, Send, Sync);
        static_assertions::assert_not_impl_any!(MoveFunction<Inc, Const>: Clone, Send, Sync);
        static_assertions::assert_impl_all!(MoveFunction<Inc>: Default, CallMut<Inc>);
        static_assertions::assert_impl_all!(MoveFunction<Inc, Const>: CallRef<Inc>);
        static_assertions::assert_not_impl_any!(MoveFunction<Inc, Once>: CallMut<Inc>);
        assert_eq!(size_of::<MoveFunction<Inc>>(), 2 * size_of::<usize>());
        assert_eq!(size_of::<MoveFunction<Inc, NoUnwind<Once>>>(), 2 * size_of::<usize>());
    }

    #[test]
    fn test_bound_member_on_boxed_receiver() {
        let entity = nontype(Counter::incr);
        let mut function = MoveFunction::<fn()>::bind(entity, Box::new(Counter { n: 0 }));
        function.call();

        let bound = bound_target::<_, Box<Counter>, _, _>(&function, entity);
        assert_eq!(bound.map(|bound| bound.receiver().n), Some(1));
    }

    #[test]
    fn test_null_state() {
        let function = MoveFunction::<Inc>::null();
        assert!(function == Null);
        assert!(Null == function);
        assert!(MoveFunction::<Inc, Const>::default().is_null());
        assert!(MoveFunction::<Inc, Once>::from(Null).is_null());
        assert!(MoveFunction::<Inc>::from(None::<Inc>).is_null());
        assert!(MoveFunction::<Inc>::from(Function::<Inc>::null()).is_null());
    }

    #[test]
    fn test_null_move_function_target_is_not_nested() {
        let function = MoveFunction::<Inc>::new(MoveFunction::<Inc>::null());
        assert!(function.is_null());
        assert!(function == Null);

        let mut replaced = MoveFunction::<Inc>::from_fn(inc);
        replaced.set(MoveFunction::<Inc>::null());
        assert!(replaced.is_null());

        let built = MoveFunction::<Inc>::in_place(MoveFunction::<Inc>::null);
        assert!(built.is_null());

        let mut nested = MoveFunction::<Inc>::new(MoveFunction::<Inc>::from_fn(inc));
        assert!(!nested.is_null());
        assert_eq!(nested.call(1), 2);
    }

    #[test]
    #[should_panic(expected = "bad function call")]
    fn test_null_call_panics() {
        let mut function = MoveFunction::<Inc>::null();
        function.call(1);
    }

    #[test]
    #[should_panic(expected = "bad function call")]
    fn test_null_once_call_panics() {
        let function = MoveFunction::<fn(), Once>::null();
        function.call();
    }

    #[test]
    fn test_qualified_calls() {
        let mut total = 0;
        let mut exclusive = MoveFunction::<Inc>::new(move |x: i32| {
            total += x;
            total
        });
        assert_eq!(exclusive.call(2), 2);
        assert_eq!(exclusive.call(3), 5);

        let shared = MoveFunction::<Inc, Const>::from_fn(inc);
        let by_ref = &shared;
        assert_eq!(by_ref.call(1), 2);
        assert_eq!(shared.call(41), 42);

        let name = String::from("once");
        let once = MoveFunction::<fn() -> String, Once>::new(move || name);
        assert_eq!(once.call(), "once");

        let guarded = MoveFunction::<Inc, NoUnwind<Const>>::new(|x: i32| x * 2);
        assert_eq!(guarded.call(21), 42);

        let mut guarded_mut = MoveFunction::<Inc, NoUnwind<Mut>>::from(inc as Inc);
        assert_eq!(guarded_mut.call(0), 1);

        let guarded_once = MoveFunction::<fn() -> usize, NoUnwind<Once>>::new(|| 3);
        assert_eq!(guarded_once.call(), 3);
    }

    #[test]
    fn test_drop_exactly_once() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));

        struct Guard(Rc<RefCell<Vec<String>>>, &'static str);

        impl Drop for Guard {
            fn drop(&mut self) {
                self.0.borrow_mut().push(self.1.to_string());
            }
        }

        let first = Guard(log.clone(), "first");
        let mut function = MoveFunction::<fn() -> &'static str>::new(move || {
            let guard = &first;
            guard.1
        });
        let moved = function.take();
        drop(function);
        assert!(log.borrow().is_empty());

        let mut moved = moved;
        let second = Guard(log.clone(), "second");
        moved.set(move || {
            let guard = &second;
            guard.1
        });
        assert_eq!(*log.borrow(), vec!["first".to_string()]);
        assert_eq!(moved.call(), "second");

        moved.set_fn(|| "pointer");
        assert_eq!(*log.borrow(), vec!["first".to_string(), "second".to_string()]);
        assert_eq!(moved.call(), "pointer");

        let third = Guard(log.clone(), "third");
        let once = MoveFunction::<fn() -> usize, Once>::new(move || {
            let guard = third;
            guard.1.len()
        });
        assert_eq!(once.call(), 5);
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_wrap_function() {
        let mut count = 0;
        let function = Function::<fn() -> i32>::new(move || {
            count += 1;
            count
        });
        let mut wrapped = MoveFunction::<fn() -> i32>::from(function);
        assert_eq!(wrapped.call(), 1);
        assert_eq!(wrapped.call(), 2);
        assert_eq!(
            wrapped.target_type_id(),
            Some(TypeId::of::<Function<fn() -> i32>>())
        );
    }

    #[test]
    fn test_swap_and_targets() {
        let mut first = MoveFunction::<Inc>::from_fn(inc);
        let mut second = MoveFunction::<Inc>::from_entity(nontype(|x: i32| x - 1));
        first.swap(&mut second);
        assert_eq!(first.call(1), 0);
        assert_eq!(second.call(1), 2);
        assert_eq!(second.target::<Inc>().map(|f| f(5)), Some(6));
        assert_eq!(second.target_type_name(), Some("fn(i32) -> i32"));

        second.clear();
        assert!(second.is_null());
        assert_eq!(second.target_type_id(), None);
    }

    #[test]
    fn test_in_place_and_box() {
        let mut built = MoveFunction::<fn() -> usize>::in_place(|| {
            let items = vec![1, 2, 3];
            move || items.len()
        });
        assert_eq!(built.call(), 3);

        let boxed = Box::new(|x: i32| x * 3);
        let mut function = MoveFunction::<Inc>::from_box(boxed);
        assert_eq!(function.call(3), 9);
    }

    #[test]
    fn test_variadic() {
        fn join(separator: char, mut rest: VarArgs) -> String {
            let mut out = String::new();
            while let Some(value) = rest.arg::<i64>() {
                if !out.is_empty() {
                    out.push(separator);
                }
                out.push_str(&value.to_string());
            }
            out
        }
        let function = MoveFunction::<Variadic<fn(char) -> String>, Const>::from(
            join as fn(char, VarArgs) -> String,
        );
        assert_eq!(function.call('-', crate::varargs![1i8, 2i16, 3i32]), "1-2-3");
    }

    #[test]
    fn test_debug() {
        let function = MoveFunction::<Inc, Once>::null();
        let debug = format!("{function:?}");
        assert!(debug.contains("qualifier: \"once\""));
        assert!(debug.contains("target: None"));
    }
}
