//! Integration tests for the polyfn crate.
//!
//! ## Equivalence Tests
//! - `test_same_result_through_every_wrapper`: Every facade returns what the
//!   target returns
//! - `test_variadic_forwarding`: Trailing packs reach the target unchanged
//!
//! ## Binding Tests
//! - `test_bound_counter_is_move_only`: Methods bound to boxed and shared
//!   receivers
//! - `test_bound_counter_state_is_readable`: Receiver state is visible through
//!   the stored binding and copied by `clone`
//! - `test_function_ref_bound_to_borrowed_receiver`: Borrowed receivers
//! - `test_variadic_bound_methods`: Methods taking a trailing pack, bound to
//!   owned and borrowed receivers
//!
//! ## State Tests
//! - `test_null_function_pointer`: Null pointers produce null wrappers
//! - `test_moved_from_wrappers_are_null`: `take` and `swap` leave the source
//!   null
//! - `test_clone_independence`: Clones never share state
//! - `test_targets_dropped_exactly_once`: Drop tracking across clones, spills
//!   and consuming calls
//! - `test_move_function_from_function`: Wrapping one facade in another
//! - `test_empty_wrapper_targets_stay_empty`: Wrapping an empty facade in the
//!   same facade
//!
//! ## Layout Tests
//! - `test_wrapper_sizes`: Wrapper sizes in machine words
//! - `test_no_unwind_returns_normally`: No-unwind dispatch on the success path

use std::{
    cell::{Cell, RefCell},
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};

use polyfn::{
    binding::{Bound, ByValue},
    prelude::*,
};

type Inc = fn(i32) -> i32;

fn inc(x: i32) -> i32 {
    x + 1
}

/// Records its name into a shared log when dropped.
#[derive(Clone)]
struct Tracked {
    name: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.log.borrow_mut().push(self.name);
    }
}

#[derive(Clone)]
struct Counter {
    n: i32,
}

impl Counter {
    fn incr(&mut self) {
        self.n += 1;
    }

    fn peek(&self) -> i32 {
        self.n
    }
}

/// Returns the count of a `Counter` bound to `entity` as the target of
/// `function`.
fn function_count<F: 'static, R>(function: &Function<fn()>, _entity: NonType<F>) -> Option<i32>
where
    R: polyfn::binding::ReceiverMut<Target = Counter> + 'static,
{
    function
        .target::<Bound<F, R>>()
        .map(|bound| bound.receiver().n)
}

/// Returns the count of a `Counter` bound to `entity` as the target of
/// `function`.
fn move_function_count<F: 'static, R>(
    function: &MoveFunction<fn()>,
    _entity: NonType<F>,
) -> Option<i32>
where
    R: polyfn::binding::ReceiverMut<Target = Counter> + 'static,
{
    function
        .target::<Bound<F, R>>()
        .map(|bound| bound.receiver().n)
}

#[test]
fn test_same_result_through_every_wrapper() {
    let stateless = |x: i32| x + 1;

    assert_eq!(FunctionRef::<Inc>::from_fn(inc).call(41), 42);
    assert_eq!(FunctionRef::<Inc>::new(&stateless).call(41), 42);

    let mut function: Function<Inc> = Function::new(stateless);
    assert_eq!(function.call(41), 42);

    let mut move_function = MoveFunction::<Inc>::from_fn(inc);
    assert_eq!(move_function.call(41), 42);

    let shared: MoveFunction<Inc, Const> = MoveFunction::new(stateless);
    assert_eq!(shared.call(41), 42);

    let once: MoveFunction<Inc, Once> = MoveFunction::from_entity(nontype(inc));
    assert_eq!(once.call(41), 42);
}

#[test]
fn test_bound_counter_is_move_only() {
    static_assertions::assert_not_impl_any!(MoveFunction<fn()>: Clone);
    static_assertions::assert_impl_all!(Function<fn()>: Clone);

    let entity = nontype(Counter::incr);
    let mut function: MoveFunction<fn()> = MoveFunction::bind(entity, Box::new(Counter { n: 0 }));
    function.call();
    assert_eq!(move_function_count::<_, Box<Counter>>(&function, entity), Some(1));

    let mut peek: MoveFunction<fn() -> i32, Const> =
        MoveFunction::bind_ref(nontype(Counter::peek), Rc::new(Counter { n: 7 }));
    assert_eq!(peek.call(), 7);
    peek.clear();
    assert!(peek.is_null());
}

#[test]
fn test_bound_counter_state_is_readable() {
    fn incr(counter: &mut Counter) {
        counter.incr();
    }

    let entity = nontype(incr);
    let mut function: Function<fn()> = Function::bind(entity, ByValue(Counter { n: 0 }));
    function.call();
    function.call();

    let mut copy = function.clone();
    copy.call();

    assert_eq!(function_count::<_, ByValue<Counter>>(&function, entity), Some(2));
    assert_eq!(function_count::<_, ByValue<Counter>>(&copy, entity), Some(3));
    assert_eq!(function_count::<_, Box<Counter>>(&function, entity), None);
}

#[test]
fn test_null_function_pointer() {
    let missing: Option<Inc> = None;

    let mut function: Function<Inc> = Function::from(missing);
    assert!(function == Null);
    let error = function.try_call(1).unwrap_err();
    assert_eq!(error.signature(), "fn(i32) -> i32");

    let move_function: MoveFunction<Inc> = MoveFunction::from(missing);
    assert!(move_function == Null);

    let result = catch_unwind(AssertUnwindSafe(|| {
        let mut function: MoveFunction<Inc> = MoveFunction::from(missing);
        function.call(1)
    }));
    assert!(result.is_err());
}

#[test]
fn test_moved_from_wrappers_are_null() {
    let mut function = Function::<Inc>::from_fn(inc);
    let mut taken = function.take();
    assert!(function.is_null());
    assert_eq!(taken.call(1), 2);

    let mut move_function: MoveFunction<Inc> = MoveFunction::new(|x: i32| x * 2);
    let mut moved = move_function.take();
    assert!(move_function == Null);
    assert_eq!(moved.call(4), 8);

    move_function.swap(&mut moved);
    assert!(moved.is_null());
    assert_eq!(move_function.call(5), 10);
}

#[test]
fn test_clone_independence() {
    let mut total = 0;
    let mut original: Function<Inc> = Function::new(move |x: i32| {
        total += x;
        total
    });
    assert_eq!(original.call(5), 5);

    let mut copy = original.clone();
    assert_eq!(copy.call(1), 6);
    assert_eq!(copy.call(1), 7);
    assert_eq!(original.call(1), 6);
}

#[test]
fn test_targets_dropped_exactly_once() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let small = Tracked {
        name: "small",
        log: log.clone(),
    };
    let function: Function<fn() -> &'static str> = Function::new(move || {
        let tracked = &small;
        tracked.name
    });
    let copy = function.clone();
    drop(function);
    drop(copy);
    assert_eq!(*log.borrow(), vec!["small", "small"]);

    log.borrow_mut().clear();
    let large = Tracked {
        name: "large",
        log: log.clone(),
    };
    let padding = [0u64; 8];
    let mut function: Function<fn() -> u64> =
        Function::new(move || {
            let tracked = &large;
            padding[0] + tracked.name.len() as u64
        });
    assert!(!function.is_inline());
    let taken = function.take();
    drop(function);
    assert!(log.borrow().is_empty());
    drop(taken);
    assert_eq!(*log.borrow(), vec!["large"]);

    log.borrow_mut().clear();
    let owned = Tracked {
        name: "once",
        log: log.clone(),
    };
    let once: MoveFunction<fn() -> usize, Once> = MoveFunction::new(move || {
        let owned = owned;
        owned.name.len()
    });
    assert_eq!(once.call(), 4);
    assert_eq!(*log.borrow(), vec!["once"]);

    log.borrow_mut().clear();
    let unused = Tracked {
        name: "unused",
        log: log.clone(),
    };
    let never_called: MoveFunction<fn() -> usize, Once> =
        MoveFunction::new(move || {
            let tracked = &unused;
            tracked.name.len()
        });
    drop(never_called);
    assert_eq!(*log.borrow(), vec!["unused"]);
}

#[test]
fn test_wrapper_sizes() {
    let word = size_of::<usize>();
    assert_eq!(size_of::<FunctionRef<'_, Inc>>(), 2 * word);
    assert_eq!(size_of::<MoveFunction<Inc>>(), 2 * word);
    assert_eq!(size_of::<MoveFunction<Inc, NoUnwind<Once>>>(), 2 * word);
    assert_eq!(
        size_of::<Function<Inc>>(),
        (polyfn::DEFAULT_INLINE_WORDS + 1) * word
    );
    assert_eq!(size_of::<Function<Inc, 6>>(), 7 * word);
    assert!(polyfn::fits_inline::<Inc, 1>());
    assert!(!polyfn::fits_inline::<[usize; 4], 3>());
}

#[test]
fn test_no_unwind_returns_normally() {
    let calls = Rc::new(Cell::new(0));
    let counted = calls.clone();
    let function: MoveFunction<fn(i32) -> i32, NoUnwind<Const>> = MoveFunction::new(move |x: i32| {
        counted.set(counted.get() + 1);
        x * 3
    });
    assert_eq!(function.call(3), 9);
    assert_eq!(function.call(4), 12);
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_variadic_forwarding() {
    fn describe(prefix: &'static str, mut rest: VarArgs) -> String {
        let mut out = String::from(prefix);
        while let Some(value) = rest.arg::<i64>() {
            out.push_str(&format!(" {value}"));
        }
        out
    }

    let pointer: fn(&'static str, VarArgs) -> String = describe;

    let view: FunctionRef<'_, Variadic<fn(&'static str) -> String>> = FunctionRef::from(pointer);
    assert_eq!(view.call("ints:", varargs![1i8, -2i16, 3i32]), "ints: 1 -2 3");

    let mut function: Function<Variadic<fn(&'static str) -> String>> = Function::from(pointer);
    assert_eq!(function.call("none:", varargs![]), "none:");

    let mut move_function: MoveFunction<Variadic<fn(&'static str) -> String>> =
        MoveFunction::from(pointer);
    assert_eq!(move_function.call("one:", varargs![42i64]), "one: 42");
}

#[test]
fn test_move_function_from_function() {
    let mut total = 0;
    let function: Function<Inc> = Function::new(move |x: i32| {
        total += x;
        total
    });
    let mut wrapped: MoveFunction<Inc> = MoveFunction::from(function);
    assert_eq!(wrapped.call(2), 2);
    assert_eq!(wrapped.call(2), 4);
    assert_eq!(wrapped.target_type_id(), Some(std::any::TypeId::of::<Function<Inc>>()));

    let empty: MoveFunction<Inc> = MoveFunction::from(Function::<Inc>::null());
    assert!(empty.is_null());
}

#[test]
fn test_function_ref_bound_to_borrowed_receiver() {
    let counter = Counter { n: 3 };
    let peek: FunctionRef<'_, fn() -> i32> = FunctionRef::bind_ref(nontype(Counter::peek), &counter);
    assert_eq!(peek.call(), 3);

    let copy = peek;
    assert_eq!(copy.call() + peek.call(), 6);
}

#[test]
fn test_variadic_bound_methods() {
    fn add_all(counter: &mut Counter, mut rest: VarArgs) -> i32 {
        while let Some(by) = rest.arg::<i32>() {
            counter.n += by;
        }
        counter.n
    }

    fn scaled(counter: &Counter, factor: i32, rest: VarArgs) -> i32 {
        counter.n * factor + rest.len() as i32
    }

    let mut function: Function<Variadic<fn() -> i32>> =
        Function::bind(nontype(add_all), ByValue(Counter { n: 0 }));
    assert_eq!(function.call(varargs![1, 2, 3]), 6);
    assert_eq!(function.call(varargs![]), 6);

    let mut boxed: MoveFunction<Variadic<fn() -> i32>> =
        MoveFunction::bind(nontype(add_all), Box::new(Counter { n: 10 }));
    assert_eq!(boxed.call(varargs![5i8]), 15);

    let counter = Counter { n: 2 };
    let view: FunctionRef<'_, Variadic<fn(i32) -> i32>> =
        FunctionRef::bind_ref(nontype(scaled), &counter);
    assert_eq!(view.call(3, varargs![0, 0]), 8);

    let shared: MoveFunction<Variadic<fn(i32) -> i32>, Const> =
        MoveFunction::bind_ref(nontype(scaled), Rc::new(Counter { n: 4 }));
    assert_eq!(shared.call(2, varargs![]), 8);
}

#[test]
fn test_empty_wrapper_targets_stay_empty() {
    let mut function: Function<Inc> = Function::new(Function::<Inc>::null());
    assert!(function == Null);
    assert!(function.try_call(1).is_err());

    let move_function: MoveFunction<Inc> = MoveFunction::new(MoveFunction::<Inc>::null());
    assert!(move_function.is_null());

    let mut nested: Function<Inc> = Function::new(Function::<Inc>::from_fn(inc));
    assert_eq!(nested.call(1), 2);
}
