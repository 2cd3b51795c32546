//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use polyfn::prelude::*;
//!
//! fn apply(f: FunctionRef<'_, fn(u8) -> u8>, x: u8) -> u8 {
//!     f.call(x)
//! }
//!
//! let mut double: Function<fn(u8) -> u8> = Function::new(|x: u8| x * 2);
//! assert_eq!(double.call(4), 8);
//! assert_eq!(apply(FunctionRef::new(&|x: u8| x + 1), 1), 2);
//! assert!(Function::<fn(u8) -> u8>::null() == Null);
//! ```

pub use crate::{
    BadCall, Function, FunctionRef, MoveFunction,
    binding::{NonType, nontype},
    markers::{Const, Mut, NoUnwind, Null, Once},
    signature::{VarArgs, Variadic},
    varargs,
};
