#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Type-erased callable values: copyable, borrowed and move-only.
//!
//! ## Overview
//!
//! This crate provides three wrappers which can hold any callable of a given
//! signature, such as a closure, a function pointer, or a method bound to a
//! receiver, behind one concrete type:
//!
//! - [`Function<S>`]: an owning, [`Clone`]able wrapper. Small targets are
//!   stored inline, without allocating.
//! - [`FunctionRef<'a, S>`]: a borrowed, [`Copy`] wrapper, two words large,
//!   which never owns its target.
//! - [`MoveFunction<S, Q>`]: an owning, move-only wrapper, two words large,
//!   whose target does not need to be [`Clone`]. Its call qualification `Q`
//!   (see [`markers`]) selects whether it is called through `&self`,
//!   `&mut self` or by value, and whether a panic in the target aborts.
//!
//! The signature `S` is written as a function-pointer type, such as
//! `fn(i32) -> i32`, or as [`Variadic<fn(..) -> R>`](signature::Variadic) for
//! signatures ending in a pack of [`VarArgs`](signature::VarArgs).
//!
//! ## Quick Example
//!
//! ```
//! use polyfn::{Function, FunctionRef, MoveFunction, markers::Null};
//!
//! fn inc(x: i32) -> i32 {
//!     x + 1
//! }
//!
//! // A borrowed view of any callable
//! let offset = 2;
//! let add = |x: i32| x + offset;
//! let view: FunctionRef<'_, fn(i32) -> i32> = FunctionRef::new(&add);
//! assert_eq!(view.call(40), 42);
//!
//! // An owning, copyable callable
//! let mut function = Function::<fn(i32) -> i32>::from_fn(inc);
//! let mut copy = function.clone();
//! assert_eq!(function.call(41), 42);
//! assert_eq!(copy.call(1), 2);
//!
//! // A null function pointer produces a null wrapper
//! let missing: Option<fn(i32) -> i32> = None;
//! let function: MoveFunction<fn(i32) -> i32> = MoveFunction::from(missing);
//! assert!(function == Null);
//! ```
//!
//! ## Binding methods
//!
//! A function known at compile time can be wrapped as a [`NonType`] with
//! [`nontype`], and optionally bound to a receiver object. The wrapper then
//! stores only the receiver.
//!
//! ```
//! use polyfn::{MoveFunction, nontype};
//!
//! struct Counter {
//!     n: u32,
//! }
//!
//! impl Counter {
//!     fn add(&mut self, amount: u32) -> u32 {
//!         self.n += amount;
//!         self.n
//!     }
//! }
//!
//! let mut add: MoveFunction<fn(u32) -> u32> =
//!     MoveFunction::bind(nontype(Counter::add), Box::new(Counter { n: 0 }));
//! assert_eq!(add.call(2), 2);
//! assert_eq!(add.call(3), 5);
//! ```
//!
//! ## Empty wrappers
//!
//! [`Function`] and [`MoveFunction`] have a null state. Calling a null wrapper
//! panics with a [`BadCall`] message; [`Function::try_call`] returns the
//! [`BadCall`] instead. A [`FunctionRef`] is never null.
//!
//! ## Features
//!
//! - `tracing`: emits [`tracing`](https://docs.rs/tracing) events under the
//!   `polyfn` target when a wrapper spills its target to the heap, is
//!   created from a null function pointer, or is called while empty.
//!
//! [`NonType`]: binding::NonType

extern crate alloc;

#[macro_use]
mod macros;

mod error;
mod function;
mod function_ref;
pub mod markers;
mod move_function;
pub mod prelude;

pub use polyfn_internals::{DEFAULT_INLINE_WORDS, binding, fits_inline, invoke, signature};

pub use self::{
    binding::nontype, error::BadCall, function::Function, function_ref::FunctionRef,
    move_function::MoveFunction,
};
