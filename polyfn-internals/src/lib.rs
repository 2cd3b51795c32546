#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`polyfn`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased data structures and unsafe
//! operations that power the [`polyfn`] callable wrappers. It provides the
//! foundation for storing "something callable with signature `S`" behind a
//! fixed-size value and dispatching calls to it through hand-written vtables.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`polyfn`] crate, not this one.
//!
//! # Architecture
//!
//! The crate is organized as a small set of leaf modules shared by three
//! parallel wrapper hierarchies:
//!
//! - **[`signature`]**: The [`Signature`] trait which normalizes a
//!   `fn(A, B) -> R` pointer type (or a [`Variadic`] one) into an argument
//!   tuple, an output type and a storable function-pointer type.
//! - **[`invoke`]**: The invocability contracts [`CallRef`], [`CallMut`] and
//!   [`CallOnce`], implemented for every closure of the matching shape.
//! - **[`handlers`]**: The [`CallHandler`] trait, which decides how a stored
//!   target is accessed (shared, exclusive or by value) when it is called.
//! - **[`handle`]**: [`RawHandle`], a single word that is either an object
//!   pointer, a const object pointer or a function pointer.
//! - **[`binding`]**: The ways a concrete callable becomes a target, including
//!   compile-time-bound entities ([`NonType`]) combined with a receiver
//!   ([`Bound`], [`BoundRef`]).
//!
//! - **`function`**: Copyable storage
//!   - [`RawFunction`]: Inline buffer plus a vtable with `call`, `clone_into`,
//!     `relocate` and `drop` entries
//! - **`move_function`**: Move-only storage
//!   - [`RawMoveFunction`]: A [`RawHandle`] plus a shared `&'static` vtable
//!     with `call` and `destroy` entries
//! - **`function_ref`**: Borrowed storage
//!   - [`RawFunctionRef`]: A [`RawHandle`] plus a single dispatch function
//!
//! # Safety Strategy
//!
//! Type erasure requires that the function pointers stored next to a target
//! are always the ones that were generated for that exact target type. This
//! crate maintains that invariant through:
//!
//! - **Module-based encapsulation**: the fields pairing a handle or buffer with
//!   its vtable are private to a single file, so the pairing can only be
//!   established by the constructors in that file
//! - **`&'static` vtables built in `const` blocks**: one per instantiated
//!   target type, so a vtable cannot be assembled from mismatched parts
//! - **Documented vtable contracts**: each vtable method states exactly when
//!   it can be called
//!
//! [`polyfn`]: https://docs.rs/polyfn/latest/polyfn/
//! [`Signature`]: signature::Signature
//! [`Variadic`]: signature::Variadic
//! [`CallRef`]: invoke::CallRef
//! [`CallMut`]: invoke::CallMut
//! [`CallOnce`]: invoke::CallOnce
//! [`CallHandler`]: handlers::CallHandler
//! [`RawHandle`]: handle::RawHandle
//! [`NonType`]: binding::NonType
//! [`Bound`]: binding::Bound
//! [`BoundRef`]: binding::BoundRef

extern crate alloc;

pub mod binding;
mod function;
mod function_ref;
pub mod handle;
pub mod handlers;
pub mod invoke;
mod move_function;
pub mod signature;
mod util;

pub use function::{DEFAULT_INLINE_WORDS, RawFunction, fits_inline};
pub use function_ref::RawFunctionRef;
pub use move_function::RawMoveFunction;
