//! Module containing the move-only, single-handle wrapper.

mod raw;
mod vtable;

pub use self::raw::RawMoveFunction;
