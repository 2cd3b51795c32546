//! Module containing the borrowed, non-owning wrapper.

mod raw;

pub use self::raw::RawFunctionRef;
