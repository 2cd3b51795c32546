//! Module containing the copyable, inline-storage wrapper.

mod raw;
mod storage;
mod vtable;

pub use self::{
    raw::RawFunction,
    storage::{DEFAULT_INLINE_WORDS, fits_inline},
};
