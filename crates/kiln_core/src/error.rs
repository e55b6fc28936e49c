//! Errors raised by the allocators and containers.
//!
//! Errors are returned at the point of detection and never recovered from internally.

use thiserror::Error;

/// Errors returned by an [`Allocator`](crate::alloc::Allocator)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum AllocError {
    /// No memory, or no free slot, is left to satisfy the request
    #[error("allocation exhausted: could not allocate {requested} element(s)")]
    Exhausted {
        /// Number of elements requested
        requested: usize,
    },
    /// The allocator cannot serve requests of this many elements
    #[error("allocation exhausted: the allocator only hands out single slots, {count} element(s) requested")]
    UnsupportedCount {
        /// Number of elements requested
        count: usize,
    },
}

/// Errors returned by a [`DynArray`](crate::collections::DynArray)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum DynArrayError {
    /// An index outside of `[0, len)` was accessed
    #[error("index out of range: the len is {len} but the index is {index}")]
    OutOfRange {
        index: usize,
        len:   usize,
    },
    /// The requested capacity is larger than `max_size()`
    #[error("length exceeded: requested a capacity of {requested} elements, the maximum is {max}")]
    LengthExceeded {
        requested: usize,
        max:       usize,
    },
    /// The allocator could not provide storage
    #[error(transparent)]
    Alloc(#[from] AllocError),
}
