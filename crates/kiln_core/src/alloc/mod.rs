//! Allocator strategies
//!
//! A container never talks to memory directly, it goes through an [`Allocator`] it owns.

mod alloc;
pub use alloc::*;

mod shared;
pub use shared::*;

pub mod primitives;

pub use crate::error::AllocError;
