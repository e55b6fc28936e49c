//! Growable contiguous arrays over pluggable allocator strategies.
//!
//! - [`alloc`]: the [`Allocator`](alloc::Allocator) strategy trait, the system backed [`Mallocator`](alloc::primitives::Mallocator),
//!   the fixed slab [`SlotAllocator`](alloc::primitives::SlotAllocator), and [`SharedAlloc`](alloc::SharedAlloc) for shared propagation.
//! - [`collections`]: [`DynArray`](collections::DynArray) and its random access iterators.
//!
//! None of the types in this crate are thread-safe, access has to be externally synchronized.

mod logging;

pub mod error;
pub mod alloc;
pub mod collections;

pub mod prelude;

#[doc(hidden)]
pub use kiln_base::count_exprs;
