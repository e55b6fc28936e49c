mod mallocator;
pub use mallocator::*;

mod slot_allocator;
pub use slot_allocator::*;
