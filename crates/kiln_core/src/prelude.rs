pub use crate::{
    alloc::{Allocator, Propagation, SharedAlloc, primitives::{Mallocator, SlotAllocator}},
    collections::{DynArray, SeqIter, SeqIterMut, RevSeqIter, RevSeqIterMut},
    error::{AllocError, DynArrayError},
    dynarr,
};
