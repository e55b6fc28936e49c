use core::{
    marker::PhantomData,
    mem::{size_of, MaybeUninit},
    ptr::{self, NonNull},
};

use kiln_base::MiB;
use static_assertions::const_assert;

use crate::{
    alloc::{Allocator, primitives::Mallocator},
    error::AllocError,
    logging::*,
};

/// Fixed-capacity pool handing out single element slots
///
/// The pool reserves one slab when it is created and never grows or shrinks afterwards.
/// Slots that were never used are handed out in ascending address order,
/// returned slots are recycled last in, first out, and take priority over unused slots.
///
/// Only requests for a single element can be served,
/// so a container using this allocator can never hold a buffer with a capacity larger than 1.
pub struct SlotAllocator<T> {
    slab:       NonNull<T>,
    slot_count: usize,
    /// Index of the first slot that was never handed out
    high_water: usize,
    /// Recycled slots, the last entry is handed out next
    free:       Vec<usize>,
    _phantom:   PhantomData<T>,
}

impl<T> SlotAllocator<T> {
    /// Slab size used by [`SlotAllocator::new`]
    pub const DEFAULT_SLAB_BYTES : usize = MiB(64);

    /// Create a pool with a slab of [`SlotAllocator::DEFAULT_SLAB_BYTES`]
    ///
    /// # Panics
    ///
    /// Panics if the slab cannot be allocated
    pub fn new() -> Self {
        Self::with_slot_count(Self::default_slot_count())
    }

    /// Create a pool with exactly `slot_count` slots
    ///
    /// # Panics
    ///
    /// Panics if the slab cannot be allocated
    pub fn with_slot_count(slot_count: usize) -> Self {
        match Self::try_with_slot_count(slot_count) {
            Ok(alloc) => alloc,
            Err(err) => panic!("Failed to allocate the slab of a SlotAllocator: {err}"),
        }
    }

    /// Create a pool with exactly `slot_count` slots
    pub fn try_with_slot_count(slot_count: usize) -> Result<Self, AllocError> {
        let slab = if slot_count == 0 {
            NonNull::dangling()
        } else {
            Allocator::<T>::allocate(&mut Mallocator, slot_count)?
        };
        Ok(Self { slab, slot_count, high_water: 0, free: Vec::new(), _phantom: PhantomData })
    }

    /// Number of slots in a pool created with [`SlotAllocator::new`]
    pub const fn default_slot_count() -> usize {
        let size = size_of::<T>();
        if size == 0 {
            return usize::MAX;
        }

        let by_slab = Self::DEFAULT_SLAB_BYTES / size;
        let by_addr = isize::MAX as usize / size;
        if by_slab < by_addr { by_slab } else { by_addr }
    }

    /// Total number of slots in the pool
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Number of slots currently handed out
    pub fn used_slots(&self) -> usize {
        self.high_water - self.free.len()
    }

    /// Number of slots that can still be handed out
    pub fn free_slots(&self) -> usize {
        self.slot_count - self.used_slots()
    }

    fn slot_ptr(&self, index: usize) -> NonNull<T> {
        debug_assert!(index < self.slot_count);
        unsafe { NonNull::new_unchecked(self.slab.as_ptr().add(index)) }
    }

    fn slot_index(&self, ptr: NonNull<T>) -> Option<usize> {
        let size = size_of::<T>();
        if size == 0 {
            // Every slot of a zero-sized type lives at the same address
            return (ptr == self.slab && self.slot_count != 0).then_some(0);
        }

        let base = self.slab.as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        if addr < base {
            return None;
        }

        let offset = addr - base;
        let index = offset / size;
        (offset % size == 0 && index < self.slot_count).then_some(index)
    }
}

impl<T> Default for SlotAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for SlotAllocator<T> {
    /// Create a pool with the same number of slots and a byte copy of the slab, in which every slot is free
    fn clone(&self) -> Self {
        let new = Self::with_slot_count(self.slot_count);
        if size_of::<T>() != 0 {
            unsafe { ptr::copy_nonoverlapping(self.slab.as_ptr() as *const MaybeUninit<T>, new.slab.as_ptr().cast::<MaybeUninit<T>>(), self.slot_count) };
        }
        new
    }
}

impl<T> Drop for SlotAllocator<T> {
    fn drop(&mut self) {
        if self.slot_count != 0 {
            unsafe { Allocator::<T>::deallocate(&mut Mallocator, self.slab, self.slot_count) };
        }
    }
}

unsafe impl<T> Allocator<T> for SlotAllocator<T> {
    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError> {
        if count != 1 {
            core_log!(log_warning, LOG_ALLOC_CAT, "SlotAllocator rejected a request for {count} slots");
            return Err(AllocError::UnsupportedCount { count });
        }

        if let Some(index) = self.free.pop() {
            return Ok(self.slot_ptr(index));
        }

        if self.high_water < self.slot_count {
            let index = self.high_water;
            self.high_water += 1;
            return Ok(self.slot_ptr(index));
        }

        core_log!(log_warning, LOG_ALLOC_CAT, "SlotAllocator ran out of slots ({} in use)", self.slot_count);
        Err(AllocError::Exhausted { requested: count })
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        if count == 0 {
            return;
        }
        assert!(count == 1, "SlotAllocator can only deallocate a single slot at a time, got a count of {count}");

        match self.slot_index(ptr) {
            Some(index) => {
                assert!(self.used_slots() != 0, "Cannot deallocate a slot when no slot is in use");
                self.free.push(index);
            },
            None => panic!("Cannot deallocate a slot that isn't owned by the allocator"),
        }
    }

    fn owns(&self, ptr: NonNull<T>) -> bool {
        self.slot_index(ptr).is_some()
    }
}

const_assert!(SlotAllocator::<u8>::DEFAULT_SLAB_BYTES == 67_108_864);
