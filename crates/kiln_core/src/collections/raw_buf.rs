use core::{
    marker::PhantomData,
    mem,
    ptr::{self, NonNull},
};

use crate::{
    alloc::Allocator,
    error::DynArrayError,
    logging::*,
};

/// Storage of a [`DynArray`](super::DynArray): a pointer, the capacity behind it, and the allocator it came from
///
/// The buffer never tracks which elements are alive, that is up to the owner.
/// A buffer with a capacity of 0 never touched the allocator and holds a dangling pointer.
pub(super) struct RawBuf<T, A: Allocator<T>> {
    ptr     : NonNull<T>,
    cap     : usize,
    alloc   : A,
    _phantom: PhantomData<T>,
}

impl<T, A: Allocator<T>> RawBuf<T, A> {
    pub const fn new_in(alloc: A) -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, alloc, _phantom: PhantomData }
    }

    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, DynArrayError> {
        let mut buf = Self::new_in(alloc);
        if capacity != 0 {
            Self::check_capacity(capacity)?;
            buf.ptr = buf.alloc.allocate(capacity)?;
            buf.cap = capacity;
        }
        Ok(buf)
    }

    /// Largest capacity a buffer can have
    pub const fn max_capacity() -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => usize::MAX / size,
        }
    }

    pub fn check_capacity(capacity: usize) -> Result<(), DynArrayError> {
        if capacity > Self::max_capacity() {
            Err(DynArrayError::LengthExceeded { requested: capacity, max: Self::max_capacity() })
        } else {
            Ok(())
        }
    }

    pub fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn non_null(&self) -> NonNull<T> {
        self.ptr
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.alloc
    }

    /// Pointer to the slot at `index`
    ///
    /// # Safety
    ///
    /// `index` must be smaller than or equal to the capacity
    pub unsafe fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.cap);
        NonNull::new_unchecked(self.ptr.as_ptr().add(index))
    }

    /// Move the first `len` elements into a new allocation of exactly `new_cap` slots, then release the old allocation
    ///
    /// If the new allocation fails, the buffer is left untouched
    pub fn relocate(&mut self, len: usize, new_cap: usize) -> Result<(), DynArrayError> {
        debug_assert!(len <= new_cap && len <= self.cap);
        Self::check_capacity(new_cap)?;

        let new_ptr = if new_cap == 0 {
            NonNull::dangling()
        } else {
            self.alloc.allocate(new_cap)?
        };

        core_log!(log_debug, LOG_DYNARR_CAT, "Relocating {len} element(s) from a capacity of {} to {new_cap}", self.cap);

        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
            self.release();
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Hand the allocation back to the allocator, the buffer must be reset or dropped afterwards
    unsafe fn release(&mut self) {
        if self.cap != 0 {
            self.alloc.deallocate(self.ptr, self.cap);
        }
    }
}

impl<T, A: Allocator<T>> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        unsafe { self.release() };
    }
}
