use core::{alloc::Layout, ptr::NonNull};

use crate::{
    alloc::Allocator,
    error::AllocError,
};

/// Allocator calling directly to the system allocator
///
/// Mallocator uses rust's global allocator to retrieve memory, requests for 0 bytes never reach it and get a dangling pointer instead.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Mallocator;

unsafe impl<T> Allocator<T> for Mallocator {
    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError> {
        let layout = Layout::array::<T>(count).map_err(|_| AllocError::Exhausted { requested: count })?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr.cast()).ok_or(AllocError::Exhausted { requested: count })
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        // A count that doesn't form a layout could never have been allocated
        if let Ok(layout) = Layout::array::<T>(count) {
            if layout.size() != 0 {
                std::alloc::dealloc(ptr.as_ptr().cast(), layout);
            }
        }
    }

    fn owns(&self, _ptr: NonNull<T>) -> bool {
        // No real way of knowing
        true
    }
}
