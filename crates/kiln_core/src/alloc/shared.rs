use core::{cell::RefCell, ptr::NonNull};
use std::rc::Rc;

use crate::{
    alloc::{Allocator, Propagation},
    error::AllocError,
};

/// Allocator wrapper whose clones all use the same underlying allocator
///
/// Containers copied from a container using a `SharedAlloc` allocate from the same pool.
///
/// `construct` and `destroy` are not forwarded, so dropping an element which itself allocates from the same pool cannot re-enter the inner allocator.
pub struct SharedAlloc<A> {
    inner: Rc<RefCell<A>>,
}

impl<A> SharedAlloc<A> {
    /// Wrap an allocator, so it can be shared
    pub fn new(alloc: A) -> Self {
        Self { inner: Rc::new(RefCell::new(alloc)) }
    }

    /// Get the number of handles to the underlying allocator
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Check if two handles use the same underlying allocator
    pub fn same_pool(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Inspect the underlying allocator
    pub fn with<R>(&self, f: impl FnOnce(&A) -> R) -> R {
        f(&self.inner.borrow())
    }
}

impl<A> Clone for SharedAlloc<A> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<A: Default> Default for SharedAlloc<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

unsafe impl<T, A: Allocator<T>> Allocator<T> for SharedAlloc<A> {
    const PROPAGATION : Propagation = Propagation::Shared;

    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError> {
        self.inner.borrow_mut().allocate(count)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        self.inner.borrow_mut().deallocate(ptr, count)
    }

    fn owns(&self, ptr: NonNull<T>) -> bool {
        self.inner.borrow().owns(ptr)
    }
}
