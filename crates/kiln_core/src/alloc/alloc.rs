use core::ptr::{self, NonNull};

use crate::error::AllocError;

/// How an allocator travels when the container owning it is copied
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Propagation {
    /// The copy gets an allocator of its own, produced by [`Allocator::select_on_copy`]
    Duplicate,
    /// The copy uses the same allocator state as the original
    Shared,
}

/// Storage strategy for elements of type `T`
///
/// # Safety
///
/// The implementor promises that a pointer returned by `allocate(count)` points to storage for `count` properly aligned `T`s,
/// that this storage is not handed out again before it is passed back to `deallocate`, and that the storage stays valid while the allocator is moved.
pub unsafe trait Allocator<T> {
    /// Propagation policy applied when a container using this allocator is cloned, see [`Allocator::propagate_on_copy`]
    const PROPAGATION : Propagation = Propagation::Duplicate;

    /// Allocate uninitialized storage for `count` elements
    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError>;

    /// Return storage previously handed out by `allocate`
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate(count)` on this allocator (or an allocator sharing its state) with the same `count`.
    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize);

    /// Check if the allocator handed out `ptr`
    fn owns(&self, ptr: NonNull<T>) -> bool;

    /// Construct `value` in place at `ptr`
    ///
    /// # Safety
    ///
    /// `ptr` must point to uninitialized storage owned by this allocator.
    unsafe fn construct(&mut self, ptr: NonNull<T>, value: T) {
        ptr.as_ptr().write(value);
    }

    /// Destroy the element at `ptr`, leaving the storage uninitialized
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live element owned by this allocator, which is not used afterwards.
    unsafe fn destroy(&mut self, ptr: NonNull<T>) {
        ptr::drop_in_place(ptr.as_ptr());
    }

    /// Allocator of its own for a copy of a container, used when [`Allocator::PROPAGATION`] is `Duplicate`
    fn select_on_copy(&self) -> Self where
        Self: Clone
    {
        self.clone()
    }

    /// Allocator for a copy of a container using this allocator, as dictated by [`Allocator::PROPAGATION`]
    ///
    /// `Shared` hands the copy a clone of this handle, `Duplicate` asks [`Allocator::select_on_copy`] for a new allocator.
    fn propagate_on_copy(&self) -> Self where
        Self: Clone
    {
        match <Self as Allocator<T>>::PROPAGATION {
            Propagation::Shared => self.clone(),
            Propagation::Duplicate => Allocator::<T>::select_on_copy(self),
        }
    }
}
