use core::{
    fmt,
    hash::{Hash, Hasher},
    mem,
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr::{self, NonNull},
    slice,
};

use scopeguard::guard;
use static_assertions::const_assert;

use crate::{
    alloc::{Allocator, primitives::Mallocator},
    error::DynArrayError,
};
use super::{
    raw_buf::RawBuf,
    SeqIter, SeqIterMut, RevSeqIter, RevSeqIterMut,
    SetLenOnDrop, impl_slice_partial_eq,
};

mod into_iter;
pub use into_iter::*;

#[cfg(test)]
mod tests;

#[cold]
#[track_caller]
fn handle_error(err: DynArrayError) -> ! {
    panic!("{err}")
}

#[inline]
#[track_caller]
fn unwrap_or_panic<R>(res: Result<R, DynArrayError>) -> R {
    match res {
        Ok(val) => val,
        Err(err) => handle_error(err),
    }
}

/// Growable contiguous array, storing its elements in memory provided by an [`Allocator`]
///
/// The array owns a single buffer, of which the first `len()` slots hold live elements.
/// When an operation needs more room than `capacity()`, the array grows to 1.5 times the size it needs:
/// a new buffer is allocated, every element is moved over, and only then is the old buffer handed back to the allocator.
///
/// Positions are element indices, operations that return a position return a [`SeqIterMut`] at that index.
///
/// Every operation that can allocate has a `try_` variant returning a [`DynArrayError`],
/// the variant without the prefix panics with the error's message.
pub struct DynArray<T, A: Allocator<T> = Mallocator> {
    buf : RawBuf<T, A>,
    len : usize,
}

impl<T> DynArray<T> {
    /// Create an empty array, this does not allocate
    pub const fn new() -> Self {
        Self::new_in(Mallocator)
    }

    /// Create an empty array with room for `capacity` elements
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        unwrap_or_panic(Self::try_with_capacity_in(capacity, Mallocator))
    }

    /// Create an array of `len` default constructed elements
    #[track_caller]
    pub fn with_len(len: usize) -> Self where
        T: Default
    {
        unwrap_or_panic(Self::try_with_len_in(len, Mallocator))
    }

    /// Create an array of `count` copies of `value`
    #[track_caller]
    pub fn from_elem(count: usize, value: &T) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_elem_in(count, value, Mallocator))
    }

    /// Create an array with copies of the elements in `[first, last)`
    #[track_caller]
    pub fn from_seq_range(first: SeqIter<'_, T>, last: SeqIter<'_, T>) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_seq_range_in(first, last, Mallocator))
    }

    /// Create an array from an iterator that knows its length up front
    #[track_caller]
    pub fn from_iter_exact<I>(iter: I) -> Self where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        unwrap_or_panic(Self::try_from_iter_exact_in(iter, Mallocator))
    }

    /// Create an array with copies of the elements in `slice`, the capacity is exactly the length of the slice
    #[track_caller]
    pub fn from_slice(slice: &[T]) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_slice_in(slice, Mallocator))
    }
}

impl<T, A: Allocator<T>> DynArray<T, A> {
    /// Numerator of the growth factor
    pub const GROWTH_NUMERATOR : usize = 3;
    /// Denominator of the growth factor
    pub const GROWTH_DENOMINATOR : usize = 2;

    /// Create an empty array using `alloc`, this does not allocate
    pub const fn new_in(alloc: A) -> Self {
        Self { buf: RawBuf::new_in(alloc), len: 0 }
    }

    /// Create an empty array using `alloc`, with room for `capacity` elements
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, DynArrayError> {
        Ok(Self { buf: RawBuf::try_with_capacity_in(capacity, alloc)?, len: 0 })
    }

    #[track_caller]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        unwrap_or_panic(Self::try_with_capacity_in(capacity, alloc))
    }

    /// Create an array of `len` default constructed elements using `alloc`
    pub fn try_with_len_in(len: usize, alloc: A) -> Result<Self, DynArrayError> where
        T: Default
    {
        let mut arr = Self::try_with_capacity_in(len, alloc)?;
        unsafe { arr.write_within_capacity(len, || Some(T::default())) };
        Ok(arr)
    }

    #[track_caller]
    pub fn with_len_in(len: usize, alloc: A) -> Self where
        T: Default
    {
        unwrap_or_panic(Self::try_with_len_in(len, alloc))
    }

    /// Create an array of `count` copies of `value` using `alloc`
    pub fn try_from_elem_in(count: usize, value: &T, alloc: A) -> Result<Self, DynArrayError> where
        T: Clone
    {
        let mut arr = Self::try_with_capacity_in(count, alloc)?;
        unsafe { arr.write_within_capacity(count, || Some(value.clone())) };
        Ok(arr)
    }

    #[track_caller]
    pub fn from_elem_in(count: usize, value: &T, alloc: A) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_elem_in(count, value, alloc))
    }

    /// Create an array with copies of the elements in `[first, last)` using `alloc`
    ///
    /// # Panics
    ///
    /// Panics if `last` comes before `first`, or if the range reaches outside of the buffer the iterators point into
    pub fn try_from_seq_range_in(first: SeqIter<'_, T>, last: SeqIter<'_, T>, alloc: A) -> Result<Self, DynArrayError> where
        T: Clone
    {
        assert!(first <= last, "sequence range is reversed: `first` (at {}) comes after `last` (at {})", first.offset(), last.offset());
        Self::try_from_iter_exact_in(first.until(last).cloned(), alloc)
    }

    #[track_caller]
    pub fn from_seq_range_in(first: SeqIter<'_, T>, last: SeqIter<'_, T>, alloc: A) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_seq_range_in(first, last, alloc))
    }

    /// Create an array from an iterator that knows its length up front, using `alloc`
    ///
    /// The capacity is the length the iterator reported, if the iterator ends early, the array only holds the elements it produced.
    pub fn try_from_iter_exact_in<I>(iter: I, alloc: A) -> Result<Self, DynArrayError> where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        let mut iter = iter.into_iter();
        let count = iter.len();
        let mut arr = Self::try_with_capacity_in(count, alloc)?;
        unsafe { arr.write_within_capacity(count, || iter.next()) };
        Ok(arr)
    }

    #[track_caller]
    pub fn from_iter_exact_in<I>(iter: I, alloc: A) -> Self where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        unwrap_or_panic(Self::try_from_iter_exact_in(iter, alloc))
    }

    /// Create an array with copies of the elements in `slice`, using `alloc`
    pub fn try_from_slice_in(slice: &[T], alloc: A) -> Result<Self, DynArrayError> where
        T: Clone
    {
        Self::try_from_iter_exact_in(slice.iter().cloned(), alloc)
    }

    #[track_caller]
    pub fn from_slice_in(slice: &[T], alloc: A) -> Self where
        T: Clone
    {
        unwrap_or_panic(Self::try_from_slice_in(slice, alloc))
    }

    /// Create a deep copy of the array using `alloc`, the copy has the same capacity as the array
    pub fn try_clone_in(&self, alloc: A) -> Result<Self, DynArrayError> where
        T: Clone
    {
        let mut arr = Self::try_with_capacity_in(self.capacity(), alloc)?;
        let mut iter = self.iter();
        unsafe { arr.write_within_capacity(self.len, || iter.next().cloned()) };
        Ok(arr)
    }

    #[track_caller]
    pub fn clone_in(&self, alloc: A) -> Self where
        T: Clone
    {
        unwrap_or_panic(self.try_clone_in(alloc))
    }

    /// Steal the contents of `src`, including its allocator, leaving `src` empty with a default allocator
    pub fn take(src: &mut Self) -> Self where
        A: Default
    {
        mem::replace(src, Self::new_in(A::default()))
    }

    /// Replace the contents of the array by stealing the contents of `src`, leaving `src` empty with a default allocator
    pub fn take_from(&mut self, src: &mut Self) where
        A: Default
    {
        *self = Self::take(src);
    }

    /// Replace the contents of the array by a deep copy of `src`
    ///
    /// The array takes over the allocator `src` propagates to copies, and the capacity of `src`.
    /// If the copy can't be created, the array is left untouched.
    pub fn try_assign_clone(&mut self, src: &Self) -> Result<(), DynArrayError> where
        T: Clone,
        A: Clone
    {
        *self = src.try_clone_in(src.allocator().propagate_on_copy())?;
        Ok(())
    }

    #[track_caller]
    pub fn assign_clone(&mut self, src: &Self) where
        T: Clone,
        A: Clone
    {
        unwrap_or_panic(self.try_assign_clone(src))
    }

    /// Replace the contents of the array by copies of `items`
    ///
    /// A temporary array is created first and swapped with this one, so on failure the array is left untouched.
    pub fn try_assign_list(&mut self, items: &[T]) -> Result<(), DynArrayError> where
        T: Clone,
        A: Clone
    {
        let mut tmp = Self::try_from_slice_in(items, self.allocator().propagate_on_copy())?;
        self.swap(&mut tmp);
        Ok(())
    }

    #[track_caller]
    pub fn assign_list(&mut self, items: &[T]) where
        T: Clone,
        A: Clone
    {
        unwrap_or_panic(self.try_assign_list(items))
    }

    /// Replace the contents of the array by `count` copies of `value`
    pub fn try_assign_fill(&mut self, count: usize, value: &T) -> Result<(), DynArrayError> where
        T: Clone
    {
        self.clear();
        self.try_reserve_to_add(count)?;
        unsafe { self.write_within_capacity(count, || Some(value.clone())) };
        Ok(())
    }

    #[track_caller]
    pub fn assign_fill(&mut self, count: usize, value: &T) where
        T: Clone
    {
        unwrap_or_panic(self.try_assign_fill(count, value))
    }

    /// Replace the contents of the array by the elements of `iter`
    pub fn try_assign_iter<I>(&mut self, iter: I) -> Result<(), DynArrayError> where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        let mut iter = iter.into_iter();
        let count = iter.len();
        self.clear();
        self.try_reserve_to_add(count)?;
        unsafe { self.write_within_capacity(count, || iter.next()) };
        Ok(())
    }

    #[track_caller]
    pub fn assign_iter<I>(&mut self, iter: I) where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        unwrap_or_panic(self.try_assign_iter(iter))
    }

    /// Get the allocator used by the array
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    //--------------------------------------------------------------
    // Element access

    /// Get a reference to the element at `index`
    pub fn at(&self, index: usize) -> Result<&T, DynArrayError> {
        self.as_slice().get(index).ok_or(DynArrayError::OutOfRange { index, len: self.len })
    }

    /// Get a mutable reference to the element at `index`
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DynArrayError> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(DynArrayError::OutOfRange { index, len })
    }

    /// Get the first element, or `None` if the array is empty
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Get the last element, or `None` if the array is empty
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Get a pointer to the first element, or `None` if the array is empty
    pub fn data(&self) -> Option<NonNull<T>> {
        (self.len != 0).then(|| self.buf.non_null())
    }

    /// Get a pointer to the first element, to write through, or `None` if the array is empty
    pub fn data_mut(&mut self) -> Option<NonNull<T>> {
        (self.len != 0).then(|| self.buf.non_null())
    }

    /// Get a pointer to the buffer, this is dangling when no buffer was allocated
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    //--------------------------------------------------------------
    // Iteration

    /// Get a cursor at the first element
    pub fn begin(&self) -> SeqIter<'_, T> {
        SeqIter::new(self.as_slice(), 0)
    }

    /// Get a cursor one past the last element
    pub fn end(&self) -> SeqIter<'_, T> {
        SeqIter::new(self.as_slice(), self.len as isize)
    }

    pub fn cbegin(&self) -> SeqIter<'_, T> {
        self.begin()
    }

    pub fn cend(&self) -> SeqIter<'_, T> {
        self.end()
    }

    /// Get a mutable cursor at the first element
    pub fn begin_mut(&mut self) -> SeqIterMut<'_, T> {
        self.iter_mut_at(0)
    }

    /// Get a mutable cursor one past the last element
    pub fn end_mut(&mut self) -> SeqIterMut<'_, T> {
        self.iter_mut_at(self.len)
    }

    /// Get a reverse cursor at the last element
    pub fn rbegin(&self) -> RevSeqIter<'_, T> {
        RevSeqIter::new(self.end())
    }

    /// Get a reverse cursor one before the first element
    pub fn rend(&self) -> RevSeqIter<'_, T> {
        RevSeqIter::new(self.begin())
    }

    pub fn crbegin(&self) -> RevSeqIter<'_, T> {
        self.rbegin()
    }

    pub fn crend(&self) -> RevSeqIter<'_, T> {
        self.rend()
    }

    pub fn rbegin_mut(&mut self) -> RevSeqIterMut<'_, T> {
        RevSeqIterMut::new(self.end_mut())
    }

    pub fn rend_mut(&mut self) -> RevSeqIterMut<'_, T> {
        RevSeqIterMut::new(self.begin_mut())
    }

    fn iter_mut_at(&mut self, index: usize) -> SeqIterMut<'_, T> {
        SeqIterMut::new(self.as_mut_slice(), index as isize)
    }

    //--------------------------------------------------------------
    // Capacity

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the number of elements the current buffer can hold
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Get the largest capacity an array of `T` can have
    pub fn max_size(&self) -> usize {
        RawBuf::<T, A>::max_capacity()
    }

    /// Make sure the array can hold at least `new_capacity` elements, without growing beyond `new_capacity`
    ///
    /// A request that does not exceed the current capacity does nothing.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), DynArrayError> {
        RawBuf::<T, A>::check_capacity(new_capacity)?;
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.buf.relocate(self.len, new_capacity)
    }

    #[track_caller]
    pub fn reserve(&mut self, new_capacity: usize) {
        unwrap_or_panic(self.try_reserve(new_capacity))
    }

    /// Shrink the buffer, so the capacity matches the length
    pub fn try_shrink_to_fit(&mut self) -> Result<(), DynArrayError> {
        if self.capacity() > self.len {
            self.buf.relocate(self.len, self.len)?;
        }
        Ok(())
    }

    #[track_caller]
    pub fn shrink_to_fit(&mut self) {
        unwrap_or_panic(self.try_shrink_to_fit())
    }

    /// Capacity to grow to when `needed` elements need to fit
    const fn grown_capacity(needed: usize) -> usize {
        let whole = (needed / Self::GROWTH_DENOMINATOR).saturating_mul(Self::GROWTH_NUMERATOR);
        whole.saturating_add(needed % Self::GROWTH_DENOMINATOR * Self::GROWTH_NUMERATOR / Self::GROWTH_DENOMINATOR)
    }

    /// Make room for `extra` more elements, growing to 1.5 times the required capacity if the buffer is too small
    fn try_reserve_to_add(&mut self, extra: usize) -> Result<(), DynArrayError> {
        let needed = self.len.checked_add(extra).ok_or(DynArrayError::LengthExceeded { requested: usize::MAX, max: self.max_size() })?;
        if needed <= self.capacity() {
            return Ok(());
        }
        self.try_reserve(Self::grown_capacity(needed))
    }

    //--------------------------------------------------------------
    // Mutation

    /// Destroy all elements, the capacity is kept
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroy all elements from `new_len` onwards, does nothing when `new_len` is not smaller than the length
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }

        let old_len = self.len;
        // Shrink first, a panicking destructor leaks the rest instead of destroying elements twice
        self.len = new_len;
        for i in new_len..old_len {
            unsafe {
                let slot = self.buf.slot(i);
                self.buf.allocator_mut().destroy(slot);
            }
        }
    }

    /// Insert `value` at `index`, shifting all elements after it to the right
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<SeqIterMut<'_, T>, DynArrayError> {
        let mut value = Some(value);
        self.try_insert_with(index, 1, || value.take())?;
        Ok(self.iter_mut_at(index))
    }

    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) -> SeqIterMut<'_, T> {
        unwrap_or_panic(self.try_insert(index, value))
    }

    /// Insert `count` copies of `value` at `index`
    pub fn try_insert_fill(&mut self, index: usize, count: usize, value: &T) -> Result<SeqIterMut<'_, T>, DynArrayError> where
        T: Clone
    {
        self.try_insert_with(index, count, || Some(value.clone()))?;
        Ok(self.iter_mut_at(index))
    }

    #[track_caller]
    pub fn insert_fill(&mut self, index: usize, count: usize, value: &T) -> SeqIterMut<'_, T> where
        T: Clone
    {
        unwrap_or_panic(self.try_insert_fill(index, count, value))
    }

    /// Insert the elements of `iter` at `index`, in order
    pub fn try_insert_iter<I>(&mut self, index: usize, iter: I) -> Result<SeqIterMut<'_, T>, DynArrayError> where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        let mut iter = iter.into_iter();
        let count = iter.len();
        self.try_insert_with(index, count, || iter.next())?;
        Ok(self.iter_mut_at(index))
    }

    #[track_caller]
    pub fn insert_iter<I>(&mut self, index: usize, iter: I) -> SeqIterMut<'_, T> where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator
    {
        unwrap_or_panic(self.try_insert_iter(index, iter))
    }

    /// Insert copies of `items` at `index`, in order
    pub fn try_insert_slice(&mut self, index: usize, items: &[T]) -> Result<SeqIterMut<'_, T>, DynArrayError> where
        T: Clone
    {
        self.try_insert_iter(index, items.iter().cloned())
    }

    #[track_caller]
    pub fn insert_slice(&mut self, index: usize, items: &[T]) -> SeqIterMut<'_, T> where
        T: Clone
    {
        unwrap_or_panic(self.try_insert_slice(index, items))
    }

    /// Construct an element in place at `index`, from the value returned by `f`
    pub fn try_emplace<F>(&mut self, index: usize, f: F) -> Result<SeqIterMut<'_, T>, DynArrayError> where
        F: FnOnce() -> T
    {
        let mut f = Some(f);
        self.try_insert_with(index, 1, || f.take().map(|f| f()))?;
        Ok(self.iter_mut_at(index))
    }

    #[track_caller]
    pub fn emplace<F>(&mut self, index: usize, f: F) -> SeqIterMut<'_, T> where
        F: FnOnce() -> T
    {
        unwrap_or_panic(self.try_emplace(index, f))
    }

    /// Open a gap of `count` slots at `index` and fill it from `next`
    ///
    /// The array grows before anything is moved, so a failed allocation leaves the array untouched.
    /// If `next` runs out or panics, the gap is closed over the elements written so far.
    fn try_insert_with<F>(&mut self, index: usize, count: usize, mut next: F) -> Result<(), DynArrayError> where
        F: FnMut() -> Option<T>
    {
        if index > self.len {
            return Err(DynArrayError::OutOfRange { index, len: self.len });
        }
        if count == 0 {
            return Ok(());
        }
        self.try_reserve_to_add(count)?;

        let tail = self.len - index;
        unsafe {
            let base = self.buf.ptr();
            ptr::copy(base.add(index), base.add(index + count), tail);
        }
        // The tail lives past the gap now, until the guard moves it back in place
        self.len = index;

        let mut gap = guard(InsertGap { arr: self, index, count, tail, written: 0 }, InsertGap::close);
        while gap.written < count {
            let Some(value) = next() else { break };
            unsafe {
                let slot = gap.arr.buf.slot(index + gap.written);
                gap.arr.buf.allocator_mut().construct(slot, value);
            }
            gap.written += 1;
        }
        Ok(())
    }

    /// Destroy the element at `index`, shifting all elements after it to the left
    ///
    /// Erasing from an empty array does nothing and returns `end_mut()`.
    ///
    /// # Panics
    ///
    /// Panics if the array is not empty and `index` is not smaller than the length
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> SeqIterMut<'_, T> {
        if self.is_empty() {
            return self.end_mut();
        }
        assert!(index < self.len, "erase index (is {index}) should be < len (is {})", self.len);
        self.erase_range(index, index + 1)
    }

    /// Destroy the elements in `[first, last)`, shifting all elements after them to the left
    ///
    /// Erasing from an empty array does nothing and returns `end_mut()`.
    ///
    /// # Panics
    ///
    /// Panics if the array is not empty and the range is reversed or reaches beyond the length
    #[track_caller]
    pub fn erase_range(&mut self, first: usize, last: usize) -> SeqIterMut<'_, T> {
        if self.is_empty() {
            return self.end_mut();
        }
        assert!(first <= last, "erase range starts at {first} but ends at {last}");
        assert!(last <= self.len, "erase range end (is {last}) should be <= len (is {})", self.len);

        let old_len = self.len;
        self.len = first;
        unsafe {
            for i in first..last {
                let slot = self.buf.slot(i);
                self.buf.allocator_mut().destroy(slot);
            }
            let base = self.buf.ptr();
            ptr::copy(base.add(last), base.add(first), old_len - last);
        }
        self.len = old_len - (last - first);
        self.iter_mut_at(first)
    }

    /// Append `value` to the back of the array
    pub fn try_push_back(&mut self, value: T) -> Result<(), DynArrayError> {
        self.try_reserve_to_add(1)?;
        unsafe {
            let slot = self.buf.slot(self.len);
            self.buf.allocator_mut().construct(slot, value);
        }
        self.len += 1;
        Ok(())
    }

    #[track_caller]
    pub fn push_back(&mut self, value: T) {
        unwrap_or_panic(self.try_push_back(value))
    }

    /// Construct an element in place at the back of the array, from the value returned by `f`
    pub fn try_emplace_back<F>(&mut self, f: F) -> Result<&mut T, DynArrayError> where
        F: FnOnce() -> T
    {
        self.try_reserve_to_add(1)?;
        let index = self.len;
        unsafe {
            let slot = self.buf.slot(index);
            self.buf.allocator_mut().construct(slot, f());
        }
        self.len += 1;
        Ok(&mut self.as_mut_slice()[index])
    }

    #[track_caller]
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T where
        F: FnOnce() -> T
    {
        unwrap_or_panic(self.try_emplace_back(f))
    }

    /// Remove the last element and return it, or `None` if the array is empty
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        unsafe { Some(ptr::read(self.buf.slot(self.len).as_ptr())) }
    }

    /// Resize the array to `new_len` elements, new elements are default constructed
    ///
    /// Growing beyond the capacity reallocates to exactly `new_len`.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), DynArrayError> where
        T: Default
    {
        self.try_resize_with(new_len, T::default)
    }

    #[track_caller]
    pub fn resize(&mut self, new_len: usize) where
        T: Default
    {
        unwrap_or_panic(self.try_resize(new_len))
    }

    /// Resize the array to `new_len` elements, new elements are copies of `value`
    pub fn try_resize_with_value(&mut self, new_len: usize, value: &T) -> Result<(), DynArrayError> where
        T: Clone
    {
        self.try_resize_with(new_len, || value.clone())
    }

    #[track_caller]
    pub fn resize_with_value(&mut self, new_len: usize, value: &T) where
        T: Clone
    {
        unwrap_or_panic(self.try_resize_with_value(new_len, value))
    }

    fn try_resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<(), DynArrayError> where
        F: FnMut() -> T
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        self.try_reserve(new_len)?;
        let extra = new_len - self.len;
        unsafe { self.write_within_capacity(extra, || Some(f())) };
        Ok(())
    }

    /// Exchange the contents of two arrays, together with their allocators
    ///
    /// No element is moved or copied.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Construct up to `count` elements from `next` in the spare capacity, stopping early when `next` returns `None`
    ///
    /// # Safety
    ///
    /// The spare capacity must be at least `count`
    unsafe fn write_within_capacity<F>(&mut self, count: usize, mut next: F) where
        F: FnMut() -> Option<T>
    {
        debug_assert!(self.capacity() - self.len >= count);

        let Self { buf, len } = self;
        // The length is bumped after every element, so a panicking `next` keeps what was written
        let mut local_len = SetLenOnDrop::new(len);
        for _ in 0..count {
            let Some(value) = next() else { break };
            let slot = buf.slot(local_len.current_len());
            buf.allocator_mut().construct(slot, value);
            local_len.increment_len(1);
        }
    }
}

const_assert!(DynArray::<u8>::GROWTH_NUMERATOR > DynArray::<u8>::GROWTH_DENOMINATOR);

/// Open gap in an array during an insertion
///
/// `written` slots at the start of the gap are filled, the `tail` elements that followed the insertion point live right after the gap.
struct InsertGap<'a, T, A: Allocator<T>> {
    arr     : &'a mut DynArray<T, A>,
    index   : usize,
    count   : usize,
    tail    : usize,
    written : usize,
}

impl<T, A: Allocator<T>> InsertGap<'_, T, A> {
    fn close(self) {
        let filled_end = self.index + self.written;
        if self.written != self.count {
            unsafe {
                let base = self.arr.buf.ptr();
                ptr::copy(base.add(self.index + self.count), base.add(filled_end), self.tail);
            }
        }
        self.arr.len = filled_end + self.tail;
    }
}

impl<T, A: Allocator<T>> Drop for DynArray<T, A> {
    fn drop(&mut self) {
        self.truncate(0);
    }
}

impl<T: Clone, A: Allocator<T> + Clone> Clone for DynArray<T, A> {
    #[track_caller]
    fn clone(&self) -> Self {
        self.clone_in(self.allocator().propagate_on_copy())
    }

    #[track_caller]
    fn clone_from(&mut self, source: &Self) {
        self.assign_clone(source)
    }
}

impl<T, A: Allocator<T> + Default> Default for DynArray<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: Allocator<T>> Deref for DynArray<T, A> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator<T>> DerefMut for DynArray<T, A> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator<T>> AsRef<[T]> for DynArray<T, A> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator<T>> AsMut<[T]> for DynArray<T, A> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, A: Allocator<T>> Index<usize> for DynArray<T, A> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.at(index) {
            Ok(elem) => elem,
            Err(err) => handle_error(err),
        }
    }
}

impl<T, A: Allocator<T>> IndexMut<usize> for DynArray<T, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.at_mut(index) {
            Ok(elem) => elem,
            Err(err) => handle_error(err),
        }
    }
}

impl<T, A: Allocator<T>> Extend<T> for DynArray<T, A> {
    #[track_caller]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        unwrap_or_panic(self.try_reserve_to_add(lower));
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator<T>> Extend<&'a T> for DynArray<T, A> {
    #[track_caller]
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        Extend::<T>::extend(self, iter.into_iter().copied())
    }
}

impl<T, A: Allocator<T> + Default> FromIterator<T> for DynArray<T, A> {
    #[track_caller]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::default();
        arr.extend(iter);
        arr
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    #[track_caller]
    fn from(slice: &[T]) -> Self {
        Self::from_slice(slice)
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    #[track_caller]
    fn from(arr: [T; N]) -> Self {
        Self::from_iter_exact(arr)
    }
}

impl<T, A: Allocator<T>> IntoIterator for DynArray<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator<T>> IntoIterator for &'a DynArray<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator<T>> IntoIterator for &'a mut DynArray<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl_slice_partial_eq!{ [A: Allocator<T>, B: Allocator<U>] DynArray<T, A>, DynArray<U, B> }
impl_slice_partial_eq!{ [A: Allocator<T>] DynArray<T, A>, [U] }
impl_slice_partial_eq!{ [A: Allocator<T>] DynArray<T, A>, &[U] }
impl_slice_partial_eq!{ [A: Allocator<T>, const N: usize] DynArray<T, A>, [U; N] }
impl_slice_partial_eq!{ [A: Allocator<T>, const N: usize] DynArray<T, A>, &[U; N] }
impl_slice_partial_eq!{ [B: Allocator<U>] [T], DynArray<U, B> }
impl_slice_partial_eq!{ [B: Allocator<U>] &[T], DynArray<U, B> }
impl_slice_partial_eq!{ [B: Allocator<U>, const N: usize] [T; N], DynArray<U, B> }

impl<T: Eq, A: Allocator<T>> Eq for DynArray<T, A> {}

impl<T: PartialOrd, A: Allocator<T>> PartialOrd for DynArray<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        PartialOrd::partial_cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: Ord, A: Allocator<T>> Ord for DynArray<T, A> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        Ord::cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: Hash, A: Allocator<T>> Hash for DynArray<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(self.as_slice(), state)
    }
}

impl<T: fmt::Debug, A: Allocator<T>> fmt::Debug for DynArray<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

/// Create a [`DynArray`] containing the arguments
///
/// `dynarr![a, b, c]` creates an array with exactly the capacity needed for the listed elements,
/// `dynarr![elem; n]` creates an array of `n` copies of `elem`.
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArray::from_elem($n, &$elem)
    };
    ($($val:expr),+ $(,)?) => {
        {
            let mut arr = $crate::collections::DynArray::with_capacity($crate::count_exprs!($($val),+));
            $(
                arr.push_back($val);
            )+
            arr
        }
    };
}
