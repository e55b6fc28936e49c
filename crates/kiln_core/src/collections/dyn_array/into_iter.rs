use core::{
    fmt,
    iter::FusedIterator,
    mem::ManuallyDrop,
    ptr,
    slice,
};

use crate::{
    alloc::{Allocator, primitives::Mallocator},
    collections::raw_buf::RawBuf,
};
use super::DynArray;

/// Iterator that moves the elements out of a [`DynArray`]
///
/// Elements that were not yielded are destroyed when the iterator is dropped, after which the buffer is handed back to the allocator.
pub struct IntoIter<T, A: Allocator<T> = Mallocator> {
    buf  : RawBuf<T, A>,
    head : usize,
    tail : usize,
}

impl<T, A: Allocator<T>> IntoIter<T, A> {
    pub(super) fn new(arr: DynArray<T, A>) -> Self {
        let arr = ManuallyDrop::new(arr);
        let tail = arr.len;
        // The array is never dropped, so the buffer is only owned by the iterator
        let buf = unsafe { ptr::read(&arr.buf) };
        Self { buf, head: 0, tail }
    }

    /// Get the elements that were not yielded yet
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.head), self.tail - self.head) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr().add(self.head), self.tail - self.head) }
    }
}

impl<T, A: Allocator<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let value = unsafe { ptr::read(self.buf.ptr().add(self.head)) };
        self.head += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tail - self.head;
        (len, Some(len))
    }
}

impl<T, A: Allocator<T>> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        Some(unsafe { ptr::read(self.buf.ptr().add(self.tail)) })
    }
}

impl<T, A: Allocator<T>> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: Allocator<T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator<T>> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let (head, tail) = (self.head, self.tail);
        self.head = tail;
        for i in head..tail {
            unsafe {
                let slot = self.buf.slot(i);
                self.buf.allocator_mut().destroy(slot);
            }
        }
    }
}

impl<T: fmt::Debug, A: Allocator<T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
