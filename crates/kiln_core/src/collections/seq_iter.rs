//! Random access cursors over a contiguous buffer
//!
//! A cursor is a base pointer and a signed offset. Cursors can be moved freely, also outside of the buffer,
//! only dereferencing them requires the offset to point at an element.
//! Comparing and subtracting cursors only looks at the offsets, so cursors into different buffers compare as if they shared one.

use core::{
    cmp::Ordering,
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut, Sub, SubAssign},
    ptr::NonNull,
};

#[cold]
#[track_caller]
fn deref_out_of_range(offset: isize, len: usize) -> ! {
    panic!("sequence iterator dereferenced at offset {offset}, outside of a buffer with {len} elements")
}

/// Returns the element pointer at `offset`, when it points inside a buffer of `len` elements
#[inline]
fn checked_slot<T>(base: NonNull<T>, len: usize, offset: isize) -> Option<NonNull<T>> {
    if offset < 0 || offset as usize >= len {
        None
    } else {
        Some(unsafe { NonNull::new_unchecked(base.as_ptr().offset(offset)) })
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Cursor yielding shared references
pub struct SeqIter<'a, T> {
    base:     NonNull<T>,
    len:      usize,
    offset:   isize,
    _phantom: PhantomData<&'a T>,
}

impl<'a, T> SeqIter<'a, T> {
    /// Create a cursor at `offset` into `slice`
    pub fn new(slice: &'a [T], offset: isize) -> Self {
        Self { base: NonNull::from(slice).cast(), len: slice.len(), offset, _phantom: PhantomData }
    }

    /// Create a cursor at `offset` into the buffer of `len` elements starting at `base`
    ///
    /// # Safety
    ///
    /// `base` must be valid for reads of `len` elements for the lifetime `'a`.
    pub unsafe fn from_raw_parts(base: NonNull<T>, len: usize, offset: isize) -> Self {
        Self { base, len, offset, _phantom: PhantomData }
    }

    /// Get the offset from the start of the buffer
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Get a pointer to the start of the buffer
    pub fn base(&self) -> *const T {
        self.base.as_ptr()
    }

    /// Get the element the cursor points at, or `None` when it points outside of the buffer
    pub fn get(&self) -> Option<&'a T> {
        self.element(self.offset)
    }

    /// Get the element the cursor points at, without checking the offset
    ///
    /// # Safety
    ///
    /// The offset must point at an element of the buffer, which must still be alive.
    pub unsafe fn get_unchecked(&self) -> &'a T {
        &*self.base.as_ptr().offset(self.offset)
    }

    /// Move the cursor to the next element
    pub fn inc(&mut self) -> &mut Self {
        self.offset += 1;
        self
    }

    /// Move the cursor to the previous element
    pub fn dec(&mut self) -> &mut Self {
        self.offset -= 1;
        self
    }

    /// Move the cursor to the next element, returning the cursor before it moved
    pub fn post_inc(&mut self) -> Self {
        let prev = *self;
        self.offset += 1;
        prev
    }

    /// Move the cursor to the previous element, returning the cursor before it moved
    pub fn post_dec(&mut self) -> Self {
        let prev = *self;
        self.offset -= 1;
        prev
    }

    /// Iterate over the elements in `[self, end)`
    pub fn until(self, end: SeqIter<'a, T>) -> SeqRange<'a, T> {
        SeqRange { front: self, back: end }
    }

    fn element(&self, offset: isize) -> Option<&'a T> {
        checked_slot(self.base, self.len, offset).map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    #[track_caller]
    fn element_or_panic(&self, offset: isize) -> &'a T {
        match self.element(offset) {
            Some(elem) => elem,
            None => deref_out_of_range(offset, self.len),
        }
    }
}

impl<T> Clone for SeqIter<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SeqIter<'_, T> {}

impl<T> Deref for SeqIter<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        self.element_or_panic(self.offset)
    }
}

impl<T> Index<isize> for SeqIter<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        self.element_or_panic(self.offset + n)
    }
}

impl<'a, 'b, T> Sub<SeqIter<'b, T>> for SeqIter<'a, T> {
    type Output = isize;

    fn sub(self, rhs: SeqIter<'b, T>) -> isize {
        self.offset - rhs.offset
    }
}

impl<T> fmt::Debug for SeqIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqIter").field("offset", &self.offset).field("len", &self.len).finish()
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Cursor yielding mutable references
///
/// Unlike [`SeqIter`], this cursor can't be copied, two copies would be able to hand out aliasing mutable references.
pub struct SeqIterMut<'a, T> {
    base:     NonNull<T>,
    len:      usize,
    offset:   isize,
    _phantom: PhantomData<&'a mut T>,
}

impl<'a, T> SeqIterMut<'a, T> {
    /// Create a cursor at `offset` into `slice`
    pub fn new(slice: &'a mut [T], offset: isize) -> Self {
        let len = slice.len();
        Self { base: NonNull::from(slice).cast(), len, offset, _phantom: PhantomData }
    }

    /// Create a cursor at `offset` into the buffer of `len` elements starting at `base`
    ///
    /// # Safety
    ///
    /// `base` must be valid for reads and writes of `len` elements for the lifetime `'a`, and must not be accessed through any other pointer during `'a`.
    pub unsafe fn from_raw_parts(base: NonNull<T>, len: usize, offset: isize) -> Self {
        Self { base, len, offset, _phantom: PhantomData }
    }

    /// Get the offset from the start of the buffer
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Get a pointer to the start of the buffer
    pub fn base(&self) -> *mut T {
        self.base.as_ptr()
    }

    /// Get a const cursor at the same position, borrowing this cursor
    pub fn as_const(&self) -> SeqIter<'_, T> {
        unsafe { SeqIter::from_raw_parts(self.base, self.len, self.offset) }
    }

    /// Get the element the cursor points at, or `None` when it points outside of the buffer
    pub fn get(&self) -> Option<&T> {
        checked_slot(self.base, self.len, self.offset).map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Get the element the cursor points at mutably, or `None` when it points outside of the buffer
    pub fn get_mut(&mut self) -> Option<&mut T> {
        checked_slot(self.base, self.len, self.offset).map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Consume the cursor, returning the element it points at for the full lifetime of the borrow
    pub fn into_mut(self) -> Option<&'a mut T> {
        checked_slot(self.base, self.len, self.offset).map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Get the element the cursor points at, without checking the offset
    ///
    /// # Safety
    ///
    /// The offset must point at an element of the buffer, which must still be alive.
    pub unsafe fn get_unchecked(&self) -> &T {
        &*self.base.as_ptr().offset(self.offset)
    }

    /// Get the element the cursor points at mutably, without checking the offset
    ///
    /// # Safety
    ///
    /// The offset must point at an element of the buffer, which must still be alive.
    pub unsafe fn get_unchecked_mut(&mut self) -> &mut T {
        &mut *self.base.as_ptr().offset(self.offset)
    }

    /// Move the cursor to the next element
    pub fn inc(&mut self) -> &mut Self {
        self.offset += 1;
        self
    }

    /// Move the cursor to the previous element
    pub fn dec(&mut self) -> &mut Self {
        self.offset -= 1;
        self
    }

    /// Move the cursor to the next element, returning the offset it was at
    ///
    /// The previous position is returned as an offset, a second cursor would alias this one.
    pub fn post_inc(&mut self) -> isize {
        let prev = self.offset;
        self.offset += 1;
        prev
    }

    /// Move the cursor to the previous element, returning the offset it was at
    pub fn post_dec(&mut self) -> isize {
        let prev = self.offset;
        self.offset -= 1;
        prev
    }

    #[track_caller]
    fn slot_or_panic(&self, offset: isize) -> NonNull<T> {
        match checked_slot(self.base, self.len, offset) {
            Some(ptr) => ptr,
            None => deref_out_of_range(offset, self.len),
        }
    }
}

impl<'a, T> From<SeqIterMut<'a, T>> for SeqIter<'a, T> {
    fn from(it: SeqIterMut<'a, T>) -> Self {
        unsafe { SeqIter::from_raw_parts(it.base, it.len, it.offset) }
    }
}

impl<T> Deref for SeqIterMut<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        unsafe { &*self.slot_or_panic(self.offset).as_ptr() }
    }
}

impl<T> DerefMut for SeqIterMut<'_, T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.slot_or_panic(self.offset).as_ptr() }
    }
}

impl<T> Index<isize> for SeqIterMut<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        unsafe { &*self.slot_or_panic(self.offset + n).as_ptr() }
    }
}

impl<T> IndexMut<isize> for SeqIterMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, n: isize) -> &mut T {
        unsafe { &mut *self.slot_or_panic(self.offset + n).as_ptr() }
    }
}

impl<'a, 'b, T> Sub<&SeqIterMut<'b, T>> for &SeqIterMut<'a, T> {
    type Output = isize;

    fn sub(self, rhs: &SeqIterMut<'b, T>) -> isize {
        self.offset - rhs.offset
    }
}

impl<T> fmt::Debug for SeqIterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqIterMut").field("offset", &self.offset).field("len", &self.len).finish()
    }
}

//------------------------------------------------------------------------------------------------------------------------------

/// Reverse cursor yielding shared references
///
/// The cursor wraps a forward cursor one past the element it yields, so `RevSeqIter::new(end)` yields the last element.
pub struct RevSeqIter<'a, T> {
    fwd: SeqIter<'a, T>,
}

impl<T> Clone for RevSeqIter<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RevSeqIter<'_, T> {}

impl<'a, T> RevSeqIter<'a, T> {
    /// Create a reverse cursor yielding the element before `fwd`
    pub fn new(fwd: SeqIter<'a, T>) -> Self {
        Self { fwd }
    }

    /// Get the forward cursor, which points one past the element this cursor yields
    pub fn forward(&self) -> SeqIter<'a, T> {
        self.fwd
    }

    /// Get the element the cursor points at, or `None` when it points outside of the buffer
    pub fn get(&self) -> Option<&'a T> {
        self.fwd.element(self.fwd.offset - 1)
    }

    /// Move the cursor to the next element, towards the start of the buffer
    pub fn inc(&mut self) -> &mut Self {
        self.fwd.dec();
        self
    }

    /// Move the cursor to the previous element, towards the end of the buffer
    pub fn dec(&mut self) -> &mut Self {
        self.fwd.inc();
        self
    }

    /// Move the cursor to the next element, returning the cursor before it moved
    pub fn post_inc(&mut self) -> Self {
        let prev = *self;
        self.fwd.dec();
        prev
    }

    /// Move the cursor to the previous element, returning the cursor before it moved
    pub fn post_dec(&mut self) -> Self {
        let prev = *self;
        self.fwd.inc();
        prev
    }
}

impl<T> Deref for RevSeqIter<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        self.fwd.element_or_panic(self.fwd.offset - 1)
    }
}

impl<T> Index<isize> for RevSeqIter<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        self.fwd.element_or_panic(self.fwd.offset - 1 - n)
    }
}

impl<'a, 'b, T> Sub<RevSeqIter<'b, T>> for RevSeqIter<'a, T> {
    type Output = isize;

    fn sub(self, rhs: RevSeqIter<'b, T>) -> isize {
        rhs.fwd.offset - self.fwd.offset
    }
}

impl<T> fmt::Debug for RevSeqIter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevSeqIter").field(&self.fwd).finish()
    }
}

/// Reverse cursor yielding mutable references
pub struct RevSeqIterMut<'a, T> {
    fwd: SeqIterMut<'a, T>,
}

impl<'a, T> RevSeqIterMut<'a, T> {
    /// Create a reverse cursor yielding the element before `fwd`
    pub fn new(fwd: SeqIterMut<'a, T>) -> Self {
        Self { fwd }
    }

    /// Get the forward cursor, which points one past the element this cursor yielded
    pub fn into_forward(self) -> SeqIterMut<'a, T> {
        self.fwd
    }

    /// Get the element the cursor points at, or `None` when it points outside of the buffer
    pub fn get(&self) -> Option<&T> {
        checked_slot(self.fwd.base, self.fwd.len, self.fwd.offset - 1).map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Get the element the cursor points at mutably, or `None` when it points outside of the buffer
    pub fn get_mut(&mut self) -> Option<&mut T> {
        checked_slot(self.fwd.base, self.fwd.len, self.fwd.offset - 1).map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Move the cursor to the next element, towards the start of the buffer
    pub fn inc(&mut self) -> &mut Self {
        self.fwd.dec();
        self
    }

    /// Move the cursor to the previous element, towards the end of the buffer
    pub fn dec(&mut self) -> &mut Self {
        self.fwd.inc();
        self
    }

    /// Get the offset of the element the cursor yields
    pub fn offset(&self) -> isize {
        self.fwd.offset - 1
    }

    /// Move the cursor to the next element, returning the offset of the element it yielded before
    pub fn post_inc(&mut self) -> isize {
        self.fwd.post_dec() - 1
    }

    /// Move the cursor to the previous element, returning the offset of the element it yielded before
    pub fn post_dec(&mut self) -> isize {
        self.fwd.post_inc() - 1
    }
}

impl<'a, T> From<RevSeqIterMut<'a, T>> for RevSeqIter<'a, T> {
    fn from(it: RevSeqIterMut<'a, T>) -> Self {
        RevSeqIter { fwd: it.fwd.into() }
    }
}

impl<T> Deref for RevSeqIterMut<'_, T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        unsafe { &*self.fwd.slot_or_panic(self.fwd.offset - 1).as_ptr() }
    }
}

impl<T> DerefMut for RevSeqIterMut<'_, T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.fwd.slot_or_panic(self.fwd.offset - 1).as_ptr() }
    }
}

impl<T> Index<isize> for RevSeqIterMut<'_, T> {
    type Output = T;

    #[track_caller]
    fn index(&self, n: isize) -> &T {
        unsafe { &*self.fwd.slot_or_panic(self.fwd.offset - 1 - n).as_ptr() }
    }
}

impl<T> IndexMut<isize> for RevSeqIterMut<'_, T> {
    #[track_caller]
    fn index_mut(&mut self, n: isize) -> &mut T {
        unsafe { &mut *self.fwd.slot_or_panic(self.fwd.offset - 1 - n).as_ptr() }
    }
}

impl<'a, 'b, T> Sub<&RevSeqIterMut<'b, T>> for &RevSeqIterMut<'a, T> {
    type Output = isize;

    fn sub(self, rhs: &RevSeqIterMut<'b, T>) -> isize {
        rhs.fwd.offset - self.fwd.offset
    }
}

impl<T> fmt::Debug for RevSeqIterMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RevSeqIterMut").field(&self.fwd).finish()
    }
}

//------------------------------------------------------------------------------------------------------------------------------

macro_rules! impl_seq_arith {
    ($ty:ident) => {
        impl<T> AddAssign<isize> for $ty<'_, T> {
            fn add_assign(&mut self, n: isize) {
                self.offset += n;
            }
        }

        impl<T> SubAssign<isize> for $ty<'_, T> {
            fn sub_assign(&mut self, n: isize) {
                self.offset -= n;
            }
        }

        impl<T> Add<isize> for $ty<'_, T> {
            type Output = Self;

            fn add(mut self, n: isize) -> Self {
                self += n;
                self
            }
        }

        impl<T> Sub<isize> for $ty<'_, T> {
            type Output = Self;

            fn sub(mut self, n: isize) -> Self {
                self -= n;
                self
            }
        }
    };
}

impl_seq_arith!(SeqIter);
impl_seq_arith!(SeqIterMut);

macro_rules! impl_rev_seq_arith {
    ($ty:ident) => {
        impl<T> AddAssign<isize> for $ty<'_, T> {
            fn add_assign(&mut self, n: isize) {
                self.fwd -= n;
            }
        }

        impl<T> SubAssign<isize> for $ty<'_, T> {
            fn sub_assign(&mut self, n: isize) {
                self.fwd += n;
            }
        }

        impl<T> Add<isize> for $ty<'_, T> {
            type Output = Self;

            fn add(mut self, n: isize) -> Self {
                self += n;
                self
            }
        }

        impl<T> Sub<isize> for $ty<'_, T> {
            type Output = Self;

            fn sub(mut self, n: isize) -> Self {
                self -= n;
                self
            }
        }
    };
}

impl_rev_seq_arith!(RevSeqIter);
impl_rev_seq_arith!(RevSeqIterMut);

macro_rules! impl_offset_cmp {
    ($lhs:ident, $rhs:ident) => {
        impl<'a, 'b, T> PartialEq<$rhs<'b, T>> for $lhs<'a, T> {
            fn eq(&self, other: &$rhs<'b, T>) -> bool {
                self.offset == other.offset
            }
        }

        impl<'a, 'b, T> PartialOrd<$rhs<'b, T>> for $lhs<'a, T> {
            fn partial_cmp(&self, other: &$rhs<'b, T>) -> Option<Ordering> {
                self.offset.partial_cmp(&other.offset)
            }
        }
    };
}

impl_offset_cmp!(SeqIter, SeqIter);
impl_offset_cmp!(SeqIter, SeqIterMut);
impl_offset_cmp!(SeqIterMut, SeqIter);
impl_offset_cmp!(SeqIterMut, SeqIterMut);

// A reverse cursor further along has the lower forward offset
macro_rules! impl_rev_offset_cmp {
    ($lhs:ident, $rhs:ident) => {
        impl<'a, 'b, T> PartialEq<$rhs<'b, T>> for $lhs<'a, T> {
            fn eq(&self, other: &$rhs<'b, T>) -> bool {
                self.fwd.offset == other.fwd.offset
            }
        }

        impl<'a, 'b, T> PartialOrd<$rhs<'b, T>> for $lhs<'a, T> {
            fn partial_cmp(&self, other: &$rhs<'b, T>) -> Option<Ordering> {
                other.fwd.offset.partial_cmp(&self.fwd.offset)
            }
        }
    };
}

impl_rev_offset_cmp!(RevSeqIter, RevSeqIter);
impl_rev_offset_cmp!(RevSeqIter, RevSeqIterMut);
impl_rev_offset_cmp!(RevSeqIterMut, RevSeqIter);
impl_rev_offset_cmp!(RevSeqIterMut, RevSeqIterMut);

macro_rules! impl_total_order {
    ($ty:ident, |$a:ident, $b:ident| $cmp:expr) => {
        impl<T> Eq for $ty<'_, T> {}

        impl<T> Ord for $ty<'_, T> {
            fn cmp(&self, other: &Self) -> Ordering {
                let ($a, $b) = (self, other);
                $cmp
            }
        }
    };
}

impl_total_order!(SeqIter, |a, b| a.offset.cmp(&b.offset));
impl_total_order!(SeqIterMut, |a, b| a.offset.cmp(&b.offset));
impl_total_order!(RevSeqIter, |a, b| b.fwd.offset.cmp(&a.fwd.offset));
impl_total_order!(RevSeqIterMut, |a, b| b.fwd.offset.cmp(&a.fwd.offset));

//------------------------------------------------------------------------------------------------------------------------------

/// Iterator over the elements between two [`SeqIter`]s, created by [`SeqIter::until`]
///
/// # Panics
///
/// Iterating panics when the range reaches outside of the buffer.
pub struct SeqRange<'a, T> {
    front: SeqIter<'a, T>,
    back:  SeqIter<'a, T>,
}

impl<T> Clone for SeqRange<'_, T> {
    fn clone(&self) -> Self {
        Self { front: self.front, back: self.back }
    }
}

impl<'a, T> Iterator for SeqRange<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        let it = self.front.post_inc();
        Some(it.element_or_panic(it.offset))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.back - self.front).max(0) as usize;
        (len, Some(len))
    }
}

impl<'a, T> DoubleEndedIterator for SeqRange<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front >= self.back {
            return None;
        }
        self.back.dec();
        Some(self.back.element_or_panic(self.back.offset))
    }
}

impl<T> ExactSizeIterator for SeqRange<'_, T> {}
impl<T> FusedIterator for SeqRange<'_, T> {}

impl<T> fmt::Debug for SeqRange<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqRange").field("front", &self.front).field("back", &self.back).finish()
    }
}

//------------------------------------------------------------------------------------------------------------------------------
