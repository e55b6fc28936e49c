use std::{
    cell::{Cell, RefCell},
    collections::hash_map::DefaultHasher,
    panic::{catch_unwind, AssertUnwindSafe},
    ptr::NonNull,
    rc::Rc,
};

use super::*;
use crate::{
    alloc::{Propagation, SharedAlloc, primitives::SlotAllocator},
    dynarr,
    error::AllocError,
};

#[derive(Clone)]
struct DropCounter {
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    fn new(drops: &Rc<Cell<usize>>) -> Self {
        Self { drops: drops.clone() }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[derive(Default, Debug)]
struct AllocStats {
    allocs:     usize,
    deallocs:   usize,
    constructs: usize,
    destroys:   usize,
}

/// Mallocator that records every call made to it
#[derive(Clone, Default)]
struct CountingAlloc {
    stats: Rc<RefCell<AllocStats>>,
}

unsafe impl<T> Allocator<T> for CountingAlloc {
    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError> {
        let ptr = Allocator::<T>::allocate(&mut Mallocator, count)?;
        self.stats.borrow_mut().allocs += 1;
        Ok(ptr)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        self.stats.borrow_mut().deallocs += 1;
        Allocator::<T>::deallocate(&mut Mallocator, ptr, count)
    }

    fn owns(&self, _ptr: NonNull<T>) -> bool {
        true
    }

    unsafe fn construct(&mut self, ptr: NonNull<T>, value: T) {
        self.stats.borrow_mut().constructs += 1;
        ptr.as_ptr().write(value);
    }

    unsafe fn destroy(&mut self, ptr: NonNull<T>) {
        self.stats.borrow_mut().destroys += 1;
        ptr::drop_in_place(ptr.as_ptr());
    }
}

/// Iterator claiming `len` elements, which panics after yielding `before_panic` of them
struct PanickingIter {
    len:          usize,
    before_panic: usize,
    next:         i32,
}

impl Iterator for PanickingIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.before_panic == 0 {
            panic!("iterator gave up");
        }
        self.before_panic -= 1;
        self.len -= 1;
        self.next += 1;
        Some(self.next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl ExactSizeIterator for PanickingIter {}

/// Iterator claiming `claimed` elements, which runs out after the ones in `items`
struct ShortIter {
    claimed: usize,
    items:   std::vec::IntoIter<i32>,
}

impl ShortIter {
    fn new<const N: usize>(claimed: usize, items: [i32; N]) -> Self {
        Self { claimed, items: Vec::from(items).into_iter() }
    }
}

impl Iterator for ShortIter {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let next = self.items.next()?;
        self.claimed = self.claimed.saturating_sub(1);
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.claimed, Some(self.claimed))
    }
}

impl ExactSizeIterator for ShortIter {}

/// Mallocator with a pool identity, declaring shared propagation when `SHARED` is set
///
/// `select_on_copy` always hands out a new pool.
#[derive(Clone)]
struct PolicyAlloc<const SHARED: bool> {
    pool: Rc<()>,
}

impl<const SHARED: bool> PolicyAlloc<SHARED> {
    fn new() -> Self {
        Self { pool: Rc::new(()) }
    }

    fn same_pool(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pool, &other.pool)
    }
}

unsafe impl<T, const SHARED: bool> Allocator<T> for PolicyAlloc<SHARED> {
    const PROPAGATION : Propagation = if SHARED { Propagation::Shared } else { Propagation::Duplicate };

    fn allocate(&mut self, count: usize) -> Result<NonNull<T>, AllocError> {
        Allocator::<T>::allocate(&mut Mallocator, count)
    }

    unsafe fn deallocate(&mut self, ptr: NonNull<T>, count: usize) {
        Allocator::<T>::deallocate(&mut Mallocator, ptr, count)
    }

    fn owns(&self, _ptr: NonNull<T>) -> bool {
        true
    }

    fn select_on_copy(&self) -> Self {
        Self::new()
    }
}

fn hash_of<T: Hash>(val: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    val.hash(&mut hasher);
    hasher.finish()
}

//--------------------------------------------------------------

#[test]
fn dynarr_new() {
    let arr = DynArray::<i32>::new();
    assert_eq!(arr.len(), 0);
    assert_eq!(arr.capacity(), 0);
    assert!(arr.is_empty());
    assert!(arr.data().is_none());
    assert_eq!(arr.begin(), arr.end());

    let arr = DynArray::<i32>::with_capacity(21);
    assert_eq!(arr.capacity(), 21);
    assert_eq!(arr.len(), 0);
}

#[test]
fn dynarr_constructors() {
    let arr = DynArray::<i32>::with_len(3);
    assert_eq!(arr, [0, 0, 0]);
    assert_eq!(arr.capacity(), 3);

    let arr = DynArray::from_elem(4, &7);
    assert_eq!(arr, [7, 7, 7, 7]);
    assert_eq!(arr.capacity(), 4);

    let arr = DynArray::from_slice(&[1, 2, 3]);
    assert_eq!(arr, [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);

    let arr = DynArray::from_iter_exact((0..5).map(|x| x * 2));
    assert_eq!(arr, [0, 2, 4, 6, 8]);

    let arr : DynArray<_> = [5, 6].into();
    assert_eq!(arr, [5, 6]);

    let empty = DynArray::<String>::from_elem(0, &String::from("unused"));
    assert_eq!(empty.capacity(), 0);
}

#[test]
fn dynarr_from_seq_range() {
    let src = dynarr![1, 2, 3, 4, 5];
    let arr = DynArray::from_seq_range(src.begin() + 1, src.end() - 1);
    assert_eq!(arr, [2, 3, 4]);
    assert_eq!(arr.capacity(), 3);

    let empty = DynArray::from_seq_range(src.begin(), src.begin());
    assert!(empty.is_empty());
}

#[test]
#[should_panic(expected = "reversed")]
fn dynarr_from_reversed_seq_range() {
    let src = dynarr![1, 2, 3];
    let _ = DynArray::from_seq_range(src.end(), src.begin());
}

#[test]
fn dynarr_macro() {
    let arr = dynarr![1, 2, 3];
    assert_eq!(arr.capacity(), 3);
    assert_eq!(arr, [1, 2, 3]);

    let arr = dynarr!["hello"; 2];
    assert_eq!(arr, ["hello", "hello"]);

    let arr : DynArray<u8> = dynarr![];
    assert!(arr.is_empty());
}

#[test]
fn dynarr_growth() {
    let mut arr = DynArray::<i32>::new();
    let mut caps = Vec::new();
    for i in 0..7 {
        arr.push_back(i);
        caps.push(arr.capacity());
    }
    assert_eq!(caps, [1, 3, 3, 6, 6, 6, 10]);
    assert_eq!(arr, [0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn dynarr_grown_capacity() {
    assert_eq!(DynArray::<u8>::grown_capacity(1), 1);
    assert_eq!(DynArray::<u8>::grown_capacity(2), 3);
    assert_eq!(DynArray::<u8>::grown_capacity(3), 4);
    assert_eq!(DynArray::<u8>::grown_capacity(7), 10);
    assert_eq!(DynArray::<u8>::grown_capacity(usize::MAX), usize::MAX);
}

#[test]
fn dynarr_reserve() {
    let mut arr = DynArray::<i32>::new();
    arr.reserve(10);
    assert_eq!(arr.capacity(), 10);
    assert!(arr.is_empty());

    arr.push_back(1);
    arr.reserve(5);
    assert_eq!(arr.capacity(), 10);

    let max = arr.max_size();
    assert_eq!(max, usize::MAX / 4);
    assert_eq!(arr.try_reserve(max + 1), Err(DynArrayError::LengthExceeded { requested: max + 1, max }));
    assert_eq!(arr.capacity(), 10);
    assert_eq!(arr, [1]);
}

#[test]
#[should_panic(expected = "length exceeded")]
fn dynarr_reserve_too_much() {
    let mut arr = DynArray::<u64>::new();
    arr.reserve(usize::MAX);
}

#[test]
fn dynarr_shrink() {
    let mut arr = dynarr![1, 2, 3, 4, 5];
    arr.reserve(20);
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 5);
    assert_eq!(arr, [1, 2, 3, 4, 5]);

    arr.clear();
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 0);
    assert!(arr.data().is_none());
}

#[test]
fn dynarr_access() {
    let mut arr = dynarr![1, 2, 3];
    assert_eq!(arr.at(1), Ok(&2));
    assert_eq!(arr.at(3), Err(DynArrayError::OutOfRange { index: 3, len: 3 }));
    *arr.at_mut(0).unwrap() = 10;
    arr[2] = 30;
    assert_eq!(arr[0], 10);
    assert_eq!(arr.front(), Some(&10));
    assert_eq!(arr.back(), Some(&30));
    *arr.back_mut().unwrap() += 1;
    assert_eq!(arr, [10, 2, 31]);
    assert_eq!(arr.data().map(|ptr| ptr.as_ptr() as *const i32), Some(arr.as_ptr()));

    *arr.front_mut().unwrap() -= 5;
    let data = arr.data_mut().unwrap();
    unsafe { *data.as_ptr().add(1) = 20 };
    assert_eq!(arr, [5, 20, 31]);

    let mut empty = DynArray::<i32>::new();
    assert_eq!(empty.front(), None);
    assert_eq!(empty.back(), None);
    assert_eq!(empty.front_mut(), None);
    assert!(empty.data_mut().is_none());
}

#[test]
#[should_panic(expected = "index out of range: the len is 3 but the index is 3")]
fn dynarr_index_out_of_range() {
    let arr = dynarr![1, 2, 3];
    let _ = arr[3];
}

#[test]
fn dynarr_insert() {
    let mut arr = dynarr![1, 2, 3];
    let it = arr.insert(1, 42);
    assert_eq!(*it, 42);
    assert_eq!(it.offset(), 1);
    assert_eq!(arr, [1, 42, 2, 3]);
    assert_eq!(arr.capacity(), 6);

    arr.insert(4, 84);
    assert_eq!(arr, [1, 42, 2, 3, 84]);

    arr.insert(0, 0);
    assert_eq!(arr, [0, 1, 42, 2, 3, 84]);

    assert_eq!(arr.try_insert(7, 5).unwrap_err(), DynArrayError::OutOfRange { index: 7, len: 6 });
    assert_eq!(arr.len(), 6);
}

#[test]
fn dynarr_insert_many() {
    let mut arr = dynarr![1, 5];
    arr.insert_fill(1, 2, &9);
    assert_eq!(arr, [1, 9, 9, 5]);

    let it = arr.insert_iter(3, [6, 7]);
    assert_eq!(*it, 6);
    assert_eq!(arr, [1, 9, 9, 6, 7, 5]);

    arr.insert_slice(6, &[10, 11]);
    assert_eq!(arr, [1, 9, 9, 6, 7, 5, 10, 11]);

    let it = arr.insert_fill(2, 0, &100);
    assert_eq!(*it, 9);
    assert_eq!(arr.len(), 8);

    let it = arr.emplace(0, || -1);
    assert_eq!(*it, -1);
    assert_eq!(arr, [-1, 1, 9, 9, 6, 7, 5, 10, 11]);
}

#[test]
fn dynarr_insert_into_empty() {
    let mut arr = DynArray::<String>::new();
    arr.insert(0, "a".to_string());
    assert_eq!(arr, ["a"]);
    assert_eq!(arr.capacity(), 1);
}

#[test]
fn dynarr_insert_panic_closes_gap() {
    let mut arr = dynarr![1, 2, 3];
    let res = catch_unwind(AssertUnwindSafe(|| {
        arr.insert_iter(1, PanickingIter { len: 3, before_panic: 1, next: 9 });
    }));
    assert!(res.is_err());
    assert_eq!(arr, [1, 10, 2, 3]);
}

#[test]
fn dynarr_erase() {
    let mut arr = dynarr![1, 2, 3, 4, 5, 6];
    let it = arr.erase(2);
    assert_eq!(*it, 4);
    assert_eq!(arr, [1, 2, 4, 5, 6]);

    let it = arr.erase_range(1, 3);
    assert_eq!(*it, 5);
    assert_eq!(arr, [1, 5, 6]);

    let it = arr.erase(2);
    assert_eq!(it.offset(), 2);
    assert!(it.get().is_none());
    assert_eq!(arr, [1, 5]);

    let it = arr.erase_range(1, 1);
    assert_eq!(*it, 5);
    assert_eq!(arr.capacity(), 6);
}

#[test]
fn dynarr_erase_empty() {
    let mut arr = DynArray::<i32>::new();
    let it = arr.erase(5);
    assert_eq!(it.offset(), 0);
    let it = arr.erase_range(3, 1);
    assert_eq!(it.offset(), 0);
    assert!(arr.is_empty());
}

#[test]
#[should_panic(expected = "erase index")]
fn dynarr_erase_past_end() {
    let mut arr = dynarr![1, 2];
    arr.erase(2);
}

#[test]
fn dynarr_push_pop() {
    let mut arr = DynArray::new();
    arr.push_back(String::from("a"));
    arr.emplace_back(|| String::from("b")).push('c');
    assert_eq!(arr, ["a", "bc"]);

    assert_eq!(arr.pop_back().as_deref(), Some("bc"));
    assert_eq!(arr.pop_back().as_deref(), Some("a"));
    assert_eq!(arr.pop_back(), None);
    assert_eq!(arr.capacity(), 3);
}

#[test]
fn dynarr_resize() {
    let mut arr = dynarr![1, 2, 3];
    arr.resize(5);
    assert_eq!(arr, [1, 2, 3, 0, 0]);
    assert_eq!(arr.capacity(), 5);

    arr.resize_with_value(7, &9);
    assert_eq!(arr, [1, 2, 3, 0, 0, 9, 9]);
    assert_eq!(arr.capacity(), 7);

    arr.resize(2);
    assert_eq!(arr, [1, 2]);
    assert_eq!(arr.capacity(), 7);

    arr.resize_with_value(4, &5);
    assert_eq!(arr, [1, 2, 5, 5]);
    assert_eq!(arr.capacity(), 7);
}

#[test]
fn dynarr_swap() {
    let mut a = dynarr![1, 2, 3];
    let mut b = DynArray::with_capacity(10);
    b.push_back(4);

    a.swap(&mut b);
    assert_eq!(a, [4]);
    assert_eq!(a.capacity(), 10);
    assert_eq!(b, [1, 2, 3]);
    assert_eq!(b.capacity(), 3);
}

#[test]
fn dynarr_clone() {
    let mut src = dynarr![String::from("a"), String::from("b")];
    src.reserve(10);

    let copy = src.clone();
    assert_eq!(copy, src);
    assert_eq!(copy.capacity(), 10);
    assert_ne!(copy.as_ptr(), src.as_ptr());

    src[0].push('!');
    assert_eq!(copy[0], "a");

    let mut dst = dynarr![String::from("x")];
    dst.clone_from(&src);
    assert_eq!(dst, ["a!", "b"]);
    assert_eq!(dst.capacity(), 10);

    let mut dst = DynArray::<String>::new();
    dst.assign_clone(&DynArray::new());
    assert!(dst.is_empty());
    assert_eq!(dst.capacity(), 0);
}

#[test]
fn dynarr_take() {
    let mut src = dynarr![1, 2, 3];
    let ptr = src.as_ptr();

    let dst = DynArray::take(&mut src);
    assert_eq!(dst, [1, 2, 3]);
    assert_eq!(dst.as_ptr(), ptr);
    assert!(src.is_empty());
    assert_eq!(src.capacity(), 0);

    let mut other = dynarr![4];
    other.take_from(&mut DynArray::take(&mut dynarr![5, 6]));
    assert_eq!(other, [5, 6]);
}

#[test]
fn dynarr_assign() {
    let mut arr = dynarr![1, 2, 3, 4, 5];
    arr.assign_list(&[7, 8]);
    assert_eq!(arr, [7, 8]);
    assert_eq!(arr.capacity(), 2);

    let mut arr = DynArray::new();
    arr.assign_fill(4, &1);
    assert_eq!(arr, [1, 1, 1, 1]);
    assert_eq!(arr.capacity(), 6);

    arr.assign_fill(2, &3);
    assert_eq!(arr, [3, 3]);
    assert_eq!(arr.capacity(), 6);

    arr.assign_iter([9, 8, 7]);
    assert_eq!(arr, [9, 8, 7]);
    assert_eq!(arr.capacity(), 6);
}

#[test]
fn dynarr_compare() {
    assert!(dynarr![1, 2, 3] < dynarr![1, 2, 4]);
    assert!(dynarr![1, 2] < dynarr![1, 2, 3]);
    assert!(dynarr![1, 2, 3] > dynarr![1, 2]);
    // Ordered by the first differing element, not by every element pair
    assert!(!(dynarr![2, 1] < dynarr![1, 5]));
    assert!(dynarr![2, 1] > dynarr![1, 5]);
    assert!(DynArray::<i32>::new() < dynarr![0]);

    assert_eq!(dynarr![1, 2], dynarr![1, 2]);
    assert_ne!(dynarr![1, 2], dynarr![1, 2, 3]);
    assert_eq!(dynarr![1, 2].cmp(&dynarr![1, 2]), core::cmp::Ordering::Equal);
    assert_eq!(hash_of(&dynarr![1, 2]), hash_of(&DynArray::from_slice(&[1, 2])));
}

#[test]
fn dynarr_cursors() {
    let mut arr = dynarr![1, 2, 3, 4];
    assert_eq!(arr.end() - arr.begin(), 4);
    assert_eq!(*arr.cbegin(), 1);
    assert_eq!(arr.cend().offset(), 4);
    assert_eq!(*arr.rbegin(), 4);
    assert_eq!(arr.crend() - arr.crbegin(), 4);
    assert_eq!(arr.rbegin().forward(), arr.end());

    let sum : i32 = arr.begin().until(arr.end()).sum();
    assert_eq!(sum, 10);

    let mut it = arr.begin_mut();
    *it = 10;
    it += 2;
    it[1] = 40;
    let mut rev = arr.rbegin_mut();
    rev.inc();
    *rev = 30;
    assert_eq!(arr, [10, 2, 30, 40]);

    let rend = arr.rend_mut();
    assert!(rend.get().is_none());
    assert_eq!(arr.end_mut().offset(), 4);
}

#[test]
fn dynarr_into_iter() {
    let arr = dynarr![1, 2, 3, 4];
    let mut iter = arr.into_iter();
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.next_back(), Some(4));
    assert_eq!(iter.as_slice(), [2, 3]);
    assert_eq!(iter.collect::<Vec<_>>(), [2, 3]);

    let mut arr = dynarr![1, 2, 3];
    for val in &mut arr {
        *val *= 2;
    }
    let doubled : Vec<_> = (&arr).into_iter().copied().collect();
    assert_eq!(doubled, [2, 4, 6]);
}

#[test]
fn dynarr_extend_collect() {
    let mut arr : DynArray<i32> = (1..=3).collect();
    arr.extend([4, 5]);
    arr.extend(&[6]);
    assert_eq!(arr, [1, 2, 3, 4, 5, 6]);
    assert_eq!(format!("{arr:?}"), "[1, 2, 3, 4, 5, 6]");
}

#[test]
fn dynarr_drops_every_element_once() {
    let drops = Rc::new(Cell::new(0));

    let mut arr = DynArray::new();
    for _ in 0..10 {
        arr.push_back(DropCounter::new(&drops));
    }
    assert_eq!(drops.get(), 0);

    arr.erase(3);
    assert_eq!(drops.get(), 1);
    arr.erase_range(0, 2);
    assert_eq!(drops.get(), 3);
    arr.truncate(5);
    assert_eq!(drops.get(), 5);
    arr.insert_fill(1, 2, &DropCounter::new(&drops));
    // The temporary passed to `insert_fill`
    assert_eq!(drops.get(), 6);
    arr.resize_with_value(3, &DropCounter::new(&drops));
    assert_eq!(drops.get(), 11);

    let copy = arr.clone();
    drop(arr);
    assert_eq!(drops.get(), 14);

    let mut iter = copy.into_iter();
    drop(iter.next());
    assert_eq!(drops.get(), 15);
    drop(iter);
    assert_eq!(drops.get(), 17);
}

#[test]
fn dynarr_uses_allocator_for_everything() {
    let alloc = CountingAlloc::default();
    {
        let mut arr = DynArray::new_in(alloc.clone());
        for i in 0..10 {
            arr.push_back(i.to_string());
        }
        arr.insert(3, "three".to_string());
        arr.erase_range(0, 2);
        arr.shrink_to_fit();
        arr.clear();
    }

    let stats = alloc.stats.borrow();
    assert_eq!(stats.allocs, stats.deallocs);
    assert_eq!(stats.constructs, 11);
    assert_eq!(stats.destroys, 11);
}

#[test]
fn dynarr_over_slot_allocator() {
    let mut arr = DynArray::new_in(SlotAllocator::<u32>::with_slot_count(4));
    arr.push_back(1);
    assert_eq!(arr.capacity(), 1);
    assert_eq!(arr.allocator().used_slots(), 1);

    // Growing needs a buffer of more than a single slot
    assert_eq!(arr.try_push_back(2), Err(DynArrayError::Alloc(AllocError::UnsupportedCount { count: 3 })));
    assert_eq!(arr, [1]);

    arr.clear();
    arr.shrink_to_fit();
    assert_eq!(arr.allocator().used_slots(), 0);
}

#[test]
fn dynarr_shared_allocator_clone() {
    let pool = SharedAlloc::new(SlotAllocator::<u32>::with_slot_count(4));
    let mut arr = DynArray::new_in(pool.clone());
    arr.push_back(7);

    let copy = arr.clone();
    assert_eq!(copy, [7]);
    assert!(copy.allocator().same_pool(&pool));
    assert_eq!(pool.with(|slots| slots.used_slots()), 2);

    drop(arr);
    drop(copy);
    assert_eq!(pool.with(|slots| slots.used_slots()), 0);
}

#[test]
fn dynarr_zero_sized() {
    let mut arr = DynArray::<()>::new();
    for _ in 0..5 {
        arr.push_back(());
    }
    assert_eq!(arr.len(), 5);
    assert_eq!(arr.max_size(), usize::MAX);
    arr.erase(1);
    assert_eq!(arr.len(), 4);
    assert_eq!(arr.into_iter().count(), 4);
}

#[test]
fn dynarr_growth_past_max_size() {
    let mut arr = dynarr![1u64, 2, 3];
    let max = arr.max_size();

    // `len + count` overflows
    assert_eq!(arr.try_insert_fill(0, usize::MAX, &7).unwrap_err(), DynArrayError::LengthExceeded { requested: usize::MAX, max });
    // The grown capacity saturates
    assert_eq!(arr.try_insert_fill(1, usize::MAX - 3, &7).unwrap_err(), DynArrayError::LengthExceeded { requested: usize::MAX, max });
    // The grown capacity fits in a usize, but not below `max_size()`
    let requested = DynArray::<u64>::grown_capacity(max + 3);
    assert_eq!(arr.try_insert_fill(3, max, &7).unwrap_err(), DynArrayError::LengthExceeded { requested, max });

    assert_eq!(arr, [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);
}

#[test]
fn dynarr_push_at_max_len() {
    let mut arr = DynArray::<()>::with_capacity(usize::MAX);
    // Zero-sized elements need no storage, so the length can be set directly
    arr.len = usize::MAX;
    let res = arr.try_push_back(());
    let len = arr.len();
    arr.len = 0;

    assert_eq!(res, Err(DynArrayError::LengthExceeded { requested: usize::MAX, max: usize::MAX }));
    assert_eq!(len, usize::MAX);
    assert_eq!(arr.capacity(), usize::MAX);
}

#[test]
fn dynarr_short_iterator() {
    let mut arr = dynarr![1, 2, 3];
    let it = arr.insert_iter(1, ShortIter::new(3, [77]));
    assert_eq!(*it, 77);
    assert_eq!(arr, [1, 77, 2, 3]);
    assert_eq!(arr.capacity(), 9);

    arr.insert_iter(4, ShortIter::new(2, []));
    assert_eq!(arr, [1, 77, 2, 3]);

    let arr = DynArray::from_iter_exact(ShortIter::new(5, [1, 2]));
    assert_eq!(arr, [1, 2]);
    assert_eq!(arr.capacity(), 5);

    let mut arr = dynarr![4, 5];
    arr.assign_iter(ShortIter::new(4, [6]));
    assert_eq!(arr, [6]);
}

#[test]
fn dynarr_clone_follows_propagation() {
    assert_eq!(<PolicyAlloc<true> as Allocator<i32>>::PROPAGATION, Propagation::Shared);
    assert_eq!(<PolicyAlloc<false> as Allocator<i32>>::PROPAGATION, Propagation::Duplicate);

    let shared = DynArray::from_slice_in(&[1, 2, 3], PolicyAlloc::<true>::new());
    let copy = shared.clone();
    assert_eq!(copy, [1, 2, 3]);
    assert!(copy.allocator().same_pool(shared.allocator()));

    let duplicated = DynArray::from_slice_in(&[1, 2, 3], PolicyAlloc::<false>::new());
    let copy = duplicated.clone();
    assert_eq!(copy, [1, 2, 3]);
    assert!(!copy.allocator().same_pool(duplicated.allocator()));

    let mut dst = DynArray::<i32, _>::new_in(PolicyAlloc::<true>::new());
    dst.assign_clone(&shared);
    assert!(dst.allocator().same_pool(shared.allocator()));

    let mut dst = DynArray::<i32, _>::new_in(PolicyAlloc::<false>::new());
    let pool = dst.allocator().clone();
    dst.assign_list(&[4, 5]);
    assert_eq!(dst, [4, 5]);
    assert!(!dst.allocator().same_pool(&pool));
}
