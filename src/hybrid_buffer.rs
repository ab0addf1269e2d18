use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator, mem, ops::RangeBounds, ptr};

use crate::error::{AllocError, OutOfRange, infallible};
use crate::growth::target_capacity;
use crate::inline_store::{self, InlineStore};
use crate::utils::{split_range_bound, trace_transition};

/// The active representation of a [`HybridBuffer`].
///
/// Exactly one store is alive at a time, so the representation never has to
/// be inferred from the capacity.
enum Store<T, const N: usize> {
    Inline(InlineStore<T, N>),
    Heap {
        buf: Vec<T>,
        /// Logical capacity, `buf` always has room for at least this many elements.
        capacity: usize,
    },
}

/// A sequence stored inline while it holds at most `N` elements, and in an
/// exclusively owned heap buffer once it grows past `N`.
///
/// The heap buffer is sized by [`target_capacity`]: `N` while the data fits
/// inline, `floor(1.5 * required)` otherwise. Erasing back down to `N`
/// elements or fewer moves the survivors inline again and releases the heap
/// buffer, so [`capacity`](HybridBuffer::capacity) returns to `N`.
///
/// Positions are plain indices. Operations that insert or erase return the
/// index of the first affected element, which stays meaningful across a
/// switch between the two stores.
///
/// # Example
///
/// ```
/// use hybridvec::HybridBuffer;
///
/// let mut buf: HybridBuffer<u32> = HybridBuffer::new();
/// assert_eq!(buf.capacity(), 16);
///
/// for i in 0..17 {
///     buf.push(i);
/// }
/// assert!(!buf.is_inline());
/// assert_eq!(buf.capacity(), 25);
///
/// buf.erase_range(10..);
/// assert!(buf.is_inline());
/// assert_eq!(buf.capacity(), 16);
/// assert_eq!(buf, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
/// ```
pub struct HybridBuffer<T, const N: usize = { crate::DEFAULT_INLINE_CAPACITY }>(Store<T, N>);

/// Creates a [`HybridBuffer`] containing the arguments.
///
/// The syntax is similar to [`vec!`](https://doc.rust-lang.org/std/macro.vec.html).
/// If there are more than `N` elements the heap store is used from the start.
///
/// # Examples
///
/// ```
/// # use hybridvec::{hybridvec, HybridBuffer};
/// let buf: HybridBuffer<String, 10> = hybridvec![];
/// let buf: HybridBuffer<i64, 10> = hybridvec![1; 5]; // Need to support Clone.
/// let buf: HybridBuffer<_, 10> = hybridvec![1, 2, 3, 4];
/// ```
#[macro_export]
macro_rules! hybridvec {
    [] => { $crate::HybridBuffer::new() };
    [$elem:expr; $n:expr] => { $crate::HybridBuffer::from_elem($elem, $n) };
    [$($item:expr),+ $(,)?] => { $crate::HybridBuffer::from_buf([ $($item),+ ]) };
}

/// Acquires an empty heap store with room for exactly `capacity` elements.
fn allocate<T>(capacity: usize) -> Result<Vec<T>, AllocError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity)
        .map_err(|_| AllocError::for_capacity::<T>(capacity))?;
    Ok(buf)
}

/// Moves `len` elements from `src` into the empty `dst` with `element`
/// written between `src[..split]` and `src[split..]`.
///
/// # Safety
/// - `src` points to `len` initialized elements whose ownership passes to `dst`.
/// - `split <= len` and `dst` is empty with room for `len + 1` elements.
unsafe fn move_split<T>(src: *const T, len: usize, split: usize, element: T, dst: &mut Vec<T>) {
    debug_assert!(split <= len && dst.is_empty() && dst.capacity() > len);
    unsafe {
        let out = dst.as_mut_ptr();
        ptr::copy_nonoverlapping(src, out, split);
        ptr::write(out.add(split), element);
        ptr::copy_nonoverlapping(src.add(split), out.add(split + 1), len - split);
        dst.set_len(len + 1);
    }
}

impl<T, const N: usize> HybridBuffer<T, N> {
    /// Constructs a new, empty `HybridBuffer` using the inline store.
    ///
    /// Nothing is allocated. The inline array is part of the value itself, so
    /// `N` should not be too large to avoid stack overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::HybridBuffer;
    /// let buf: HybridBuffer<i32, 8> = HybridBuffer::new();
    /// assert!(buf.is_empty());
    /// assert_eq!(buf.capacity(), 8);
    /// ```
    #[inline]
    pub const fn new() -> Self {
        Self(Store::Inline(InlineStore::new()))
    }

    /// Constructs an empty buffer able to hold `capacity` elements.
    ///
    /// A capacity of `N` or less is equivalent to [`new`](HybridBuffer::new).
    /// Anything larger allocates a heap store of exactly `capacity` elements.
    ///
    /// # Panics
    /// Panics on capacity overflow, aborts if the allocator fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::HybridBuffer;
    /// let buf: HybridBuffer<i32, 5> = HybridBuffer::with_capacity(4);
    /// assert!(buf.is_inline());
    ///
    /// let buf: HybridBuffer<i32, 5> = HybridBuffer::with_capacity(10);
    /// assert!(!buf.is_inline());
    /// assert_eq!(buf.capacity(), 10);
    /// ```
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::try_with_capacity(capacity))
    }

    /// Fallible version of [`with_capacity`](HybridBuffer::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        if capacity > N {
            Ok(Self(Store::Heap {
                buf: allocate(capacity)?,
                capacity,
            }))
        } else {
            Ok(Self::new())
        }
    }

    /// An empty buffer in the store a sequence of `len` elements ends up in.
    fn for_len(len: usize) -> Self {
        let capacity = target_capacity(N, 0, len).ok_or(AllocError::CapacityOverflow);
        infallible(capacity.and_then(Self::try_with_capacity))
    }

    /// Creates a `HybridBuffer` from an array.
    ///
    /// If `P > N` the heap store is used.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridBuffer;
    /// let buf: HybridBuffer<i32, 5> = HybridBuffer::from_buf([1, 2, 3]);
    /// assert_eq!(buf.len(), 3);
    /// assert!(buf.is_inline());
    /// ```
    pub fn from_buf<const P: usize>(arr: [T; P]) -> Self {
        let mut buf = Self::for_len(P);
        for item in arr {
            // SAFETY: `for_len(P)` leaves room for `P` elements.
            unsafe { buf.push_unchecked(item) };
        }
        buf
    }

    /// Returns `true` while the elements live in the inline store.
    ///
    /// # Example
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<i32, 2> = hybridvec![1, 2];
    /// assert!(buf.is_inline());
    ///
    /// buf.push(3);
    /// assert!(!buf.is_inline());
    /// ```
    #[inline(always)]
    pub const fn is_inline(&self) -> bool {
        match &self.0 {
            Store::Inline(_) => true,
            Store::Heap { .. } => false,
        }
    }

    /// Returns the number of elements in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.0 {
            Store::Inline(store) => store.len(),
            Store::Heap { buf, .. } => buf.len(),
        }
    }

    /// Returns `true` if the buffer contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many elements the active store can hold without moving.
    ///
    /// This is exactly `N` for the inline store and always greater than `N`
    /// for the heap store.
    #[inline]
    pub const fn capacity(&self) -> usize {
        match &self.0 {
            Store::Inline(_) => N,
            Store::Heap { capacity, .. } => *capacity,
        }
    }

    /// Returns a raw pointer to the active store.
    ///
    /// The pointer is invalidated by any operation that moves the data
    /// between stores.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        match &self.0 {
            Store::Inline(store) => store.as_ptr(),
            Store::Heap { buf, .. } => buf.as_ptr(),
        }
    }

    /// Returns a raw mutable pointer to the active store.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        match &mut self.0 {
            Store::Inline(store) => store.as_mut_ptr(),
            Store::Heap { buf, .. } => buf.as_mut_ptr(),
        }
    }

    /// Extracts a slice containing the entire buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.0 {
            Store::Inline(store) => store.as_slice(),
            Store::Heap { buf, .. } => buf.as_slice(),
        }
    }

    /// Extracts a mutable slice of the entire buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.0 {
            Store::Inline(store) => store.as_mut_slice(),
            Store::Heap { buf, .. } => buf.as_mut_slice(),
        }
    }

    /// Returns the element at `index`, or [`OutOfRange`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec, OutOfRange};
    /// let buf: HybridBuffer<_, 4> = hybridvec![10, 20, 30];
    /// assert_eq!(buf.at(1), Ok(&20));
    /// assert_eq!(buf.at(3), Err(OutOfRange { index: 3, len: 3 }));
    /// ```
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len();
        self.as_slice().get(index).ok_or(OutOfRange { index, len })
    }

    /// Mutable version of [`at`](HybridBuffer::at).
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec, OutOfRange};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec![10, 20];
    /// *buf.at_mut(0).unwrap() += 1;
    /// assert_eq!(buf, [11, 20]);
    /// assert_eq!(buf.at_mut(2), Err(OutOfRange { index: 2, len: 2 }));
    /// ```
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len();
        self.as_mut_slice().get_mut(index).ok_or(OutOfRange { index, len })
    }

    /// Returns the element at `index` without bounds checking.
    ///
    /// Indexing with `[]` goes through the slice and panics on a bad index,
    /// this is the unchecked path.
    ///
    /// # Safety
    /// `index < len`.
    #[inline(always)]
    pub unsafe fn at_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        unsafe { &*self.as_ptr().add(index) }
    }

    /// Mutable version of [`at_unchecked`](HybridBuffer::at_unchecked).
    ///
    /// # Safety
    /// `index < len`.
    #[inline(always)]
    pub unsafe fn at_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    /// Makes room for at least `additional` more elements.
    ///
    /// Nothing happens if the active store already has room. Otherwise the
    /// data moves to a heap store sized by [`target_capacity`].
    ///
    /// This never moves heap data back inline.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<i32, 8> = hybridvec![];
    /// buf.reserve(5);
    /// assert!(buf.is_inline());
    ///
    /// buf.reserve(10);
    /// assert!(!buf.is_inline());
    /// assert_eq!(buf.capacity(), 15);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.try_reserve(additional))
    }

    /// Fallible version of [`reserve`](HybridBuffer::reserve).
    ///
    /// On error the buffer is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        let len = self.len();
        let required = len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let capacity = target_capacity(N, len, additional).ok_or(AllocError::CapacityOverflow)?;
        self.try_grow(capacity)
    }

    /// Moves every element into a fresh heap store of `capacity` elements.
    ///
    /// The new store is fully populated before the old one is released.
    fn try_grow(&mut self, capacity: usize) -> Result<(), AllocError> {
        debug_assert!(capacity > N && capacity >= self.len());
        let mut buf = allocate(capacity)?;
        match &mut self.0 {
            Store::Inline(store) => {
                store.move_into(&mut buf);
                trace_transition!(len = buf.len(), capacity, "promoted inline store to heap");
            }
            Store::Heap { buf: old, .. } => {
                buf.append(old);
                trace_transition!(len = buf.len(), capacity, "moved to a larger heap store");
            }
        }
        self.0 = Store::Heap { buf, capacity };
        Ok(())
    }

    /// Releases the heap store once the elements fit inline again.
    fn demote_if_fits(&mut self) {
        match &mut self.0 {
            Store::Heap { buf, .. } if buf.len() <= N => {
                // SAFETY: `len <= N`.
                let store = unsafe { InlineStore::from_vec_unchecked(buf) };
                trace_transition!(len = store.len(), "demoted heap store to inline");
                self.0 = Store::Inline(store);
            }
            _ => {}
        }
    }

    /// # Safety
    /// `len < capacity`.
    #[inline(always)]
    unsafe fn push_unchecked(&mut self, value: T) {
        match &mut self.0 {
            Store::Inline(store) => unsafe { store.push_unchecked(value) },
            Store::Heap { buf, .. } => buf.push(value),
        }
    }

    /// Appends an element to the back of the buffer.
    ///
    /// Pushing the `N + 1`-th element moves the data to the heap.
    ///
    /// # Time complexity
    /// Amortized O(1).
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec![1, 2];
    /// buf.push(3);
    /// assert_eq!(buf, [1, 2, 3]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        infallible(self.try_push(value))
    }

    /// Fallible version of [`push`](HybridBuffer::push).
    ///
    /// On error `value` is dropped and the buffer is unchanged.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), AllocError> {
        self.try_reserve(1)?;
        // SAFETY: room for one more element was just reserved.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// Inserts `element` before position `index` and returns `index`.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec!['a', 'b', 'c'];
    ///
    /// buf.insert(1, 'd');
    /// assert_eq!(buf, ['a', 'd', 'b', 'c']);
    /// assert!(buf.is_inline());
    ///
    /// buf.insert(4, 'e');
    /// assert_eq!(buf, ['a', 'd', 'b', 'c', 'e']);
    /// assert!(!buf.is_inline());
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, element: T) -> usize {
        infallible(self.try_insert(index, element))
    }

    /// Fallible version of [`insert`](HybridBuffer::insert).
    pub fn try_insert(&mut self, index: usize, element: T) -> Result<usize, AllocError> {
        let len = self.len();
        assert!(index <= len, "insertion index should be <= len");

        if len < self.capacity() {
            match &mut self.0 {
                // SAFETY: index <= len < N
                Store::Inline(store) => unsafe { store.insert_unchecked(index, element) },
                Store::Heap { buf, .. } => buf.insert(index, element),
            }
            return Ok(index);
        }

        let capacity = target_capacity(N, len, 1).ok_or(AllocError::CapacityOverflow)?;
        let mut buf = allocate(capacity)?;
        match &mut self.0 {
            Store::Inline(store) => unsafe {
                let src = store.as_ptr();
                store.set_len(0);
                move_split(src, len, index, element, &mut buf);
                trace_transition!(len = buf.len(), capacity, "promoted inline store to heap");
            },
            Store::Heap { buf: old, .. } => unsafe {
                let src = old.as_ptr();
                old.set_len(0);
                move_split(src, len, index, element, &mut buf);
                trace_transition!(len = buf.len(), capacity, "moved to a larger heap store");
            },
        }
        self.0 = Store::Heap { buf, capacity };
        Ok(index)
    }

    /// Inserts every element of `items` before position `index` and returns
    /// `index`.
    ///
    /// Room for all of `items` is reserved once, then the existing suffix is
    /// rotated behind the new elements. Inserting nothing leaves the buffer
    /// untouched.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec![1, 5];
    /// assert_eq!(buf.insert_many(1, [2, 3, 4]), 1);
    /// assert_eq!(buf, [1, 2, 3, 4, 5]);
    /// assert!(!buf.is_inline());
    /// ```
    pub fn insert_many<I>(&mut self, index: usize, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        infallible(self.try_insert_many(index, items))
    }

    /// Fallible version of [`insert_many`](HybridBuffer::insert_many).
    pub fn try_insert_many<I>(&mut self, index: usize, items: I) -> Result<usize, AllocError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let len = self.len();
        assert!(index <= len, "insertion index should be <= len");

        let iter = items.into_iter();
        let count = iter.len();
        if count == 0 {
            return Ok(index);
        }
        self.try_reserve(count)?;

        /// Drops the items appended so far if the source panics.
        struct TruncateGuard<'a, T, const N: usize> {
            buf: &'a mut HybridBuffer<T, N>,
            len: usize,
        }

        impl<T, const N: usize> Drop for TruncateGuard<'_, T, N> {
            fn drop(&mut self) {
                self.buf.truncate(self.len);
            }
        }

        let guard = TruncateGuard { buf: self, len };
        for item in iter.take(count) {
            // SAFETY: at most `count` elements, all reserved above.
            unsafe { guard.buf.push_unchecked(item) };
        }
        mem::forget(guard);

        let inserted = self.len() - len;
        self.as_mut_slice()[index..].rotate_right(inserted);
        Ok(index)
    }

    /// Removes the element at `index` and returns the index of the element
    /// that followed it, which equals `len` if it was the last one.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 2> = hybridvec![1, 2, 3];
    /// assert_eq!(buf.erase(1), 1);
    /// assert_eq!(buf, [1, 3]);
    /// assert!(buf.is_inline());
    ///
    /// assert_eq!(buf.erase(1), buf.len());
    /// ```
    #[inline]
    pub fn erase(&mut self, index: usize) -> usize {
        assert!(index < self.len(), "removal index should be < len");
        self.erase_range(index..index + 1)
    }

    /// Removes the elements in `range` and returns the index of the first
    /// element after it.
    ///
    /// If the buffer is on the heap and the survivors fit in `N` elements,
    /// they are moved inline and the heap store is released.
    ///
    /// # Panics
    /// Panics if the range is reversed or ends past `len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec![1, 2, 3, 4, 5, 6];
    /// assert!(!buf.is_inline());
    ///
    /// assert_eq!(buf.erase_range(1..3), 1);
    /// assert_eq!(buf, [1, 4, 5, 6]);
    /// assert!(buf.is_inline());
    /// assert_eq!(buf.capacity(), 4);
    /// ```
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> usize {
        let len = self.len();
        let (first, last) = split_range_bound(&range, len);
        let removed = last - first;
        if removed == 0 {
            return first;
        }

        match &mut self.0 {
            Store::Inline(store) => store.remove_range(first, last),
            Store::Heap { buf, .. } => {
                if len - removed <= N {
                    // SAFETY: the range is in bounds and the survivors fit inline.
                    let store = unsafe { InlineStore::from_vec_excluding(buf, first, last) };
                    trace_transition!(len = store.len(), "demoted heap store to inline");
                    // The old store still owns the erased elements.
                    drop(mem::replace(&mut self.0, Store::Inline(store)));
                } else {
                    buf.drain(first..last);
                }
            }
        }
        first
    }

    /// Removes and returns the element at `index`, shifting the rest left.
    ///
    /// # Panics
    /// Panics if `index >= len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec!['a', 'b', 'c'];
    /// assert_eq!(buf.remove(1), 'b');
    /// assert_eq!(buf, ['a', 'c']);
    /// ```
    pub fn remove(&mut self, index: usize) -> T {
        let value = match &mut self.0 {
            Store::Inline(store) => store.remove(index),
            Store::Heap { buf, .. } => {
                assert!(index < buf.len(), "removal index should be < len");
                buf.remove(index)
            }
        };
        self.demote_if_fits();
        value
    }

    /// Removes the last element and returns it, or `None` if the buffer is empty.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 2> = hybridvec![1, 2, 3];
    /// assert_eq!(buf.pop(), Some(3));
    /// assert!(buf.is_inline());
    /// assert_eq!(buf.pop(), Some(2));
    /// assert_eq!(buf.pop(), Some(1));
    /// assert_eq!(buf.pop(), None);
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let value = match &mut self.0 {
            Store::Inline(store) => store.pop(),
            Store::Heap { buf, .. } => buf.pop(),
        };
        if value.is_some() {
            self.demote_if_fits();
        }
        value
    }

    /// Keeps the first `len` elements and drops the rest.
    ///
    /// Has no effect if `len >= self.len()`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 3> = hybridvec![1, 2, 3, 4, 5];
    /// buf.truncate(8);
    /// assert_eq!(buf.len(), 5);
    ///
    /// buf.truncate(2);
    /// assert_eq!(buf, [1, 2]);
    /// assert!(buf.is_inline());
    /// ```
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len() {
            return;
        }
        match &mut self.0 {
            Store::Inline(store) => store.truncate(len),
            Store::Heap { buf, .. } => buf.truncate(len),
        }
        self.demote_if_fits();
    }

    /// Retains only the elements for which `f` returns `true`.
    #[inline]
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut f: F) {
        self.retain_mut(|item| f(item));
    }

    /// Retains only the elements for which `f` returns `true`, passing a
    /// mutable reference to each.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 2> = hybridvec![1, 2, 3, 4];
    /// buf.retain_mut(|x| {
    ///     *x *= 10;
    ///     *x > 20
    /// });
    /// assert_eq!(buf, [30, 40]);
    /// assert!(buf.is_inline());
    /// ```
    pub fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, f: F) {
        let len = self.len();
        match &mut self.0 {
            Store::Inline(store) => store.retain_mut(f),
            Store::Heap { buf, .. } => buf.retain_mut(f),
        }
        if self.len() < len {
            self.demote_if_fits();
        }
    }

    /// Removes all elements and returns to the inline store.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 4> = hybridvec![1, 2, 3, 4, 5];
    /// assert!(!buf.is_inline());
    /// buf.clear();
    /// assert!(buf.is_empty());
    /// assert!(buf.is_inline());
    /// assert_eq!(buf.capacity(), 4);
    /// ```
    pub fn clear(&mut self) {
        trace_transition!(if !self.is_inline(), "cleared heap store");
        self.0 = Store::Inline(InlineStore::new());
    }

    /// Converts the buffer into a [`Vec`].
    ///
    /// Heap data is returned without copying, inline data is moved into an
    /// exact allocation.
    pub fn into_vec(self) -> Vec<T> {
        match self.0 {
            Store::Inline(mut store) => {
                let mut vec = Vec::with_capacity(store.len());
                store.move_into(&mut vec);
                vec
            }
            Store::Heap { buf, .. } => buf,
        }
    }
}

impl<T: Clone, const N: usize> HybridBuffer<T, N> {
    /// Creates a buffer holding `count` clones of `elem`.
    ///
    /// If `count > N` the heap store is used.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::HybridBuffer;
    /// let buf: HybridBuffer<i32, 5> = HybridBuffer::from_elem(1, 4);
    /// assert_eq!(buf, [1, 1, 1, 1]);
    /// assert!(buf.is_inline());
    ///
    /// let buf: HybridBuffer<i32, 5> = HybridBuffer::from_elem(1, 6);
    /// assert_eq!(buf.capacity(), 9);
    /// ```
    pub fn from_elem(elem: T, count: usize) -> Self {
        let mut buf = Self::for_len(count);
        if count > 0 {
            for _ in 1..count {
                // SAFETY: `for_len(count)` leaves room for `count` elements.
                unsafe { buf.push_unchecked(elem.clone()) };
            }
            unsafe { buf.push_unchecked(elem) };
        }
        buf
    }

    /// Clones and inserts every element of `items` before position `index`.
    ///
    /// # Panics
    /// Panics if `index > len`.
    ///
    /// # Examples
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let mut buf: HybridBuffer<_, 8> = hybridvec![1, 4];
    /// buf.insert_from_slice(1, &[2, 3]);
    /// assert_eq!(buf, [1, 2, 3, 4]);
    /// ```
    #[inline]
    pub fn insert_from_slice(&mut self, index: usize, items: &[T]) -> usize {
        self.insert_many(index, items.iter().cloned())
    }

    /// Clones and appends every element of `items`.
    #[inline]
    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.insert_from_slice(self.len(), items);
    }
}

impl<T, const N: usize> Default for HybridBuffer<T, N> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const N: usize> Clone for HybridBuffer<T, N> {
    /// Deep-copies into a store of the same kind and capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hybridvec::{HybridBuffer, hybridvec};
    /// let a: HybridBuffer<i32, 2> = hybridvec![1, 2, 3];
    /// let b = a.clone();
    /// assert_eq!(a, b);
    /// assert_eq!(a.capacity(), b.capacity());
    /// assert_ne!(a.as_ptr(), b.as_ptr());
    /// ```
    fn clone(&self) -> Self {
        match &self.0 {
            Store::Inline(store) => Self(Store::Inline(store.clone())),
            Store::Heap { buf, capacity } => {
                let mut copy = infallible(allocate(*capacity));
                copy.extend_from_slice(buf);
                Self(Store::Heap {
                    buf: copy,
                    capacity: *capacity,
                })
            }
        }
    }
}

impl<T, const N: usize> Extend<T> for HybridBuffer<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (hint, _) = iter.size_hint();
        self.reserve(hint);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: 'a + Clone, const N: usize> Extend<&'a T> for HybridBuffer<T, N> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        Extend::<T>::extend(self, iter.into_iter().cloned());
    }
}

impl<T, const N: usize> FromIterator<T> for HybridBuffer<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (hint, _) = iter.size_hint();
        let mut buf = Self::for_len(hint);
        for item in iter {
            buf.push(item);
        }
        buf
    }
}

impl<T, const N: usize> From<Vec<T>> for HybridBuffer<T, N> {
    /// Small vectors are moved inline, larger ones are adopted as the heap
    /// store without copying.
    fn from(mut vec: Vec<T>) -> Self {
        if vec.len() <= N {
            // SAFETY: `len <= N`.
            Self(Store::Inline(unsafe { InlineStore::from_vec_unchecked(&mut vec) }))
        } else {
            let capacity = vec.capacity();
            Self(Store::Heap { buf: vec, capacity })
        }
    }
}

impl<T, const N: usize, const P: usize> From<[T; P]> for HybridBuffer<T, N> {
    #[inline]
    fn from(value: [T; P]) -> Self {
        Self::from_buf(value)
    }
}

impl<T: Clone, const N: usize> From<&[T]> for HybridBuffer<T, N> {
    fn from(value: &[T]) -> Self {
        let mut buf = Self::for_len(value.len());
        buf.extend_from_slice(value);
        buf
    }
}

impl<T: Clone, const N: usize, const P: usize> From<&[T; P]> for HybridBuffer<T, N> {
    #[inline]
    fn from(value: &[T; P]) -> Self {
        Self::from(value.as_slice())
    }
}

impl<T, const N: usize> core::ops::Deref for HybridBuffer<T, N> {
    type Target = [T];
    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> core::ops::DerefMut for HybridBuffer<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for HybridBuffer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, const N: usize> AsRef<[T]> for HybridBuffer<T, N> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> AsMut<[T]> for HybridBuffer<T, N> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, const N: usize> core::borrow::Borrow<[T]> for HybridBuffer<T, N> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, const N: usize> core::borrow::BorrowMut<[T]> for HybridBuffer<T, N> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: core::hash::Hash, const N: usize> core::hash::Hash for HybridBuffer<T, N> {
    #[inline]
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::hash::Hash::hash(self.as_slice(), state);
    }
}

impl<T, I: core::slice::SliceIndex<[T]>, const N: usize> core::ops::Index<I> for HybridBuffer<T, N> {
    type Output = I::Output;
    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        core::ops::Index::index(self.as_slice(), index)
    }
}

impl<T, I: core::slice::SliceIndex<[T]>, const N: usize> core::ops::IndexMut<I>
    for HybridBuffer<T, N>
{
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        core::ops::IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T: Ord, const N: usize> Ord for HybridBuffer<T, N> {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        Ord::cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: PartialOrd, const N: usize> PartialOrd for HybridBuffer<T, N> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        PartialOrd::partial_cmp(self.as_slice(), other.as_slice())
    }
}

impl<T: Eq, const N: usize> Eq for HybridBuffer<T, N> {}

/// Equality compares the logical sequences only, whichever store backs
/// either side.
impl<T, U, const N: usize, const M: usize> PartialEq<HybridBuffer<U, M>> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &HybridBuffer<U, M>) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, const N: usize> PartialEq<[U]> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        PartialEq::eq(self.as_slice(), other)
    }
}

impl<T, U, const N: usize> PartialEq<&[U]> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U]) -> bool {
        PartialEq::eq(self.as_slice(), *other)
    }
}

impl<T, U, const N: usize, const P: usize> PartialEq<[U; P]> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, const N: usize, const P: usize> PartialEq<&[U; P]> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &&[U; P]) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<T, U, const N: usize> PartialEq<Vec<U>> for HybridBuffer<T, N>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &Vec<U>) -> bool {
        PartialEq::eq(self.as_slice(), other.as_slice())
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a HybridBuffer<T, N> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut HybridBuffer<T, N> {
    type Item = &'a mut T;
    type IntoIter = core::slice::IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, const N: usize> IntoIterator for HybridBuffer<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        match self.0 {
            Store::Inline(store) => IntoIter(Iter::Inline(store.into_iter())),
            Store::Heap { buf, .. } => IntoIter(Iter::Heap(buf.into_iter())),
        }
    }
}

enum Iter<T, const N: usize> {
    Inline(inline_store::IntoIter<T, N>),
    Heap(alloc::vec::IntoIter<T>),
}

/// An iterator that consumes a [`HybridBuffer`] and yields its items by value.
///
/// # Examples
///
/// ```
/// # use hybridvec::{HybridBuffer, hybridvec};
/// let buf: HybridBuffer<&'static str, 3> = hybridvec!["1", "2", "3"];
/// let mut iter = buf.into_iter();
///
/// assert_eq!(iter.next(), Some("1"));
/// assert_eq!(iter.as_slice(), ["2", "3"]);
/// ```
pub struct IntoIter<T, const N: usize>(Iter<T, N>);

impl<T, const N: usize> IntoIter<T, N> {
    /// Returns the remaining items as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.0 {
            Iter::Inline(iter) => iter.as_slice(),
            Iter::Heap(iter) => iter.as_slice(),
        }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            Iter::Inline(iter) => iter.next(),
            Iter::Heap(iter) => iter.next(),
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.0 {
            Iter::Inline(iter) => iter.size_hint(),
            Iter::Heap(iter) => iter.size_hint(),
        }
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        match &mut self.0 {
            Iter::Inline(iter) => iter.next_back(),
            Iter::Heap(iter) => iter.next_back(),
        }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for IntoIter<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
