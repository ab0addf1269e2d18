use alloc::vec::Vec;
use core::{
    iter::FusedIterator,
    mem::{ManuallyDrop, MaybeUninit},
    ptr,
};

/// A fixed-capacity array embedded in its owner.
///
/// This is the inline representation of [`HybridBuffer`]. Every method that
/// could exceed `N` is either `unsafe` or asserts, the owner is responsible
/// for switching to the heap store before that happens.
///
/// [`HybridBuffer`]: crate::HybridBuffer
pub(crate) struct InlineStore<T, const N: usize> {
    data: [MaybeUninit<T>; N],
    len: usize,
}

impl<T, const N: usize> Drop for InlineStore<T, N> {
    // Internal data using `MaybeUninit`, we need to call `drop` manually.
    fn drop(&mut self) {
        if self.len > 0 {
            // SAFETY: the first `len` slots are initialized.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr(), self.len));
            }
        }
    }
}

impl<T, const N: usize> InlineStore<T, N> {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            // SAFETY: an array of `MaybeUninit` needs no initialization.
            data: unsafe { MaybeUninit::<[MaybeUninit<T>; N]>::uninit().assume_init() },
            len: 0,
        }
    }

    #[inline(always)]
    pub(crate) const fn as_ptr(&self) -> *const T {
        &raw const self.data as *const T
    }

    #[inline(always)]
    pub(crate) const fn as_mut_ptr(&mut self) -> *mut T {
        &raw mut self.data as *mut T
    }

    /// # Safety
    /// - `new_len <= N`.
    /// - Slots `[0, new_len)` are initialized, and slots dropped from the
    ///   logical range are either already moved out or intentionally leaked.
    #[inline(always)]
    pub(crate) const unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= N);
        self.len = new_len;
    }

    #[inline(always)]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { core::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { core::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// # Safety
    /// `len < N`.
    #[inline(always)]
    pub(crate) const unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < N, "length overflow during `push`");
        unsafe {
            ptr::write(self.as_mut_ptr().add(self.len), value);
        }
        self.len += 1;
    }

    #[inline]
    pub(crate) const fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: slot `len` was initialized and is no longer tracked.
            unsafe { Some(ptr::read(self.as_ptr().add(self.len))) }
        }
    }

    /// Shifts `[index, len)` right by one slot and writes `element` at `index`.
    ///
    /// # Safety
    /// `index <= len < N`.
    #[inline]
    pub(crate) const unsafe fn insert_unchecked(&mut self, index: usize, element: T) {
        debug_assert!(index <= self.len, "insertion index should be <= len");
        debug_assert!(self.len < N, "length overflow during `insert`");

        unsafe {
            let ptr = self.as_mut_ptr().add(index);
            if index < self.len {
                ptr::copy(ptr, ptr.add(1), self.len - index);
            }
            ptr::write(ptr, element);
        }
        self.len += 1;
    }

    /// # Panics
    /// Panics if `index >= len`.
    #[inline]
    pub(crate) const fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "removal index should be < len");

        unsafe {
            let ptr = self.as_mut_ptr().add(index);
            let value = ptr::read(ptr);
            ptr::copy(ptr.add(1), ptr, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Drops `[first, last)` and closes the gap by moving `[last, len)` left.
    pub(crate) fn remove_range(&mut self, first: usize, last: usize) {
        debug_assert!(first <= last && last <= self.len);
        let removed = last - first;
        if removed == 0 {
            return;
        }
        // Erased elements rotate to the tail and `truncate` drops them there.
        self.as_mut_slice()[first..].rotate_left(removed);
        self.truncate(self.len - removed);
    }

    #[inline]
    pub(crate) fn truncate(&mut self, len: usize) {
        if self.len > len {
            let tail = self.len - len;
            self.len = len;
            // SAFETY: the slots `[len, len + tail)` are initialized and no longer tracked.
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.as_mut_ptr().add(len), tail));
            }
        }
    }

    /// Keeps the elements for which `f` returns `true`, preserving their order.
    pub(crate) fn retain_mut<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) {
        let len = self.len;
        let mut kept = 0;
        let slice = self.as_mut_slice();
        for index in 0..len {
            if f(&mut slice[index]) {
                slice.swap(kept, index);
                kept += 1;
            }
        }
        self.truncate(kept);
    }

    /// Moves every element of `vec` into a new store, leaving `vec` empty.
    ///
    /// # Safety
    /// `vec.len() <= N`.
    #[inline]
    pub(crate) unsafe fn from_vec_unchecked(vec: &mut Vec<T>) -> Self {
        debug_assert!(vec.len() <= N);
        let mut store = Self::new();
        unsafe {
            ptr::copy_nonoverlapping(vec.as_ptr(), store.as_mut_ptr(), vec.len());
            store.len = vec.len();
            vec.set_len(0);
        }
        store
    }

    /// Moves `vec[..first]` followed by `vec[last..]` into a new store.
    ///
    /// On return `vec` holds exactly the elements of `[first, last)`, still
    /// alive, so dropping `vec` disposes of them.
    ///
    /// # Safety
    /// `first <= last <= vec.len()` and `vec.len() - (last - first) <= N`.
    pub(crate) unsafe fn from_vec_excluding(vec: &mut Vec<T>, first: usize, last: usize) -> Self {
        let len = vec.len();
        let removed = last - first;
        let tail = len - last;
        debug_assert!(first <= last && last <= len && len - removed <= N);

        let mut store = Self::new();
        unsafe {
            let src = vec.as_mut_ptr();
            let dst = store.as_mut_ptr();
            vec.set_len(0);
            ptr::copy_nonoverlapping(src, dst, first);
            ptr::copy_nonoverlapping(src.add(last), dst.add(first), tail);
            store.len = first + tail;
            ptr::copy(src.add(first), src, removed);
            vec.set_len(removed);
        }
        store
    }

    /// Moves every element to the end of `vec`, leaving the store empty.
    ///
    /// `vec` must already have room for `len` more elements.
    #[inline]
    pub(crate) fn move_into(&mut self, vec: &mut Vec<T>) {
        let len = self.len;
        let start = vec.len();
        assert!(vec.capacity() - start >= len, "heap store too small");
        unsafe {
            ptr::copy_nonoverlapping(self.as_ptr(), vec.as_mut_ptr().add(start), len);
            self.len = 0;
            vec.set_len(start + len);
        }
    }
}

impl<T: Clone, const N: usize> Clone for InlineStore<T, N> {
    fn clone(&self) -> Self {
        let mut store = Self::new();
        for item in self.as_slice() {
            // SAFETY: `store` never holds more than `self`, which holds at most `N`.
            unsafe { store.push_unchecked(item.clone()) };
        }
        store
    }
}

/// By-value iterator over an [`InlineStore`].
pub(crate) struct IntoIter<T, const N: usize> {
    store: ManuallyDrop<InlineStore<T, N>>,
    index: usize,
}

impl<T, const N: usize> IntoIterator for InlineStore<T, N> {
    type Item = T;
    type IntoIter = IntoIter<T, N>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            store: ManuallyDrop::new(self),
            index: 0,
        }
    }
}

impl<T, const N: usize> IntoIter<T, N> {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        let len = self.store.len - self.index;
        unsafe { core::slice::from_raw_parts(self.store.as_ptr().add(self.index), len) }
    }
}

impl<T, const N: usize> Iterator for IntoIter<T, N> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.store.len {
            self.index += 1;
            // SAFETY: each slot in `[index, len)` is read at most once.
            unsafe { Some(ptr::read(self.store.as_ptr().add(self.index - 1))) }
        } else {
            None
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len - self.index;
        (remaining, Some(remaining))
    }
}

impl<T, const N: usize> DoubleEndedIterator for IntoIter<T, N> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index < self.store.len {
            self.store.len -= 1;
            unsafe { Some(ptr::read(self.store.as_ptr().add(self.store.len))) }
        } else {
            None
        }
    }
}

impl<T, const N: usize> ExactSizeIterator for IntoIter<T, N> {}

impl<T, const N: usize> FusedIterator for IntoIter<T, N> {}

impl<T, const N: usize> Drop for IntoIter<T, N> {
    fn drop(&mut self) {
        if self.index < self.store.len {
            unsafe {
                ptr::drop_in_place(core::slice::from_raw_parts_mut(
                    self.store.as_mut_ptr().add(self.index),
                    self.store.len - self.index,
                ));
            }
        }
    }
}
