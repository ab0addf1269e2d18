use core::ops::{Bound, RangeBounds};

/// Resolves `range` against a sequence of length `len` into `[start, end)`.
///
/// # Panics
/// Panics if `start > end` or `end > len`.
#[inline]
pub(crate) fn split_range_bound(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&i) => i,
        Bound::Excluded(&i) => i.checked_add(1).expect("range start overflow"),
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(&i) => i.checked_add(1).expect("range end overflow"),
        Bound::Excluded(&i) => i,
        Bound::Unbounded => len,
    };

    assert!(start <= end, "range start {start} should be <= range end {end}");
    assert!(end <= len, "range end {end} should be <= len {len}");
    (start, end)
}

/// Reports a store transition when the `tracing` feature is enabled.
macro_rules! trace_transition {
    (if $cond:expr, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        if $cond {
            tracing::trace!($($arg)+);
        }
    };
    ($($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)+);
    };
}

pub(crate) use trace_transition;
