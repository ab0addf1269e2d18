//! Capacity policy shared by every growing operation of [`HybridBuffer`].
//!
//! [`HybridBuffer`]: crate::HybridBuffer

/// Computes the capacity a buffer must move to before inserting `additional`
/// elements into a buffer that currently holds `len` elements.
///
/// - If `len + additional` fits in the inline store, the answer is `inline`.
/// - Otherwise it is `floor(1.5 * (len + additional))`.
///
/// The result is always `>= len + additional`. `None` is returned when the
/// computation overflows `usize`.
///
/// The function is pure, so growth decisions can be checked without building
/// a buffer.
///
/// # Examples
///
/// ```
/// # use hybridvec::growth::target_capacity;
/// assert_eq!(target_capacity(16, 10, 6), Some(16));
/// assert_eq!(target_capacity(16, 16, 1), Some(25));
/// assert_eq!(target_capacity(16, 25, 1), Some(39));
/// assert_eq!(target_capacity(16, usize::MAX, 1), None);
/// ```
#[inline]
pub const fn target_capacity(inline: usize, len: usize, additional: usize) -> Option<usize> {
    let required = match len.checked_add(additional) {
        Some(required) => required,
        None => return None,
    };

    if required <= inline {
        Some(inline)
    } else {
        // floor(1.5 * x) == x + floor(x / 2)
        required.checked_add(required >> 1)
    }
}
