//! ## Intro
//!
//! A resizable sequence that stores its elements inline, inside the value
//! itself, while it holds at most `N` of them, and migrates to an exclusively
//! owned heap buffer once it grows past that.
//!
//! Most sequences in a program are short. Keeping them inline avoids the
//! allocator entirely for the common case while random access, amortized
//! append and mid-sequence insert/erase keep working for the general case.
//!
//! ```
//! # use hybridvec::{HybridBuffer, hybridvec};
//! let mut buf: HybridBuffer<i32, 5> = hybridvec![1, 2, 3];
//! assert!(buf.is_inline()); // Still inline
//!
//! // Push beyond capacity, the data moves to the heap
//! buf.extend(&[4, 5, 6, 7, 8]);
//! assert!(!buf.is_inline());
//! assert_eq!(buf.capacity(), 12);
//!
//! // Erase back below the threshold, the data moves inline again
//! buf.erase_range(2..);
//! assert!(buf.is_inline());
//! assert_eq!(buf, [1, 2]);
//! ```
//!
//! ## Storage policy
//!
//! - While `len <= N` the inline store is used and `capacity() == N`.
//! - When an operation needs room for `len + k > capacity` elements, a heap
//!   store of [`target_capacity(N, len, k)`](growth::target_capacity) elements
//!   is allocated, that is `floor(1.5 * (len + k))`, and the data is moved
//!   into it before the old store is released.
//! - Erase-family operations that leave a heap-backed buffer with `N`
//!   elements or fewer move the survivors inline and release the heap store.
//!
//! Every growing operation has a `try_*` form returning [`AllocError`] that
//! leaves the buffer untouched on failure. Checked access with
//! [`HybridBuffer::at`] returns [`OutOfRange`].
//!
//! ## `no_std` support
//!
//! This crate requires only `core` and `alloc`.
//!
//! ## Optional features
//!
//! ### `std`
//!
//! Implements [`std::io::Write`] for `HybridBuffer<u8, N>`.
//!
//! ### `tracing`
//!
//! Emits `TRACE` level events through [`tracing`] whenever the data moves
//! between the inline and the heap store.
//!
//! [`std::io::Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
//! [`tracing`]: https://docs.rs/tracing
#![no_std]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod utils;

pub mod error;
pub mod growth;

mod inline_store;

pub mod hybrid_buffer;

#[cfg(feature = "std")]
mod std_io;

#[doc(inline)]
pub use error::{AllocError, OutOfRange};
#[doc(inline)]
pub use hybrid_buffer::HybridBuffer;

/// The inline capacity used when `N` is not given.
pub const DEFAULT_INLINE_CAPACITY: usize = 16;

/// A `HybridBuffer` with an inline capacity of 8 elements.
///
/// This is an alias for [`HybridBuffer<T, 8>`].
///
/// # Examples
///
/// ```
/// # use hybridvec::TinyBuffer;
/// let mut buf: TinyBuffer<i32> = TinyBuffer::new();
///
/// buf.extend([1, 2, 3]);
/// assert!(buf.is_inline());
/// assert_eq!(buf, [1, 2, 3]);
///
/// buf.extend(&[4, 5, 6, 7, 8, 9]);
/// assert!(!buf.is_inline());
/// assert_eq!(buf.len(), 9);
/// ```
pub type TinyBuffer<T> = HybridBuffer<T, 8>;
