//! Error types for checked access and fallible growth.

use core::alloc::Layout;
use core::fmt;

/// Returned by [`HybridBuffer::at`] when `index >= len`.
///
/// [`HybridBuffer::at`]: crate::HybridBuffer::at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    /// The requested index.
    pub index: usize,
    /// The length of the buffer at the time of the request.
    pub len: usize,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "index {} out of range for length {}", self.index, self.len)
    }
}

impl core::error::Error for OutOfRange {}

/// Failure to acquire a heap store.
///
/// When a `try_*` method returns this error the buffer is left exactly as it
/// was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity does not fit in `usize` or exceeds `isize::MAX` bytes.
    CapacityOverflow,
    /// The allocator refused the request.
    AllocFailed {
        /// The layout that was requested.
        layout: Layout,
    },
}

impl AllocError {
    /// Classifies a refused request for `capacity` elements of `T`.
    pub(crate) fn for_capacity<T>(capacity: usize) -> Self {
        match Layout::array::<T>(capacity) {
            Ok(layout) => Self::AllocFailed { layout },
            Err(_) => Self::CapacityOverflow,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => f.write_str("capacity overflow"),
            Self::AllocFailed { layout } => {
                write!(f, "memory allocation of {} bytes failed", layout.size())
            }
        }
    }
}

impl core::error::Error for AllocError {}

/// Unwraps the result of a growth step for the infallible API.
#[inline]
pub(crate) fn infallible<T>(result: Result<T, AllocError>) -> T {
    match result {
        Ok(x) => x,
        Err(AllocError::CapacityOverflow) => panic!("capacity overflow"),
        Err(AllocError::AllocFailed { layout }) => alloc::alloc::handle_alloc_error(layout),
    }
}
