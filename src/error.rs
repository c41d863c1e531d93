//! Errors exposed by the ring collections.
//!
//! Each failure gets its own small, `Copy` type so callers
//! can match on exactly the condition an operation reports.

use core::fmt;

/// Error that indicates a logical index outside of `[-len, len)`.
///
/// Range checks are made against the number of live elements,
/// never against the capacity of the backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    /// The rejected logical index
    pub index: isize,
    /// Number of live elements at the time of the access
    pub len: usize,
}

#[cfg(feature = "std")]
impl std::error::Error for IndexOutOfRange {}

impl fmt::Display for IndexOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index {} out of range for ring buffer of length {}",
            self.index, self.len
        )
    }
}

/// Error that indicates a removal from a buffer holding no elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyBuffer;

#[cfg(feature = "std")]
impl std::error::Error for EmptyBuffer {}

impl fmt::Display for EmptyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("No data in buffer")
    }
}

/// Error that indicates a bounded queue was requested with no room at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroCapacity;

#[cfg(feature = "std")]
impl std::error::Error for ZeroCapacity {}

impl fmt::Display for ZeroCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Queue capacity must be greater than 0")
    }
}
