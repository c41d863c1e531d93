//! Ring collections: a power-of-two circular buffer with signed indexing,
//! and a bounded concurrent queue that drops its oldest elements.
//!
//! `RingBuffer` is a single-owner structure with no internal
//! synchronization. `BoundedDropQueue` may be shared between any number of
//! producers and consumers.
//!
//! ```
//! use ring_collections::RingBuffer;
//!
//! let mut rb = RingBuffer::new(3);
//! assert_eq!(rb.capacity(), 4);
//! rb.extend(0..6);
//! assert_eq!(rb.get(0), Ok(&2));
//! assert_eq!(rb.get(-1), Ok(&5));
//! assert_eq!(rb.insert(6), Some(2));
//! ```
//!
//! # Feature Flags
//!
//! - `std`
//!   - Enabled by default
//!   - Implements `std::error::Error` for the error types
//!
//! Without `std` the crate only requires `alloc`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

use static_assertions::{assert_impl_all, assert_not_impl_any, const_assert};

pub use bounded::BoundedDropQueue;
pub use error::*;
pub use ring::{IntoIter, Iter, RingBuffer, DEFAULT_CAPACITY};

mod bounded;
mod error;
mod ring;

const_assert!(DEFAULT_CAPACITY.is_power_of_two());
assert_impl_all!(BoundedDropQueue<u32>: Send, Sync);
assert_impl_all!(RingBuffer<u32>: Send, Sync, Clone, Default);
assert_not_impl_any!(RingBuffer<core::cell::Cell<u32>>: Sync);
