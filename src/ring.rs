use crate::{EmptyBuffer, IndexOutOfRange};
use alloc::{boxed::Box, vec::Vec};
use core::fmt;
use core::iter::FusedIterator;
use core::mem::{size_of, MaybeUninit};
use core::ops::{Index, IndexMut};

/// Capacity used by `RingBuffer::default`
pub const DEFAULT_CAPACITY: usize = 256;

const LOG_TARGET: &str = "ring_collections::ring";

/// A circular buffer whose capacity is always a power of two.
///
/// Inserting into a full buffer overwrites the oldest element. Elements are
/// addressed by logical index: `0` is the oldest live element and `-1` is the
/// newest, so the valid range is `[-len, len)`.
///
/// There is no internal synchronization. All mutation must be driven by a
/// single owner; sharing across threads requires external locking.
pub struct RingBuffer<T> {
    /// The number of live elements
    len: usize,
    /// Slot of the most recently inserted element.
    /// `None` until something has been written since the last reset.
    newest: Option<usize>,
    /// Slot of the oldest live element.
    /// When data is consumed, this advances.
    oldest: usize,
    /// `capacity - 1`, used for every wrap-around
    mask: usize,
    /// Backing storage, provides capacity.
    /// Only the `len` slots starting at `oldest` are initialized.
    storage: Box<[MaybeUninit<T>]>,
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}

/// Smallest power of two that is at least `requested`, and never less than 1
#[inline]
fn round_capacity(requested: usize) -> usize {
    match requested.max(1).checked_next_power_of_two() {
        Some(capacity) => capacity,
        None => capacity_overflow(),
    }
}

fn allocate<T>(capacity: usize) -> Box<[MaybeUninit<T>]> {
    let mut storage = Vec::with_capacity(capacity);
    storage.resize_with(capacity, MaybeUninit::uninit);
    storage.into_boxed_slice()
}

impl<T> RingBuffer<T> {
    /// Create an empty buffer able to hold at least `requested_capacity` elements.
    ///
    /// The capacity is rounded up to the next power of two. A request that is
    /// already a power of two is kept as is, and a request of 0 yields 1.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity does not fit in a `usize`.
    pub fn new(requested_capacity: usize) -> Self {
        let capacity = round_capacity(requested_capacity);
        RingBuffer {
            len: 0,
            newest: None,
            oldest: 0,
            mask: capacity - 1,
            storage: allocate(capacity),
        }
    }

    /// Number of live elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots in the backing storage, always a power of two
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// True when no elements are live
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when the next insert will evict the oldest element
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Map a logical index to a slot in the backing storage
    #[inline]
    fn slot(&self, index: isize) -> Result<usize, IndexOutOfRange> {
        let out_of_range = IndexOutOfRange {
            index,
            len: self.len,
        };
        if index >= 0 {
            let offset = index as usize;
            if offset < self.len {
                Ok(self.oldest.wrapping_add(offset) & self.mask)
            } else {
                Err(out_of_range)
            }
        } else {
            // -1 is the newest element, -len the oldest
            let back = index.unsigned_abs();
            match self.newest {
                Some(newest) if back <= self.len => {
                    Ok(newest.wrapping_add(1).wrapping_sub(back) & self.mask)
                }
                _ => Err(out_of_range),
            }
        }
    }

    /// Get a reference to the element at logical index `index`.
    ///
    /// Non-negative indices count forward from the oldest element,
    /// negative ones count back from the newest.
    #[inline]
    pub fn get(&self, index: isize) -> Result<&T, IndexOutOfRange> {
        let slot = self.slot(index)?;
        // Every slot reachable through `slot` holds a live element
        Ok(unsafe { &*self.storage[slot].as_ptr() })
    }

    /// Get a mutable reference to the element at logical index `index`.
    #[inline]
    pub fn get_mut(&mut self, index: isize) -> Result<&mut T, IndexOutOfRange> {
        let slot = self.slot(index)?;
        Ok(unsafe { &mut *self.storage[slot].as_mut_ptr() })
    }

    /// Write an element at the head (newest).
    ///
    /// Always succeeds. When the buffer is full the oldest element is
    /// evicted to make room and handed back to the caller.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let overwritten = if self.is_full() {
            // About to overwrite the oldest element
            let evicted = unsafe { self.storage[self.oldest].as_ptr().read() };
            self.oldest = (self.oldest + 1) & self.mask;
            Some(evicted)
        } else {
            self.len += 1;
            None
        };

        let slot = match self.newest {
            Some(newest) => (newest + 1) & self.mask,
            None => self.oldest,
        };
        self.storage[slot] = MaybeUninit::new(value);
        self.newest = Some(slot);

        overwritten
    }

    /// Remove and return the oldest element.
    pub fn remove(&mut self) -> Result<T, EmptyBuffer> {
        self.try_remove().ok_or(EmptyBuffer)
    }

    /// Remove and return the oldest element, or `None` if the buffer is empty.
    ///
    /// Emptiness is checked before any slot is read.
    pub fn try_remove(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = unsafe { self.storage[self.oldest].as_ptr().read() };
        self.oldest = (self.oldest + 1) & self.mask;
        self.len -= 1;
        Some(value)
    }

    /// Double the capacity, keeping every live element in order.
    ///
    /// Elements are compacted to the start of the new storage, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the doubled capacity does not fit in a `usize`.
    pub fn grow(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = match old_capacity.checked_mul(2) {
            Some(capacity) => capacity,
            None => capacity_overflow(),
        };

        let mut storage = allocate(new_capacity);
        for (offset, target) in storage.iter_mut().take(self.len).enumerate() {
            let source = (self.oldest + offset) & self.mask;
            // Moved out bitwise; the old storage never drops its slots
            *target = MaybeUninit::new(unsafe { self.storage[source].as_ptr().read() });
        }

        self.storage = storage;
        self.mask = new_capacity - 1;
        self.oldest = 0;
        self.newest = self.len.checked_sub(1);

        tracing::debug!(
            target: LOG_TARGET,
            old_capacity,
            new_capacity,
            len = self.len,
            "ring buffer grown"
        );
    }

    /// Drop every live element and reset the cursors
    pub fn clear(&mut self) {
        while self.try_remove().is_some() {}
        self.newest = None;
        self.oldest = 0;
    }

    /// Iterate over the live elements from the oldest to the newest without
    /// removing them
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buffer: self,
            front: 0,
            back: self.len,
        }
    }

    /// Header line plus every element, each written by `element`
    fn render<F>(&self, f: &mut fmt::Formatter<'_>, mut element: F) -> fmt::Result
    where
        F: FnMut(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
    {
        write!(f, "Count:{} Capacity:{} ", self.len, self.capacity())?;
        match self.newest {
            Some(newest) => write!(f, "Newest:{} ", newest)?,
            None => f.write_str("Newest:none ")?,
        }
        writeln!(f, "Oldest:{} Mask:{:#b}", self.oldest, self.mask)?;
        for value in self.iter() {
            element(value, f)?;
        }
        writeln!(f)
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for RingBuffer<T> {
    fn default() -> Self {
        RingBuffer::new(DEFAULT_CAPACITY)
    }
}

impl<T: Clone> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        let mut copy = RingBuffer::new(self.capacity());
        copy.extend(self.iter().cloned());
        copy
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T> Index<isize> for RingBuffer<T> {
    type Output = T;

    fn index(&self, index: isize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> IndexMut<isize> for RingBuffer<T> {
    fn index_mut(&mut self, index: isize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Cursor state followed by each element separated by a space
impl<T: fmt::Display> fmt::Display for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, |value, f| write!(f, "{} ", value))
    }
}

/// Cursor state followed by each element as zero padded hex, two digits per byte
impl<T: fmt::UpperHex> fmt::UpperHex for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = size_of::<T>() * 2;
        self.render(f, |value, f| write!(f, "{:0width$X} ", value, width = width))
    }
}

/// An iterator over the live elements, oldest to newest, that leaves the
/// buffer untouched
pub struct Iter<'a, T> {
    buffer: &'a RingBuffer<T>,
    /// Logical index of the next element from the front
    front: usize,
    /// One past the logical index of the next element from the back
    back: usize,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            buffer: self.buffer,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let value = self.buffer.get(self.front as isize).ok()?;
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let value = self.buffer.get(self.back as isize - 1).ok()?;
        self.back -= 1;
        Some(value)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// An iterator that consumes elements from the oldest to the newest
pub struct IntoIter<T>(RingBuffer<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.0.try_remove()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len(), Some(self.0.len()))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> IntoIterator for RingBuffer<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}
