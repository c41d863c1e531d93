//! BoundedDropQueue, a multi-producer, multi-consumer FIFO queue that
//! discards its oldest elements instead of rejecting or blocking producers.

use crate::ZeroCapacity;
use core::fmt;
use crossbeam_queue::SegQueue;

const LOG_TARGET: &str = "ring_collections::bounded";

/// A concurrent FIFO queue holding at most `capacity` elements at rest.
///
/// All operations are non-blocking. The capacity is enforced on a best
/// effort basis: each `push` discards from the front until the observed
/// length is below capacity, then appends. The check and the append are
/// not one atomic step, so racing producers may leave the queue holding
/// more than `capacity` elements until a later `push` runs alone, and
/// which elements a set of racing producers discards is not deterministic.
pub struct BoundedDropQueue<T> {
    /// Backing unbounded queue, provides the per-operation atomicity
    queue: SegQueue<T>,
    /// Number of elements kept once producers stop racing
    capacity: usize,
}

impl<T> BoundedDropQueue<T> {
    /// Create an empty queue. Returns error if `capacity` is 0.
    ///
    /// The capacity is used verbatim, with no power of two rounding.
    pub fn new(capacity: usize) -> Result<BoundedDropQueue<T>, ZeroCapacity> {
        if capacity == 0 {
            return Err(ZeroCapacity);
        }
        tracing::debug!(target: LOG_TARGET, capacity, "bounded drop queue created");
        Ok(BoundedDropQueue {
            queue: SegQueue::new(),
            capacity,
        })
    }

    /// Append `value` at the back, first discarding elements from the front
    /// while the queue is at or above capacity.
    ///
    /// Returns the number of elements this call discarded.
    pub fn push(&self, value: T) -> usize {
        let mut discarded = 0;
        loop {
            let len = self.queue.len();
            if len < self.capacity {
                break;
            }
            // A concurrent consumer may have emptied the queue since `len` was read
            if self.queue.pop().is_none() {
                break;
            }
            discarded += 1;
            tracing::trace!(
                target: LOG_TARGET,
                capacity = self.capacity,
                len,
                "discarded oldest element"
            );
        }
        self.queue.push(value);
        discarded
    }

    /// Remove and return the oldest element, or `None` if the queue is empty
    #[inline]
    pub fn pop(&self) -> Option<T> {
        self.queue.pop()
    }

    /// Number of elements currently queued.
    ///
    /// Only a snapshot while other threads are pushing or popping.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The capacity given at construction
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BoundedDropQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedDropQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.queue.len())
            .finish()
    }
}

#[cfg(feature = "std")]
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Barrier};
    use std::vec::Vec;

    fn drain<T>(queue: &BoundedDropQueue<T>) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(v) = queue.pop() {
            out.push(v);
        }
        out
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            BoundedDropQueue::<u32>::new(0).map(|q| q.capacity()),
            Err(ZeroCapacity)
        );
    }

    #[test]
    fn capacity_is_not_rounded() {
        for capacity in [1, 3, 5, 10, 16, 17].iter() {
            let queue = BoundedDropQueue::<u8>::new(*capacity).unwrap();
            assert_eq!(queue.capacity(), *capacity);
        }
    }

    #[test]
    fn keeps_newest_when_full() {
        let queue = BoundedDropQueue::new(3).unwrap();
        assert_eq!(queue.push(1), 0);
        assert_eq!(queue.push(2), 0);
        assert_eq!(queue.push(3), 0);
        assert_eq!(queue.push(4), 1);
        assert_eq!(queue.push(5), 1);
        assert_eq!(queue.len(), 3);
        assert_eq!(drain(&queue), [3, 4, 5]);
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn pop_interleaved_with_push() {
        let queue = BoundedDropQueue::new(2).unwrap();
        queue.push('a');
        queue.push('b');
        assert_eq!(queue.pop(), Some('a'));
        assert_eq!(queue.push('c'), 0);
        assert_eq!(queue.push('d'), 1);
        assert_eq!(drain(&queue), ['c', 'd']);
    }

    #[test]
    fn debug_shows_capacity_and_len() {
        let queue = BoundedDropQueue::new(4).unwrap();
        queue.push(());
        assert_eq!(
            std::format!("{:?}", queue),
            "BoundedDropQueue { capacity: 4, len: 1 }"
        );
    }

    proptest! {
        #[test]
        fn single_producer_matches_trimmed_fifo(
            capacity in 1_usize..=40,
            values in proptest::collection::vec(any::<u16>(), 0..200),
        ) {
            let queue = BoundedDropQueue::new(capacity).unwrap();
            let mut model = VecDeque::new();
            for v in values {
                let mut expected_discards = 0;
                while model.len() >= capacity {
                    model.pop_front();
                    expected_discards += 1;
                }
                model.push_back(v);
                prop_assert_eq!(queue.push(v), expected_discards);
                prop_assert!(queue.len() <= capacity);
            }
            prop_assert_eq!(drain(&queue), model.into_iter().collect::<Vec<_>>());
        }
    }

    // Concurrent producers may overshoot, but each producer's surviving
    // elements stay in order and nothing is duplicated
    proptest! {
        #[test]
        fn concurrent_producers(
            capacity in 1_usize..=64,
            num_producers in 2_usize..=4,
            writes_per_producer in 1_u32..=512,
        ) {
            let queue = Arc::new(BoundedDropQueue::new(capacity).unwrap());
            let barrier = Arc::new(Barrier::new(num_producers));
            crossbeam::thread::scope(|s| {
                for producer in 0..num_producers {
                    let queue = Arc::clone(&queue);
                    let barrier = Arc::clone(&barrier);
                    s.spawn(move |_| {
                        barrier.wait();
                        for i in 0..writes_per_producer {
                            queue.push((producer, i));
                        }
                    });
                }
            })
            .unwrap();

            // A push with no competition restores the bound
            queue.push((num_producers, 0));
            prop_assert!(queue.len() <= capacity);

            let survivors = drain(&queue);
            prop_assert_eq!(survivors.last(), Some(&(num_producers, 0)));
            for producer in 0..num_producers {
                let seen: Vec<u32> = survivors
                    .iter()
                    .filter(|(p, _)| *p == producer)
                    .map(|(_, i)| *i)
                    .collect();
                prop_assert!(seen.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn concurrent_producers_and_consumers() {
        const PRODUCERS: usize = 3;
        const CONSUMERS: usize = 2;
        const WRITES: u32 = 10_000;

        let queue = BoundedDropQueue::new(16).unwrap();
        let barrier = Barrier::new(PRODUCERS + CONSUMERS);
        let (consumed, discarded) = crossbeam::thread::scope(|s| {
            let producers: Vec<_> = (0..PRODUCERS)
                .map(|producer| {
                    let queue = &queue;
                    let barrier = &barrier;
                    s.spawn(move |_| {
                        barrier.wait();
                        (0..WRITES)
                            .map(|i| queue.push((producer, i)))
                            .sum::<usize>()
                    })
                })
                .collect();
            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    let queue = &queue;
                    let barrier = &barrier;
                    s.spawn(move |_| {
                        barrier.wait();
                        let mut got = Vec::new();
                        for _ in 0..WRITES {
                            if let Some(v) = queue.pop() {
                                got.push(v);
                            }
                        }
                        got
                    })
                })
                .collect();
            let discarded: usize = producers.into_iter().map(|h| h.join().unwrap()).sum();
            let consumed: Vec<Vec<(usize, u32)>> =
                consumers.into_iter().map(|h| h.join().unwrap()).collect();
            (consumed, discarded)
        })
        .unwrap();

        let remaining = drain(&queue);
        let total: usize = consumed.iter().map(|c| c.len()).sum::<usize>() + remaining.len();

        // Every element was either consumed, discarded or left behind, exactly once
        assert_eq!(total + discarded, PRODUCERS * WRITES as usize);

        // Each consumer sees any single producer's elements in push order
        for got in consumed.iter().chain(core::iter::once(&remaining)) {
            for producer in 0..PRODUCERS {
                let seen: Vec<u32> = got
                    .iter()
                    .filter(|(p, _)| *p == producer)
                    .map(|(_, i)| *i)
                    .collect();
                assert!(seen.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
}
