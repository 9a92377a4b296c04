//! Bounded FIFO work queue connecting producer threads to a consumer thread.
//!
//! Producers hand items over without ever blocking: once the queue reaches
//! its depth limit the oldest resident item is evicted to make room, keeping
//! memory bounded under load at the cost of dropped work. The consumer blocks
//! in [`BoundedWorkQueue::dequeue`] in bounded slices, re-checking the shared
//! [`HaltFlag`] between sleeps, so shutdown propagates within one wait
//! interval even when nothing notifies the condvar.

use crate::config::{WorkQueueConfig, MIN_DEPTH};
use crate::error::QueueResult;
use crate::halt::HaltFlag;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::mem;
use std::time::Duration;

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    max_depth: usize,
    wait_interval: Duration,
    dropped: u64,
    handled: u64,
}

impl<T> QueueState<T> {
    /// Pops heads until the next push fits within `max_depth`, counting each
    /// eviction.
    fn evict_for_insert(&mut self, incoming: usize) -> u64 {
        let overflow = self
            .items
            .len()
            .saturating_add(incoming)
            .saturating_sub(self.max_depth);
        let evicted = overflow.min(self.items.len()) as u64;
        for _ in 0..evicted {
            self.items.pop_front();
        }
        self.dropped += evicted;
        evicted
    }
}

/// Bounded multi-producer FIFO queue with oldest-first eviction.
///
/// One mutex guards the item sequence, the diagnostic counters, and the
/// runtime-tunable settings; the only blocking wait is the dequeue condvar,
/// which releases and reacquires the lock around each sleep.
#[derive(Debug)]
pub struct BoundedWorkQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    halt: HaltFlag,
}

impl<T> BoundedWorkQueue<T> {
    /// Creates an effectively unbounded queue polling `halt` every 100 ms.
    pub fn new(halt: HaltFlag) -> Self {
        Self::from_parts(halt, WorkQueueConfig::default())
    }

    /// Creates a queue with explicit depth limit and wait interval.
    pub fn with_config(halt: HaltFlag, config: WorkQueueConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(halt, config))
    }

    fn from_parts(halt: HaltFlag, config: WorkQueueConfig) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                max_depth: config.max_depth,
                wait_interval: config.wait_interval,
                dropped: 0,
                handled: 0,
            }),
            available: Condvar::new(),
            halt,
        }
    }

    /// Returns the halt flag this queue observes.
    pub fn halt_flag(&self) -> &HaltFlag {
        &self.halt
    }

    /// Moves `item` into the queue, evicting the oldest resident item first
    /// if the queue is at its depth limit.
    ///
    /// `None` is a silent no-op. While the halt flag is set the item is
    /// discarded instead of queued; ownership moves into the call either way.
    /// Never blocks.
    pub fn enqueue<I>(&self, item: I)
    where
        I: Into<Option<T>>,
    {
        let Some(item) = item.into() else {
            return;
        };

        {
            let mut state = self.state.lock();
            if self.halt.is_set() {
                log::trace!("enqueue while halted; discarding item");
                return;
            }
            let evicted = state.evict_for_insert(1);
            if evicted > 0 {
                log::trace!(
                    "depth limit {} reached; dropped {evicted} oldest item(s)",
                    state.max_depth
                );
            }
            state.items.push_back(item);
        }
        self.available.notify_one();
    }

    /// Moves a batch of items into the queue under one lock acquisition.
    ///
    /// `None` entries are skipped. Evictions needed for the whole batch to
    /// fit are performed before any insertion, oldest first, and the batch
    /// keeps its internal order. While the halt flag is set the entire batch
    /// is discarded as a unit.
    pub fn enqueue_batch<I>(&self, items: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<T>>,
    {
        let incoming: Vec<T> = items.into_iter().filter_map(Into::into).collect();
        if incoming.is_empty() {
            return;
        }

        {
            let mut state = self.state.lock();
            if self.halt.is_set() {
                log::trace!(
                    "batch of {} enqueued while halted; discarding",
                    incoming.len()
                );
                return;
            }

            let mut evicted = state.evict_for_insert(incoming.len());
            state.items.extend(incoming);

            // A batch longer than the depth limit overflows on its own; its
            // oldest entries go the same way resident items did.
            while state.items.len() > state.max_depth {
                state.items.pop_front();
                state.dropped += 1;
                evicted += 1;
            }

            if evicted > 0 {
                log::trace!(
                    "depth limit {} reached; dropped {evicted} oldest item(s)",
                    state.max_depth
                );
            }
        }
        self.available.notify_one();
    }

    /// Removes and returns the oldest queued item, blocking while the queue
    /// is empty.
    ///
    /// The wait is sliced into `wait_interval` sleeps with the predicate
    /// "non-empty or halted" re-checked on every wake, covering spurious
    /// wakeups and missed notifies. Once the halt flag is set this returns
    /// `None` immediately; items still queued are abandoned, not drained.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        while state.items.is_empty() && !self.halt.is_set() {
            let interval = state.wait_interval;
            self.available.wait_for(&mut state, interval);
        }

        if self.halt.is_set() {
            log::debug!(
                "halt observed; abandoning {} queued item(s)",
                state.items.len()
            );
            return None;
        }

        let item = state.items.pop_front();
        if item.is_some() {
            state.handled += 1;
        }
        item
    }

    /// Number of items currently queued.
    ///
    /// Reports zero once the halt flag is set, since draining is no longer
    /// permitted.
    pub fn len(&self) -> usize {
        let state = self.state.lock();
        if self.halt.is_set() {
            0
        } else {
            state.items.len()
        }
    }

    /// Returns whether [`len`](Self::len) is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items evicted since the last call; reading resets the counter.
    ///
    /// Diagnostic only: concurrent readers race on the reset, though every
    /// eviction is counted exactly once overall.
    pub fn take_dropped(&self) -> u64 {
        mem::take(&mut self.state.lock().dropped)
    }

    /// Items dequeued since the last call; reading resets the counter.
    pub fn take_handled(&self) -> u64 {
        mem::take(&mut self.state.lock().handled)
    }

    /// Current eviction threshold.
    pub fn max_depth(&self) -> usize {
        self.state.lock().max_depth
    }

    /// Changes the eviction threshold.
    ///
    /// A decrease does not evict retroactively; the next enqueue that would
    /// overflow does. Zero is clamped to [`MIN_DEPTH`].
    pub fn set_max_depth(&self, value: usize) {
        self.state.lock().max_depth = value.max(MIN_DEPTH);
    }

    /// Current poll granularity for blocked dequeues.
    pub fn wait_interval(&self) -> Duration {
        self.state.lock().wait_interval
    }

    /// Changes the poll granularity.
    ///
    /// Zero is clamped to one millisecond so the dequeue loop cannot spin.
    pub fn set_wait_interval(&self, value: Duration) {
        self.state.lock().wait_interval = value.max(Duration::from_millis(1));
    }
}

#[cfg(test)]
mod tests {
    //! Single-threaded coverage; threaded behaviour lives in `tests/`.
    use super::*;
    use crate::error::QueueError;

    fn bounded(depth: usize) -> (BoundedWorkQueue<&'static str>, HaltFlag) {
        let halt = HaltFlag::new();
        let queue = BoundedWorkQueue::with_config(
            halt.clone(),
            WorkQueueConfig::new()
                .max_depth(depth)
                .wait_interval(Duration::from_millis(10)),
        )
        .expect("create queue");
        (queue, halt)
    }

    #[test]
    fn creation_starts_empty() {
        let (queue, _halt) = bounded(4);
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert_eq!(queue.take_dropped(), 0);
        assert_eq!(queue.take_handled(), 0);
    }

    #[test]
    fn fifo_round_trip() {
        let (queue, _halt) = bounded(16);
        for item in ["a", "b", "c", "d"] {
            queue.enqueue(item);
        }
        assert_eq!(queue.len(), 4);
        for expected in ["a", "b", "c", "d"] {
            assert_eq!(queue.dequeue(), Some(expected));
        }
        assert_eq!(queue.take_handled(), 4);
        assert_eq!(queue.take_dropped(), 0);
    }

    /// Depth 3, enqueue A..D: A is evicted and B, C, D survive in order.
    #[test]
    fn eviction_drops_oldest() {
        let (queue, _halt) = bounded(3);
        for item in ["a", "b", "c", "d"] {
            queue.enqueue(item);
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.take_dropped(), 1);
        for expected in ["b", "c", "d"] {
            assert_eq!(queue.dequeue(), Some(expected));
        }
    }

    #[test]
    fn none_enqueue_is_noop() {
        let (queue, _halt) = bounded(4);
        queue.enqueue(None::<&str>);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.take_dropped(), 0);
        assert_eq!(queue.take_handled(), 0);
    }

    #[test]
    fn batch_skips_none_entries() {
        let (queue, _halt) = bounded(8);
        queue.enqueue_batch([Some("a"), None, Some("b"), None]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));
        assert_eq!(queue.take_dropped(), 0);
    }

    #[test]
    fn batch_preserves_internal_order() {
        let (queue, _halt) = bounded(16);
        queue.enqueue_batch(["a", "b", "c"]);
        queue.enqueue_batch(["d", "e"]);
        for expected in ["a", "b", "c", "d", "e"] {
            assert_eq!(queue.dequeue(), Some(expected));
        }
    }

    /// Two residents plus a batch of four against depth 4: both residents are
    /// evicted up front and the batch lands intact.
    #[test]
    fn batch_evicts_residents_before_insert() {
        let (queue, _halt) = bounded(4);
        queue.enqueue("old1");
        queue.enqueue("old2");
        queue.enqueue_batch(["a", "b", "c", "d"]);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.take_dropped(), 2);
        for expected in ["a", "b", "c", "d"] {
            assert_eq!(queue.dequeue(), Some(expected));
        }
    }

    /// A batch longer than the depth limit sheds its own oldest entries.
    #[test]
    fn oversized_batch_keeps_newest_tail() {
        let (queue, _halt) = bounded(2);
        queue.enqueue_batch(["a", "b", "c", "d", "e"]);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.take_dropped(), 3);
        assert_eq!(queue.dequeue(), Some("d"));
        assert_eq!(queue.dequeue(), Some("e"));
    }

    #[test]
    fn halted_enqueue_discards_item() {
        let (queue, halt) = bounded(4);
        halt.set();
        queue.enqueue("lost");
        queue.enqueue_batch(["also", "lost"]);
        halt.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.take_dropped(), 0);
    }

    #[test]
    fn halt_takes_precedence_over_drain() {
        let (queue, halt) = bounded(8);
        queue.enqueue_batch(["a", "b", "c"]);
        halt.set();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.dequeue(), None);
        assert_eq!(queue.take_handled(), 0);
    }

    /// Clearing the flag returns the queue to service with resident items
    /// intact; only work rejected during the halted window is gone.
    #[test]
    fn cleared_halt_resumes_service() {
        let (queue, halt) = bounded(8);
        queue.enqueue_batch(["a", "b"]);
        halt.set();
        queue.enqueue("rejected");
        assert_eq!(queue.dequeue(), None);
        halt.clear();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue(), Some("a"));
        assert_eq!(queue.dequeue(), Some("b"));
    }

    #[test]
    fn counters_reset_on_read() {
        let (queue, _halt) = bounded(1);
        queue.enqueue("a");
        queue.enqueue("b");
        assert_eq!(queue.dequeue(), Some("b"));
        assert_eq!(queue.take_dropped(), 1);
        assert_eq!(queue.take_dropped(), 0);
        assert_eq!(queue.take_handled(), 1);
        assert_eq!(queue.take_handled(), 0);
    }

    /// Shrinking the depth limit leaves residents alone until the next
    /// enqueue, which then evicts down to the new bound.
    #[test]
    fn depth_decrease_evicts_lazily() {
        let (queue, _halt) = bounded(5);
        queue.enqueue_batch(["a", "b", "c", "d", "e"]);
        queue.set_max_depth(2);
        assert_eq!(queue.len(), 5);
        assert_eq!(queue.take_dropped(), 0);

        queue.enqueue("f");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.take_dropped(), 4);
        assert_eq!(queue.dequeue(), Some("e"));
        assert_eq!(queue.dequeue(), Some("f"));
    }

    #[test]
    fn setters_clamp_degenerate_values() {
        let (queue, _halt) = bounded(4);
        queue.set_max_depth(0);
        assert_eq!(queue.max_depth(), MIN_DEPTH);
        queue.set_wait_interval(Duration::ZERO);
        assert_eq!(queue.wait_interval(), Duration::from_millis(1));
    }

    #[test]
    fn config_rejects_zero_depth() {
        let halt = HaltFlag::new();
        let err = BoundedWorkQueue::<u32>::with_config(halt, WorkQueueConfig::new().max_depth(0))
            .expect_err("zero depth must be rejected");
        assert!(matches!(err, QueueError::InvalidDepth { requested: 0, .. }));
    }

    #[test]
    fn config_rejects_zero_interval() {
        let halt = HaltFlag::new();
        let err = BoundedWorkQueue::<u32>::with_config(
            halt,
            WorkQueueConfig::new().wait_interval(Duration::ZERO),
        )
        .expect_err("zero interval must be rejected");
        assert!(matches!(err, QueueError::ZeroWaitInterval));
    }

    /// Owned (non-`Copy`) items move through the queue without duplication.
    #[test]
    fn owned_items_move_through() {
        let halt = HaltFlag::new();
        let queue = BoundedWorkQueue::new(halt);
        queue.enqueue(String::from("payload"));
        let out = queue.dequeue().expect("payload present");
        assert_eq!(out, "payload");
        assert!(queue.is_empty());
    }
}
