//! A bounded, thread-safe FIFO of record blocks.
//!
//! The queue sits between the single feeder thread, which pushes blocks
//! pulled from the source, and the workers, which pop them. It is bounded so
//! that a fast source cannot run ahead of slow checkers, and its waits are
//! *timed*: a blocked push or pop wakes up every [`WAIT_TICK`] to re-check
//! the queue state, so an externally requested stop is observed even when no
//! push or pop ever signals the condition variables.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use crate::block::Block;

/// Number of blocks the queue holds at most.
pub const QUEUE_CAPACITY: usize = 20;

/// How long a blocked push or pop sleeps before re-checking the queue state.
pub const WAIT_TICK: Duration = Duration::from_secs(1);

/// Lifecycle of a [`BoundedQueue`].
///
/// Transitions are monotone: `Active → Stopping → Stopped`, where `Stopping`
/// is only held while entries remain to be drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting pushes and pops.
    Active,
    /// No further pushes; the remaining entries may still be popped.
    Stopping,
    /// Drained and closed.
    Stopped,
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<Block>,
    state: QueueState,
}

/// Bounded FIFO of record blocks with a three-state lifecycle.
#[derive(Debug)]
pub struct BoundedQueue {
    inner: Mutex<Inner>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl Default for BoundedQueue {
    fn default() -> BoundedQueue {
        BoundedQueue::new()
    }
}

impl BoundedQueue {
    pub fn new() -> BoundedQueue {
        BoundedQueue {
            inner: Mutex::new(Inner {
                entries: VecDeque::with_capacity(QUEUE_CAPACITY),
                state: QueueState::Active,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a block, waiting while the queue is full.
    ///
    /// Returns the block unchanged if the queue left its active state while
    /// we were waiting, so the caller can hand it back to the source.
    pub fn push_wait(&self, block: Block) -> Result<(), Block> {
        debug_assert!(!block.is_empty());
        let mut inner = self.lock();
        loop {
            if inner.state != QueueState::Active {
                return Err(block);
            }
            if inner.entries.len() < QUEUE_CAPACITY {
                inner.entries.push_back(block);
                drop(inner);
                self.not_empty.notify_one();
                return Ok(());
            }
            inner = self
                .not_full
                .wait_timeout(inner, WAIT_TICK)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Pops the next block, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue has stopped and drained.
    pub fn pop_wait(&self) -> Option<Block> {
        let mut inner = self.lock();
        loop {
            if inner.state == QueueState::Stopped {
                return None;
            }
            if let Some(block) = inner.entries.pop_front() {
                if inner.entries.is_empty() && inner.state == QueueState::Stopping {
                    inner.state = QueueState::Stopped;
                }
                drop(inner);
                self.not_full.notify_one();
                return Some(block);
            }
            inner = self
                .not_empty
                .wait_timeout(inner, WAIT_TICK)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Pops the next block if one is immediately available.
    pub fn try_pop(&self) -> Option<Block> {
        let mut inner = self.lock();
        if inner.state == QueueState::Stopped {
            return None;
        }
        let block = inner.entries.pop_front()?;
        if inner.entries.is_empty() && inner.state == QueueState::Stopping {
            inner.state = QueueState::Stopped;
        }
        Some(block)
    }

    /// Refuses further pushes. If the queue is already empty it goes straight
    /// to `Stopped`, otherwise it stops once the last entry is popped.
    /// Idempotent. Does not signal either condition variable; the timed
    /// waits in [`push_wait`](BoundedQueue::push_wait) and
    /// [`pop_wait`](BoundedQueue::pop_wait) pick the state change up.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if inner.state != QueueState::Stopped {
            inner.state = if inner.entries.is_empty() {
                QueueState::Stopped
            } else {
                QueueState::Stopping
            };
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        self.lock().state
    }

    /// Number of queued blocks.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}

impl Drop for BoundedQueue {
    fn drop(&mut self) {
        // a queue must be stopped and drained before it goes away
        if !thread::panicking() {
            debug_assert!(self.lock().entries.is_empty());
        }
    }
}
