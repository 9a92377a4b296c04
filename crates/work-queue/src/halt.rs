//! Shared shutdown signal written by the application and read by queues.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cheaply clonable halt signal shared between an application and its queues.
///
/// The application owns the write side and flips the flag once to initiate
/// shutdown; queues only ever read it. A single writer may race any number of
/// readers without additional locking.
#[derive(Clone, Debug, Default)]
pub struct HaltFlag {
    inner: Arc<AtomicBool>,
}

impl HaltFlag {
    /// Creates a flag in the not-halted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals shutdown. Blocked dequeues observe this within one wait
    /// interval of their queue.
    pub fn set(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Clears the signal so queues re-enter service. Items rejected or
    /// abandoned while the flag was set are not recovered.
    pub fn clear(&self) {
        self.inner.store(false, Ordering::Release);
    }

    /// Returns whether shutdown has been signalled.
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}
