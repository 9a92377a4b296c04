//! Construction options for [`BoundedWorkQueue`](crate::BoundedWorkQueue).

use crate::error::{QueueError, QueueResult};
use std::time::Duration;

/// Smallest depth limit a queue can be configured with.
pub const MIN_DEPTH: usize = 1;

/// Poll granularity used when none is configured.
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_millis(100);

/// Recognized queue options.
///
/// `max_depth` is the eviction threshold: an enqueue past it silently drops
/// the oldest resident item. The default leaves the queue effectively
/// unbounded. `wait_interval` bounds how long a blocked consumer sleeps
/// between checks of the halt flag.
#[derive(Clone, Copy, Debug)]
pub struct WorkQueueConfig {
    pub max_depth: usize,
    pub wait_interval: Duration,
}

impl Default for WorkQueueConfig {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            wait_interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

impl WorkQueueConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }

    pub fn wait_interval(mut self, value: Duration) -> Self {
        self.wait_interval = value;
        self
    }

    pub(crate) fn validate(&self) -> QueueResult<()> {
        if self.max_depth < MIN_DEPTH {
            return Err(QueueError::InvalidDepth {
                requested: self.max_depth,
                minimum: MIN_DEPTH,
            });
        }
        if self.wait_interval.is_zero() {
            return Err(QueueError::ZeroWaitInterval);
        }
        Ok(())
    }
}
