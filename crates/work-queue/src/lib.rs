//! Bounded producer/consumer work queue with cooperative shutdown.
//!
//! This crate exposes the pieces needed to hand discrete work items between
//! threads without unbounded memory growth:
//! * [`BoundedWorkQueue`] – FIFO queue that evicts its oldest item when full
//!   and never blocks producers.
//! * [`HaltFlag`] – application-owned shutdown signal observed by blocked
//!   consumers within one wait interval.
//! * [`WorkQueueConfig`] – recognized construction options (depth limit, poll
//!   granularity).
//! * [`Worker`] – consumer-thread harness that pumps a queue until shutdown.

mod config;
mod error;
mod halt;
mod queue;
mod worker;

pub use config::{WorkQueueConfig, DEFAULT_WAIT_INTERVAL, MIN_DEPTH};
pub use error::{QueueError, QueueResult};
pub use halt::HaltFlag;
pub use queue::BoundedWorkQueue;
pub use worker::Worker;
