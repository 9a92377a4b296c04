//! Error handling for queue construction.
//!
//! The queue intentionally keeps its error surface small: configuration
//! validation only. During steady-state operation nothing fails — absence of
//! work is `None`, and saturation is resolved by eviction rather than
//! reported.

use thiserror::Error;

/// Convenience result alias for fallible queue construction.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors surfaced while validating queue configuration.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Requested depth limit cannot hold a single item.
    #[error("max depth {requested} must be at least {minimum}")]
    InvalidDepth { requested: usize, minimum: usize },

    /// A zero wait interval would turn the dequeue loop into a spin.
    #[error("wait interval must be non-zero")]
    ZeroWaitInterval,
}
