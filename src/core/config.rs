//! # Router configuration.
//!
//! Provides [`Config`] centralized settings for the router runtime.
//!
//! Config is used in two ways:
//! 1. **Router creation**: `Router::builder(config).build()`
//! 2. **Listener defaults**: queue capacity for listeners that do not override it
//!
//! ## Sentinel values
//! - `ack_timeout = 0s` → wait for acknowledgements forever
//! - capacities of `0` are clamped to 1
//! - `ack_timeout` above [`MAX_ACK_TIMEOUT`] is clamped to it

use std::time::Duration;

/// Longest acknowledgement timeout the dispatcher schedules (365 days).
///
/// Larger configured values are clamped to this.
pub const MAX_ACK_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Global configuration for the router runtime.
///
/// ## Field semantics
/// - `queue_capacity`: dispatcher inbound queue size (min 1)
/// - `listener_capacity`: default per-listener queue size (min 1)
/// - `ack_timeout`: how long a batch may wait for acknowledgements (`0s` = forever)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the dispatcher's inbound queue.
    ///
    /// Batch submission and acknowledgements wait for space; registration
    /// fails with `RouterError::Busy` instead of waiting.
    pub queue_capacity: usize,

    /// Default capacity of each listener's queue.
    ///
    /// The dispatcher waits while a listener queue is full, so a slow listener
    /// delays routing for everyone.
    pub listener_capacity: usize,

    /// Maximum time a batch waits for its outstanding acknowledgements.
    ///
    /// - `Duration::ZERO` = no timeout (the caller stays blocked until every ack arrives)
    /// - `> 0` = the batch is released with an ERROR endstate when the timeout expires
    ///   (at most [`MAX_ACK_TIMEOUT`])
    pub ack_timeout: Duration,
}

impl Config {
    /// Returns the acknowledgement timeout as an `Option`.
    ///
    /// - `None` → wait forever
    /// - `Some(d)` → release with ERROR after `d`, clamped to [`MAX_ACK_TIMEOUT`]
    #[inline]
    pub fn ack_timeout(&self) -> Option<Duration> {
        if self.ack_timeout == Duration::ZERO {
            None
        } else {
            Some(self.ack_timeout.min(MAX_ACK_TIMEOUT))
        }
    }

    /// Returns the dispatcher queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the listener queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn listener_capacity_clamped(&self) -> usize {
        self.listener_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_capacity = 1024`
    /// - `listener_capacity = 1024`
    /// - `ack_timeout = 30s`
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            listener_capacity: 1024,
            ack_timeout: Duration::from_secs(30),
        }
    }
}
