//! Error types used by the router, its envelopes, and the tickler.
//!
//! This module defines three error enums:
//!
//! - [`EnvelopeError`]: a message could not be placed on a destination.
//! - [`RouterError`]: failures surfaced by the router handle and the ingestion path.
//! - [`TickleError`]: failures of the periodic scheduler.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging.
//! Routing outcomes (an unreachable topic, an expired acknowledgement) are **not**
//! errors here: they are reported to the batch caller as an ERROR [`Endstate`](crate::Endstate).

use thiserror::Error;

/// # Errors produced when sending an envelope.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The receiving side of the destination has been dropped.
    #[error("destination closed")]
    Closed,

    /// The destination queue is full (only returned by non-blocking sends).
    #[error("destination queue full")]
    Full,

    /// `send_response` was called on an envelope that carries no reply destination.
    #[error("envelope has no reply destination")]
    NoReplyDestination,
}

impl EnvelopeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use hubcast::EnvelopeError;
    ///
    /// assert_eq!(EnvelopeError::Full.as_label(), "envelope_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EnvelopeError::Closed => "envelope_closed",
            EnvelopeError::Full => "envelope_full",
            EnvelopeError::NoReplyDestination => "envelope_no_reply",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by the router handle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The dispatcher task is gone (router shut down).
    #[error("router closed")]
    Closed,

    /// The dispatcher queue is full; registration does not wait for space.
    #[error("router queue full")]
    Busy,

    /// Inbound bytes could not be decoded into a batch of events.
    #[error("malformed input: {reason}")]
    Malformed {
        /// Decoder message.
        reason: String,
    },

    /// The event was never submitted through a router and cannot be acknowledged.
    #[error("event is not attached to a router")]
    Detached,
}

impl RouterError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use hubcast::RouterError;
    ///
    /// let err = RouterError::Malformed { reason: "eof".into() };
    /// assert_eq!(err.as_label(), "router_malformed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RouterError::Closed => "router_closed",
            RouterError::Busy => "router_busy",
            RouterError::Malformed { .. } => "router_malformed",
            RouterError::Detached => "router_detached",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RouterError::Closed => "router is not running".to_string(),
            RouterError::Busy => "router queue is full, try again".to_string(),
            RouterError::Malformed { reason } => format!("cannot decode events: {reason}"),
            RouterError::Detached => "event has no owning batch".to_string(),
        }
    }
}

impl From<EnvelopeError> for RouterError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Full => RouterError::Busy,
            EnvelopeError::Closed | EnvelopeError::NoReplyDestination => RouterError::Closed,
        }
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(e: serde_json::Error) -> Self {
        RouterError::Malformed {
            reason: e.to_string(),
        }
    }
}

/// # Errors produced by the tickler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickleError {
    /// Every slot of the table holds an active spot.
    #[error("tickle table full ({capacity} spots)")]
    TableFull {
        /// Table capacity.
        capacity: usize,
    },
}

impl TickleError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TickleError::TableFull { .. } => "tickle_table_full",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TickleError::TableFull { capacity } => {
                format!("all {capacity} tickle spots are in use, remove one first")
            }
        }
    }
}
