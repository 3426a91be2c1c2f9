//! # Dispatcher commands.
//!
//! Everything the dispatcher processes arrives as an [`Envelope`](crate::envelope::Envelope)
//! whose request is a [`Command`]. The envelope `kind` mirrors the variant
//! (see [`kind`]) so other tasks can classify messages without matching.

use std::sync::Arc;

use crate::envelope::Destination;
use crate::events::{AckReply, Batch, Endstate, Event};

/// Destination a listener receives its events on.
pub type Listener = Destination<Arc<Event>>;

/// Destination of the dispatcher's inbound queue.
pub(crate) type DispatchDest = Destination<Command, Endstate>;

/// Message kinds used on router envelopes.
pub mod kind {
    /// Subscribe a listener to a topic.
    pub const REGISTER: u32 = 1;
    /// Remove a listener from a topic.
    pub const UNREGISTER: u32 = 2;
    /// Inbound batch of events.
    pub const BATCH: u32 = 3;
    /// Acknowledgement from a listener.
    pub const ACK: u32 = 4;
    /// Event delivered to a listener.
    pub const EVENT: u32 = 10;
}

/// Requests handled by the dispatcher.
#[derive(Debug)]
pub enum Command {
    /// Add `listener` at `topic`.
    Register { topic: String, listener: Listener },
    /// Remove `listener` along `topic`.
    Unregister { topic: String, listener: Listener },
    /// Route a batch; the envelope's reply destination is the release signal.
    Batch(Batch),
    /// Count an acknowledgement towards its batch.
    Ack(AckReply),
}

impl Command {
    /// Envelope kind for this command.
    pub fn kind(&self) -> u32 {
        match self {
            Command::Register { .. } => kind::REGISTER,
            Command::Unregister { .. } => kind::UNREGISTER,
            Command::Batch(_) => kind::BATCH,
            Command::Ack(_) => kind::ACK,
        }
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Unregister { .. } => "unregister",
            Command::Batch(_) => "batch",
            Command::Ack(_) => "ack",
        }
    }
}
