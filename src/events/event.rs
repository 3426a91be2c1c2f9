//! # One routable unit.
//!
//! An [`Event`] carries a dot-separated topic, an acknowledgement flag and an
//! application payload. Once submitted it is shared (`Arc<Event>`) between every
//! listener it was delivered to; the acknowledgement guard is the only state those
//! listeners mutate concurrently.
//!
//! ## Acknowledgement rules
//! - Only events with `ack_required = true` can be acknowledged.
//! - The first [`Event::acknowledge`] wins; later calls return `Ok(false)` and have no effect.
//! - The acknowledged flag is never unset.
//!
//! ## Example
//! ```rust
//! use hubcast::Event;
//! use serde_json::json;
//!
//! let ev = Event::new("network.switch.add", true)
//!     .with_field("name", json!("sw-01"))
//!     .with_field("ports", json!(48));
//!
//! assert_eq!(ev.topic, "network.switch.add");
//! assert!(ev.ack_required);
//! assert_eq!(ev.data["ports"], 48);
//! assert!(!ev.is_acknowledged());
//! assert!(ev.batch().is_none());
//! ```

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::ack::{Ack, AckReply};
use super::batch::BatchId;
use crate::core::{Command, DispatchDest, kind};
use crate::envelope::Envelope;
use crate::error::RouterError;

/// Acknowledgement state guarded by the event's mutex.
#[derive(Debug, Default)]
struct AckState {
    sent: bool,
    text: String,
}

/// A routed event.
pub struct Event {
    /// Dot-separated topic path.
    pub topic: String,
    /// Whether the submitter waits for a listener's acknowledgement.
    pub ack_required: bool,
    /// Application-defined key/value payload.
    pub data: Map<String, Value>,

    batch: Option<BatchId>,
    dispatcher: Option<DispatchDest>,
    ack: Mutex<AckState>,
}

impl Event {
    /// Creates an event with an empty payload.
    pub fn new(topic: impl Into<String>, ack_required: bool) -> Self {
        Self {
            topic: topic.into(),
            ack_required,
            data: Map::new(),
            batch: None,
            dispatcher: None,
            ack: Mutex::new(AckState::default()),
        }
    }

    /// Replaces the payload.
    #[inline]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Sets one payload field.
    #[inline]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Batch this event was submitted in, if any.
    #[inline]
    pub fn batch(&self) -> Option<BatchId> {
        self.batch
    }

    pub(crate) fn attach(&mut self, batch: BatchId, dispatcher: DispatchDest) {
        self.batch = Some(batch);
        self.dispatcher = Some(dispatcher);
    }

    /// Returns `true` once a reply has been accepted for this event.
    pub fn is_acknowledged(&self) -> bool {
        self.state().sent
    }

    /// Formatted acknowledgement (JSON); empty until a reply has been accepted.
    pub fn ack_text(&self) -> String {
        self.state().text.clone()
    }

    /// Replies to this event.
    ///
    /// Returns `Ok(true)` if this reply was accepted and forwarded to the dispatcher,
    /// `Ok(false)` if it was discarded (no acknowledgement required, or another
    /// listener already replied).
    ///
    /// ### Errors
    /// - [`RouterError::Detached`] if the event was never submitted through a router.
    /// - [`RouterError::Closed`] if the router has shut down.
    pub async fn acknowledge(&self, ack: Ack) -> Result<bool, RouterError> {
        if !self.ack_required {
            return Ok(false);
        }
        let (Some(batch), Some(dispatcher)) = (self.batch, self.dispatcher.as_ref()) else {
            return Err(RouterError::Detached);
        };

        let reply = AckReply {
            batch,
            topic: self.topic.clone(),
            ack,
        };
        {
            let mut state = self.state();
            if state.sent {
                return Ok(false);
            }
            state.sent = true;
            state.text = reply.to_value().to_string();
        }

        dispatcher
            .send(Envelope::new(kind::ACK, Command::Ack(reply)))
            .await?;
        Ok(true)
    }

    fn state(&self) -> MutexGuard<'_, AckState> {
        self.ack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("topic", &self.topic)
            .field("ack_required", &self.ack_required)
            .field("data", &self.data)
            .field("batch", &self.batch)
            .field("acknowledged", &self.is_acknowledged())
            .finish()
    }
}
