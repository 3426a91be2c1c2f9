//! # Listener acknowledgements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::batch::BatchId;
use super::endstate::Status;

/// A listener's answer to an event that requires acknowledgement.
///
/// An `Error` ack fails the whole batch immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// OK accepts the event; ERROR fails its batch.
    pub status: Status,
    /// Human-readable explanation.
    pub comment: String,
    /// Optional payload forwarded to the batch caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Ack {
    /// Accepts the event.
    pub fn ok(comment: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            comment: comment.into(),
            data: None,
        }
    }

    /// Rejects the event, failing its batch.
    pub fn error(comment: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            comment: comment.into(),
            data: None,
        }
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Accepted acknowledgement on its way to the dispatcher.
///
/// Serializes to the entry appended to the batch output:
/// `{"topic": .., "status": .., "comment": .., "data"?: ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AckReply {
    /// Owning batch.
    #[serde(skip)]
    pub batch: BatchId,
    /// Topic of the acknowledged event.
    pub topic: String,
    #[serde(flatten)]
    pub ack: Ack,
}

impl AckReply {
    /// JSON form of the reply, as stored in the batch output.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_flattens_ack() {
        let reply = AckReply {
            batch: BatchId::next(),
            topic: "disk.full".into(),
            ack: Ack::ok("cleaned").with_data(json!({"freed": 12})),
        };
        assert_eq!(
            reply.to_value(),
            json!({"topic": "disk.full", "status": "OK", "comment": "cleaned", "data": {"freed": 12}})
        );
    }
}
