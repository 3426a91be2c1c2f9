//! # Per-batch outcome.
//!
//! Serialized as `{"endstate": {"status": "OK"|"ERROR", "comment": "...", "data": ...}}`;
//! `data` is omitted when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome classification shared by endstates and acknowledgements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// Final answer for one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endstate {
    /// OK or ERROR.
    pub status: Status,
    /// Human-readable summary.
    pub comment: String,
    /// Application payload (acknowledgement replies for acked batches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Endstate {
    /// Creates a successful endstate.
    pub fn ok(comment: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            comment: comment.into(),
            data: None,
        }
    }

    /// Creates a failed endstate.
    pub fn error(comment: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            comment: comment.into(),
            data: None,
        }
    }

    /// Attaches an application payload.
    #[inline]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Wire wrapper written once per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub endstate: Endstate,
}

impl From<Endstate> for Reply {
    fn from(endstate: Endstate) -> Self {
        Self { endstate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_wire_shape() {
        let reply = Reply::from(Endstate::ok("done"));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"endstate": {"status": "OK", "comment": "done"}})
        );

        let reply = Reply::from(Endstate::error("no listener").with_data(json!([1])));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"endstate": {"status": "ERROR", "comment": "no listener", "data": [1]}})
        );
    }
}
