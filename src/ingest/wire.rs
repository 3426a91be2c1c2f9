use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RouterError;
use crate::events::{Event, Reply};

/// One event object as it appears on the wire.
#[derive(Debug, Deserialize)]
struct WireEvent {
    topic: String,
    #[serde(default)]
    ack: bool,
    #[serde(default)]
    data: Map<String, Value>,
}

impl From<WireEvent> for Event {
    fn from(w: WireEvent) -> Self {
        Event::new(w.topic, w.ack).with_data(w.data)
    }
}

/// Decodes an inbound payload into events, in wire order.
///
/// ### Errors
/// [`RouterError::Malformed`] if the bytes are not JSON, the top level is not an
/// object, `events` is neither an object nor an array, or an event lacks a string `topic`.
pub fn decode(bytes: &[u8]) -> Result<Vec<Event>, RouterError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Object(mut obj) = value else {
        return Err(malformed("expected a JSON object"));
    };

    let wire: Vec<WireEvent> = match obj.remove("events") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?,
        Some(single @ Value::Object(_)) => vec![serde_json::from_value(single)?],
        Some(_) => return Err(malformed("`events` must be an object or an array")),
        None => vec![serde_json::from_value(Value::Object(obj))?],
    };

    Ok(wire.into_iter().map(Event::from).collect())
}

/// Encodes a reply as `{"endstate": {...}}`.
pub fn encode(reply: &Reply) -> Vec<u8> {
    serde_json::to_vec(reply).unwrap_or_default()
}

fn malformed(reason: &str) -> RouterError {
    RouterError::Malformed {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Endstate;
    use serde_json::json;

    #[test]
    fn wrapped_array_keeps_order_and_defaults() {
        let events = decode(
            br#"{"events": [
                {"topic": "a.b", "ack": true, "data": {"n": 1}},
                {"topic": "c"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].topic, "a.b");
        assert!(events[0].ack_required);
        assert_eq!(events[0].data["n"], json!(1));
        assert_eq!(events[1].topic, "c");
        assert!(!events[1].ack_required);
        assert!(events[1].data.is_empty());
    }

    #[test]
    fn single_objects_are_normalized() {
        let wrapped = decode(br#"{"events": {"topic": "x"}}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped[0].topic, "x");

        let bare = decode(br#"{"topic": "y", "ack": true}"#).unwrap();
        assert_eq!(bare.len(), 1);
        assert!(bare[0].ack_required);
    }

    #[test]
    fn empty_array_is_an_empty_batch() {
        assert!(decode(br#"{"events": []}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for bad in [
            &b"not json"[..],
            br#"[{"topic": "a"}]"#,
            br#"{"events": "a"}"#,
            br#"{"events": [{"ack": true}]}"#,
            br#"{"topic": 7}"#,
            br#"{"topic": "a", "data": [1, 2]}"#,
        ] {
            let err = decode(bad).unwrap_err();
            assert_eq!(err.as_label(), "router_malformed", "input {:?}", String::from_utf8_lossy(bad));
        }
    }

    #[test]
    fn encode_wraps_endstate() {
        let reply = Reply::from(Endstate::error("no listener for a"));
        let out: Value = serde_json::from_slice(&encode(&reply)).unwrap();
        assert_eq!(
            out,
            json!({"endstate": {"status": "ERROR", "comment": "no listener for a"}})
        );
    }
}
