//! # Ingestion adapter.
//!
//! Turns inbound bytes into a batch, hands it to the router, and turns the
//! released [`Endstate`](crate::Endstate) back into bytes. Transport is up to the
//! caller: an HTTP handler, a socket reader, or a test all call [`ingest`] the same way.
//!
//! ```text
//! bytes ──► decode ──► Vec<Event> ──► Router::submit ──(blocks until release)──► Reply ──► encode ──► bytes
//!             │                             │
//!             └─ malformed: ERROR reply     └─ router closed: ERROR reply
//! ```
//!
//! ## Inbound format
//! ```json
//! {"events": [{"topic": "disk.full", "ack": true, "data": {"used": 0.97}}]}
//! ```
//! `{"events": {...}}` and a bare event object are normalized into a one-element batch.
//! `ack` defaults to `false` and `data` to an empty object.
//!
//! ## Outbound format
//! ```json
//! {"endstate": {"status": "OK", "comment": "1 acknowledgement(s) received", "data": [...]}}
//! ```

mod wire;

pub use wire::{decode, encode};

use tracing::debug;

use crate::core::Router;
use crate::events::{Endstate, Reply};

/// Decodes `bytes`, submits the batch, and waits for its release.
///
/// Never fails: decoding errors and a closed router are reported as an ERROR reply.
/// Malformed input never reaches the dispatcher.
pub async fn ingest(router: &Router, bytes: &[u8]) -> Reply {
    let events = match decode(bytes) {
        Ok(events) => events,
        Err(e) => {
            debug!(error = e.as_label(), "rejecting inbound batch");
            return Endstate::error(e.as_message()).into();
        }
    };

    match router.submit(events).await {
        Ok(endstate) => endstate.into(),
        Err(e) => Endstate::error(e.as_message()).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, Status, envelope};

    #[tokio::test]
    async fn malformed_input_gets_error_reply() {
        let router = Router::builder(Config::default()).build();
        let reply = ingest(&router, b"{\"events\": 5}").await;
        assert_eq!(reply.endstate.status, Status::Error);
        assert!(reply.endstate.comment.starts_with("cannot decode events"));
        router.shutdown().await;
    }

    #[tokio::test]
    async fn closed_router_gets_error_reply() {
        let router = Router::builder(Config::default()).build();
        router.shutdown().await;
        let reply = ingest(&router, br#"{"topic": "a"}"#).await;
        assert_eq!(reply.endstate.status, Status::Error);
        assert_eq!(reply.endstate.comment, "router is not running");
    }

    #[tokio::test]
    async fn acknowledged_batch_round_trips_to_bytes() {
        let router = Router::builder(Config::default()).build();
        let (listener, mut inbox) = envelope::channel(4);
        router.register("disk", &listener).unwrap();
        tokio::spawn(async move {
            while let Some(env) = inbox.recv().await {
                let _ = env.request.acknowledge(crate::Ack::ok("fine")).await;
            }
        });

        let reply = ingest(&router, br#"{"events": {"topic": "disk.sda", "ack": true}}"#).await;
        let out: serde_json::Value = serde_json::from_slice(&encode(&reply)).unwrap();
        assert_eq!(out["endstate"]["status"], "OK");
        assert_eq!(out["endstate"]["data"][0]["topic"], "disk.sda");
        assert_eq!(out["endstate"]["data"][0]["comment"], "fine");
        router.shutdown().await;
    }
}
