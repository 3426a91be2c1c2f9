//! # LogListener: event printer
//!
//! A minimal listener that logs every delivered [`Event`] through `tracing`.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! INFO hubcast: event delivered listener="log" topic="disk.full" batch=#3 ack_required=true data={"used":0.97}
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::events::{Ack, Event};
use crate::listeners::Listen;

/// Event logging listener.
#[derive(Debug, Default)]
pub struct LogListener {
    acknowledge: bool,
}

impl LogListener {
    /// Logs events and never answers them.
    #[must_use]
    pub fn new() -> Self {
        Self { acknowledge: false }
    }

    /// Logs events and answers those requiring acknowledgement with OK.
    #[must_use]
    pub fn acking() -> Self {
        Self { acknowledge: true }
    }
}

#[async_trait]
impl Listen for LogListener {
    async fn on_event(&self, e: &Arc<Event>) -> Option<Ack> {
        let batch = e.batch().map(|b| b.to_string()).unwrap_or_default();
        info!(
            listener = "log",
            topic = %e.topic,
            batch = %batch,
            ack_required = e.ack_required,
            data = %serde_json::Value::Object(e.data.clone()),
            "event delivered"
        );

        (self.acknowledge && e.ack_required).then(|| Ack::ok("logged"))
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;
    use crate::events::Status;

    #[tokio::test]
    async fn acking_answers_only_acknowledged_events() {
        let acking = LogListener::acking();
        let wanted = Arc::new(Event::new("disk.full", true));
        let ack = acking.on_event(&wanted).await.expect("ack");
        assert_eq!(ack.status, Status::Ok);
        assert_eq!(ack.comment, "logged");

        let fire_and_forget = Arc::new(Event::new("disk.full", false));
        assert!(acking.on_event(&fire_and_forget).await.is_none());
    }

    #[tokio::test]
    async fn plain_listener_never_answers() {
        let quiet = LogListener::new();
        assert_eq!(quiet.name(), "log");
        assert!(quiet.on_event(&Arc::new(Event::new("disk", true))).await.is_none());
    }
}
