//! # Listener trait.
//!
//! Provides [`Listen`], the extension point for plugging event consumers into a router.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use hubcast::{Ack, Event, Listen};
//!
//! struct DiskAlarm;
//!
//! #[async_trait]
//! impl Listen for DiskAlarm {
//!     async fn on_event(&self, ev: &Arc<Event>) -> Option<Ack> {
//!         match ev.data.get("used").and_then(|v| v.as_f64()) {
//!             Some(used) if used > 0.9 => Some(Ack::error("disk almost full")),
//!             _ => Some(Ack::ok("disk fine")),
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "disk-alarm" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::events::{Ack, Event};

/// Event consumer driven by a router-owned worker.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return `Some(ack)` for events that require acknowledgement. The answer is
///   ignored for events that do not; only the first answer per event counts.
/// - Handle errors internally; a panic is caught but leaves the event unanswered.
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Processes one delivered event and optionally answers it.
    async fn on_event(&self, event: &Arc<Event>) -> Option<Ack>;

    /// Name used in logs.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose; override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity for this listener.
    ///
    /// `None` uses [`Config::listener_capacity`](crate::Config::listener_capacity).
    /// The runtime clamps capacity to a minimum of 1.
    fn queue_capacity(&self) -> Option<usize> {
        None
    }
}
