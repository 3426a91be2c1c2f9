//! # hubcast
//!
//! **Hubcast** is an in-process, topic-routed event router for tokio applications.
//!
//! Producers submit *batches* of events; listeners subscribe to dot-separated topic
//! prefixes; events that require acknowledgement hold their batch open until a
//! listener answers. A single dispatcher task serializes every routing decision, so
//! the topic tree needs no lock. A small periodic scheduler ([`Tickler`]) lets any
//! task receive timed wake-ups as ordinary messages.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ingest(bytes) / Router::submit(events)        Router::register / Router::listen
//!              │ (blocks until release)                       │
//!              ▼                                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │              dispatcher queue (Config::queue_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (single task)                                         │
//! │  - Audience tree (topic prefix ─► listener destinations)          │
//! │  - Pending batches (outstanding acks, release signal, expiry)     │
//! └──────┬──────────────────┬──────────────────┬───────────────▲──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  listener    │   │  listener    │   │  listener    │   │
//!     │  "disk"      │   │  "disk.sda"  │   │  "net"       │   │
//!     └──────┬───────┘   └──────┬───────┘   └──────────────┘   │
//!            └──── event.acknowledge(ack) (first reply wins) ───┘
//! ```
//!
//! ### Batch life cycle
//! ```text
//! submit(events) ──► Dispatcher
//!
//! for event in batch (in order) {
//!   ├─► broadcast along the topic path, root ─► leaf
//!   ├─► ack required and nobody reached ─► remember topic, keep routing
//!   └─► listener queue full past the deadline, or shutdown ─► release ERROR, stop
//! }
//! ├─► any unreachable topic ─► release ERROR (naming every such topic)
//! ├─► no ack required ─► release OK
//! └─► otherwise pending:
//!       ├─ OK ack      ─► outstanding -= 1, release OK at zero (data = replies)
//!       ├─ ERROR ack   ─► release ERROR
//!       ├─ ack timeout ─► release ERROR
//!       └─ shutdown    ─► release ERROR
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------|
//! | **Routing**       | Submit batches, register listeners, shut down.               | [`Router`], [`RouterBuilder`], [`Config`]  |
//! | **Events**        | Routable units, acknowledgements, batch outcomes.            | [`Event`], [`Ack`], [`Endstate`]           |
//! | **Listeners**     | Managed consumers with panic isolation.                      | [`Listen`], [`ListenerHandle`]             |
//! | **Topic tree**    | Prefix matching over dot-separated topics.                   | [`Audience`]                               |
//! | **Envelopes**     | Typed request/response messages over bounded queues.         | [`envelope::Envelope`], [`envelope::Destination`] |
//! | **Tickler**       | Periodic messages without hand-rolled timers.                | [`Tickler`]                                |
//! | **Ingestion**     | JSON bytes in, JSON endstate out.                            | [`ingest::ingest`]                         |
//! | **Errors**        | Typed errors for envelopes, the router and the tickler.      | [`RouterError`], [`EnvelopeError`], [`TickleError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use hubcast::{Ack, Config, Event, Listen, Router, Status};
//!
//! struct Disk;
//!
//! #[async_trait]
//! impl Listen for Disk {
//!     async fn on_event(&self, ev: &Arc<Event>) -> Option<Ack> {
//!         Some(Ack::ok(format!("handled {}", ev.topic)))
//!     }
//!     fn name(&self) -> &'static str { "disk" }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let router = Router::builder(Config::default()).build();
//!     let _disk = router.listen("disk", Disk)?;
//!
//!     let endstate = router
//!         .submit(vec![
//!             Event::new("disk.sda", true),
//!             Event::new("net.eth0", false),
//!         ])
//!         .await?;
//!     assert_eq!(endstate.status, Status::Ok);
//!
//!     router.shutdown().await;
//!     Ok(())
//! }
//! ```
mod audience;
mod core;
pub mod envelope;
mod error;
mod events;
pub mod ingest;
mod listeners;
mod tickler;

// ---- Public re-exports ----

pub use audience::Audience;
pub use crate::core::{Command, Config, Listener, MAX_ACK_TIMEOUT, Router, RouterBuilder, kind};
pub use error::{EnvelopeError, RouterError, TickleError};
pub use events::{Ack, AckReply, Batch, BatchId, Endstate, Event, Reply, Status};
pub use listeners::{Listen, ListenerHandle};
pub use tickler::{DEFAULT_CAPACITY, MAX_CAPACITY, MAX_DELAY, MIN_DELAY, SpotId, Tickler};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
