//! Routed events: data model and acknowledgement life cycle.
//!
//! This module groups everything that travels through the router:
//! the [`Event`] itself, the [`Batch`] it arrived in, the [`Ack`] a listener
//! answers with, and the [`Endstate`] the batch caller finally receives.
//!
//! ## Contents
//! - [`Event`] one routable unit with its acknowledgement guard
//! - [`Ack`], [`AckReply`] listener answers and the command that carries them
//! - [`Batch`], [`BatchId`] events submitted together
//! - [`Endstate`], [`Status`], [`Reply`] the per-batch outcome and its wire wrapper
//!
//! ## Life cycle
//! ```text
//! created ──► broadcast ──► (acknowledged) ──► retired
//!   │             │               │                │
//!   decode     audience      first reply      batch released
//!              matching       accepted,        (endstate sent
//!                             others dropped    exactly once)
//! ```

mod ack;
mod batch;
mod endstate;
mod event;

pub use ack::{Ack, AckReply};
pub use batch::{Batch, BatchId};
pub use endstate::{Endstate, Reply, Status};
pub use event::Event;
