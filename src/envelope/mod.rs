//! Request/response envelopes passed between tasks.
//!
//! An [`Envelope`] carries a typed request to a [`Destination`] and, when the
//! sender attached a reply destination, brings the response back on it.
//! This is the only scheduling primitive used for synchronous request/response
//! inside the router: the requester awaits its own [`Inbox`] until the single
//! receiver that owns the reply step answers.
//!
//! ## Contents
//! - [`Envelope`] message with request, response, private correlation data and completion state
//! - [`Destination`] / [`Inbox`] the two halves of a bounded queue of envelopes
//!
//! ## Flow
//! ```text
//! requester                                   receiver
//!    │  send_request(dest, Some(reply), ..)      │
//!    ├──────────────► [dest queue] ─────────────►│ recv()
//!    │                                           │ ... work ...
//!    │◄────────────── [reply queue] ◄────────────┤ send_response(resp, state)
//!    │ reply_inbox.recv()
//! ```
//!
//! ## Rules
//! - A sender that supplies a reply destination must not reuse the envelope concurrently.
//! - `send` on a full destination waits; `try_send` never waits.

mod destination;
mod message;

pub use destination::{Destination, Inbox, channel};
pub use message::{Envelope, Fault, Private};
