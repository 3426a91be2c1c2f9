//! # The envelope itself.
//!
//! ## Example
//! ```rust
//! use hubcast::envelope::{Envelope, channel};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (service, mut service_inbox) = channel::<u32, u32>(8);
//! let (reply, mut reply_inbox) = channel::<u32, u32>(1);
//!
//! tokio::spawn(async move {
//!     while let Some(env) = service_inbox.recv().await {
//!         let doubled = env.request * 2;
//!         let _ = env.send_response(doubled, None).await;
//!     }
//! });
//!
//! Envelope::send_request(&service, Some(reply), 7, 21, None).await.unwrap();
//! let answered = reply_inbox.recv().await.unwrap();
//! assert_eq!(answered.response, Some(42));
//! assert!(answered.state.is_none());
//! # }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::destination::Destination;
use crate::error::EnvelopeError;

/// Opaque data meaningful only to the original sender (asynchronous correlation).
pub type Private = Arc<dyn Any + Send + Sync>;

/// Recoverable error carried back as the completion state of a request.
pub type Fault = Arc<dyn std::error::Error + Send + Sync>;

/// One request travelling between tasks, with its (eventual) response.
///
/// - `kind`: application-defined message kind
/// - `request`: outbound payload, set by the sender
/// - `response` / `state`: set by the receiver that owns the reply step
/// - `private`: carried through untouched for the sender's own correlation
pub struct Envelope<Req, Resp = ()> {
    /// Application-defined message kind.
    pub kind: u32,
    /// Request payload.
    pub request: Req,
    /// Response payload, populated on reply.
    pub response: Option<Resp>,
    /// Requestor-private payload.
    pub private: Option<Private>,
    /// Completion state; `None` on success.
    pub state: Option<Fault>,

    reply_to: Option<Destination<Req, Resp>>,
}

impl<Req, Resp> Envelope<Req, Resp> {
    /// Creates an envelope with empty response fields and no reply destination.
    pub fn new(kind: u32, request: Req) -> Self {
        Self {
            kind,
            request,
            response: None,
            private: None,
            state: None,
            reply_to: None,
        }
    }

    /// Attaches requestor-private data.
    #[inline]
    pub fn with_private(mut self, private: Private) -> Self {
        self.private = Some(private);
        self
    }

    /// Attaches the destination the response must be sent to.
    #[inline]
    pub fn with_reply_to(mut self, reply_to: Destination<Req, Resp>) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Returns the recorded reply destination, if any.
    #[inline]
    pub fn reply_to(&self) -> Option<&Destination<Req, Resp>> {
        self.reply_to.as_ref()
    }

    /// Returns `true` if the sender is waiting for a response.
    #[inline]
    pub fn expects_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Builds an envelope and places it on `dest`.
    ///
    /// Waits while `dest` is full. Fails only if `dest` is closed.
    pub async fn send_request(
        dest: &Destination<Req, Resp>,
        reply_to: Option<Destination<Req, Resp>>,
        kind: u32,
        request: Req,
        private: Option<Private>,
    ) -> Result<(), EnvelopeError> {
        let envelope = Self {
            kind,
            request,
            response: None,
            private,
            state: None,
            reply_to,
        };
        dest.send(envelope).await
    }

    /// Fills the response fields and sends the envelope back to its reply destination.
    ///
    /// Must only be called by the task currently holding the envelope as a request.
    /// The reply destination is consumed, so an envelope is answered at most once.
    pub async fn send_response(
        mut self,
        response: Resp,
        state: Option<Fault>,
    ) -> Result<(), EnvelopeError> {
        let reply_to = self
            .reply_to
            .take()
            .ok_or(EnvelopeError::NoReplyDestination)?;
        self.response = Some(response);
        self.state = state;
        reply_to.send(self).await
    }
}

impl<Req: fmt::Debug, Resp: fmt::Debug> fmt::Debug for Envelope<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("kind", &self.kind)
            .field("request", &self.request)
            .field("response", &self.response)
            .field("private", &self.private.is_some())
            .field("state", &self.state.as_ref().map(|s| s.to_string()))
            .field("reply_to", &self.reply_to.is_some())
            .finish()
    }
}
