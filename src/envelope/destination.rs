//! # Bounded envelope queues.
//!
//! [`Destination`] is the sending half (cheap to clone, compared by channel identity),
//! [`Inbox`] the receiving half. Both wrap [`tokio::sync::mpsc`].

use std::fmt;

use tokio::sync::mpsc;

use super::message::Envelope;
use crate::error::EnvelopeError;

/// Creates a bounded envelope queue.
///
/// The minimum capacity is 1 (clamped).
pub fn channel<Req, Resp>(capacity: usize) -> (Destination<Req, Resp>, Inbox<Req, Resp>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Destination { tx }, Inbox { rx })
}

/// Sending half of an envelope queue.
///
/// Two destinations are equal when they feed the same queue.
pub struct Destination<Req, Resp = ()> {
    tx: mpsc::Sender<Envelope<Req, Resp>>,
}

impl<Req, Resp> Destination<Req, Resp> {
    /// Places an envelope on the queue, waiting while it is full.
    pub async fn send(&self, envelope: Envelope<Req, Resp>) -> Result<(), EnvelopeError> {
        self.tx
            .send(envelope)
            .await
            .map_err(|_| EnvelopeError::Closed)
    }

    /// Places an envelope on the queue without waiting.
    pub fn try_send(&self, envelope: Envelope<Req, Resp>) -> Result<(), EnvelopeError> {
        self.tx.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => EnvelopeError::Full,
            mpsc::error::TrySendError::Closed(_) => EnvelopeError::Closed,
        })
    }

    /// Returns `true` once the receiving [`Inbox`] has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<Req, Resp> Clone for Destination<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<Req, Resp> PartialEq for Destination<Req, Resp> {
    fn eq(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

impl<Req, Resp> Eq for Destination<Req, Resp> {}

impl<Req, Resp> fmt::Debug for Destination<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("capacity", &self.tx.max_capacity())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Receiving half of an envelope queue.
pub struct Inbox<Req, Resp = ()> {
    rx: mpsc::Receiver<Envelope<Req, Resp>>,
}

impl<Req, Resp> Inbox<Req, Resp> {
    /// Receives the next envelope, or `None` once every [`Destination`] is dropped.
    pub async fn recv(&mut self) -> Option<Envelope<Req, Resp>> {
        self.rx.recv().await
    }

    /// Receives without waiting.
    pub fn try_recv(&mut self) -> Option<Envelope<Req, Resp>> {
        self.rx.try_recv().ok()
    }

    /// Stops accepting new envelopes; already queued ones can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

impl<Req, Resp> fmt::Debug for Inbox<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox").field("queued", &self.rx.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations_compare_by_channel() {
        let (a, _ia) = channel::<u8, ()>(1);
        let (b, _ib) = channel::<u8, ()>(1);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn try_send_reports_full_and_closed() {
        let (dest, mut inbox) = channel::<u8, ()>(1);
        dest.try_send(Envelope::new(1, 1)).unwrap();
        assert_eq!(
            dest.try_send(Envelope::new(1, 2)).unwrap_err(),
            EnvelopeError::Full
        );

        assert_eq!(inbox.recv().await.map(|e| e.request), Some(1));
        drop(inbox);
        assert!(dest.is_closed());
        assert_eq!(
            dest.send(Envelope::new(1, 3)).await.unwrap_err(),
            EnvelopeError::Closed
        );
    }
}
