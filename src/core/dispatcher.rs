//! # Dispatcher: the single task that makes every routing decision.
//!
//! The dispatcher owns the [`Audience`] tree and the ledger of batches still
//! waiting for acknowledgements. It handles one envelope at a time, so events of
//! a batch are broadcast strictly in arrival order and the tree needs no lock.
//!
//! ## Architecture
//! ```text
//! Router::submit ──┐
//! Router::register ┼──► [inbound queue] ──► Dispatcher::run()
//! Event::acknowledge┘                          ├─► Register / Unregister ─► Audience
//!                                              ├─► Batch ─► broadcast each event ─► listener queues
//!                                              │             ├─ stalled send    ─► release ERROR
//!                                              │             ├─ unreachable ack ─► release ERROR
//!                                              │             ├─ no acks needed  ─► release OK
//!                                              │             └─ otherwise       ─► ledger (+ expiry)
//!                                              ├─► Ack ─► ledger: count, release OK at zero
//!                                              └─► expiry ─► release ERROR
//! ```
//!
//! ## Rules
//! - A batch is released **exactly once**: its ledger entry is removed before the
//!   endstate is sent on the batch's capacity-one reply destination.
//! - Acks for batches that are no longer in the ledger are dropped.
//! - Routing failures never stop the dispatcher.
//! - Sends to listener queues wait while the queue is full. A listener that blocks on
//!   acknowledging while its own queue is full can therefore stall routing.
//! - A stalled send gives up at the batch's acknowledgement deadline (counted from
//!   arrival) or at shutdown; the batch is then released with ERROR and the rest of
//!   it is not routed.
//! - An unreachable acknowledged event does not stop routing; the batch is released
//!   with ERROR once every event was broadcast.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::{self, Instant};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tokio_util::time::{DelayQueue, delay_queue};
use tracing::{debug, info, warn};

use super::command::{Command, Listener, kind};
use super::config::Config;
use crate::audience::Audience;
use crate::envelope::{Envelope, Inbox};
use crate::events::{AckReply, BatchId, Endstate, Event, Status};

/// Why a listener send was abandoned.
enum Interrupted {
    /// The batch's acknowledgement deadline passed.
    Deadline,
    /// The router is shutting down.
    Shutdown,
}

/// Batch waiting for acknowledgements.
struct Pending {
    /// The inbound envelope; answering it releases the caller.
    release: Envelope<Command, Endstate>,
    /// Acknowledgements still needed.
    outstanding: usize,
    /// Acknowledgements counted so far.
    received: usize,
    /// Accepted replies, in arrival order.
    replies: Vec<Value>,
    /// Entry in the expiry queue, if a timeout is configured.
    expiry: Option<delay_queue::Key>,
}

pub(crate) struct Dispatcher {
    audience: Audience<Listener>,
    pending: HashMap<BatchId, Pending>,
    expiry: DelayQueue<BatchId>,
    inbox: Inbox<Command, Endstate>,
    ack_timeout: Option<Duration>,
    token: CancellationToken,
}

impl Dispatcher {
    pub(crate) fn new(
        inbox: Inbox<Command, Endstate>,
        cfg: &Config,
        token: CancellationToken,
    ) -> Self {
        Self {
            audience: Audience::new(),
            pending: HashMap::new(),
            expiry: DelayQueue::new(),
            inbox,
            ack_timeout: cfg.ack_timeout(),
            token,
        }
    }

    /// Processes envelopes until the token is cancelled or every sender is gone.
    ///
    /// Batches still pending at exit are released with an ERROR endstate.
    pub(crate) async fn run(mut self) {
        info!(ack_timeout = ?self.ack_timeout, "dispatcher started");
        let token = self.token.clone();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                msg = self.inbox.recv() => match msg {
                    Some(env) => self.handle(env).await,
                    None => break,
                },
                Some(expired) = self.expiry.next(), if !self.expiry.is_empty() => {
                    self.expire(expired.into_inner()).await;
                }
            }
        }

        self.release_all("router shutting down").await;
        info!("dispatcher stopped");
    }

    async fn handle(&mut self, env: Envelope<Command, Endstate>) {
        debug!(kind = env.kind, command = env.request.as_label(), "dispatch");

        let (id, events) = match &env.request {
            Command::Register { topic, listener } => {
                self.audience.add_listener(topic, listener.clone());
                debug!(topic = %topic, "listener registered");
                return;
            }
            Command::Unregister { topic, listener } => {
                self.audience.remove_listener(topic, listener);
                debug!(topic = %topic, "listener unregistered");
                return;
            }
            Command::Ack(reply) => {
                let reply = reply.clone();
                self.acknowledge(reply).await;
                return;
            }
            Command::Batch(batch) => (batch.id, batch.events.clone()),
        };
        self.route(id, events, env).await;
    }

    /// Broadcasts every event of a batch in order and decides its fate.
    async fn route(
        &mut self,
        id: BatchId,
        events: Vec<Arc<Event>>,
        release: Envelope<Command, Endstate>,
    ) {
        let deadline = self.ack_timeout.map(|t| Instant::now() + t);
        let mut outstanding = 0usize;
        let mut unreachable: Vec<&str> = Vec::new();

        for event in &events {
            let delivered = match self.broadcast(event, deadline).await {
                Ok(delivered) => delivered,
                Err(Interrupted::Deadline) => {
                    warn!(batch = %id, topic = %event.topic, "listener queue stalled past the deadline");
                    let comment = format!("acknowledgement timeout: routing stalled on {}", event.topic);
                    Self::answer(id, release, Endstate::error(comment)).await;
                    return;
                }
                Err(Interrupted::Shutdown) => {
                    Self::answer(id, release, Endstate::error("router shutting down")).await;
                    return;
                }
            };
            if event.ack_required {
                if delivered {
                    outstanding += 1;
                } else {
                    unreachable.push(&event.topic);
                }
            }
        }

        if !unreachable.is_empty() {
            warn!(batch = %id, topics = ?unreachable, "no listener for acknowledged event");
            let comment = format!("no listener for {}", unreachable.join(", "));
            Self::answer(id, release, Endstate::error(comment)).await;
            return;
        }

        if outstanding == 0 {
            debug!(batch = %id, events = events.len(), "batch routed");
            let comment = format!("{} event(s) routed", events.len());
            Self::answer(id, release, Endstate::ok(comment)).await;
            return;
        }

        let expiry = deadline.map(|at| self.expiry.insert_at(id, at));
        debug!(batch = %id, outstanding, "batch waiting for acknowledgements");
        self.pending.insert(
            id,
            Pending {
                release,
                outstanding,
                received: 0,
                replies: Vec::with_capacity(outstanding),
                expiry,
            },
        );
    }

    /// Sends `event` to every matching listener. Closed listeners are pruned.
    ///
    /// Returns `Ok(true)` if at least one listener accepted the event. A send still
    /// waiting on a full queue at `deadline` or at shutdown aborts the broadcast.
    async fn broadcast(
        &mut self,
        event: &Arc<Event>,
        deadline: Option<Instant>,
    ) -> Result<bool, Interrupted> {
        let mut delivered = false;

        for listener in self.audience.matching(&event.topic) {
            let sent = tokio::select! {
                biased;
                _ = self.token.cancelled() => return Err(Interrupted::Shutdown),
                sent = listener.send(Envelope::new(kind::EVENT, Arc::clone(event))) => sent,
                _ = until(deadline) => return Err(Interrupted::Deadline),
            };
            match sent {
                Ok(()) => delivered = true,
                Err(_) => {
                    warn!(topic = %event.topic, "listener closed; unregistering");
                    self.audience.remove_listener(&event.topic, &listener);
                }
            }
        }
        Ok(delivered)
    }

    async fn acknowledge(&mut self, reply: AckReply) {
        let id = reply.batch;
        let Some(pending) = self.pending.get_mut(&id) else {
            debug!(batch = %id, topic = %reply.topic, "ack for released batch dropped");
            return;
        };

        if reply.ack.status == Status::Error {
            let comment = format!("listener rejected {}: {}", reply.topic, reply.ack.comment);
            self.release(id, Endstate::error(comment).with_data(Value::Array(vec![reply.to_value()])))
                .await;
            return;
        }

        pending.replies.push(reply.to_value());
        pending.received += 1;
        pending.outstanding = pending.outstanding.saturating_sub(1);
        debug!(batch = %id, outstanding = pending.outstanding, "ack counted");

        if pending.outstanding == 0 {
            let comment = format!("{} acknowledgement(s) received", pending.received);
            let data = Value::Array(std::mem::take(&mut pending.replies));
            self.release(id, Endstate::ok(comment).with_data(data)).await;
        }
    }

    /// Releases a batch whose acknowledgement deadline passed.
    async fn expire(&mut self, id: BatchId) {
        let Some(mut pending) = self.pending.remove(&id) else {
            return;
        };
        // The key was consumed by the expiry queue.
        pending.expiry = None;

        warn!(batch = %id, outstanding = pending.outstanding, "acknowledgement timeout");
        let comment = format!(
            "acknowledgement timeout: {} of {} missing",
            pending.outstanding,
            pending.outstanding + pending.received
        );
        let data = Value::Array(pending.replies);
        Self::answer(id, pending.release, Endstate::error(comment).with_data(data)).await;
    }

    /// Removes a batch from the ledger and answers its caller.
    async fn release(&mut self, id: BatchId, endstate: Endstate) {
        if let Some(mut pending) = self.pending.remove(&id) {
            if let Some(key) = pending.expiry.take() {
                self.expiry.remove(&key);
            }
            Self::answer(id, pending.release, endstate).await;
        }
    }

    async fn release_all(&mut self, reason: &str) {
        self.expiry.clear();
        for (id, pending) in std::mem::take(&mut self.pending) {
            Self::answer(id, pending.release, Endstate::error(reason)).await;
        }
    }

    async fn answer(id: BatchId, release: Envelope<Command, Endstate>, endstate: Endstate) {
        debug!(batch = %id, status = ?endstate.status, "batch released");
        if release.send_response(endstate, None).await.is_err() {
            debug!(batch = %id, "batch caller went away");
        }
    }
}

/// Completes at `deadline`, or never when there is none.
async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
