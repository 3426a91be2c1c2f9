//! # Router: the handle every component talks to.
//!
//! A [`Router`] is constructed once at start-up (see [`RouterBuilder`](super::RouterBuilder))
//! and cloned into every task that publishes batches or registers listeners.
//! It replaces process-wide globals: the dispatcher queue lives inside the handle.
//!
//! ## Send behavior per call site
//! | Call | Queue full | Dispatcher gone |
//! |---|---|---|
//! | [`Router::register`] / [`Router::unregister`] | `Err(Busy)`, never waits | `Err(Closed)` |
//! | [`Router::submit`] | waits for space | `Err(Closed)` |
//! | [`Event::acknowledge`](crate::Event::acknowledge) | waits for space | `Err(Closed)` |
//!
//! ## Example
//! ```rust
//! use hubcast::{Ack, Config, Event, Router, Status, envelope};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), hubcast::RouterError> {
//! let router = Router::builder(Config::default()).build();
//!
//! let (listener, mut inbox) = envelope::channel(16);
//! router.register("disk", &listener)?;
//!
//! tokio::spawn(async move {
//!     while let Some(env) = inbox.recv().await {
//!         let _ = env.request.acknowledge(Ack::ok("seen")).await;
//!     }
//! });
//!
//! let endstate = router.submit(vec![Event::new("disk.full", true)]).await?;
//! assert_eq!(endstate.status, Status::Ok);
//!
//! router.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::command::{Command, DispatchDest, Listener, kind};
use super::config::Config;
use crate::envelope::{self, Envelope};
use crate::error::RouterError;
use crate::events::{Batch, Endstate, Event};

struct Inner {
    cfg: Config,
    dispatcher: DispatchDest,
    token: CancellationToken,
    join: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to a running dispatcher.
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

impl Router {
    pub(crate) fn from_parts(
        cfg: Config,
        dispatcher: DispatchDest,
        token: CancellationToken,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                dispatcher,
                token,
                join: Mutex::new(Some(join)),
            }),
        }
    }

    /// Configuration the router was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// Subscribes `listener` to `topic` and all of its descendants.
    ///
    /// Fire-and-forget: no confirmation is returned, but registrations are applied
    /// in order with batches submitted afterwards through the same router.
    pub fn register(&self, topic: impl Into<String>, listener: &Listener) -> Result<(), RouterError> {
        let topic = topic.into();
        debug!(topic = %topic, "register requested");
        self.post(Command::Register {
            topic,
            listener: listener.clone(),
        })
    }

    /// Removes `listener` from `topic` (and from every prefix node of `topic`).
    pub fn unregister(&self, topic: impl Into<String>, listener: &Listener) -> Result<(), RouterError> {
        let topic = topic.into();
        debug!(topic = %topic, "unregister requested");
        self.post(Command::Unregister {
            topic,
            listener: listener.clone(),
        })
    }

    fn post(&self, cmd: Command) -> Result<(), RouterError> {
        if self.inner.token.is_cancelled() {
            return Err(RouterError::Closed);
        }
        self.inner
            .dispatcher
            .try_send(Envelope::new(cmd.kind(), cmd))
            .map_err(RouterError::from)
    }

    /// Routes a batch and waits until it is released.
    ///
    /// Routing outcomes (unreachable topic, rejected or missing acknowledgement) are
    /// reported through the returned [`Endstate`]; `Err` means the router is gone.
    pub async fn submit(&self, events: Vec<Event>) -> Result<Endstate, RouterError> {
        if self.inner.token.is_cancelled() {
            return Err(RouterError::Closed);
        }
        let batch = Batch::assemble(events, &self.inner.dispatcher);
        let id = batch.id;
        let (release, mut released) = envelope::channel::<Command, Endstate>(1);

        debug!(batch = %id, events = batch.len(), "submitting batch");
        Envelope::send_request(
            &self.inner.dispatcher,
            Some(release),
            kind::BATCH,
            Command::Batch(batch),
            None,
        )
        .await?;

        let answered = released.recv().await.ok_or(RouterError::Closed)?;
        answered.response.ok_or(RouterError::Closed)
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was requested.
    pub fn is_closed(&self) -> bool {
        self.inner.token.is_cancelled() || self.inner.dispatcher.is_closed()
    }

    /// Stops the dispatcher and waits for it to exit.
    ///
    /// Batches still waiting for acknowledgements are released with ERROR.
    /// Calling it more than once is harmless.
    pub async fn shutdown(&self) {
        self.inner.token.cancel();
        let join = self
            .inner
            .join
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(join) = join {
            let _ = join.await;
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("cfg", &self.inner.cfg)
            .field("closed", &self.is_closed())
            .finish()
    }
}
