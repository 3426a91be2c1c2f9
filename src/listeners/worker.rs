use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use super::Listen;
use crate::core::{Listener, Router};
use crate::envelope::{self, Inbox};
use crate::error::RouterError;
use crate::events::Event;

/// Handle to a listener started with [`Router::listen`].
///
/// Dropping the handle keeps the listener registered; call
/// [`unregister`](Self::unregister) to stop deliveries.
#[derive(Debug)]
pub struct ListenerHandle {
    name: &'static str,
    topic: String,
    destination: Listener,
    router: Router,
}

impl ListenerHandle {
    /// Listener name (from [`Listen::name`]).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Topic the listener is registered at.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Destination the worker receives on; can be registered at further topics.
    pub fn destination(&self) -> &Listener {
        &self.destination
    }

    /// Removes the listener from its topic.
    ///
    /// The worker drains what is already queued and exits once no topic
    /// references its destination.
    pub fn unregister(self) -> Result<(), RouterError> {
        self.router.unregister(self.topic, &self.destination)
    }
}

impl Router {
    /// Starts a worker for `listener` and registers it at `topic`.
    ///
    /// The worker calls [`Listen::on_event`] for every delivered event, in order,
    /// and acknowledges the event with the returned [`Ack`](crate::Ack).
    /// Panics are caught and logged; the worker moves on to the next event.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen<L: Listen>(
        &self,
        topic: impl Into<String>,
        listener: L,
    ) -> Result<ListenerHandle, RouterError> {
        let topic = topic.into();
        let name = listener.name();
        let cap = listener
            .queue_capacity()
            .unwrap_or_else(|| self.config().listener_capacity_clamped())
            .max(1);

        let (destination, inbox) = envelope::channel(cap);
        self.register(topic.clone(), &destination)?;
        tokio::spawn(work(listener, inbox));

        debug!(listener = name, topic = %topic, capacity = cap, "listener started");
        Ok(ListenerHandle {
            name,
            topic,
            destination,
            router: self.clone(),
        })
    }
}

async fn work<L: Listen>(listener: L, mut inbox: Inbox<Arc<Event>>) {
    let name = listener.name();

    while let Some(env) = inbox.recv().await {
        let event = env.request;
        let fut = listener.on_event(&event);

        match AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Some(ack)) => {
                if let Err(e) = event.acknowledge(ack).await {
                    warn!(listener = name, topic = %event.topic, error = e.as_label(), "acknowledgement not delivered");
                }
            }
            Ok(None) => {}
            Err(panic) => {
                warn!(
                    listener = name,
                    topic = %event.topic,
                    info = %panic_message(panic.as_ref()),
                    "listener panicked"
                );
            }
        }
    }
    debug!(listener = name, "listener worker exited");
}

fn panic_message(any: &(dyn Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
