use tokio_util::sync::CancellationToken;

use super::{config::Config, dispatcher::Dispatcher, router::Router};
use crate::envelope;

/// Builder for constructing a [`Router`].
pub struct RouterBuilder {
    cfg: Config,
    token: Option<CancellationToken>,
}

impl RouterBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self { cfg, token: None }
    }

    /// Ties the router's lifetime to an external cancellation token.
    ///
    /// The dispatcher uses a child token, so cancelling the parent stops the router
    /// while `Router::shutdown` leaves the parent untouched.
    pub fn with_cancellation(mut self, parent: &CancellationToken) -> Self {
        self.token = Some(parent.child_token());
        self
    }

    /// Builds the router and spawns its dispatcher task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Router {
        let (dispatcher, inbox) = envelope::channel(self.cfg.queue_capacity_clamped());
        let token = self.token.unwrap_or_default();

        let task = Dispatcher::new(inbox, &self.cfg, token.clone());
        let join = tokio::spawn(task.run());

        Router::from_parts(self.cfg, dispatcher, token, join)
    }
}

impl Router {
    /// Starts building a router.
    pub fn builder(cfg: Config) -> RouterBuilder {
        RouterBuilder::new(cfg)
    }
}
