//! Router core: the dispatcher and the handle used to reach it.
//!
//! The public API from this module is [`Router`] (with its [`RouterBuilder`]),
//! the [`Config`] it is built from, and the [`Command`] vocabulary of the
//! dispatcher queue.
//!
//! Internal modules:
//! - [`dispatcher`]: the single sequential task owning the topic tree and batch ledger;
//! - [`router`]: cloneable handle (registration, submission, shutdown);
//! - [`builder`]: constructs the handle and spawns the dispatcher;
//! - [`command`]: closed set of dispatcher requests and their message kinds;
//! - [`config`]: runtime settings.

mod builder;
mod command;
mod config;
mod dispatcher;
mod router;

pub use builder::RouterBuilder;
pub use command::{Command, Listener, kind};
pub use config::{Config, MAX_ACK_TIMEOUT};
pub use router::Router;

pub(crate) use command::DispatchDest;
