//! # Listeners: tasks that consume routed events.
//!
//! Any [`Listener`](crate::Listener) destination can be registered directly with
//! [`Router::register`](crate::Router::register). This module adds the managed form:
//! implement [`Listen`] and hand it to [`Router::listen`](crate::Router::listen), which
//! owns the queue, the worker task, and the acknowledgement call.
//!
//! ## Architecture
//! ```text
//! Dispatcher ── broadcast ──► [bounded queue] ──► worker ──► listener.on_event(&event)
//!                                                    │            │
//!                                                    │      Some(ack) ──► event.acknowledge(ack)
//!                                                    └─► panic caught, logged, next event
//! ```
//!
//! ## Rules
//! - Events are processed sequentially (FIFO) per listener.
//! - A full listener queue makes the dispatcher wait; keep `on_event` short.
//! - A panicking listener never acknowledges the event it panicked on.
//! - The worker exits once it is unregistered and its [`ListenerHandle`] is dropped,
//!   or when the router shuts down.

mod listener;
#[cfg(feature = "logging")]
mod log;
mod worker;

pub use listener::Listen;
#[cfg(feature = "logging")]
pub use log::LogListener;
pub use worker::ListenerHandle;
