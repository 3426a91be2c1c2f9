//! # Tickler: periodic envelope scheduler.
//!
//! A [`Tickler`] owns a bounded table of *tickle spots*. Each spot sends a fresh
//! [`Envelope`](crate::envelope::Envelope) with a fixed kind and payload to its
//! destination every `delay`, either forever or a fixed number of times.
//! One background loop per tickler serves the whole table.
//!
//! ## Architecture
//! ```text
//! add(delay, dest, kind, payload, count) ──► [slot table] ◄── remove(id)
//!                                               │
//!                                   background loop (one per tickler)
//!                                               │
//!   loop {
//!     ├─► wake = min(next_fire of active spots), at least 1s from now
//!     ├─► sleep_until(wake)
//!     ├─► for each due spot:
//!     │     ├─ dest.send(Envelope::new(kind, payload.clone()))
//!     │     ├─ next_fire += delay
//!     │     └─ count > 0 ─► count -= 1, retire at 0
//!     └─► exit when stopped or no spot is active (next add restarts it)
//!   }
//! ```
//!
//! ## Rules
//! - Delays are clamped between 1 second and 365 days.
//! - `count = 0` means unlimited.
//! - `add` takes the table guard for the whole insertion, including the
//!   decision to start the loop.
//! - Envelopes are sent outside the guard; a full destination delays the loop.
//! - A spot added while the loop sleeps towards a later wake-up fires no earlier than
//!   that wake-up. Add spots before the loop starts, or `stop`/`start` around additions,
//!   when that matters.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use hubcast::{Tickler, envelope};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tickler: Tickler<&'static str> = Tickler::new(4);
//! let (dest, mut inbox) = envelope::channel(8);
//!
//! tickler.add(Duration::from_secs(1), dest, 7, "wake up", 2).unwrap();
//!
//! let first = inbox.recv().await.unwrap();
//! assert_eq!((first.kind, first.request), (7, "wake up"));
//! assert!(inbox.recv().await.is_some());
//! assert!(inbox.recv().await.is_none()); // retired after two fires
//! # }
//! ```

mod spot;
#[allow(clippy::module_inception)]
mod tickler;

pub use spot::SpotId;
pub use tickler::{DEFAULT_CAPACITY, MAX_CAPACITY, MAX_DELAY, MIN_DELAY, Tickler};
