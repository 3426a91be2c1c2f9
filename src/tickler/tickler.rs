use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::spot::{Spot, SpotId};
use crate::envelope::{Destination, Envelope};
use crate::error::TickleError;

/// Table size used when `Tickler::new(0)` is requested.
pub const DEFAULT_CAPACITY: usize = 16;

/// Largest table a tickler will allocate.
pub const MAX_CAPACITY: usize = 1024;

/// Shortest delay between two firings of a spot, and shortest loop sleep.
pub const MIN_DELAY: Duration = Duration::from_secs(1);

/// Longest delay between two firings of a spot (365 days).
pub const MAX_DELAY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

type Due<Req, Resp> = Vec<(SpotId, Destination<Req, Resp>, Envelope<Req, Resp>)>;

struct Table<Req, Resp> {
    slots: Vec<Option<Spot<Req, Resp>>>,
    /// A loop task is alive.
    running: bool,
    /// `stop()` was called and `start()` was not.
    paused: bool,
}

impl<Req: Clone, Resp> Table<Req, Resp> {
    fn active(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn next_fire(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|s| s.next_fire).min()
    }

    fn collect_due(&mut self, now: Instant) -> Due<Req, Resp> {
        let mut due = Vec::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let exhausted = {
                let Some(spot) = slot.as_mut() else { continue };
                if !spot.is_due(now) {
                    continue;
                }
                let (env, exhausted) = spot.fire();
                due.push((SpotId(idx), spot.dest.clone(), env));
                exhausted
            };
            if exhausted {
                debug!(spot = idx, "tickle spot retired");
                *slot = None;
            }
        }
        due
    }
}

struct Shared<Req, Resp> {
    table: Mutex<Table<Req, Resp>>,
}

impl<Req, Resp> Shared<Req, Resp> {
    fn lock(&self) -> MutexGuard<'_, Table<Req, Resp>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic scheduler sending envelopes to destinations.
///
/// Spots are added with [`add`](Self::add) and removed with [`remove`](Self::remove).
/// The background loop starts on the first successful `add`, exits when no spot is
/// active, and is paused/resumed with [`stop`](Self::stop)/[`start`](Self::start).
/// Dropping the tickler pauses its loop.
///
/// The loop is spawned with `tokio::spawn`, so `add` and `start` must be called
/// from within a tokio runtime.
pub struct Tickler<Req, Resp = ()> {
    shared: Arc<Shared<Req, Resp>>,
}

impl<Req, Resp> Tickler<Req, Resp>
where
    Req: Clone + Send + 'static,
    Resp: Send + 'static,
{
    /// Creates a tickler holding up to `capacity` spots.
    ///
    /// `0` selects [`DEFAULT_CAPACITY`]; larger values are clamped to [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = match capacity {
            0 => DEFAULT_CAPACITY,
            n => n.min(MAX_CAPACITY),
        };
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(Table {
                    slots,
                    running: false,
                    paused: false,
                }),
            }),
        }
    }

    /// Adds a spot sending `Envelope::new(kind, payload)` to `dest` every `delay`.
    ///
    /// - `delay` is clamped to [`MIN_DELAY`]..=[`MAX_DELAY`]; the first firing is `delay` from now.
    /// - `count = 0` fires until removed; otherwise the spot retires after `count` firings.
    ///
    /// ### Errors
    /// [`TickleError::TableFull`] if every slot holds an active spot.
    pub fn add(
        &self,
        delay: Duration,
        dest: Destination<Req, Resp>,
        kind: u32,
        payload: Req,
        count: u32,
    ) -> Result<SpotId, TickleError> {
        let delay = delay.clamp(MIN_DELAY, MAX_DELAY);
        let mut table = self.shared.lock();

        let capacity = table.slots.len();
        let Some(idx) = table.slots.iter().position(Option::is_none) else {
            return Err(TickleError::TableFull { capacity });
        };
        table.slots[idx] = Some(Spot {
            dest,
            kind,
            payload,
            delay,
            remaining: count,
            next_fire: Instant::now() + delay,
        });
        debug!(spot = idx, ?delay, count, "tickle spot added");

        self.launch(&mut table);
        Ok(SpotId(idx))
    }

    /// Deactivates a spot; its slot becomes free for a later `add`.
    ///
    /// Unknown or already removed ids are ignored.
    pub fn remove(&self, id: SpotId) {
        let mut table = self.shared.lock();
        if let Some(slot) = table.slots.get_mut(id.0) {
            if slot.take().is_some() {
                debug!(spot = id.0, "tickle spot removed");
            }
        }
    }

    /// Pauses the loop; it exits after its current sleep without firing.
    pub fn stop(&self) {
        self.shared.lock().paused = true;
    }

    /// Resumes the loop, relaunching it if it is not running and a spot is active.
    pub fn start(&self) {
        let mut table = self.shared.lock();
        table.paused = false;
        self.launch(&mut table);
    }

    /// Returns `true` while a loop task is alive.
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Number of active spots.
    pub fn active(&self) -> usize {
        self.shared.lock().active()
    }

    /// Table capacity.
    pub fn capacity(&self) -> usize {
        self.shared.lock().slots.len()
    }

    fn launch(&self, table: &mut Table<Req, Resp>) {
        if table.running || table.paused || table.active() == 0 {
            return;
        }
        table.running = true;
        tokio::spawn(run(Arc::clone(&self.shared)));
    }
}

impl<Req, Resp> Drop for Tickler<Req, Resp> {
    fn drop(&mut self) {
        self.shared.lock().paused = true;
    }
}

async fn run<Req, Resp>(shared: Arc<Shared<Req, Resp>>)
where
    Req: Clone + Send + 'static,
    Resp: Send + 'static,
{
    info!("tickler loop started");

    loop {
        let wake = {
            let mut table = shared.lock();
            match table.next_fire() {
                Some(next) if !table.paused => next.max(Instant::now() + MIN_DELAY),
                _ => {
                    table.running = false;
                    break;
                }
            }
        };

        time::sleep_until(wake).await;

        let due = {
            let mut table = shared.lock();
            if table.paused {
                table.running = false;
                break;
            }
            table.collect_due(Instant::now())
        };

        for (id, dest, env) in due {
            if dest.send(env).await.is_err() {
                warn!(spot = id.get(), "tickle destination closed; removing spot");
                let mut table = shared.lock();
                if let Some(slot) = table.slots.get_mut(id.get()) {
                    if slot.as_ref().is_some_and(|s| s.dest == dest) {
                        *slot = None;
                    }
                }
            }
        }
    }

    info!("tickler loop exited");
}
