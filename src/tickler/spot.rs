use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::envelope::{Destination, Envelope};

/// Identifier of a tickle spot (its slot in the table).
///
/// Slots are reused after [`Tickler::remove`](super::Tickler::remove), so an id
/// must not be kept past its removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpotId(pub(super) usize);

impl SpotId {
    /// Slot index in the tickler's table.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spot-{}", self.0)
    }
}

/// One registered periodic notification.
pub(super) struct Spot<Req, Resp> {
    pub dest: Destination<Req, Resp>,
    pub kind: u32,
    pub payload: Req,
    pub delay: Duration,
    /// Fires left; `0` = unlimited.
    pub remaining: u32,
    pub next_fire: Instant,
}

impl<Req: Clone, Resp> Spot<Req, Resp> {
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_fire <= now
    }

    /// Builds the envelope for this firing and schedules the next one.
    ///
    /// Returns the envelope and whether the spot is now exhausted. A spot whose
    /// next firing cannot be represented is exhausted as well.
    pub fn fire(&mut self) -> (Envelope<Req, Resp>, bool) {
        let env = Envelope::new(self.kind, self.payload.clone());
        let Some(next) = self.next_fire.checked_add(self.delay) else {
            return (env, true);
        };
        self.next_fire = next;

        let exhausted = match self.remaining {
            0 => false,
            1 => true,
            n => {
                self.remaining = n - 1;
                false
            }
        };
        (env, exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::channel;

    #[tokio::test(start_paused = true)]
    async fn fire_advances_from_previous_schedule() {
        let (dest, _inbox) = channel::<u8, ()>(1);
        let start = Instant::now();
        let mut spot = Spot {
            dest,
            kind: 9,
            payload: 1u8,
            delay: Duration::from_secs(5),
            remaining: 2,
            next_fire: start + Duration::from_secs(5),
        };

        assert!(!spot.is_due(start));
        assert!(spot.is_due(start + Duration::from_secs(6)));

        let (env, exhausted) = spot.fire();
        assert_eq!((env.kind, env.request), (9, 1));
        assert!(!exhausted);
        assert_eq!(spot.next_fire, start + Duration::from_secs(10));

        let (_, exhausted) = spot.fire();
        assert!(exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_next_fire_exhausts() {
        let (dest, _inbox) = channel::<(), ()>(1);
        let now = Instant::now();
        let mut spot = Spot {
            dest,
            kind: 0,
            payload: (),
            delay: Duration::MAX,
            remaining: 0,
            next_fire: now,
        };
        let (_, exhausted) = spot.fire();
        assert!(exhausted);
        assert_eq!(spot.next_fire, now);
    }

    #[tokio::test(start_paused = true)]
    async fn unlimited_spot_never_exhausts() {
        let (dest, _inbox) = channel::<(), ()>(1);
        let mut spot = Spot {
            dest,
            kind: 0,
            payload: (),
            delay: Duration::from_secs(1),
            remaining: 0,
            next_fire: Instant::now(),
        };
        for _ in 0..100 {
            assert!(!spot.fire().1);
        }
        assert_eq!(spot.remaining, 0);
    }
}
