//! # Batches of events submitted together.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::event::Event;
use crate::core::DispatchDest;

/// Global counter for batch identifiers.
static BATCH_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing batch identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(u64);

impl BatchId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        Self(BATCH_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events that arrived together, in arrival order.
///
/// Every event is stamped with the batch id and the dispatcher it belongs to,
/// so listeners can acknowledge it.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: BatchId,
    pub events: Vec<Arc<Event>>,
}

impl Batch {
    pub(crate) fn assemble(events: Vec<Event>, dispatcher: &DispatchDest) -> Self {
        let id = BatchId::next();
        let events = events
            .into_iter()
            .map(|mut ev| {
                ev.attach(id, dispatcher.clone());
                Arc::new(ev)
            })
            .collect();
        Self { id, events }
    }

    /// Number of events that demand an acknowledgement.
    pub fn acks_required(&self) -> usize {
        self.events.iter().filter(|e| e.ack_required).count()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
