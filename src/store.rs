// SPDX-License-Identifier: GPL-3.0-only

//! Latest-value store for hand readings
//!
//! Keeps exactly one reading per side. The producer replaces readings as it
//! finishes detection cycles and any number of readers take point-in-time
//! copies without waiting for the producer.
//!
//! Each side is an `RwLock<Option<Arc<HandReading>>>`. Writers build the
//! new `Arc` before taking the lock and drop the old one after releasing
//! it, so the lock is only ever held for a pointer swap or a pointer clone.
//! Readers therefore see either the old complete reading or the new
//! complete one.

use crate::hands::{HandReading, Side};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Shared store handle type
pub type SharedHandStore = Arc<HandStore>;

/// Both sides read together
///
/// Each side is individually consistent; the two sides may come from
/// different producer cycles.
#[derive(Debug, Clone, Default)]
pub struct HandsSnapshot {
    pub left: Option<Arc<HandReading>>,
    pub right: Option<Arc<HandReading>>,
}

impl HandsSnapshot {
    pub fn get(&self, side: Side) -> Option<&Arc<HandReading>> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }
}

/// Latest reading per hand side
#[derive(Debug, Default)]
pub struct HandStore {
    slots: [RwLock<Option<Arc<HandReading>>>; 2],
    publishes: AtomicU64,
}

impl HandStore {
    /// Create an empty store (no side has a reading)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store ready to be shared between threads
    pub fn shared() -> SharedHandStore {
        Arc::new(Self::new())
    }

    /// Replace the reading for `side`
    ///
    /// The stored reading is tagged with `side` regardless of what
    /// `reading.side` said.
    pub fn publish(&self, side: Side, mut reading: HandReading) {
        reading.side = side;
        let sequence = reading.sequence;
        let detected = reading.is_detected();
        let next = Arc::new(reading);

        let previous = {
            // A panicking reader cannot leave a half-written Option behind,
            // so a poisoned lock still holds a valid value.
            let mut slot = self.slots[side.index()]
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            slot.replace(next)
        };
        drop(previous);

        self.publishes.fetch_add(1, Ordering::Relaxed);
        trace!(side = %side, sequence, detected, "Published hand reading");
    }

    /// Current reading for `side`, or `None` if nothing was ever published
    pub fn read(&self, side: Side) -> Option<Arc<HandReading>> {
        self.slots[side.index()]
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read both sides
    pub fn snapshot(&self) -> HandsSnapshot {
        HandsSnapshot {
            left: self.read(Side::Left),
            right: self.read(Side::Right),
        }
    }

    /// Total number of publishes since the store was created
    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hands::Landmark;
    use std::time::Instant;

    fn reading(side: Side, x: f32, sequence: u64) -> HandReading {
        HandReading::detected(side, vec![Landmark::new(x, 0.0, 0.0)], Instant::now(), sequence)
    }

    #[test]
    fn test_empty_store_reads_absent() {
        let store = HandStore::new();
        assert!(store.read(Side::Left).is_none());
        assert!(store.read(Side::Right).is_none());
        assert_eq!(store.publish_count(), 0);
    }

    #[test]
    fn test_publish_tags_reading_with_slot_side() {
        let store = HandStore::new();
        store.publish(Side::Right, reading(Side::Left, 1.0, 1));

        let stored = store.read(Side::Right).unwrap();
        assert_eq!(stored.side, Side::Right);
        assert!(store.read(Side::Left).is_none());
    }

    #[test]
    fn test_reader_keeps_old_value_after_overwrite() {
        let store = HandStore::new();
        store.publish(Side::Left, reading(Side::Left, 1.0, 1));
        let held = store.read(Side::Left).unwrap();

        store.publish(Side::Left, reading(Side::Left, 2.0, 2));

        assert_eq!(held.landmarks[0].x, 1.0);
        assert_eq!(store.read(Side::Left).unwrap().landmarks[0].x, 2.0);
        assert_eq!(store.publish_count(), 2);
    }

    #[test]
    fn test_snapshot_reads_both_sides() {
        let store = HandStore::new();
        store.publish(Side::Left, reading(Side::Left, 1.0, 1));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.get(Side::Left).unwrap().sequence, 1);
        assert!(snapshot.get(Side::Right).is_none());
    }

    #[test]
    fn test_poisoned_lock_still_readable() {
        let store = Arc::new(HandStore::new());
        store.publish(Side::Left, reading(Side::Left, 1.0, 1));

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.slots[Side::Left.index()].write().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert_eq!(store.read(Side::Left).unwrap().sequence, 1);
        store.publish(Side::Left, reading(Side::Left, 2.0, 2));
        assert_eq!(store.read(Side::Left).unwrap().sequence, 2);
    }
}
