//! Day-scoped, single-flight memo of risk snapshots.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use chrono::NaiveDate;
use flu_risk_scoring_models::RiskSnapshot;

/// Identifies one memoized computation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    /// Reference date the snapshot was computed for.
    pub day: NaiveDate,
    /// Fingerprint of the window the snapshot was computed from.
    pub fingerprint: String,
}

type Slot = Arc<OnceLock<Arc<RiskSnapshot>>>;

/// Memoizes snapshots per [`CacheKey`].
///
/// Concurrent callers with the same key share one computation. Looking up a
/// key for a new day drops every entry from other days.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    slots: Mutex<BTreeMap<CacheKey, Slot>>,
}

impl SnapshotCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot for `key`, running `compute` at most once per key.
    pub fn get_or_compute(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> RiskSnapshot,
    ) -> Arc<RiskSnapshot> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            let day = key.day;
            let before = slots.len();
            slots.retain(|k, _| k.day == day);
            if slots.len() < before {
                log::debug!("Evicted {} snapshot(s) from previous days", before - slots.len());
            }
            Arc::clone(slots.entry(key).or_default())
        };
        Arc::clone(slot.get_or_init(|| Arc::new(compute())))
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every memoized snapshot.
    pub fn clear(&self) {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
