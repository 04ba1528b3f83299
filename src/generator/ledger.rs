//! # Seed Ledger Module
//!
//! A bounded, ranked record of the best `(seed, efficiency)` pairs seen by the
//! search.
//!
//! Entries are ordered by efficiency, highest first. Equal efficiencies are
//! ordered by seed, lowest first, so the order is total and does not depend on
//! the order in which trials finished.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Outcome of one trial.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Seed the trial was run with
    pub seed: u64,
    /// Percentage of the grid filled at the end of the trial
    pub efficiency: f64,
}

impl LedgerEntry {
    /// Ranking order: higher efficiency first, then lower seed.
    pub fn rank(&self, other: &LedgerEntry) -> Ordering {
        other
            .efficiency
            .total_cmp(&self.efficiency)
            .then(self.seed.cmp(&other.seed))
    }
}

/// Top-K record of trial outcomes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedLedger {
    capacity: usize,
    entries: Vec<LedgerEntry>,
}

impl SeedLedger {
    /// Creates an empty ledger keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        SeedLedger {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    /// Records a trial outcome, evicting the lowest ranked entry when full.
    ///
    /// # Returns
    /// `true` if the entry is still in the ledger afterwards.
    pub fn record(&mut self, seed: u64, efficiency: f64) -> bool {
        let entry = LedgerEntry { seed, efficiency };
        self.entries.push(entry);
        self.entries.sort_by(LedgerEntry::rank);

        if self.entries.len() > self.capacity {
            return self.entries.pop() != Some(entry);
        }
        true
    }

    /// Entries, best first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The best entry, if any trial was recorded.
    pub fn best(&self) -> Option<&LedgerEntry> {
        self.entries.first()
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
