//! Durable per-candidate counters
//!
//! Level 3 - Steps

use bracket_core::{CandidateId, StatsBatch};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Lifetime counters of one candidate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableCounts {
    /// Brackets this candidate won outright
    pub win_count: u64,
    /// Individual matches won
    pub match_win_count: u64,
    /// Individual matches appeared in
    pub match_expose_count: u64,
}

impl DurableCounts {
    /// Match win rate (0.0 when never shown)
    pub fn match_win_rate(&self) -> f32 {
        if self.match_expose_count == 0 {
            0.0
        } else {
            self.match_win_count as f32 / self.match_expose_count as f32
        }
    }
}

/// Durable statistics of one tournament
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Completed plays of the tournament
    pub total_plays: u64,
    pub counts: FxHashMap<CandidateId, DurableCounts>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished session's deltas
    pub fn apply(&mut self, batch: &StatsBatch) {
        self.total_plays += u64::from(batch.play_increment);
        for entry in &batch.entries {
            let counts = self.counts.entry(entry.candidate_id.clone()).or_default();
            counts.win_count += u64::from(entry.overall_win_increment);
            counts.match_win_count += u64::from(entry.match_win_increment);
            counts.match_expose_count += u64::from(entry.match_exposure_increment);
        }
    }

    /// Fold another ledger into this one
    pub fn merge(&mut self, other: &Ledger) {
        self.total_plays += other.total_plays;
        for (id, theirs) in &other.counts {
            let ours = self.counts.entry(id.clone()).or_default();
            ours.win_count += theirs.win_count;
            ours.match_win_count += theirs.match_win_count;
            ours.match_expose_count += theirs.match_expose_count;
        }
    }

    /// Counters for a candidate (zero when never played)
    pub fn counts_for(&self, id: &CandidateId) -> DurableCounts {
        self.counts.get(id).copied().unwrap_or_default()
    }
}
