//! Session counters and the batch handed to the persistence sink

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateId;

/// Per-candidate counters for one play session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounters {
    /// Matches this candidate won
    pub match_wins: u32,
    /// Matches this candidate appeared in
    pub match_exposures: u32,
}

impl MatchCounters {
    /// Session win rate (0.0 when never shown)
    pub fn win_rate(&self) -> f32 {
        if self.match_exposures == 0 {
            0.0
        } else {
            self.match_wins as f32 / self.match_exposures as f32
        }
    }
}

/// Additive update for one candidate's durable counters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDelta {
    pub candidate_id: CandidateId,
    pub match_win_increment: u32,
    pub match_exposure_increment: u32,
    /// 1 for the champion, 0 otherwise
    pub overall_win_increment: u32,
}

/// Everything a finished session contributes to durable statistics.
///
/// Entries follow the order candidates were originally supplied in, one per
/// candidate. Counts are deltas; absolute totals live in the sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsBatch {
    pub entries: Vec<CandidateDelta>,
    /// Tournament-level play counter increment (always 1)
    pub play_increment: u32,
}

impl StatsBatch {
    /// The entry with `overall_win_increment == 1`
    pub fn champion_id(&self) -> Option<&CandidateId> {
        self.entries
            .iter()
            .find(|e| e.overall_win_increment == 1)
            .map(|e| &e.candidate_id)
    }

    pub fn entry(&self, id: &CandidateId) -> Option<&CandidateDelta> {
        self.entries.iter().find(|e| &e.candidate_id == id)
    }

    /// Matches played in the session
    pub fn total_matches(&self) -> u32 {
        self.entries.iter().map(|e| e.match_win_increment).sum()
    }
}
