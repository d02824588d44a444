//! Leaderboard standings
//!
//! Level 2 - Phases

use bracket_core::{Candidate, CandidateId};
use serde::{Deserialize, Serialize};

use crate::config::LeaderboardOrder;
use crate::ledger::Ledger;

/// A candidate's row on the leaderboard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position
    pub rank: usize,
    pub candidate_id: CandidateId,
    pub name: String,
    pub image_url: String,
    /// Brackets won outright
    pub win_count: u64,
    pub match_win_count: u64,
    pub match_expose_count: u64,
    /// match_win_count / match_expose_count
    pub match_win_rate: f32,
    /// win_count / total plays of the tournament
    pub champion_rate: f32,
}

/// Rank every candidate of a tournament from its ledger.
///
/// Candidates that were never played still get a row with zero counts.
pub fn compute_standings(
    candidates: &[Candidate],
    ledger: &Ledger,
    order: LeaderboardOrder,
) -> Vec<Standing> {
    let mut standings: Vec<Standing> = candidates
        .iter()
        .map(|candidate| standing_for(candidate, ledger))
        .collect();

    standings.sort_by(|a, b| {
        let primary = match order {
            LeaderboardOrder::Wins => b.win_count.cmp(&a.win_count).then_with(|| {
                b.match_win_rate
                    .partial_cmp(&a.match_win_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            LeaderboardOrder::WinRate => b
                .match_win_rate
                .partial_cmp(&a.match_win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.win_count.cmp(&a.win_count)),
        };
        primary.then_with(|| a.name.cmp(&b.name))
    });

    for (i, standing) in standings.iter_mut().enumerate() {
        standing.rank = i + 1;
    }

    standings
}

/// Build the unranked row for one candidate
fn standing_for(candidate: &Candidate, ledger: &Ledger) -> Standing {
    let counts = ledger.counts_for(&candidate.id);
    let champion_rate = if ledger.total_plays == 0 {
        0.0
    } else {
        counts.win_count as f32 / ledger.total_plays as f32
    };

    Standing {
        rank: 0,
        candidate_id: candidate.id.clone(),
        name: candidate.name.clone(),
        image_url: candidate.image_url.clone(),
        win_count: counts.win_count,
        match_win_count: counts.match_win_count,
        match_expose_count: counts.match_expose_count,
        match_win_rate: counts.match_win_rate(),
        champion_rate,
    }
}
