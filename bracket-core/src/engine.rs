//! Bracket progression engine
//!
//! A synchronous state machine over a fixed candidate set:
//!
//! ```text
//! Uninitialized -> RoundInProgress(N) -> ... -> RoundInProgress(2) -> Concluded
//! ```
//!
//! The caller asks for the current pair, feeds back the picked id and, once a
//! champion exists, takes the session's [`StatsBatch`] to its persistence sink.
//! Mutation goes through `&mut self`; the engine holds no locks and is owned
//! by exactly one driving context.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateId};
use crate::error::BracketError;
use crate::round::{MatchProgress, RoundLabel};
use crate::shuffle::{RngShuffler, Shuffler};
use crate::stats::{CandidateDelta, MatchCounters, StatsBatch};
use crate::tournament::validate_candidates;

// ============================================================================
// TYPES
// ============================================================================

/// Coarse lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    Uninitialized,
    InProgress,
    Concluded,
}

/// Result of [`BracketEngine::initialize`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
    /// Candidates were shuffled into a fresh first round
    Started { round_size: usize },
    /// A bracket was already loaded; nothing changed
    AlreadyInitialized,
}

/// What a recorded pick led to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Another match in the same round
    NextMatch,
    /// The round finished and the survivors form the next one
    NextRound { round_size: usize },
    /// The final was decided
    Champion(Candidate),
}

/// One resolved match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Size of the round the match belonged to
    pub round_size: usize,
    /// 1-based match number within the round
    pub match_number: usize,
    pub winner: CandidateId,
    pub loser: CandidateId,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Single-elimination bracket driven one pick at a time
pub struct BracketEngine<S: Shuffler = RngShuffler> {
    shuffler: S,
    /// Candidate ids in the order they were supplied
    roster: Vec<CandidateId>,
    current_round: Vec<Candidate>,
    match_index: usize,
    advancing: Vec<Candidate>,
    counters: FxHashMap<CandidateId, MatchCounters>,
    champion: Option<Candidate>,
    history: Vec<MatchRecord>,
}

impl BracketEngine<RngShuffler> {
    /// Engine with a ChaCha-backed shuffle, seeded when `seed` is set
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self::new(RngShuffler::from_seed_option(seed))
    }
}

impl Default for BracketEngine<RngShuffler> {
    fn default() -> Self {
        Self::new(RngShuffler::from_entropy())
    }
}

impl<S: Shuffler> BracketEngine<S> {
    pub fn new(shuffler: S) -> Self {
        Self {
            shuffler,
            roster: Vec::new(),
            current_round: Vec::new(),
            match_index: 0,
            advancing: Vec::new(),
            counters: FxHashMap::default(),
            champion: None,
            history: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Load and shuffle the candidate set.
    ///
    /// The count must be a power of two >= 2 and ids must be unique; on error
    /// the engine stays uninitialized. Once a bracket is loaded, further calls
    /// are no-ops, so a caller that re-enters does not reshuffle a running
    /// tournament.
    pub fn initialize(&mut self, candidates: Vec<Candidate>) -> Result<InitOutcome, BracketError> {
        if self.is_initialized() {
            tracing::debug!("initialize ignored: bracket already loaded");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        validate_candidates(&candidates)?;

        let mut order = candidates;
        self.roster = order.iter().map(|c| c.id.clone()).collect();
        self.counters = self
            .roster
            .iter()
            .map(|id| (id.clone(), MatchCounters::default()))
            .collect();
        self.shuffler.shuffle(&mut order);

        self.current_round = order;
        self.match_index = 0;
        self.advancing.clear();
        self.champion = None;
        self.history.clear();

        let round_size = self.current_round.len();
        tracing::debug!(round_size, "bracket initialized");
        Ok(InitOutcome::Started { round_size })
    }

    /// The two candidates of the match being played, left then right.
    ///
    /// `None` before initialization and after the champion is decided.
    pub fn current_pair(&self) -> Option<(&Candidate, &Candidate)> {
        if self.champion.is_some() {
            return None;
        }
        let i = self.match_index * 2;
        match (self.current_round.get(i), self.current_round.get(i + 1)) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }

    /// Resolve the current match in favour of `winner_id`.
    ///
    /// Fails without touching any state when the bracket is not running or
    /// when `winner_id` is not one of the two current candidates.
    pub fn record_pick(&mut self, winner_id: &CandidateId) -> Result<PickOutcome, BracketError> {
        if self.champion.is_some() {
            return Err(BracketError::AlreadyConcluded);
        }

        let (winner, loser) = {
            let (left, right) = self.current_pair().ok_or(BracketError::NotInitialized)?;
            if &left.id == winner_id {
                (left.clone(), right.clone())
            } else if &right.id == winner_id {
                (right.clone(), left.clone())
            } else {
                return Err(BracketError::InvalidPick {
                    picked: winner_id.clone(),
                    left: left.id.clone(),
                    right: right.id.clone(),
                });
            }
        };

        let round_size = self.current_round.len();
        let last_match = self.match_index * 2 + 2 >= round_size;

        let winner_counters = self.counters.entry(winner.id.clone()).or_default();
        winner_counters.match_wins += 1;
        winner_counters.match_exposures += 1;
        self.counters.entry(loser.id.clone()).or_default().match_exposures += 1;

        self.history.push(MatchRecord {
            round_size,
            match_number: self.match_index + 1,
            winner: winner.id.clone(),
            loser: loser.id,
        });
        self.advancing.push(winner.clone());

        if !last_match {
            self.match_index += 1;
            return Ok(PickOutcome::NextMatch);
        }

        if self.advancing.len() == 1 {
            self.advancing.clear();
            tracing::debug!(champion = %winner.id, "bracket concluded");
            self.champion = Some(winner.clone());
            return Ok(PickOutcome::Champion(winner));
        }

        // Survivors keep the order they were collected in
        self.current_round = std::mem::take(&mut self.advancing);
        self.match_index = 0;
        let round_size = self.current_round.len();
        tracing::debug!(round_size, "next round");
        Ok(PickOutcome::NextRound { round_size })
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn status(&self) -> BracketStatus {
        if self.champion.is_some() {
            BracketStatus::Concluded
        } else if self.is_initialized() {
            BracketStatus::InProgress
        } else {
            BracketStatus::Uninitialized
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.current_round.is_empty()
    }

    pub fn is_concluded(&self) -> bool {
        self.champion.is_some()
    }

    pub fn champion(&self) -> Option<&Candidate> {
        self.champion.as_ref()
    }

    /// Candidates in the current round, in match order
    pub fn current_round(&self) -> &[Candidate] {
        &self.current_round
    }

    /// Zero-based index of the current match within the round
    pub fn match_index(&self) -> usize {
        self.match_index
    }

    /// Winners collected so far in the current round
    pub fn advancing_winners(&self) -> &[Candidate] {
        &self.advancing
    }

    pub fn round_size(&self) -> usize {
        self.current_round.len()
    }

    pub fn round_label(&self) -> Option<RoundLabel> {
        if self.is_initialized() {
            Some(RoundLabel::for_size(self.current_round.len()))
        } else {
            None
        }
    }

    pub fn match_progress(&self) -> Option<MatchProgress> {
        if !self.is_initialized() || self.is_concluded() {
            return None;
        }
        Some(MatchProgress {
            current_match: self.match_index + 1,
            total_matches: self.current_round.len() / 2,
        })
    }

    /// Number of candidates supplied at initialization
    pub fn candidate_count(&self) -> usize {
        self.roster.len()
    }

    pub fn counters(&self, id: &CandidateId) -> Option<MatchCounters> {
        self.counters.get(id).copied()
    }

    /// Counters for every candidate, in the order they were supplied
    pub fn session_counters(&self) -> Vec<(CandidateId, MatchCounters)> {
        self.roster
            .iter()
            .map(|id| (id.clone(), self.counters.get(id).copied().unwrap_or_default()))
            .collect()
    }

    /// Resolved matches, oldest first
    pub fn history(&self) -> &[MatchRecord] {
        &self.history
    }

    pub fn matches_played(&self) -> usize {
        self.history.len()
    }

    /// Matches left before a champion exists
    pub fn matches_remaining(&self) -> usize {
        self.roster.len().saturating_sub(1) - self.history.len()
    }

    /// Session deltas for the persistence sink. Only available once concluded.
    pub fn stats_batch(&self) -> Result<StatsBatch, BracketError> {
        let champion = match (&self.champion, self.is_initialized()) {
            (Some(champion), _) => champion,
            (None, false) => return Err(BracketError::NotInitialized),
            (None, true) => return Err(BracketError::NotConcluded),
        };

        let entries = self
            .session_counters()
            .into_iter()
            .map(|(candidate_id, counters)| CandidateDelta {
                overall_win_increment: u32::from(candidate_id == champion.id),
                candidate_id,
                match_win_increment: counters.match_wins,
                match_exposure_increment: counters.match_exposures,
            })
            .collect();

        Ok(StatsBatch {
            entries,
            play_increment: 1,
        })
    }

    /// Structural invariants of the round state and counters
    pub fn invariants_hold(&self) -> bool {
        let counters_ok = self
            .counters
            .values()
            .all(|c| c.match_exposures >= c.match_wins);

        if !self.is_initialized() {
            return counters_ok && self.advancing.is_empty() && self.champion.is_none();
        }

        let round_ok = self.current_round.len() >= 2 && self.current_round.len().is_power_of_two();
        let progress_ok = if self.is_concluded() {
            self.advancing.is_empty()
        } else {
            self.match_index * 2 < self.current_round.len()
                && self.advancing.len() == self.match_index
        };

        counters_ok && round_ok && progress_ok
    }
}

// ============================================================================
// TESTS
// ============================================================================
