//! Bracket Core - Elimination bracket engine
//!
//! This crate provides the core bracket logic:
//! - Candidate value types and ids
//! - Injected shuffling (fair RNG in production, fixed order in tests)
//! - The bracket progression state machine
//! - Round naming and match progress
//! - Session counters and the stats batch handed to persistence
//! - Tournament definitions stored as JSON

pub mod candidate;
pub mod engine;
pub mod error;
pub mod round;
pub mod shuffle;
pub mod stats;
pub mod tournament;

// Re-exports for convenient access
pub use candidate::{Candidate, CandidateId};
pub use engine::{BracketEngine, BracketStatus, InitOutcome, MatchRecord, PickOutcome};
pub use error::BracketError;
pub use round::{MatchProgress, RoundLabel};
pub use shuffle::{IdentityShuffler, RngShuffler, Shuffler};
pub use stats::{CandidateDelta, MatchCounters, StatsBatch};
pub use tournament::{validate_candidates, TournamentDef};
