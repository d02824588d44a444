//! Bracket Stats - Durable statistics, leaderboards and simulation
//!
//! This crate provides the aggregation side of the platform:
//! - A ledger applying finished-session batches additively
//! - Leaderboard standings (championships, match win rate)
//! - Bulk simulation of random-pick brackets
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: simulate (orchestration)
//! - Level 2: play_random_bracket, compute_standings (phases)
//! - Level 3: Ledger::apply, standing_for (steps)
//! - Level 4: utilities, configuration

mod config;
mod ledger;
mod simulate;
mod standings;

pub use config::{LeaderboardOrder, SimulationConfig};
pub use ledger::{DurableCounts, Ledger};
pub use simulate::{play_random_bracket, simulate, SimulationResult};
pub use standings::{compute_standings, Standing};
