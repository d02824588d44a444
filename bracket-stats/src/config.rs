//! Configuration types for leaderboards and simulation
//!
//! Level 4 - Utilities and configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How standings are ranked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardOrder {
    /// Most championships first, match win rate breaks ties
    #[default]
    Wins,
    /// Highest match win rate first, championships break ties
    WinRate,
}

impl FromStr for LeaderboardOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wins" => Ok(LeaderboardOrder::Wins),
            "win_rate" | "win-rate" => Ok(LeaderboardOrder::WinRate),
            other => Err(format!("unknown leaderboard order: {}", other)),
        }
    }
}

/// Simulation configuration
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of brackets to play
    pub runs: usize,
    /// Whether to play brackets in parallel
    pub parallel: bool,
    /// Base seed for reproducibility (None = random)
    pub seed: Option<u64>,
    /// Ranking used for the resulting standings
    pub order: LeaderboardOrder,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: 1000,
            parallel: true,
            seed: None,
            order: LeaderboardOrder::default(),
        }
    }
}

impl SimulationConfig {
    /// Create config for a number of runs
    pub fn new(runs: usize) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Play brackets one after another
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set leaderboard order
    pub fn with_order(mut self, order: LeaderboardOrder) -> Self {
        self.order = order;
        self
    }
}
