//! Round naming and match progress helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation label for a round, derived from its candidate count
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundLabel {
    /// Two candidates left
    Final,
    /// Any larger power-of-two round
    RoundOf(usize),
}

impl RoundLabel {
    /// Label for a round holding `round_size` candidates
    pub fn for_size(round_size: usize) -> Self {
        if round_size == 2 {
            RoundLabel::Final
        } else {
            RoundLabel::RoundOf(round_size)
        }
    }

    /// Candidate count of the labelled round
    pub fn round_size(&self) -> usize {
        match self {
            RoundLabel::Final => 2,
            RoundLabel::RoundOf(n) => *n,
        }
    }
}

impl fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundLabel::Final => write!(f, "final"),
            RoundLabel::RoundOf(n) => write!(f, "round of {}", n),
        }
    }
}

/// Position of the current match within its round
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProgress {
    /// 1-based number of the match being played
    pub current_match: usize,
    /// Matches in this round (round size / 2)
    pub total_matches: usize,
}

/// True for 1, 2, 4, 8, ...
pub fn is_power_of_two(n: usize) -> bool {
    n.is_power_of_two()
}

/// Number of rounds a bracket of `size` candidates goes through
pub fn rounds_for(size: usize) -> u32 {
    if size < 2 {
        0
    } else {
        size.trailing_zeros()
    }
}
