//! Errors raised by the bracket engine

use crate::candidate::CandidateId;

/// Precondition and contract violations of [`crate::BracketEngine`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BracketError {
    /// Candidate count is not a power of two >= 2
    #[error("invalid candidate count {count}: expected a power of two >= 2")]
    InvalidCandidateCount { count: usize },

    /// The same id was supplied twice
    #[error("duplicate candidate id: {0}")]
    DuplicateCandidate(CandidateId),

    /// Operation needs an initialized bracket
    #[error("bracket has not been initialized")]
    NotInitialized,

    /// A champion is already decided
    #[error("bracket already concluded")]
    AlreadyConcluded,

    /// Bracket still has matches to play
    #[error("bracket has not concluded yet")]
    NotConcluded,

    /// Picked id is not part of the current pair
    #[error("invalid pick {picked}: current pair is ({left}, {right})")]
    InvalidPick {
        picked: CandidateId,
        left: CandidateId,
        right: CandidateId,
    },
}

impl BracketError {
    /// Whether this is a caller contract violation during play
    /// (as opposed to a bad candidate set at initialization)
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BracketError::NotInitialized
                | BracketError::AlreadyConcluded
                | BracketError::NotConcluded
                | BracketError::InvalidPick { .. }
        )
    }
}
