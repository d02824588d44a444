//! TournamentDef - a titled candidate list, stored as JSON

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::candidate::Candidate;
use crate::error::BracketError;

/// A tournament definition as created by its author
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentDef {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub candidates: Vec<Candidate>,
}

impl TournamentDef {
    pub fn new(title: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            title: title.into(),
            description: None,
            candidates,
        }
    }

    /// Check that the definition can seed a bracket
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title.trim().is_empty() {
            anyhow::bail!("tournament title must not be empty");
        }
        validate_candidates(&self.candidates)?;
        Ok(())
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let def: TournamentDef = serde_json::from_str(&content)?;
        Ok(def)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Power-of-two count >= 2 and unique ids
pub fn validate_candidates(candidates: &[Candidate]) -> Result<(), BracketError> {
    let count = candidates.len();
    if count < 2 || !count.is_power_of_two() {
        return Err(BracketError::InvalidCandidateCount { count });
    }

    let mut seen = FxHashSet::default();
    for candidate in candidates {
        if !seen.insert(&candidate.id) {
            return Err(BracketError::DuplicateCandidate(candidate.id.clone()));
        }
    }

    Ok(())
}
