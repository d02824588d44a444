//! Tournament store - candidate source and persistence sink
//!
//! The bracket engine only sees candidates going in and a [`StatsBatch`]
//! coming out. This module owns everything durable: tournament definitions,
//! their ledgers, and the optional JSON data file they are mirrored to.

use bracket_core::{Candidate, StatsBatch, TournamentDef};
use bracket_stats::Ledger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Identifier of a stored tournament
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(pub u64);

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by stores and sinks
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("invalid tournament: {0}")]
    Invalid(String),

    #[error("sink rejected update: {0}")]
    Rejected(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Supplies the candidate list of a tournament
pub trait CandidateSource: Send + Sync {
    fn candidates(&self, id: TournamentId) -> Result<Vec<Candidate>, StoreError>;
}

/// Receives the stats of finished sessions.
///
/// Implementations apply batches additively; a failure must leave durable
/// counters untouched.
pub trait StatsSink: Send + Sync {
    fn commit(&self, id: TournamentId, batch: &StatsBatch) -> Result<(), StoreError>;
}

/// A tournament with its durable counters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredTournament {
    pub id: TournamentId,
    pub def: TournamentDef,
    pub ledger: Ledger,
}

/// On-disk layout of the data file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    next_id: u64,
    tournaments: Vec<StoredTournament>,
}

/// In-memory tournament store, mirrored to a JSON file when configured
pub struct TournamentStore {
    inner: RwLock<StoreSnapshot>,
    data_file: Option<PathBuf>,
}

impl TournamentStore {
    /// Store that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(StoreSnapshot {
                next_id: 1,
                tournaments: Vec::new(),
            }),
            data_file: None,
        }
    }

    /// Store backed by `path`; existing contents are loaded
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let mut snapshot: StoreSnapshot = serde_json::from_str(&content)?;
            let max_id = snapshot.tournaments.iter().map(|t| t.id.0).max().unwrap_or(0);
            snapshot.next_id = snapshot.next_id.max(max_id + 1);
            tracing::info!(
                "Loaded {} tournaments from {}",
                snapshot.tournaments.len(),
                path.display()
            );
            snapshot
        } else {
            StoreSnapshot {
                next_id: 1,
                tournaments: Vec::new(),
            }
        };

        Ok(Self {
            inner: RwLock::new(snapshot),
            data_file: Some(path.to_path_buf()),
        })
    }

    /// Add a validated tournament, returning its id
    pub fn create(&self, def: TournamentDef) -> Result<TournamentId, StoreError> {
        def.validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let id = TournamentId(inner.next_id);
        inner.next_id += 1;
        inner.tournaments.push(StoredTournament {
            id,
            def,
            ledger: Ledger::new(),
        });

        if let Err(e) = self.persist(&inner) {
            inner.tournaments.pop();
            inner.next_id -= 1;
            return Err(e);
        }

        tracing::info!(tournament = %id, "tournament created");
        Ok(id)
    }

    pub fn get(&self, id: TournamentId) -> Result<StoredTournament, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        inner
            .tournaments
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// All tournaments, oldest first
    pub fn list(&self) -> Result<Vec<StoredTournament>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.tournaments.clone())
    }

    /// Write the snapshot to the data file, if any
    fn persist(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(snapshot)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl CandidateSource for TournamentStore {
    fn candidates(&self, id: TournamentId) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.get(id)?.def.candidates)
    }
}

impl StatsSink for TournamentStore {
    fn commit(&self, id: TournamentId, batch: &StatsBatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let index = inner
            .tournaments
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let previous = inner.tournaments[index].ledger.clone();
        inner.tournaments[index].ledger.apply(batch);

        if let Err(e) = self.persist(&inner) {
            // Keep memory and disk in agreement
            inner.tournaments[index].ledger = previous;
            return Err(e);
        }

        tracing::debug!(tournament = %id, "session stats committed");
        Ok(())
    }
}
