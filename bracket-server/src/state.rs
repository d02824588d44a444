//! Server state management
//!
//! Shared state for the tournament store and the play sessions in flight.

use bracket_core::BracketEngine;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::store::{CandidateSource, StatsSink, TournamentId, TournamentStore};

/// One player's run through a tournament.
///
/// The engine lives only here; the session table's lock is the single
/// point through which it is driven.
pub struct PlaySession {
    pub tournament_id: TournamentId,
    pub engine: BracketEngine,
    /// Last time the player viewed or picked
    pub last_active: Instant,
}

impl PlaySession {
    pub fn new(tournament_id: TournamentId, engine: BracketEngine) -> Self {
        Self {
            tournament_id,
            engine,
            last_active: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= timeout
    }
}

/// Sessions untouched for this long are dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Server-wide shared state
pub struct ServerState {
    pub store: Arc<TournamentStore>,
    pub source: Arc<dyn CandidateSource>,
    pub sink: Arc<dyn StatsSink>,
    pub sessions: RwLock<HashMap<Uuid, PlaySession>>,
    /// Base seed for session shuffles (None = entropy)
    pub shuffle_seed: Option<u64>,
    pub session_idle_timeout: Duration,
}

impl ServerState {
    /// State whose store is both candidate source and stats sink
    pub fn new(store: Arc<TournamentStore>) -> Self {
        Self {
            source: store.clone(),
            sink: store.clone(),
            store,
            sessions: RwLock::new(HashMap::new()),
            shuffle_seed: None,
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
        }
    }

    /// Replace the stats sink
    pub fn with_sink(mut self, sink: Arc<dyn StatsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Make session shuffles reproducible
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Drop sessions a player walked away from
    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.session_idle_timeout = timeout;
        self
    }

    /// Discard every session idle since before `now - session_idle_timeout`.
    ///
    /// Returns how many were dropped; nothing of theirs is persisted.
    pub fn evict_idle_sessions(
        sessions: &mut HashMap<Uuid, PlaySession>,
        now: Instant,
        timeout: Duration,
    ) -> usize {
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_idle(now, timeout));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "dropped idle sessions");
        }
        evicted
    }

    /// Fresh engine for a new session
    pub fn new_engine(&self, session_id: &Uuid) -> BracketEngine {
        let seed = self
            .shuffle_seed
            .map(|seed| seed ^ (session_id.as_u128() as u64));
        BracketEngine::with_seed(seed)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(Arc::new(TournamentStore::in_memory()))
    }
}
