//! Play session API endpoints
//!
//! A session wraps one bracket engine. The presentation layer polls the
//! current pair and posts picks; when the final is decided the session is
//! closed and its stats batch goes to the sink. A sink failure only produces
//! a warning: the champion is already known.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use bracket_core::{
    BracketEngine, BracketStatus, Candidate, CandidateId, MatchProgress, MatchRecord, PickOutcome,
    StatsBatch,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{PlaySession, ServerState};
use crate::store::{StoreError, TournamentId};

/// Shown when the sink rejected a finished session
pub const STATS_NOT_SAVED_WARNING: &str = "stats may not have saved";

#[derive(Serialize)]
pub struct PairView {
    pub left: Candidate,
    pub right: Candidate,
}

#[derive(Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub tournament_id: TournamentId,
    pub status: BracketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_label: Option<String>,
    pub round_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<MatchProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairView>,
}

#[derive(Serialize)]
pub struct CounterView {
    pub candidate_id: CandidateId,
    pub match_wins: u32,
    pub match_exposures: u32,
}

#[derive(Serialize)]
pub struct PickResponse {
    pub status: BracketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<Vec<CounterView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Pick request
#[derive(Deserialize)]
pub struct PickRequest {
    pub candidate_id: CandidateId,
}

/// Everything taken out of a session once it concludes
struct FinishedSession {
    tournament_id: TournamentId,
    champion: Candidate,
    counters: Vec<CounterView>,
    matches: Vec<MatchRecord>,
    batch: StatsBatch,
}

/// Start a new session for a tournament
pub async fn start_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let tournament_id = TournamentId(id);
    let candidates = state.source.candidates(tournament_id)?;

    let session_id = Uuid::new_v4();
    let mut engine = state.new_engine(&session_id);
    engine.initialize(candidates)?;
    let view = session_view(session_id, tournament_id, &engine);

    {
        let mut sessions = state.sessions.write().map_err(|_| StoreError::Poisoned)?;
        ServerState::evict_idle_sessions(
            &mut sessions,
            Instant::now(),
            state.session_idle_timeout,
        );
        sessions.insert(session_id, PlaySession::new(tournament_id, engine));
    }

    tracing::info!(session = %session_id, tournament = %tournament_id, "session started");
    Ok((StatusCode::CREATED, Json(view)))
}

/// Current pair, round and progress of a session
pub async fn get_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let mut sessions = state.sessions.write().map_err(|_| StoreError::Poisoned)?;
    let session = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
    session.touch();
    Ok(Json(session_view(id, session.tournament_id, &session.engine)))
}

/// Drop a session without recording anything
pub async fn abandon_session(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = state
        .sessions
        .write()
        .map_err(|_| StoreError::Poisoned)?
        .remove(&id);

    match removed {
        Some(_) => {
            tracing::info!(session = %id, "session abandoned");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::SessionNotFound(id)),
    }
}

/// Record the player's pick for the current pair
pub async fn record_pick(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PickRequest>,
) -> Result<Json<PickResponse>, ApiError> {
    let finished = {
        let mut sessions = state.sessions.write().map_err(|_| StoreError::Poisoned)?;
        let session = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound(id))?;
        session.touch();

        match session.engine.record_pick(&req.candidate_id)? {
            PickOutcome::Champion(champion) => {
                let finished = finish_session(session, champion)?;
                sessions.remove(&id);
                finished
            }
            PickOutcome::NextMatch | PickOutcome::NextRound { .. } => {
                let view = session_view(id, session.tournament_id, &session.engine);
                return Ok(Json(PickResponse {
                    status: view.status,
                    session: Some(view),
                    champion: None,
                    counters: None,
                    matches: None,
                    saved: None,
                    warning: None,
                }));
            }
        }
    };

    // The bracket is resolved and out of the session table; the sink can
    // fail without touching it.
    let sink = state.sink.clone();
    let tournament_id = finished.tournament_id;
    let batch = finished.batch;
    let commit = tokio::task::spawn_blocking(move || sink.commit(tournament_id, &batch)).await;

    let saved = match commit {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::warn!(
                session = %id,
                tournament = %tournament_id,
                "failed to save session stats: {}",
                e
            );
            false
        }
        Err(e) => {
            tracing::warn!(session = %id, "stats commit task failed: {}", e);
            false
        }
    };

    tracing::info!(
        session = %id,
        champion = %finished.champion.id,
        saved,
        "session concluded"
    );

    Ok(Json(PickResponse {
        status: BracketStatus::Concluded,
        session: None,
        champion: Some(finished.champion),
        counters: Some(finished.counters),
        matches: Some(finished.matches),
        saved: Some(saved),
        warning: (!saved).then(|| STATS_NOT_SAVED_WARNING.to_string()),
    }))
}

/// Snapshot the presentation view of an engine
fn session_view(
    session_id: Uuid,
    tournament_id: TournamentId,
    engine: &BracketEngine,
) -> SessionView {
    SessionView {
        session_id,
        tournament_id,
        status: engine.status(),
        round_label: engine.round_label().map(|l| l.to_string()),
        round_size: engine.round_size(),
        progress: engine.match_progress(),
        pair: engine.current_pair().map(|(left, right)| PairView {
            left: left.clone(),
            right: right.clone(),
        }),
    }
}

/// Collect final results from a concluded session
fn finish_session(session: &PlaySession, champion: Candidate) -> Result<FinishedSession, ApiError> {
    let batch = session.engine.stats_batch()?;
    let counters = session
        .engine
        .session_counters()
        .into_iter()
        .map(|(candidate_id, c)| CounterView {
            candidate_id,
            match_wins: c.match_wins,
            match_exposures: c.match_exposures,
        })
        .collect();

    Ok(FinishedSession {
        tournament_id: session.tournament_id,
        champion,
        counters,
        matches: session.engine.history().to_vec(),
        batch,
    })
}
