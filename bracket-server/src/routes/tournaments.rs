//! Tournament API endpoints
//!
//! Creating and listing tournaments, and their leaderboards.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bracket_core::{Candidate, TournamentDef};
use bracket_stats::{compute_standings, LeaderboardOrder, Standing};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::ServerState;
use crate::store::{StoredTournament, TournamentId};

#[derive(Serialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub candidate_count: usize,
    pub total_plays: u64,
}

impl From<&StoredTournament> for TournamentSummary {
    fn from(t: &StoredTournament) -> Self {
        Self {
            id: t.id,
            title: t.def.title.clone(),
            description: t.def.description.clone(),
            candidate_count: t.def.candidates.len(),
            total_plays: t.ledger.total_plays,
        }
    }
}

#[derive(Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub summary: TournamentSummary,
    pub candidates: Vec<Candidate>,
}

/// List all tournaments
pub async fn list_tournaments(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<TournamentSummary>>, ApiError> {
    let tournaments = state.store.list()?;
    Ok(Json(tournaments.iter().map(TournamentSummary::from).collect()))
}

/// Create a tournament from a title and candidate list
pub async fn create_tournament(
    State(state): State<Arc<ServerState>>,
    Json(def): Json<TournamentDef>,
) -> Result<(StatusCode, Json<TournamentSummary>), ApiError> {
    // Creating may write the data file
    let store = state.store.clone();
    let id = tokio::task::spawn_blocking(move || store.create(def)).await??;
    let stored = state.store.get(id)?;
    Ok((StatusCode::CREATED, Json(TournamentSummary::from(&stored))))
}

/// Get one tournament with its candidates
pub async fn get_tournament(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let stored = state.store.get(TournamentId(id))?;
    Ok(Json(TournamentDetail {
        summary: TournamentSummary::from(&stored),
        candidates: stored.def.candidates,
    }))
}

/// Leaderboard query params
#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub order: Option<String>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub tournament_id: TournamentId,
    pub total_plays: u64,
    pub order: LeaderboardOrder,
    pub standings: Vec<Standing>,
}

/// Ranked standings of a tournament
pub async fn get_leaderboard(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let order = match params.order.as_deref() {
        Some(s) => s.parse::<LeaderboardOrder>().map_err(ApiError::BadRequest)?,
        None => LeaderboardOrder::default(),
    };

    let stored = state.store.get(TournamentId(id))?;
    let standings = compute_standings(&stored.def.candidates, &stored.ledger, order);

    Ok(Json(LeaderboardResponse {
        tournament_id: stored.id,
        total_plays: stored.ledger.total_plays,
        order,
        standings,
    }))
}
