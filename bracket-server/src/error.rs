//! API errors and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bracket_core::BracketError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::store::{StoreError, TournamentId};

/// Errors returned by route handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid input
    #[error("{0}")]
    BadRequest(String),

    #[error("tournament not found: {0}")]
    TournamentNotFound(TournamentId),

    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Engine precondition or contract violation
    #[error(transparent)]
    Bracket(#[from] BracketError),

    /// Store or sink failure
    #[error("store error: {0}")]
    Store(StoreError),

    /// Blocking store work panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::TournamentNotFound(id),
            StoreError::Invalid(msg) => ApiError::BadRequest(msg),
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TournamentNotFound(_) | ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Bracket(e) if e.is_contract_violation() => StatusCode::CONFLICT,
            ApiError::Bracket(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
