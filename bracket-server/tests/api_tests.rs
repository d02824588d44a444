//! Integration tests for bracket-server API

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use bracket_core::StatsBatch;
use bracket_server::{
    create_router, ServerConfig, ServerState, StatsSink, StoreError, TournamentId,
    TournamentStore, STATS_NOT_SAVED_WARNING,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// TEST FIXTURES
// ============================================================================

struct FailingSink;

impl StatsSink for FailingSink {
    fn commit(&self, _id: TournamentId, _batch: &StatsBatch) -> Result<(), StoreError> {
        Err(StoreError::Rejected("database offline".to_string()))
    }
}

fn test_app() -> axum::Router {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::default());
    create_router(&config, state)
}

fn failing_sink_app() -> axum::Router {
    let config = ServerConfig::default();
    let state =
        ServerState::new(Arc::new(TournamentStore::in_memory())).with_sink(Arc::new(FailingSink));
    create_router(&config, Arc::new(state))
}

fn no_idle_app() -> axum::Router {
    let config = ServerConfig::default();
    let state = ServerState::default().with_session_idle_timeout(Duration::ZERO);
    create_router(&config, Arc::new(state))
}

fn tournament_body(n: usize) -> Value {
    let candidates: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("c{}", i),
                "name": format!("Candidate {}", i),
                "image_url": format!("https://img.example/{}.png", i),
            })
        })
        .collect();
    json!({ "title": "Best dessert", "candidates": candidates })
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_tournament(app: &axum::Router, n: usize) -> u64 {
    let body = Some(tournament_body(n));
    let (status, json) = send(app, Method::POST, "/api/tournaments", body).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_u64().unwrap()
}

async fn start_session(app: &axum::Router, tournament: u64) -> (String, Value) {
    let (status, json) = send(
        app,
        Method::POST,
        &format!("/api/tournaments/{}/sessions", tournament),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (json["session_id"].as_str().unwrap().to_string(), json)
}

/// Pick the left candidate until the bracket concludes; returns the final response
async fn play_out(app: &axum::Router, session: &str) -> Value {
    loop {
        let uri = format!("/api/sessions/{}", session);
        let (status, view) = send(app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let left = view["pair"]["left"]["id"].clone();

        let (status, json) = send(
            app,
            Method::POST,
            &format!("/api/sessions/{}/pick", session),
            Some(json!({ "candidate_id": left })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        if json["status"] == "concluded" {
            return json;
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();
    let (status, json) = send(&app, Method::GET, "/api/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "bracket");
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn test_create_list_and_get_tournament() {
    let app = test_app();
    let id = create_tournament(&app, 8).await;

    let (status, list) = send(&app, Method::GET, "/api/tournaments", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Best dessert");
    assert_eq!(list[0]["candidate_count"], 8);
    assert_eq!(list[0]["total_plays"], 0);

    let (status, detail) = send(&app, Method::GET, &format!("/api/tournaments/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["candidates"].as_array().unwrap().len(), 8);
    assert_eq!(detail["candidates"][0]["id"], "c0");
}

#[tokio::test]
async fn test_create_rejects_non_power_of_two() {
    let app = test_app();
    let body = Some(tournament_body(6));
    let (status, json) = send(&app, Method::POST, "/api/tournaments", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("power of two"));
}

#[tokio::test]
async fn test_unknown_tournament() {
    let app = test_app();
    let (status, _) = send(&app, Method::GET, "/api/tournaments/42/leaderboard", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/api/tournaments/42/sessions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_starts_with_first_pair() {
    let app = test_app();
    let id = create_tournament(&app, 8).await;
    let (_, view) = start_session(&app, id).await;

    assert_eq!(view["status"], "in_progress");
    assert_eq!(view["round_label"], "round of 8");
    assert_eq!(view["round_size"], 8);
    assert_eq!(view["progress"]["current_match"], 1);
    assert_eq!(view["progress"]["total_matches"], 4);
    assert!(view["pair"]["left"]["id"].is_string());
    assert_ne!(view["pair"]["left"]["id"], view["pair"]["right"]["id"]);
}

#[tokio::test]
async fn test_full_play_updates_leaderboard() {
    let app = test_app();
    let id = create_tournament(&app, 4).await;
    let (session, _) = start_session(&app, id).await;

    let result = play_out(&app, &session).await;
    assert_eq!(result["saved"], true);
    assert!(result.get("warning").is_none());
    assert_eq!(result["matches"].as_array().unwrap().len(), 3);

    let counters = result["counters"].as_array().unwrap();
    assert_eq!(counters.len(), 4);
    let wins: u64 = counters.iter().map(|c| c["match_wins"].as_u64().unwrap()).sum();
    let exposures: u64 = counters.iter().map(|c| c["match_exposures"].as_u64().unwrap()).sum();
    assert_eq!(wins, 3);
    assert_eq!(exposures, 6);

    // Concluded sessions are closed
    let (status, _) = send(&app, Method::GET, &format!("/api/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let champion = result["champion"]["id"].clone();
    let (status, board) = send(
        &app,
        Method::GET,
        &format!("/api/tournaments/{}/leaderboard", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["total_plays"], 1);
    assert_eq!(board["order"], "wins");
    assert_eq!(board["standings"][0]["candidate_id"], champion);
    assert_eq!(board["standings"][0]["rank"], 1);
    assert_eq!(board["standings"][0]["win_count"], 1);
    assert_eq!(board["standings"][0]["match_win_count"], 2);
    assert_eq!(board["standings"][0]["match_win_rate"], 1.0);
}

#[tokio::test]
async fn test_pick_outside_pair_is_conflict() {
    let app = test_app();
    let id = create_tournament(&app, 4).await;
    let (session, view) = start_session(&app, id).await;

    let left = view["pair"]["left"]["id"].as_str().unwrap().to_string();
    let right = view["pair"]["right"]["id"].as_str().unwrap().to_string();
    let outsider = ["c0", "c1", "c2", "c3"]
        .into_iter()
        .find(|c| *c != left && *c != right)
        .unwrap();

    let (status, json) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/pick", session),
        Some(json!({ "candidate_id": outsider })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("invalid pick"));

    let (_, after) = send(&app, Method::GET, &format!("/api/sessions/{}", session), None).await;
    assert_eq!(after["pair"], view["pair"]);
    assert_eq!(after["progress"]["current_match"], 1);
}

#[tokio::test]
async fn test_sink_failure_still_returns_champion() {
    let app = failing_sink_app();
    let id = create_tournament(&app, 2).await;
    let (session, _) = start_session(&app, id).await;

    let result = play_out(&app, &session).await;
    assert!(result["champion"]["id"].is_string());
    assert_eq!(result["saved"], false);
    assert_eq!(result["warning"], STATS_NOT_SAVED_WARNING);

    let (_, board) = send(
        &app,
        Method::GET,
        &format!("/api/tournaments/{}/leaderboard", id),
        None,
    )
    .await;
    assert_eq!(board["total_plays"], 0);
}

#[tokio::test]
async fn test_abandon_session() {
    let app = test_app();
    let id = create_tournament(&app, 4).await;
    let (session, view) = start_session(&app, id).await;

    let left = view["pair"]["left"]["id"].clone();
    send(
        &app,
        Method::POST,
        &format!("/api/sessions/{}/pick", session),
        Some(json!({ "candidate_id": left })),
    )
    .await;

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = send(&app, Method::GET, &format!("/api/tournaments/{}", id), None).await;
    assert_eq!(detail["total_plays"], 0);
}

#[tokio::test]
async fn test_leaderboard_order_param() {
    let app = test_app();
    let id = create_tournament(&app, 2).await;

    let (status, board) = send(
        &app,
        Method::GET,
        &format!("/api/tournaments/{}/leaderboard?order=win_rate", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["order"], "win_rate");
    assert_eq!(board["standings"].as_array().unwrap().len(), 2);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/tournaments/{}/leaderboard?order=elo", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_session() {
    let app = test_app();
    let (status, json) = send(
        &app,
        Method::GET,
        "/api/sessions/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("session not found"));
}

#[tokio::test]
async fn test_idle_sessions_are_dropped_on_start() {
    let app = no_idle_app();
    let id = create_tournament(&app, 4).await;

    let (first, _) = start_session(&app, id).await;
    let (second, _) = start_session(&app, id).await;

    let (_, status) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status["active_sessions"], 1);

    let (code, _) = send(&app, Method::GET, &format!("/api/sessions/{}", first), None).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    let (code, _) = send(&app, Method::GET, &format!("/api/sessions/{}", second), None).await;
    assert_eq!(code, StatusCode::OK);
}

#[tokio::test]
async fn test_abandoned_starts_do_not_accumulate() {
    let app = no_idle_app();
    let id = create_tournament(&app, 2).await;

    for _ in 0..50 {
        start_session(&app, id).await;
    }

    let (_, status) = send(&app, Method::GET, "/api/status", None).await;
    assert_eq!(status["active_sessions"], 1);
}
