use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dashmap::mapref::entry::Entry;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    game::{GameError, GameRoom, GameSession, SessionSnapshot},
    models::Placement,
    websocket::messages::TransportEvent,
    words::WordList,
    AppState,
};

/// Session bootstrap from the game-management layer. Anything omitted falls
/// back to the server configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub game_id: Option<Uuid>,
    pub word_list: Option<WordList>,
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    /// Fixed seed for a reproducible grid
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub game_id: Uuid,
    pub rows: usize,
    pub cols: usize,
    pub grid: Vec<String>,
    pub words: Vec<String>,
    pub placements: Vec<Placement>,
}

fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::PlacementFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        GameError::AlreadyFound { .. } | GameError::AlreadyStarted => StatusCode::CONFLICT,
        GameError::UnknownPlayer { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Create a game and generate its grid
pub async fn create_game(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), StatusCode> {
    let game_id = payload.game_id.unwrap_or_else(Uuid::new_v4);
    let words = payload.word_list.unwrap_or_else(|| state.word_list.clone());
    let rows = payload.rows.unwrap_or(state.config.game.rows);
    let cols = payload.cols.unwrap_or(state.config.game.cols);
    let seed = payload.seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Creating game {} ({}x{}, {} words, seed {})",
        game_id,
        rows,
        cols,
        words.len(),
        seed
    );

    let builder = state.config.game.grid_builder(rows, cols).map_err(|e| {
        tracing::error!("Rejected grid dimensions: {}", e);
        status_for(&e)
    })?;

    let mut session =
        GameSession::new(game_id, words).with_max_players(state.config.game.max_players);
    session
        .start(&builder, &mut StdRng::seed_from_u64(seed))
        .map_err(|e| {
            tracing::error!("Failed to build grid for game {}: {}", game_id, e);
            status_for(&e)
        })?;

    let response = {
        let grid = session.grid().ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
        CreateGameResponse {
            game_id,
            rows: grid.rows(),
            cols: grid.cols(),
            grid: grid.to_strings(),
            words: session.words().as_slice().to_vec(),
            placements: session.placements().to_vec(),
        }
    };

    match state.games.entry(game_id) {
        Entry::Occupied(_) => {
            tracing::warn!("Game {} already exists", game_id);
            return Err(StatusCode::CONFLICT);
        }
        Entry::Vacant(slot) => {
            slot.insert(GameRoom::spawn(session));
        }
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// Current state of a game
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, StatusCode> {
    let room = state.game(&game_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(room.snapshot().await))
}

/// Intake for finds relayed by the real-time transport. Merging is
/// asynchronous and idempotent.
pub async fn report_find(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
    Json(TransportEvent::WordFound(find)): Json<TransportEvent>,
) -> Result<StatusCode, StatusCode> {
    let room = state.game(&game_id).ok_or(StatusCode::NOT_FOUND)?;

    tracing::debug!("Remote find of {} in game {}", find.word, game_id);

    room.intake().send(find).await.map_err(|e| {
        tracing::error!("Find intake for game {} is closed: {}", game_id, e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(StatusCode::ACCEPTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GameConfig, ServerConfig};
    use crate::routes::create_routes;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        Router,
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Arc<AppState>, Router) {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            game: GameConfig {
                rows: 12,
                cols: 12,
                ..GameConfig::default()
            },
        };
        let state = Arc::new(AppState::new(config, WordList::default_words()));
        let router = create_routes().with_state(state.clone());
        (state, router)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_create_game_request_deserialization() {
        let json = r#"{"wordList": ["cat", "dog"], "rows": 5, "cols": 5, "seed": 7}"#;
        let request: CreateGameRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.word_list.unwrap().as_slice(), ["CAT", "DOG"]);
        assert_eq!(request.seed, Some(7));
        assert!(request.game_id.is_none());
    }

    #[test]
    fn test_status_for_errors() {
        assert_eq!(
            status_for(&GameError::PlacementFailed {
                word: "CAT".to_string()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&GameError::InvalidDimensions { rows: 0, cols: 0 }),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_create_and_fetch_game() {
        let (_state, app) = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/games",
                json!({"wordList": ["cat", "dog"], "rows": 6, "cols": 6, "seed": 1}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        assert_eq!(created["rows"], 6);
        assert_eq!(created["grid"].as_array().unwrap().len(), 6);
        assert_eq!(created["placements"].as_array().unwrap().len(), 2);
        let game_id = created["gameId"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/games/{game_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot = body_json(response).await;
        assert_eq!(snapshot["status"], "inprogress");
        assert_eq!(snapshot["progress"], json!({"found": 0, "total": 2}));
    }

    #[tokio::test]
    async fn test_same_seed_same_grid() {
        let (_state, app) = app();
        let body = json!({"wordList": ["react", "canvas"], "rows": 8, "cols": 8, "seed": 99});

        let first = body_json(app.clone().oneshot(post_json("/api/games", body.clone())).await.unwrap()).await;
        let second = body_json(app.oneshot(post_json("/api/games", body)).await.unwrap()).await;
        assert_eq!(first["grid"], second["grid"]);
        assert_ne!(first["gameId"], second["gameId"]);
    }

    #[tokio::test]
    async fn test_unplaceable_word_is_rejected() {
        let (_state, app) = app();
        let response = app
            .oneshot(post_json(
                "/api/games",
                json!({"wordList": ["elephant"], "rows": 4, "cols": 4}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_oversized_grid_is_rejected() {
        let (state, app) = app();
        for (rows, cols) in [(100_000u64, 100_000u64), (u64::MAX, 2), (0, 5)] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/games",
                    json!({"wordList": ["cat"], "rows": rows, "cols": cols}),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(state.games.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_game_id_conflicts() {
        let (_state, app) = app();
        let body = json!({"gameId": Uuid::new_v4(), "rows": 10, "cols": 10});
        let first = app.clone().oneshot(post_json("/api/games", body.clone())).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = app.oneshot(post_json("/api/games", body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unknown_game_is_not_found() {
        let (_state, app) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/games/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_report_find_is_merged() {
        let (state, app) = app();
        let created = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/games",
                    json!({"wordList": ["cat"], "rows": 5, "cols": 5, "seed": 3}),
                ))
                .await
                .unwrap(),
        )
        .await;
        let game_id: Uuid = created["gameId"].as_str().unwrap().parse().unwrap();
        let room = state.game(&game_id).unwrap();
        let mut events = room.subscribe();

        let event = json!({
            "type": "word_found",
            "word": "CAT",
            "finderId": Uuid::new_v4(),
            "color": "#3742fa",
            "timestamp": "2024-05-01T12:00:00Z"
        });
        let response = app
            .oneshot(post_json(&format!("/api/games/{game_id}/finds"), event))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let received = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(received, crate::game::RoomEvent::WordFound { remote: true, .. }));
        assert_eq!(room.progress().await.found, 1);
    }
}
