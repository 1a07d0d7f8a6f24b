pub mod games;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", post(games::create_game))
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/finds", post(games::report_find))
}
