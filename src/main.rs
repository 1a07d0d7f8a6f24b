use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordsearch_backend::{
    config::Config,
    routes,
    state::{game_cleanup_task, AppState},
    websocket,
    words::WordList,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wordsearch_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting word search backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load the default word list
    let word_list = match &config.game.word_list_path {
        Some(path) => match WordList::load(path).await {
            Ok(words) => words,
            Err(e) => {
                tracing::warn!("Failed to load word list: {:#}. Using built-in words.", e);
                WordList::default_words()
            }
        },
        None => WordList::default_words(),
    };
    tracing::info!("Default word list has {} words", word_list.len());

    let state = Arc::new(AppState::new(config.clone(), word_list));

    // Spawn background task to drop finished games
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        game_cleanup_task(cleanup_state).await;
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
