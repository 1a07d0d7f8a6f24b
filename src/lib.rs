pub mod config;
pub mod game;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;
pub mod websocket;
pub mod words;

pub use state::AppState;
