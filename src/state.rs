use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{config::Config, game::GameRoom, words::WordList};

/// How long a finished game stays around for late joiners
pub const COMPLETED_GAME_GRACE_PERIOD: Duration = Duration::from_secs(300);
/// Interval between sweeps for finished games
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    /// Used when a game is created without its own word list
    pub word_list: WordList,
    pub games: DashMap<Uuid, Arc<GameRoom>>,
}

impl AppState {
    pub fn new(config: Config, word_list: WordList) -> Self {
        Self {
            config,
            word_list,
            games: DashMap::new(),
        }
    }

    pub fn game(&self, game_id: &Uuid) -> Option<Arc<GameRoom>> {
        self.games.get(game_id).map(|entry| entry.value().clone())
    }

    /// Drop games that finished more than `grace` ago. Returns how many went.
    pub async fn remove_completed_games(&self, grace: Duration) -> usize {
        let rooms: Vec<Arc<GameRoom>> = self.games.iter().map(|e| e.value().clone()).collect();
        let now = Utc::now();
        let mut removed = 0;

        for room in rooms {
            let Some(completed_at) = room.completed_at().await else {
                continue;
            };
            let elapsed = (now - completed_at).to_std().unwrap_or_default();
            if elapsed >= grace && self.games.remove(&room.game_id()).is_some() {
                tracing::info!("Removed completed game {} (grace period expired)", room.game_id());
                removed += 1;
            }
        }

        removed
    }
}

/// Background task that periodically removes finished games
pub async fn game_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        interval.tick().await;
        state.remove_completed_games(COMPLETED_GAME_GRACE_PERIOD).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, ServerConfig};
    use crate::game::{BuiltGrid, GameSession};
    use crate::models::Grid;

    fn test_state() -> AppState {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            game: GameConfig {
                rows: 10,
                cols: 10,
                ..GameConfig::default()
            },
        };
        AppState::new(config, WordList::default_words())
    }

    #[tokio::test]
    async fn test_remove_completed_games() {
        let state = test_state();

        let mut session = GameSession::new(Uuid::new_v4(), WordList::new(["CAT"]).unwrap());
        session
            .start_with_grid(BuiltGrid {
                grid: Grid::from_rows(&["CAT"]).unwrap(),
                placements: Vec::new(),
                skipped: Vec::new(),
            })
            .unwrap();
        let done = GameRoom::spawn(session);
        done.record_find("CAT", Uuid::new_v4(), "#fff", Utc::now())
            .await
            .unwrap();

        let open = GameRoom::spawn(GameSession::new(Uuid::new_v4(), WordList::new(["DOG"]).unwrap()));

        state.games.insert(done.game_id(), done.clone());
        state.games.insert(open.game_id(), open.clone());

        assert_eq!(state.remove_completed_games(Duration::from_secs(60)).await, 0);
        assert_eq!(state.remove_completed_games(Duration::ZERO).await, 1);
        assert!(state.game(&done.game_id()).is_none());
        assert!(state.game(&open.game_id()).is_some());
    }
}
