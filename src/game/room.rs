use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, Mutex};
use uuid::Uuid;

use super::{GameError, GameSession, SelectionPath, SessionSnapshot};
use crate::models::{FoundWord, GameStatus, Player, Position, Progress};

pub const EVENT_CHANNEL_CAPACITY: usize = 256;
pub const INTAKE_CHANNEL_CAPACITY: usize = 100;

/// Outbound notifications for everyone watching a room
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    WordFound {
        find: FoundWord,
        /// Merged from the intake channel rather than found here
        remote: bool,
    },
    PlayerJoined(Player),
    PlayerLeft(Uuid),
    Complete(Progress),
}

/// A `GameSession` behind a single lock, with channels to the transport.
///
/// Every find goes through the one mutex, so checking and recording a word
/// cannot interleave with another find of the same word.
pub struct GameRoom {
    game_id: Uuid,
    session: Mutex<GameSession>,
    events: broadcast::Sender<RoomEvent>,
    intake: mpsc::Sender<FoundWord>,
}

impl GameRoom {
    /// Wrap a session and spawn the task that merges remote finds. The task
    /// ends once the room is dropped.
    pub fn spawn(session: GameSession) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (intake, mut rx) = mpsc::channel::<FoundWord>(INTAKE_CHANNEL_CAPACITY);

        let room = Arc::new(Self {
            game_id: session.game_id(),
            session: Mutex::new(session),
            events,
            intake,
        });

        let weak: Weak<Self> = Arc::downgrade(&room);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(room) = weak.upgrade() else {
                    break;
                };
                room.apply_remote_find(&event).await;
            }
            tracing::debug!("Find intake closed");
        });

        room
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Sender for finds reported by other participants
    pub fn intake(&self) -> mpsc::Sender<FoundWord> {
        self.intake.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn progress(&self) -> Progress {
        self.session.lock().await.progress()
    }

    pub async fn status(&self) -> GameStatus {
        self.session.lock().await.status()
    }

    pub async fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.session.lock().await.completed_at()
    }

    pub async fn player_count(&self) -> usize {
        self.session.lock().await.players().len()
    }

    /// Add a player, or let a known one back in. Fails with `GameFull` once
    /// the session's player cap is reached.
    pub async fn join(&self, id: Uuid, name: &str, color: &str) -> Result<Player, GameError> {
        let mut session = self.session.lock().await;
        let player = session.join(id, name, color)?;
        self.publish(RoomEvent::PlayerJoined(player.clone()));
        Ok(player)
    }

    pub async fn leave(&self, id: Uuid) -> Option<Player> {
        let mut session = self.session.lock().await;
        let player = session.leave(id)?;
        self.publish(RoomEvent::PlayerLeft(id));
        Some(player)
    }

    /// Validate a finished drag, match it and record the find in one step.
    pub async fn submit_selection(
        &self,
        player: Uuid,
        cells: Vec<Position>,
    ) -> Result<Option<FoundWord>, GameError> {
        let mut session = self.session.lock().await;
        let grid = session.grid().ok_or(GameError::NotStarted)?;
        let path = SelectionPath::from_cells(grid, cells)?;
        let found = session.claim(&path, player, Utc::now())?;

        if let Some(find) = &found {
            self.announce(find.clone(), false, session.progress());
        }
        Ok(found)
    }

    pub async fn record_find(
        &self,
        word: &str,
        finder_id: Uuid,
        color: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<FoundWord, GameError> {
        let mut session = self.session.lock().await;
        let find = session.record_find(word, finder_id, color, timestamp)?;
        self.announce(find.clone(), false, session.progress());
        Ok(find)
    }

    pub async fn apply_remote_find(&self, event: &FoundWord) -> bool {
        let mut session = self.session.lock().await;
        let applied = session.apply_remote_find(event);
        if applied {
            self.announce(event.clone(), true, session.progress());
        }
        applied
    }

    /// Publish a find, and completion if it was the last word. Callers hold
    /// the session lock so events go out in the order finds were recorded.
    fn announce(&self, find: FoundWord, remote: bool, progress: Progress) {
        self.publish(RoomEvent::WordFound { find, remote });
        if progress.is_complete() {
            self.publish(RoomEvent::Complete(progress));
        }
    }

    fn publish(&self, event: RoomEvent) {
        // No subscribers is fine; finds are fire-and-forget
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::BuiltGrid;
    use crate::models::Grid;
    use crate::words::WordList;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn room() -> Arc<GameRoom> {
        let mut session = GameSession::new(Uuid::new_v4(), WordList::new(["CAT", "DOG"]).unwrap());
        session
            .start_with_grid(BuiltGrid {
                grid: Grid::from_rows(&["CATXX", "XXXXX", "DOGXX"]).unwrap(),
                placements: Vec::new(),
                skipped: Vec::new(),
            })
            .unwrap();
        GameRoom::spawn(session)
    }

    fn row(row: usize, len: usize) -> Vec<Position> {
        (0..len).map(|col| Position::new(row, col)).collect()
    }

    #[tokio::test]
    async fn test_concurrent_record_find_credits_one_finder() {
        let room = room();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let room = room.clone();
            handles.push(tokio::spawn(async move {
                room.record_find("CAT", Uuid::new_v4(), "#ff4757", Utc::now())
                    .await
            }));
        }

        let mut wins = 0;
        let mut already = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(GameError::AlreadyFound { .. }) => already += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(already, 7);
        assert_eq!(room.progress().await.found, 1);
    }

    #[tokio::test]
    async fn test_submit_selection_broadcasts_find() {
        let room = room();
        let mut events = room.subscribe();
        let alice = room.join(Uuid::new_v4(), "Alice", "#ff4757").await.unwrap();
        assert_eq!(events.recv().await.unwrap(), RoomEvent::PlayerJoined(alice.clone()));

        let found = assert_ok!(room.submit_selection(alice.id, row(0, 3)).await);
        assert_eq!(found.as_ref().map(|f| f.word.as_str()), Some("CAT"));

        match events.recv().await.unwrap() {
            RoomEvent::WordFound { find, remote } => {
                assert_eq!(find.word, "CAT");
                assert_eq!(find.finder_id, alice.id);
                assert!(!remote);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_selection_rejects_bent_path() {
        let room = room();
        let alice = room.join(Uuid::new_v4(), "Alice", "#ff4757").await.unwrap();
        let bent = vec![Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)];
        let err = assert_err!(room.submit_selection(alice.id, bent).await);
        assert!(err.is_selection_error());
    }

    #[tokio::test]
    async fn test_complete_is_announced_after_every_find() {
        let words: Vec<String> = (b'A'..=b'H').map(|c| format!("{}X", c as char)).collect();
        let rows: Vec<String> = words.iter().map(|w| format!("{w}Q")).collect();
        let mut session = GameSession::new(Uuid::new_v4(), WordList::new(words.clone()).unwrap());
        session
            .start_with_grid(BuiltGrid {
                grid: Grid::from_rows(rows.as_slice()).unwrap(),
                placements: Vec::new(),
                skipped: Vec::new(),
            })
            .unwrap();
        let room = GameRoom::spawn(session);
        let mut events = room.subscribe();

        let mut handles = Vec::new();
        for word in words.clone() {
            let room = room.clone();
            handles.push(tokio::spawn(async move {
                room.record_find(&word, Uuid::new_v4(), "#ff4757", Utc::now())
                    .await
            }));
        }
        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }

        let mut found = 0;
        loop {
            match events.recv().await.unwrap() {
                RoomEvent::WordFound { .. } => found += 1,
                RoomEvent::Complete(progress) => {
                    assert_eq!(found, words.len());
                    assert_eq!(progress.found, words.len());
                    break;
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_joins_respect_max_players() {
        let session =
            GameSession::new(Uuid::new_v4(), WordList::new(["CAT"]).unwrap()).with_max_players(3);
        let room = GameRoom::spawn(session);

        let mut handles = Vec::new();
        for i in 0..10 {
            let room = room.clone();
            handles.push(tokio::spawn(async move {
                room.join(Uuid::new_v4(), &format!("Player{i}"), "#3742fa").await
            }));
        }

        let mut joined = 0;
        let mut full = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => joined += 1,
                Err(GameError::GameFull { max_players: 3 }) => full += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(joined, 3);
        assert_eq!(full, 7);
        assert_eq!(room.player_count().await, 3);
    }

    #[tokio::test]
    async fn test_intake_merges_remote_finds() {
        let room = room();
        let mut events = room.subscribe();
        let event = FoundWord {
            word: "DOG".to_string(),
            finder_id: Uuid::new_v4(),
            color: "#3742fa".to_string(),
            timestamp: Utc::now(),
        };

        // Delivered twice, merged once
        room.intake().send(event.clone()).await.unwrap();
        room.intake().send(event.clone()).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            received,
            RoomEvent::WordFound {
                find: event.clone(),
                remote: true
            }
        );

        // The duplicate produces no event of its own
        room.record_find("CAT", Uuid::new_v4(), "#fff", Utc::now())
            .await
            .unwrap();
        assert!(matches!(
            events.recv().await.unwrap(),
            RoomEvent::WordFound { remote: false, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            RoomEvent::Complete(Progress { found: 2, total: 2 })
        ));
        assert_eq!(room.status().await, GameStatus::Complete);
    }
}
