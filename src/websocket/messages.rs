use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{RoomEvent, SessionSnapshot};
use crate::models::{FoundWord, Player, Position, Progress};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame {
        game_id: Uuid,
        /// Reuse an identity from an earlier connection
        #[serde(default)]
        player_id: Option<Uuid>,
        name: String,
        color: String,
    },
    /// A finished drag, start to end
    SubmitSelection {
        positions: Vec<Position>,
    },
    LeaveGame,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameState(SessionSnapshot),
    Joined {
        player: Player,
    },
    WordFound(FoundWord),
    /// The selection spelled nothing still available
    NoMatch,
    InvalidSelection {
        reason: String,
    },
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: Uuid,
    },
    GameComplete {
        progress: Progress,
    },
    Error {
        message: String,
    },
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::WordFound { find, .. } => ServerMessage::WordFound(find),
            RoomEvent::PlayerJoined(player) => ServerMessage::PlayerJoined { player },
            RoomEvent::PlayerLeft(player_id) => ServerMessage::PlayerLeft { player_id },
            RoomEvent::Complete(progress) => ServerMessage::GameComplete { progress },
        }
    }
}

/// Find notifications exchanged with an external real-time transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    WordFound(FoundWord),
}
