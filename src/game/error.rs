use thiserror::Error;
use uuid::Uuid;

use crate::models::Position;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("could not place word {word} within the retry budget")]
    PlacementFailed { word: String },
    #[error("coordinate ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
    #[error("selection from {start} to {end} is not a straight line")]
    NotStraight { start: Position, end: Position },
    #[error("word {word} has already been found")]
    AlreadyFound { word: String },
    #[error("word {word} is not in this game's word list")]
    UnknownWord { word: String },
    #[error("selection is empty or too short")]
    EmptySelection,
    #[error("game has not started")]
    NotStarted,
    #[error("game has already started")]
    AlreadyStarted,
    #[error("game is full ({max_players} players)")]
    GameFull { max_players: usize },
    #[error("player {id} has not joined this game")]
    UnknownPlayer { id: Uuid },
    #[error("invalid word list: {0}")]
    InvalidWordList(String),
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}

impl GameError {
    /// Errors that only mean "this drag did not select anything".
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            GameError::OutOfBounds { .. } | GameError::NotStraight { .. } | GameError::EmptySelection
        )
    }
}
