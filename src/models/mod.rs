pub mod game;

pub use game::{Direction, FoundWord, GameStatus, Grid, Placement, Player, Position, Progress};
