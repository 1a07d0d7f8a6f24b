// Puzzle engine: grid generation, path geometry, matching and sessions

pub mod error;
pub mod grid;
pub mod matcher;
pub mod path;
pub mod room;
pub mod selection;
pub mod session;

pub use error::GameError;
pub use grid::{BuildOptions, BuiltGrid, DirectionSet, FillStrategy, GridBuilder, PlacementPolicy};
pub use matcher::WordMatcher;
pub use path::{PathGeometry, SelectionPath};
pub use room::{GameRoom, RoomEvent};
pub use selection::DragSelection;
pub use session::{GameSession, PlayerScore, SessionSnapshot};
