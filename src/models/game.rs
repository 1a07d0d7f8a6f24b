use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::GameError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the eight compass directions a word can run in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Left-to-right and top-to-bottom only.
    pub const ORTHOGONAL: [Direction; 2] = [Direction::East, Direction::South];

    /// Unit step as (row delta, col delta)
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Direction of a non-zero straight delta; `None` for zero or skewed deltas.
    pub fn from_delta(row: isize, col: isize) -> Option<Self> {
        if !(row == 0 || col == 0 || row.abs() == col.abs()) {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|dir| dir.delta() == (row.signum(), col.signum()) && (row != 0 || col != 0))
    }
}

/// Immutable letter grid, stored row-major.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<char>>,
}

impl Grid {
    pub(crate) fn from_cells(cells: Vec<Vec<char>>) -> Self {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        Self { rows, cols, cells }
    }

    /// Build a grid from one string per row. All rows must be the same length.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GameError> {
        let cells: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.as_ref().chars().map(|c| c.to_ascii_uppercase()).collect())
            .collect();

        let cols = cells.first().map_or(0, Vec::len);
        if cells.is_empty() || cols == 0 || cells.iter().any(|row| row.len() != cols) {
            return Err(GameError::InvalidDimensions {
                rows: cells.len(),
                cols,
            });
        }

        Ok(Self::from_cells(cells))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Bounds-check a signed coordinate, as produced by pointer input.
    pub fn position(&self, row: i64, col: i64) -> Result<Position, GameError> {
        let out_of_bounds = GameError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        };
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(col)) else {
            return Err(out_of_bounds);
        };
        let pos = Position::new(r, c);
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(out_of_bounds)
        }
    }

    pub fn check(&self, pos: Position) -> Result<Position, GameError> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(GameError::OutOfBounds {
                row: pos.row as i64,
                col: pos.col as i64,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub fn get(&self, pos: Position) -> Option<char> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col)).copied()
    }

    pub fn letter(&self, pos: Position) -> Result<char, GameError> {
        self.check(pos)?;
        Ok(self.cells[pos.row][pos.col])
    }

    /// Read the letters under `positions`, in order.
    pub fn spell(&self, positions: &[Position]) -> Result<String, GameError> {
        positions.iter().map(|pos| self.letter(*pos)).collect()
    }

    /// One string per row, for compact wire transfer.
    pub fn to_strings(&self) -> Vec<String> {
        self.cells.iter().map(|row| row.iter().collect()).collect()
    }
}

/// Where a word was hidden at generation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub word: String,
    pub direction: Direction,
    pub cells: Vec<Position>,
}

/// A claimed word. Created once per word and never modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FoundWord {
    pub word: String,
    pub finder_id: Uuid,
    pub color: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub is_leader: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub found: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.found == self.total
    }
}
