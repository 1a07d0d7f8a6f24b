use serde::Serialize;

use super::GameError;
use crate::models::{Direction, Grid, Position};

/// A validated, non-empty straight run of cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionPath {
    cells: Vec<Position>,
}

impl SelectionPath {
    /// Validate an arbitrary submitted path: non-empty, in bounds, and every
    /// step the same unit vector.
    pub fn from_cells(grid: &Grid, cells: Vec<Position>) -> Result<Self, GameError> {
        let (Some(&start), Some(&end)) = (cells.first(), cells.last()) else {
            return Err(GameError::EmptySelection);
        };
        for pos in &cells {
            grid.check(*pos)?;
        }

        let expected = PathGeometry::interpolate(start, end)?;
        if expected.cells != cells {
            return Err(GameError::NotStraight { start, end });
        }
        Ok(expected)
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn start(&self) -> Position {
        self.cells[0]
    }

    pub fn end(&self) -> Position {
        self.cells[self.cells.len() - 1]
    }

    /// `None` for a single-cell path.
    pub fn direction(&self) -> Option<Direction> {
        let (dr, dc) = deltas(self.start(), self.end());
        Direction::from_delta(dr, dc)
    }

    pub fn reversed(&self) -> Self {
        Self {
            cells: self.cells.iter().rev().copied().collect(),
        }
    }

    pub fn into_cells(self) -> Vec<Position> {
        self.cells
    }
}

fn deltas(start: Position, end: Position) -> (isize, isize) {
    (
        end.row as isize - start.row as isize,
        end.col as isize - start.col as isize,
    )
}

/// Straight-line geometry between two grid cells.
pub struct PathGeometry;

impl PathGeometry {
    pub fn is_straight(start: Position, end: Position) -> bool {
        let (dr, dc) = deltas(start, end);
        dr == 0 || dc == 0 || dr.abs() == dc.abs()
    }

    /// Every cell from `start` to `end` inclusive, one per unit step.
    /// Runs on every pointer move, so it stays O(path length).
    pub fn interpolate(start: Position, end: Position) -> Result<SelectionPath, GameError> {
        if !Self::is_straight(start, end) {
            return Err(GameError::NotStraight { start, end });
        }

        let (dr, dc) = deltas(start, end);
        let steps = dr.abs().max(dc.abs());
        let (step_row, step_col) = (dr.signum(), dc.signum());

        let cells = (0..=steps)
            .map(|i| {
                Position::new(
                    (start.row as isize + step_row * i) as usize,
                    (start.col as isize + step_col * i) as usize,
                )
            })
            .collect();

        Ok(SelectionPath { cells })
    }

    /// Bounds-check both endpoints, then interpolate.
    pub fn select(grid: &Grid, start: Position, end: Position) -> Result<SelectionPath, GameError> {
        grid.check(start)?;
        grid.check(end)?;
        Self::interpolate(start, end)
    }
}
