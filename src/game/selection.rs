use super::{GameError, PathGeometry, SelectionPath};
use crate::models::{Grid, Position};

/// Tracks one participant's drag across the grid.
///
/// Purely local: reads the grid and never touches the session.
#[derive(Debug, Default, Clone)]
pub struct DragSelection {
    start: Option<Position>,
    path: Vec<Position>,
}

impl DragSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    /// Current highlighted cells
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Pointer down. Out-of-range input leaves no drag active.
    pub fn begin(&mut self, grid: &Grid, row: i64, col: i64) -> Result<(), GameError> {
        self.cancel();
        let start = grid.position(row, col)?;
        self.start = Some(start);
        self.path = vec![start];
        Ok(())
    }

    /// Pointer move. The path only follows straight drags; anything else
    /// keeps the last straight path.
    pub fn extend(&mut self, grid: &Grid, row: i64, col: i64) -> &[Position] {
        let Some(start) = self.start else {
            return &self.path;
        };
        let Ok(end) = grid.position(row, col) else {
            return &self.path;
        };
        if let Ok(path) = PathGeometry::interpolate(start, end) {
            self.path = path.into_cells();
        }
        &self.path
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.path.clear();
    }

    /// Pointer up. Yields a path worth matching only if it spans at least
    /// two cells.
    pub fn finish(&mut self) -> Option<SelectionPath> {
        let start = self.start.take()?;
        let cells = std::mem::take(&mut self.path);
        let end = *cells.last()?;
        if cells.len() < 2 {
            return None;
        }
        PathGeometry::interpolate(start, end).ok()
    }
}
