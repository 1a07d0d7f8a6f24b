use std::ops::Range;
use std::str::FromStr;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::GameError;
use crate::{
    models::{Direction, Grid, Placement, Position},
    utils::letters::{uniform_letter, weighted_letter},
    words::WordList,
};

/// Placement attempts per word before the policy kicks in
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 50;
pub const DEFAULT_RESEED_ROUNDS: u32 = 3;
/// Upper bound on `rows * cols` for a single grid
pub const MAX_GRID_CELLS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionSet {
    /// Horizontal left-to-right and vertical top-to-bottom only
    Orthogonal,
    /// All eight compass directions
    All,
}

impl DirectionSet {
    pub fn directions(self) -> &'static [Direction] {
        match self {
            DirectionSet::Orthogonal => &Direction::ORTHOGONAL,
            DirectionSet::All => &Direction::ALL,
        }
    }
}

impl FromStr for DirectionSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "orthogonal" => Ok(DirectionSet::Orthogonal),
            "all" => Ok(DirectionSet::All),
            other => Err(format!("unknown direction set: {other}")),
        }
    }
}

/// What to do when a word cannot be placed within its attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Log the word and leave it out of the game
    Skip,
    /// Return `PlacementFailed` straight away
    FailFast,
    /// Rebuild the whole grid from a fresh seed, up to `rounds` more times
    Reseed { rounds: u32 },
}

impl FromStr for PlacementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(PlacementPolicy::Skip),
            "fail" | "fail_fast" => Ok(PlacementPolicy::FailFast),
            "reseed" => Ok(PlacementPolicy::Reseed {
                rounds: DEFAULT_RESEED_ROUNDS,
            }),
            other => Err(format!("unknown placement policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    Uniform,
    /// English letter frequencies
    Weighted,
}

impl FromStr for FillStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(FillStrategy::Uniform),
            "weighted" => Ok(FillStrategy::Weighted),
            other => Err(format!("unknown fill strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub attempts: u32,
    pub directions: DirectionSet,
    pub policy: PlacementPolicy,
    pub fill: FillStrategy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            directions: DirectionSet::All,
            policy: PlacementPolicy::Reseed {
                rounds: DEFAULT_RESEED_ROUNDS,
            },
            fill: FillStrategy::Uniform,
        }
    }
}

/// Output of a successful build.
#[derive(Debug, Clone)]
pub struct BuiltGrid {
    pub grid: Grid,
    /// In word-list order, placed words only
    pub placements: Vec<Placement>,
    /// Words dropped under `PlacementPolicy::Skip`
    pub skipped: Vec<String>,
}

impl BuiltGrid {
    pub fn placement(&self, word: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.word == word)
    }
}

pub struct GridBuilder {
    rows: usize,
    cols: usize,
    options: BuildOptions,
}

impl GridBuilder {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GameError> {
        Self::with_max_cells(rows, cols, MAX_GRID_CELLS)
    }

    /// Like [`GridBuilder::new`], rejecting grids of more than `max_cells` cells.
    pub fn with_max_cells(rows: usize, cols: usize, max_cells: usize) -> Result<Self, GameError> {
        let fits = rows
            .checked_mul(cols)
            .is_some_and(|cells| cells > 0 && cells <= max_cells);
        if !fits {
            return Err(GameError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            options: BuildOptions::default(),
        })
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Hide every word in a fresh grid and fill the rest with noise letters.
    /// The same words, dimensions, options and RNG state always give the same grid.
    pub fn build(&self, words: &WordList, rng: &mut impl Rng) -> Result<BuiltGrid, GameError> {
        match self.options.policy {
            PlacementPolicy::Skip => self.build_once(words, rng, true),
            PlacementPolicy::FailFast => self.build_once(words, rng, false),
            PlacementPolicy::Reseed { rounds } => {
                let mut round = 0;
                loop {
                    let mut round_rng = StdRng::seed_from_u64(rng.random::<u64>());
                    match self.build_once(words, &mut round_rng, false) {
                        Err(e @ GameError::PlacementFailed { .. }) if round < rounds => {
                            tracing::warn!("Grid build round {} failed: {}; reseeding", round, e);
                            round += 1;
                        }
                        result => return result,
                    }
                }
            }
        }
    }

    fn build_once(
        &self,
        words: &WordList,
        rng: &mut impl Rng,
        skip_failures: bool,
    ) -> Result<BuiltGrid, GameError> {
        let mut cells: Vec<Vec<Option<char>>> = vec![vec![None; self.cols]; self.rows];
        let mut placements = Vec::with_capacity(words.len());
        let mut skipped = Vec::new();

        for word in words.iter() {
            match self.place_word(&mut cells, word, rng) {
                Some(placement) => placements.push(placement),
                None if skip_failures => {
                    tracing::warn!(
                        "Skipping word {}: no valid placement after {} attempts",
                        word,
                        self.options.attempts
                    );
                    skipped.push(word.to_string());
                }
                None => {
                    return Err(GameError::PlacementFailed {
                        word: word.to_string(),
                    })
                }
            }
        }

        let grid = Grid::from_cells(
            cells
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|cell| cell.unwrap_or_else(|| self.random_letter(rng)))
                        .collect()
                })
                .collect(),
        );

        tracing::debug!(
            "Built {}x{} grid with {} words placed, {} skipped",
            self.rows,
            self.cols,
            placements.len(),
            skipped.len()
        );

        Ok(BuiltGrid {
            grid,
            placements,
            skipped,
        })
    }

    fn place_word(
        &self,
        cells: &mut [Vec<Option<char>>],
        word: &str,
        rng: &mut impl Rng,
    ) -> Option<Placement> {
        let letters: Vec<char> = word.chars().collect();
        let directions = self.options.directions.directions();

        // Nothing to try if the word is longer than every direction allows
        if !directions
            .iter()
            .any(|dir| self.start_ranges(*dir, letters.len()).is_some())
        {
            return None;
        }

        for attempt in 0..self.options.attempts {
            let direction = directions[rng.random_range(0..directions.len())];
            let Some((row_range, col_range)) = self.start_ranges(direction, letters.len()) else {
                continue;
            };
            let start = Position::new(rng.random_range(row_range), rng.random_range(col_range));
            let path = Self::cells_for(start, direction, letters.len());

            if Self::can_place(cells, &letters, &path) {
                for (pos, letter) in path.iter().zip(&letters) {
                    cells[pos.row][pos.col] = Some(*letter);
                }
                tracing::debug!(
                    "Placed {} at {} heading {:?} after {} attempts",
                    word,
                    start,
                    direction,
                    attempt + 1
                );
                return Some(Placement {
                    word: word.to_string(),
                    direction,
                    cells: path,
                });
            }
        }

        None
    }

    /// Start rows and cols from which a word of `len` letters stays inside the grid.
    fn start_ranges(&self, direction: Direction, len: usize) -> Option<(Range<usize>, Range<usize>)> {
        let (dr, dc) = direction.delta();
        Some((
            start_range(self.rows, dr, len)?,
            start_range(self.cols, dc, len)?,
        ))
    }

    fn cells_for(start: Position, direction: Direction, len: usize) -> Vec<Position> {
        let (dr, dc) = direction.delta();
        (0..len as isize)
            .map(|i| {
                Position::new(
                    (start.row as isize + dr * i) as usize,
                    (start.col as isize + dc * i) as usize,
                )
            })
            .collect()
    }

    /// Every cell must be empty or already hold the letter the word needs.
    fn can_place(cells: &[Vec<Option<char>>], letters: &[char], path: &[Position]) -> bool {
        path.iter().zip(letters).all(|(pos, letter)| {
            match cells.get(pos.row).and_then(|row| row.get(pos.col)) {
                Some(None) => true,
                Some(Some(existing)) => existing == letter,
                None => false,
            }
        })
    }

    fn random_letter(&self, rng: &mut impl Rng) -> char {
        match self.options.fill {
            FillStrategy::Uniform => uniform_letter(rng),
            FillStrategy::Weighted => weighted_letter(rng),
        }
    }
}

fn start_range(extent: usize, step: isize, len: usize) -> Option<Range<usize>> {
    match step {
        0 => (extent > 0).then_some(0..extent),
        _ if len == 0 || len > extent => None,
        1 => Some(0..extent - len + 1),
        _ => Some(len - 1..extent),
    }
}
