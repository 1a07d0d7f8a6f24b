use std::collections::HashMap;

use super::SelectionPath;
use crate::models::{FoundWord, Grid};
use crate::words::WordList;

pub struct WordMatcher;

impl WordMatcher {
    /// First word in list order spelled by `path` in either direction that
    /// nobody has found yet.
    pub fn find_match<'w>(
        path: &SelectionPath,
        grid: &Grid,
        words: &'w WordList,
        already_found: &HashMap<String, FoundWord>,
    ) -> Option<&'w str> {
        let forward = Self::extract_word(grid, path)?;
        let reversed: String = forward.chars().rev().collect();

        words
            .iter()
            .find(|word| (*word == forward || *word == reversed) && !already_found.contains_key(*word))
    }

    /// Extract word from grid positions
    pub fn extract_word(grid: &Grid, path: &SelectionPath) -> Option<String> {
        grid.spell(path.cells()).ok()
    }
}
