use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::{BuiltGrid, GameError, GridBuilder, SelectionPath, WordMatcher};
use crate::models::{FoundWord, GameStatus, Grid, Placement, Player, Progress};
use crate::words::WordList;

/// Words found by one player
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub player: Player,
    pub words_found: usize,
}

/// Everything a newly connected client needs to render the game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub game_id: Uuid,
    pub status: GameStatus,
    pub rows: usize,
    pub cols: usize,
    pub grid: Vec<String>,
    pub words: Vec<String>,
    pub found_words: Vec<FoundWord>,
    pub players: Vec<PlayerScore>,
    pub progress: Progress,
}

/// One live game: its grid, word list, players and finds.
///
/// All mutation goes through `&mut self`, so whoever owns the session (see
/// [`super::GameRoom`]) decides the serialization boundary.
#[derive(Debug)]
pub struct GameSession {
    game_id: Uuid,
    words: WordList,
    grid: Option<Grid>,
    placements: Vec<Placement>,
    found: HashMap<String, FoundWord>,
    /// Join order
    players: Vec<Player>,
    max_players: Option<usize>,
    status: GameStatus,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(game_id: Uuid, words: WordList) -> Self {
        Self {
            game_id,
            words,
            grid: None,
            placements: Vec::new(),
            found: HashMap::new(),
            players: Vec::new(),
            max_players: None,
            status: GameStatus::NotStarted,
            completed_at: None,
        }
    }

    /// Cap the number of players; rejoining players are always let back in.
    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.max_players = Some(max_players);
        self
    }

    /// Generate the grid and move to `InProgress`.
    pub fn start(&mut self, builder: &GridBuilder, rng: &mut impl Rng) -> Result<&[Placement], GameError> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        let built = builder.build(&self.words, rng)?;
        self.start_with_grid(built)?;
        Ok(&self.placements)
    }

    /// Start from an already generated grid.
    pub fn start_with_grid(&mut self, built: BuiltGrid) -> Result<(), GameError> {
        if self.status != GameStatus::NotStarted {
            return Err(GameError::AlreadyStarted);
        }

        if !built.skipped.is_empty() {
            tracing::warn!(
                "Game {}: dropping unplaced words {:?} from the word list",
                self.game_id,
                built.skipped
            );
            self.words = self.words.without(&built.skipped);
        }

        self.grid = Some(built.grid);
        self.placements = built.placements;
        self.status = GameStatus::InProgress;
        self.refresh_status();

        tracing::info!(
            "Game {} started with {} words",
            self.game_id,
            self.words.len()
        );
        Ok(())
    }

    pub fn game_id(&self) -> Uuid {
        self.game_id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn found_word(&self, word: &str) -> Option<&FoundWord> {
        self.found.get(word)
    }

    /// Found words in word-list order
    pub fn found_words(&self) -> Vec<FoundWord> {
        self.words
            .iter()
            .filter_map(|word| self.found.get(word).cloned())
            .collect()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn progress(&self) -> Progress {
        Progress {
            found: self.found.len(),
            total: self.words.len(),
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Add a player, or refresh name and color if already known. The first
    /// player to join leads.
    pub fn join(&mut self, id: Uuid, name: &str, color: &str) -> Result<Player, GameError> {
        if let Some(existing) = self.players.iter_mut().find(|p| p.id == id) {
            existing.name = name.to_string();
            existing.color = color.to_string();
            return Ok(existing.clone());
        }
        if let Some(max_players) = self.max_players {
            if self.players.len() >= max_players {
                return Err(GameError::GameFull { max_players });
            }
        }

        let player = Player {
            id,
            name: name.to_string(),
            color: color.to_string(),
            is_leader: self.players.is_empty(),
        };
        self.players.push(player.clone());
        Ok(player)
    }

    /// Remove a player. Leadership passes to the earliest remaining player.
    pub fn leave(&mut self, id: Uuid) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == id)?;
        let player = self.players.remove(index);
        if player.is_leader {
            if let Some(next) = self.players.first_mut() {
                next.is_leader = true;
            }
        }
        Some(player)
    }

    pub fn finds_by(&self, player: Uuid) -> usize {
        self.found.values().filter(|f| f.finder_id == player).count()
    }

    pub fn scoreboard(&self) -> Vec<PlayerScore> {
        self.players
            .iter()
            .map(|player| PlayerScore {
                player: player.clone(),
                words_found: self.finds_by(player.id),
            })
            .collect()
    }

    /// Claim `word` for `finder_id`. The check and the insert happen under
    /// the same `&mut self` borrow.
    pub fn record_find(
        &mut self,
        word: &str,
        finder_id: Uuid,
        color: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<FoundWord, GameError> {
        if self.status == GameStatus::NotStarted {
            return Err(GameError::NotStarted);
        }
        if !self.words.contains(word) {
            return Err(GameError::UnknownWord {
                word: word.to_string(),
            });
        }

        let record = match self.found.entry(word.to_string()) {
            Entry::Occupied(_) => {
                return Err(GameError::AlreadyFound {
                    word: word.to_string(),
                })
            }
            Entry::Vacant(slot) => slot
                .insert(FoundWord {
                    word: word.to_string(),
                    finder_id,
                    color: color.to_string(),
                    timestamp,
                })
                .clone(),
        };

        tracing::info!("Game {}: {} found by {}", self.game_id, word, finder_id);
        self.refresh_status();
        Ok(record)
    }

    /// Match a finished drag and record the find for `finder_id`.
    /// `Ok(None)` means the path spelled nothing still available.
    pub fn claim(
        &mut self,
        path: &SelectionPath,
        finder_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<FoundWord>, GameError> {
        let grid = self.grid.as_ref().ok_or(GameError::NotStarted)?;
        if path.len() < 2 {
            return Err(GameError::EmptySelection);
        }
        let color = self
            .player(finder_id)
            .map(|p| p.color.clone())
            .ok_or(GameError::UnknownPlayer { id: finder_id })?;

        let Some(word) = WordMatcher::find_match(path, grid, &self.words, &self.found) else {
            return Ok(None);
        };
        let word = word.to_string();

        self.record_find(&word, finder_id, &color, timestamp).map(Some)
    }

    /// Merge a find reported by another participant. Returns whether the
    /// session changed; duplicates and unknown words are ignored.
    pub fn apply_remote_find(&mut self, event: &FoundWord) -> bool {
        if self.status == GameStatus::NotStarted {
            tracing::warn!(
                "Game {}: ignoring remote find of {} before start",
                self.game_id,
                event.word
            );
            return false;
        }
        if !self.words.contains(&event.word) {
            tracing::warn!(
                "Game {}: ignoring remote find of unknown word {}",
                self.game_id,
                event.word
            );
            return false;
        }

        match self.found.entry(event.word.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!("Game {}: duplicate find of {}", self.game_id, event.word);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(event.clone());
                tracing::info!(
                    "Game {}: {} found remotely by {}",
                    self.game_id,
                    event.word,
                    event.finder_id
                );
                self.refresh_status();
                true
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_id: self.game_id,
            status: self.status,
            rows: self.grid.as_ref().map_or(0, Grid::rows),
            cols: self.grid.as_ref().map_or(0, Grid::cols),
            grid: self.grid.as_ref().map(Grid::to_strings).unwrap_or_default(),
            words: self.words.as_slice().to_vec(),
            found_words: self.found_words(),
            players: self.scoreboard(),
            progress: self.progress(),
        }
    }

    fn refresh_status(&mut self) {
        if self.status == GameStatus::InProgress && self.progress().is_complete() {
            self.status = GameStatus::Complete;
            self.completed_at = Some(Utc::now());
            tracing::info!("Game {} complete", self.game_id);
        }
    }
}
