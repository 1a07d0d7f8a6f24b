use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::game::{
    grid::{DEFAULT_PLACEMENT_ATTEMPTS, DEFAULT_RESEED_ROUNDS, MAX_GRID_CELLS},
    BuildOptions, DirectionSet, FillStrategy, GameError, GridBuilder, PlacementPolicy,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    pub word_list_path: Option<String>,
    pub rows: usize,
    pub cols: usize,
    /// Largest `rows * cols` a created game may ask for
    pub max_grid_cells: usize,
    pub placement_attempts: u32,
    pub placement_policy: PlacementPolicy,
    pub directions: DirectionSet,
    pub fill: FillStrategy,
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            word_list_path: None,
            rows: 50,
            cols: 100,
            max_grid_cells: MAX_GRID_CELLS,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
            placement_policy: PlacementPolicy::Reseed {
                rounds: DEFAULT_RESEED_ROUNDS,
            },
            directions: DirectionSet::All,
            fill: FillStrategy::Uniform,
            max_players: 16,
        }
    }
}

impl GameConfig {
    /// Builder for a grid of the given size, bounded by `max_grid_cells`
    pub fn grid_builder(&self, rows: usize, cols: usize) -> Result<GridBuilder, GameError> {
        Ok(GridBuilder::with_max_cells(rows, cols, self.max_grid_cells)?
            .with_options(self.build_options()))
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            attempts: self.placement_attempts,
            directions: self.directions,
            policy: self.placement_policy,
            fill: self.fill,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let defaults = GameConfig::default();
        let mut placement_policy = parse_var("PLACEMENT_POLICY", defaults.placement_policy)?;
        if let PlacementPolicy::Reseed { rounds } = &mut placement_policy {
            *rounds = parse_var("PLACEMENT_RESEEDS", *rounds)?;
        }

        let game = GameConfig {
            word_list_path: env::var("WORD_LIST_PATH").ok().filter(|p| !p.is_empty()),
            rows: parse_var("GRID_ROWS", defaults.rows)?,
            cols: parse_var("GRID_COLS", defaults.cols)?,
            max_grid_cells: parse_var("MAX_GRID_CELLS", defaults.max_grid_cells)?,
            placement_attempts: parse_var("PLACEMENT_ATTEMPTS", defaults.placement_attempts)?,
            placement_policy,
            directions: parse_var("PLACEMENT_DIRECTIONS", defaults.directions)?,
            fill: parse_var("FILL_LETTERS", defaults.fill)?,
            max_players: parse_var("MAX_PLAYERS", defaults.max_players)?,
        };

        game.grid_builder(game.rows, game.cols).with_context(|| {
            format!(
                "GRID_ROWS and GRID_COLS must be positive with at most {} cells",
                game.max_grid_cells
            )
        })?;

        Ok(Config { server, game })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{} has invalid value {:?}: {}", name, raw, e))
}
