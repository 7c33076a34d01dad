//! Engine configuration
//!
//! Values survive [`GameEngine::reset`](crate::GameEngine::reset); only a new
//! engine picks up a different configuration.

use std::env;

use thiserror::Error;

use crate::types::{
    Molecule, BASE_TICK_MS, BOARD_HEIGHT, BOARD_WIDTH, CLEAR_HIGHLIGHT_MS, DEFAULT_CASCADE_LIMIT,
};

/// Smallest playable board
pub const MIN_WIDTH: usize = 3;
pub const MIN_HEIGHT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board width {0} is below the minimum of 3")]
    TooNarrow(usize),
    #[error("board height {0} is below the minimum of 2")]
    TooShort(usize),
    #[error("tick duration must be positive")]
    ZeroTick,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Fall interval at the start of a game
    pub base_tick_ms: u32,
    pub seed: u32,
    /// How long matched cells stay highlighted before removal
    pub clear_delay_ms: u32,
    /// Max clears chained without player input
    pub cascade_limit: u32,
    /// Replaces the built-in molecule tiers when non-empty
    pub custom_pool: Option<Vec<Molecule>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            base_tick_ms: BASE_TICK_MS,
            seed: 1,
            clear_delay_ms: CLEAR_HIGHLIGHT_MS,
            cascade_limit: DEFAULT_CASCADE_LIMIT,
            custom_pool: None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl EngineConfig {
    /// Create from environment variables, falling back to defaults per field
    ///
    /// - `MOLDROP_WIDTH`, `MOLDROP_HEIGHT`: board size
    /// - `MOLDROP_TICK_MS`: base fall interval
    /// - `MOLDROP_SEED`: RNG seed
    /// - `MOLDROP_CASCADE_LIMIT`: chained clear cap
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            width: env_parse("MOLDROP_WIDTH").unwrap_or(defaults.width),
            height: env_parse("MOLDROP_HEIGHT").unwrap_or(defaults.height),
            base_tick_ms: env_parse("MOLDROP_TICK_MS").unwrap_or(defaults.base_tick_ms),
            seed: env_parse("MOLDROP_SEED").unwrap_or(defaults.seed),
            clear_delay_ms: defaults.clear_delay_ms,
            cascade_limit: env_parse("MOLDROP_CASCADE_LIMIT").unwrap_or(defaults.cascade_limit),
            custom_pool: None,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_custom_pool(mut self, pool: Vec<Molecule>) -> Self {
        self.custom_pool = Some(pool);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_WIDTH {
            return Err(ConfigError::TooNarrow(self.width));
        }
        if self.height < MIN_HEIGHT {
            return Err(ConfigError::TooShort(self.height));
        }
        if self.base_tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }
}
