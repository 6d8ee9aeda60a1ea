use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::knowledge::GridSize;
use crate::types::Strategy;

pub const DEFAULT_GRID_SIZE: usize = 13;
pub const DEFAULT_MAX_ACTIONS: u32 = 1_000_000;
/// Largest side length accepted; coordinates must also fit the wire's `i32`.
pub const MAX_GRID_SIZE: usize = 1024;

/// Per-episode settings. Every field has a default so partial config files load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub grid_size: usize,
    pub strategy: Strategy,
    /// Hard cap on commands sent to the environment before the end line.
    pub max_actions: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            strategy: Strategy::Forward,
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }
}

impl SessionConfig {
    pub fn grid(&self) -> GridSize {
        GridSize::square(self.grid_size)
    }

    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (1..=MAX_GRID_SIZE).contains(&self.grid_size) {
            Ok(())
        } else {
            Err(ConfigError::GridSize(self.grid_size))
        }
    }
}
