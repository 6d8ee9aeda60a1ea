//! Agent process configuration: an optional TOML file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use warden_core::{SessionConfig, Strategy};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "WARDEN_LOG";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub session: SessionConfig,
    /// JSONL transcript of the whole conversation, when set.
    pub transcript: Option<PathBuf>,
    pub log_filter: Option<String>,
}

/// Values given on the command line. `None` keeps the file (or default) value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Overrides {
    pub strategy: Option<Strategy>,
    pub grid_size: Option<usize>,
    pub max_actions: Option<u32>,
    pub transcript: Option<PathBuf>,
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads `path` if given, otherwise starts from defaults, then applies `overrides`.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(overrides);
        config.session.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(strategy) = overrides.strategy {
            self.session.strategy = strategy;
        }
        if let Some(grid_size) = overrides.grid_size {
            self.session.grid_size = grid_size;
        }
        if let Some(max_actions) = overrides.max_actions {
            self.session.max_actions = max_actions;
        }
        if let Some(transcript) = &overrides.transcript {
            self.transcript = Some(transcript.clone());
        }
        self
    }

    /// The environment variable wins over the file, which wins over the default.
    pub fn log_filter(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.log_filter.clone())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }
}
