//! Error types for environment I/O and episode control.
//!
//! Lethal moves and planning dead-ends are not errors: they end an episode
//! through [`Outcome`](crate::types::Outcome). These types cover the cases
//! where the conversation with the environment itself breaks down.

use std::io;

use crate::config::MAX_GRID_SIZE;

/// Failures while talking to the environment.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The environment closed its output before the agent finished reading.
    #[error("environment closed the input stream")]
    Closed,

    /// A read or write on the underlying stream failed.
    #[error("environment I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A token that must be numeric was not.
    #[error("expected {expected}, found {found:?}")]
    Malformed { expected: &'static str, found: String },
}

/// Failures that abort an episode from inside a strategy.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("action budget of {0} exhausted")]
    BudgetExhausted(u32),
}

/// Settings that cannot describe a playable episode.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid size {0} is outside 1..={max}", max = MAX_GRID_SIZE)]
    GridSize(usize),
}
