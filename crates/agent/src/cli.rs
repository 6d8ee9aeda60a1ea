use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use warden_core::Strategy;

use crate::config::Overrides;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Informed search with replanning and frontier exploration.
    Forward,
    /// Live depth-first branch-and-bound.
    BranchAndBound,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Forward => Strategy::Forward,
            StrategyArg::BranchAndBound => Strategy::BranchAndBound,
        }
    }
}

/// Hazard-grid agent speaking the line protocol on stdin/stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Side length of the square grid
    #[arg(long)]
    pub grid_size: Option<usize>,

    /// Maximum commands sent before giving up
    #[arg(long)]
    pub max_actions: Option<u32>,

    /// Write a JSONL transcript of the session to this path
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            strategy: self.strategy.map(Strategy::from),
            grid_size: self.grid_size,
            max_actions: self.max_actions,
            transcript: self.transcript.clone(),
        }
    }
}
