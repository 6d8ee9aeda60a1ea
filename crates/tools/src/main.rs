use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use warden_core::{Outcome, Scenario, SessionConfig, SimWorld, Strategy, run_episode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Forward,
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

/// Runs one episode against the simulated environment and prints what happened.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML scenario file; a random map is generated when absent
    #[arg(short, long, conflicts_with = "seed")]
    scenario: Option<PathBuf>,

    /// Seed for the random map
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Side length of the random map
    #[arg(long, default_value_t = 13)]
    size: usize,

    /// Difficulty variant; 1 sees one cell around the agent, anything else two
    #[arg(long)]
    variant: Option<u32>,

    #[arg(long, value_enum, default_value_t = StrategyArg::Forward)]
    strategy: StrategyArg,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    parse_scenario(&text).with_context(|| format!("Invalid scenario file: {}", path.display()))
}

fn parse_scenario(text: &str) -> Result<Scenario> {
    let scenario: Scenario = toml::from_str(text)?;
    session_config(scenario.size, Strategy::default())?;
    let grid = scenario.grid();
    if !grid.contains(scenario.guide) || !grid.contains(scenario.destination) {
        bail!("guide and destination must lie inside the {0}x{0} grid", scenario.size);
    }
    Ok(scenario)
}

fn session_config(grid_size: usize, strategy: Strategy) -> Result<SessionConfig> {
    let config = SessionConfig { grid_size, strategy, ..SessionConfig::default() };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => {
            session_config(args.size, Strategy::default()).context("Invalid --size")?;
            Scenario::generate(args.seed, args.size)
        }
    };
    if let Some(variant) = args.variant {
        scenario.variant = variant;
    }
    println!("{}", scenario.render());

    let config = session_config(scenario.size, args.strategy.into())?;
    let mut world = SimWorld::new(scenario);
    let outcome = run_episode(&mut world, &config).context("Episode aborted")?;

    match outcome {
        Outcome::Arrived { moves } => println!("Outcome: arrived in {moves} moves"),
        Outcome::Failed(reason) => println!("Outcome: failed ({reason:?})"),
    }
    println!("Commands sent: {}", world.commands().len());
    println!("Moves walked: {}", world.moves());
    println!("Destination revealed: {}", world.destination_revealed());
    println!("Exposed to danger: {}", world.agent_was_exposed());
    println!("Illegal moves: {}", world.illegal_moves());
    Ok(())
}

#[cfg(test)]
mod tests {
    use warden_core::{Loadout, Pos};

    use super::*;

    const SAMPLE: &str = include_str!("../scenarios/scout_and_hazards.toml");

    #[test]
    fn sample_scenario_parses_with_safe_key_cells() {
        let scenario = parse_scenario(SAMPLE).expect("sample");
        assert_eq!(scenario.size, 6);
        assert_eq!(scenario.enemies.len(), 1);
        for pos in [Pos::ORIGIN, scenario.guide, scenario.destination] {
            assert!(!scenario.is_lethal(pos, Loadout::BARE), "{pos:?}");
        }
    }

    #[test]
    fn destination_outside_the_grid_is_rejected() {
        let text = "size = 3\nguide = { x = 0, y = 1 }\ndestination = { x = 5, y = 0 }\n";
        assert!(parse_scenario(text).is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let text = "size = 100000\nguide = { x = 0, y = 1 }\ndestination = { x = 5, y = 0 }\n";
        let err = parse_scenario(text).expect_err("too large");
        assert!(format!("{err:#}").contains("grid size"));
        assert!(session_config(0, Strategy::Forward).is_err());
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_scenario(Path::new("no/such/map.toml")).expect_err("missing");
        assert!(format!("{err:#}").contains("no/such/map.toml"));
    }

    #[test]
    fn scenario_and_seed_are_exclusive() {
        let parsed = Args::try_parse_from(["play", "--scenario", "a.toml", "--seed", "3"]);
        assert!(parsed.is_err());
        let args = Args::try_parse_from(["play", "--strategy", "branch-and-bound"]).expect("parse");
        assert_eq!(Strategy::from(args.strategy), Strategy::BranchAndBound);
    }
}
