//! One agent episode: the context object every strategy works through.
//!
//! [`Episode`] owns the knowledge store, the physical agent state and the
//! move/action counters, and is the only place that issues commands on the
//! [`EnvironmentPort`]. Each real action is followed by a percept read and a
//! lethality check. [`run_episode`] picks a strategy and guarantees that the
//! episode-end command is sent exactly once.

use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{AgentError, PortError};
use crate::knowledge::Knowledge;
use crate::port::EnvironmentPort;
use crate::threat::is_dangerous;
use crate::types::*;

mod auto_explore;
mod branch_bound;
mod engine;
mod pathfinding;
#[cfg(test)]
mod test_support;

pub use auto_explore::{FrontierStep, choose_frontier_step};
pub use pathfinding::{plan_route, successors};

pub struct Episode<P> {
    port: P,
    knowledge: Knowledge,
    state: AgentState,
    perception_radius: i32,
    moves: u32,
    actions: u32,
    max_actions: u32,
    report_pending: bool,
}

impl<P: EnvironmentPort> Episode<P> {
    /// Reads the session header and the initial percept batch.
    pub fn begin(mut port: P, config: &SessionConfig) -> Result<Self, PortError> {
        let start = port.read_session_start()?;
        let mut knowledge = Knowledge::new(config.grid());
        knowledge.set_guide(start.guide);
        knowledge.mark_seen(Pos::ORIGIN);

        let mut episode = Self {
            port,
            knowledge,
            state: AgentState::start(),
            perception_radius: start.perception_radius(),
            moves: 0,
            actions: 0,
            max_actions: config.max_actions,
            report_pending: true,
        };
        let percepts = episode.port.read_percepts()?;
        episode.observe(&percepts)?;
        debug!(
            variant = start.variant,
            guide_x = start.guide.x,
            guide_y = start.guide.y,
            percepts = percepts.len(),
            "episode started"
        );
        Ok(episode)
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn actions(&self) -> u32 {
        self.actions
    }

    pub fn perception_radius(&self) -> i32 {
        self.perception_radius
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Lethality of the agent's current cell under its current loadout.
    pub fn survival(&self) -> Survival {
        if is_dangerous(&self.knowledge, self.state.pos, self.state.loadout) {
            Survival::Killed
        } else {
            Survival::Alive
        }
    }

    /// Whether the agent stands where a plan should stop and the loop should retarget.
    pub fn at_checkpoint(&self) -> bool {
        let pos = self.state.pos;
        match self.knowledge.destination() {
            Some(destination) => destination == pos,
            None => self.knowledge.guide() == Some(pos),
        }
    }

    pub fn move_to(&mut self, pos: Pos) -> Result<Survival, AgentError> {
        self.charge_action()?;
        self.port.send(Command::Move(pos))?;
        self.state.pos = pos;
        self.moves += 1;
        let percepts = self.port.read_percepts()?;
        self.observe(&percepts)?;
        Ok(self.survival())
    }

    /// Switches the cloak. Asking for the current setting sends nothing.
    pub fn set_cloak(&mut self, on: bool) -> Result<Survival, AgentError> {
        if self.state.loadout.cloak == on {
            return Ok(self.survival());
        }
        self.charge_action()?;
        self.port.send(if on { Command::CloakOn } else { Command::CloakOff })?;
        self.state.loadout.cloak = on;
        let percepts = self.port.read_percepts()?;
        self.observe(&percepts)?;
        Ok(self.survival())
    }

    fn charge_action(&mut self) -> Result<(), AgentError> {
        if self.actions >= self.max_actions {
            return Err(AgentError::BudgetExhausted(self.max_actions));
        }
        self.actions += 1;
        Ok(())
    }

    fn observe(&mut self, percepts: &[Percept]) -> Result<(), PortError> {
        self.knowledge.absorb(percepts);
        self.knowledge.mark_seen_around(self.state.pos, self.perception_radius);
        if self.knowledge.is_armor(self.state.pos) && !self.state.loadout.armor {
            debug!(x = self.state.pos.x, y = self.state.pos.y, "armor acquired");
            self.state.loadout.armor = true;
        }
        if self.report_pending
            && self.knowledge.destination().is_none()
            && self.knowledge.guide() == Some(self.state.pos)
        {
            self.report_pending = false;
            let report = self.port.read_destination_report()?;
            let learned = report.is_some_and(|pos| self.knowledge.learn_destination(pos));
            debug!(?report, learned, "destination report consumed");
        }
        Ok(())
    }
}

/// Runs one full episode and sends the end command exactly once.
///
/// On a port failure the no-solution sentinel is still sent best-effort and
/// the original error is returned.
pub fn run_episode<P: EnvironmentPort>(
    port: &mut P,
    config: &SessionConfig,
) -> Result<Outcome, PortError> {
    let result = play(&mut *port, config);
    let outcome = match &result {
        Ok(outcome) => *outcome,
        Err(_) => Outcome::Failed(FailureReason::PortClosed),
    };
    let end = port.send(Command::End(outcome.reported_moves()));
    match result {
        Ok(outcome) => {
            end?;
            match outcome {
                Outcome::Arrived { moves } => info!(moves, "episode finished"),
                Outcome::Failed(reason) => warn!(?reason, "episode failed"),
            }
            Ok(outcome)
        }
        Err(err) => {
            warn!(error = %err, "episode aborted by environment failure");
            Err(err)
        }
    }
}

fn play<P: EnvironmentPort>(port: P, config: &SessionConfig) -> Result<Outcome, PortError> {
    let mut episode = Episode::begin(port, config)?;
    if episode.survival() == Survival::Killed {
        return Ok(Outcome::Failed(FailureReason::Killed));
    }
    let result = match config.strategy {
        Strategy::Forward => engine::drive(&mut episode),
        Strategy::BranchAndBound => branch_bound::search(&mut episode),
    };
    match result {
        Ok(outcome) => Ok(outcome),
        Err(AgentError::BudgetExhausted(limit)) => {
            warn!(limit, "action budget exhausted");
            Ok(Outcome::Failed(FailureReason::ActionBudgetExhausted))
        }
        Err(AgentError::Port(err)) => Err(err),
    }
}
