//! In-memory environment that plays the other side of the line protocol.
//!
//! [`SimWorld`] holds a [`Scenario`] as ground truth, applies the agent's
//! commands without judging them, and answers with the percept batches and
//! the one-time destination report a real environment would send. It also
//! keeps a referee's view of the episode (exposure, illegal moves, the end
//! value) so tests and the `play` tool can judge the run afterwards.

use std::mem;

use tracing::{trace, warn};

use crate::error::PortError;
use crate::knowledge::footprint;
use crate::port::EnvironmentPort;
use crate::types::*;

mod scenario;

pub use scenario::{MIN_GENERATED_SIZE, Scenario};

pub struct SimWorld {
    scenario: Scenario,
    agent: AgentState,
    header_sent: bool,
    report_queued: bool,
    destination_revealed: bool,
    commands: Vec<Command>,
    moves: u32,
    illegal_moves: u32,
    exposed: bool,
    ended: Option<Option<u32>>,
}

impl SimWorld {
    pub fn new(scenario: Scenario) -> Self {
        // An agent that starts on the guide hears the report with its first batch.
        let report_queued = scenario.guide == Pos::ORIGIN;
        Self {
            scenario,
            agent: AgentState::start(),
            header_sent: false,
            report_queued,
            destination_revealed: false,
            commands: Vec::new(),
            moves: 0,
            illegal_moves: 0,
            exposed: false,
            ended: None,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Every command received, in order, including the end command.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn illegal_moves(&self) -> u32 {
        self.illegal_moves
    }

    pub fn agent_pos(&self) -> Pos {
        self.agent.pos
    }

    pub fn agent_cloaked(&self) -> bool {
        self.agent.loadout.cloak
    }

    pub fn agent_armored(&self) -> bool {
        self.agent.loadout.armor
    }

    pub fn destination_revealed(&self) -> bool {
        self.destination_revealed
    }

    /// Whether the agent ever stood on a lethal cell with its loadout at the time.
    pub fn agent_was_exposed(&self) -> bool {
        self.exposed
    }

    /// The value of the end command, once received. `Some(None)` is the no-solution sentinel.
    pub fn ended(&self) -> Option<Option<u32>> {
        self.ended
    }

    /// Percepts for the agent's current footprint.
    ///
    /// Object tags take precedence over lethality: guide, then armor, then the
    /// destination once revealed, then enemy kinds. Any other cell is reported
    /// as ambient danger only when lethal under the agent's current loadout.
    pub fn percepts(&self) -> Vec<Percept> {
        let radius = self.perception_radius();
        footprint(self.agent.pos, radius)
            .filter(|pos| self.scenario.grid().contains(*pos))
            .filter_map(|pos| self.percept_at(pos).map(|tag| Percept { pos, tag }))
            .collect()
    }

    fn perception_radius(&self) -> i32 {
        SessionStart { variant: self.scenario.variant, guide: self.scenario.guide }
            .perception_radius()
    }

    fn percept_at(&self, pos: Pos) -> Option<PerceptTag> {
        if pos == self.scenario.guide {
            Some(PerceptTag::Guide)
        } else if self.scenario.armor == Some(pos) {
            Some(PerceptTag::Armor)
        } else if self.destination_revealed && pos == self.scenario.destination {
            Some(PerceptTag::Destination)
        } else if let Some(kind) = self.scenario.enemy_at(pos) {
            Some(PerceptTag::Enemy(kind))
        } else if self.scenario.is_lethal(pos, self.agent.loadout) {
            Some(PerceptTag::Ambient)
        } else {
            None
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Move(to) => {
                if self.agent.pos.manhattan(to) != 1 || !self.scenario.grid().contains(to) {
                    warn!(x = to.x, y = to.y, "illegal move accepted by simulator");
                    self.illegal_moves += 1;
                }
                self.agent.pos = to;
                self.moves += 1;
                if self.scenario.armor == Some(to) {
                    self.agent.loadout.armor = true;
                }
            }
            Command::CloakOn => self.agent.loadout.cloak = true,
            Command::CloakOff => self.agent.loadout.cloak = false,
            Command::End(value) => {
                self.ended = Some(value);
                return;
            }
        }
        if self.scenario.is_lethal(self.agent.pos, self.agent.loadout) {
            self.exposed = true;
        }
        if self.agent.pos == self.scenario.guide && !self.destination_revealed {
            self.report_queued = true;
        }
    }

    fn ensure_open(&self) -> Result<(), PortError> {
        if self.ended.is_some() { Err(PortError::Closed) } else { Ok(()) }
    }
}

impl EnvironmentPort for SimWorld {
    fn read_session_start(&mut self) -> Result<SessionStart, PortError> {
        self.ensure_open()?;
        if self.header_sent {
            return Err(PortError::Malformed {
                expected: "variant number",
                found: "percept batch".to_string(),
            });
        }
        self.header_sent = true;
        Ok(SessionStart { variant: self.scenario.variant, guide: self.scenario.guide })
    }

    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError> {
        self.ensure_open()?;
        let percepts = self.percepts();
        trace!(count = percepts.len(), "percept batch");
        Ok(percepts)
    }

    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError> {
        self.ensure_open()?;
        if !mem::take(&mut self.report_queued) {
            return Ok(None);
        }
        self.destination_revealed = true;
        Ok(Some(self.scenario.destination))
    }

    fn send(&mut self, command: Command) -> Result<(), PortError> {
        self.ensure_open()?;
        self.commands.push(command);
        self.apply(command);
        Ok(())
    }
}
