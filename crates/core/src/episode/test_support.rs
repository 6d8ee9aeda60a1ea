//! Shared fixtures for the `episode` submodule test suites.
//! This module exists to avoid repeating map, scenario and port setup across many tests.
//! It does not own production agent logic.

use std::collections::{BTreeMap, VecDeque};
use std::io::Cursor;

use super::*;
use crate::knowledge::GridSize;
use crate::port::StdioPort;
use crate::sim::Scenario;

pub(super) fn blank_knowledge(side: usize) -> Knowledge {
    Knowledge::new(GridSize::square(side))
}

/// 3x3 map where the only way to the target crosses a cell inside a scout's reach.
///
/// ```text
///   y=2  .  O  .
///   y=1  .  g  T
///   y=0  S  #  .
/// ```
pub(super) fn scout_corridor_fixture() -> (Knowledge, Pos) {
    let mut knowledge = blank_knowledge(3);
    knowledge.add_enemy(Enemy { pos: Pos::new(1, 2), kind: EnemyKind::Scout });
    knowledge.set_no_go(Pos::new(1, 0));
    (knowledge, Pos::new(2, 1))
}

/// 5x5 map whose far corner is sealed off by two no-go cells.
pub(super) fn enclosed_target_fixture() -> (Knowledge, Pos) {
    let mut knowledge = blank_knowledge(5);
    knowledge.set_no_go(Pos::new(3, 4));
    knowledge.set_no_go(Pos::new(4, 3));
    (knowledge, Pos::new(4, 4))
}

/// Replays `plan` from `start`, checking adjacency, safety and the move count.
pub(super) fn assert_plan_is_walkable(knowledge: &Knowledge, start: AgentState, plan: &Plan) {
    let mut state = start;
    let mut moves = 0;
    for step in &plan.steps {
        match *step {
            Step::Move(next) => {
                assert_eq!(state.pos.manhattan(next), 1, "non-adjacent move to {next:?}");
                assert!(
                    !is_dangerous(knowledge, next, state.loadout),
                    "move into danger at {next:?} with {:?}",
                    state.loadout
                );
                state.pos = next;
                if knowledge.is_armor(next) {
                    state.loadout = state.loadout.with_armor();
                }
                moves += 1;
            }
            Step::CloakOn | Step::CloakOff => {
                let flipped = state.loadout.with_cloak(*step == Step::CloakOn);
                assert_ne!(flipped, state.loadout, "redundant toggle {step:?}");
                assert!(
                    !is_dangerous(knowledge, state.pos, flipped),
                    "toggle exposes {:?}",
                    state.pos
                );
                state.loadout = flipped;
            }
        }
    }
    assert_eq!(moves, plan.moves, "plan move count");
}

/// Uninformed 0-1 breadth-first search over the same edges the planner uses.
pub(super) fn exhaustive_route_cost(
    knowledge: &Knowledge,
    start: AgentState,
    target: Pos,
) -> Option<u32> {
    let mut best: BTreeMap<AgentState, u32> = BTreeMap::new();
    let mut queue = VecDeque::new();
    best.insert(start, 0);
    queue.push_back((start, 0));
    while let Some((state, cost)) = queue.pop_front() {
        if best.get(&state).is_some_and(|known| cost > *known) {
            continue;
        }
        if state.pos == target {
            return Some(cost);
        }
        for (_, next, step_cost) in successors(knowledge, state) {
            let next_cost = cost + step_cost;
            if best.get(&next).is_none_or(|known| next_cost < *known) {
                best.insert(next, next_cost);
                if step_cost == 0 {
                    queue.push_front((next, next_cost));
                } else {
                    queue.push_back((next, next_cost));
                }
            }
        }
    }
    None
}

/// Variant-1 scenario with no enemies, armor or hazards.
pub(super) fn open_scenario(size: usize, guide: Pos, destination: Pos) -> Scenario {
    Scenario {
        size,
        variant: 1,
        guide,
        destination,
        armor: None,
        enemies: Vec::new(),
        hazards: Vec::new(),
    }
}

/// 6x6 scenario where a hazard column at x=2 cuts the start off from the guide.
pub(super) fn walled_in_scenario() -> Scenario {
    Scenario {
        hazards: (0..6).map(|y| Pos::new(2, y)).collect(),
        ..open_scenario(6, Pos::new(4, 4), Pos::new(5, 5))
    }
}

pub(super) fn config(grid_size: usize) -> SessionConfig {
    SessionConfig { grid_size, ..SessionConfig::default() }
}

/// Line-protocol port fed from canned input that also keeps every command sent.
pub(super) struct ScriptedPort {
    inner: StdioPort<Cursor<Vec<u8>>, Vec<u8>>,
    sent: Vec<Command>,
}

impl ScriptedPort {
    pub(super) fn new(lines: Vec<&str>) -> Self {
        let mut input = lines.join("\n");
        if !input.is_empty() {
            input.push('\n');
        }
        Self { inner: StdioPort::new(Cursor::new(input.into_bytes()), Vec::new()), sent: Vec::new() }
    }

    pub(super) fn sent(&self) -> &[Command] {
        &self.sent
    }
}

impl EnvironmentPort for ScriptedPort {
    fn read_session_start(&mut self) -> Result<SessionStart, PortError> {
        self.inner.read_session_start()
    }

    fn read_percepts(&mut self) -> Result<Vec<Percept>, PortError> {
        self.inner.read_percepts()
    }

    fn read_destination_report(&mut self) -> Result<Option<Pos>, PortError> {
        self.inner.read_destination_report()
    }

    fn send(&mut self, command: Command) -> Result<(), PortError> {
        self.sent.push(command);
        self.inner.send(command)
    }
}
