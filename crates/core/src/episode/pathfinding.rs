//! Informed forward search over the augmented state space.
//! This module exists so route planning is a pure function of knowledge and state.
//! It does not issue commands or decide what to do when no route exists.

use std::collections::{BTreeMap, BTreeSet};

use crate::knowledge::Knowledge;
use crate::threat::is_dangerous;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    g: u32,
    state: AgentState,
}

/// Edges leaving `state` as `(step, successor, move cost)`.
///
/// A cloak toggle is free and offered only when the occupied cell stays safe
/// under the flipped flag. A move costs one and is legal only when the
/// neighbour is safe under the flags held before moving. Stepping onto known
/// armor sets the armor flag in the successor.
pub fn successors(knowledge: &Knowledge, state: AgentState) -> Vec<(Step, AgentState, u32)> {
    let mut edges = Vec::with_capacity(5);
    let flipped = state.loadout.with_cloak(!state.loadout.cloak);
    if !is_dangerous(knowledge, state.pos, flipped) {
        let step = if flipped.cloak { Step::CloakOn } else { Step::CloakOff };
        edges.push((step, AgentState { loadout: flipped, ..state }, 0));
    }
    for next in state.pos.neighbors() {
        if is_dangerous(knowledge, next, state.loadout) {
            continue;
        }
        let loadout =
            if knowledge.is_armor(next) { state.loadout.with_armor() } else { state.loadout };
        edges.push((Step::Move(next), AgentState { pos: next, loadout }, 1));
    }
    edges
}

/// Cheapest step sequence from `start` to any state standing on `target`.
///
/// Cost counts moves only. The manhattan estimate ignores flags and never
/// overestimates, since toggles are free and every move costs exactly one.
pub fn plan_route(knowledge: &Knowledge, start: AgentState, target: Pos) -> Option<Plan> {
    let mut open_set = BTreeSet::new();
    let mut g_score = BTreeMap::new();
    let mut came_from: BTreeMap<AgentState, (AgentState, Step)> = BTreeMap::new();

    let h = start.pos.manhattan(target);
    open_set.insert(OpenNode { f: h, h, g: 0, state: start });
    g_score.insert(start, 0);

    while let Some(current) = open_set.pop_first() {
        if g_score.get(&current.state).is_some_and(|best| current.g > *best) {
            continue;
        }
        if current.state.pos == target {
            let steps = reconstruct_steps(&came_from, start, current.state);
            return Some(Plan { steps, moves: current.g });
        }
        for (step, next, cost) in successors(knowledge, current.state) {
            let tentative = current.g + cost;
            if tentative < *g_score.get(&next).unwrap_or(&u32::MAX) {
                came_from.insert(next, (current.state, step));
                g_score.insert(next, tentative);
                let h = next.pos.manhattan(target);
                open_set.insert(OpenNode { f: tentative + h, h, g: tentative, state: next });
            }
        }
    }
    None
}

fn reconstruct_steps(
    came_from: &BTreeMap<AgentState, (AgentState, Step)>,
    start: AgentState,
    goal: AgentState,
) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut state = goal;
    while state != start {
        let Some((previous, step)) = came_from.get(&state) else {
            break;
        };
        steps.push(*step);
        state = *previous;
    }
    steps.reverse();
    steps
}
