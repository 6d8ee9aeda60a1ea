//! Greedy frontier step used when no route to the current target exists.

use crate::knowledge::Knowledge;
use crate::threat::is_dangerous;
use crate::types::{AgentState, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrontierStep {
    pub to: Pos,
    /// Never-seen cells that would enter the perception footprint.
    pub reveals: usize,
}

/// Safe neighbour revealing the most unseen cells; the first in expansion order wins ties.
pub fn choose_frontier_step(
    knowledge: &Knowledge,
    state: AgentState,
    perception_radius: i32,
) -> Option<FrontierStep> {
    let mut best: Option<FrontierStep> = None;
    for next in state.pos.neighbors() {
        if is_dangerous(knowledge, next, state.loadout) {
            continue;
        }
        let reveals = knowledge.unseen_in_footprint(next, perception_radius);
        if best.is_none_or(|current| reveals > current.reveals) {
            best = Some(FrontierStep { to: next, reveals });
        }
    }
    best
}
