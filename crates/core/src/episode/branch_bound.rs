//! Live depth-first branch-and-bound over the augmented state space.
//!
//! Unlike [`plan_route`](super::pathfinding::plan_route) this strategy does not
//! simulate: every recursive call corresponds to the agent physically occupying
//! a state, and backtracking is done by issuing the inverse command. Two bounds
//! prune the tree: the incumbent (shortest complete route found so far) and the
//! best depth at which each augmented state has been reached.
//!
//! When the destination is only learned part-way through (by stepping on the
//! guide cell), the whole search is run once more from the start.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::Episode;
use crate::error::AgentError;
use crate::knowledge::Knowledge;
use crate::port::EnvironmentPort;
use crate::threat::is_dangerous;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Killed,
}

#[derive(Debug, Default)]
struct BranchAndBound {
    best_known: BTreeMap<AgentState, u32>,
    incumbent: Option<u32>,
    visited: BTreeSet<Pos>,
}

pub(super) fn search<P: EnvironmentPort>(episode: &mut Episode<P>) -> Result<Outcome, AgentError> {
    let mut search = BranchAndBound::default();
    let start = episode.state();
    search.visited.insert(start.pos);

    loop {
        let known_before = episode.knowledge().destination().is_some();
        if search.explore(episode, start, 0)? == Flow::Killed {
            return Ok(Outcome::Failed(FailureReason::Killed));
        }
        // Costs recorded before the destination was known cover subtrees that were
        // never checked for it; one more pass with a fresh table makes the result exact.
        if known_before || episode.knowledge().destination().is_none() {
            break;
        }
        debug!(incumbent = ?search.incumbent, "destination learned mid-search, restarting");
        search.best_known.clear();
    }
    debug!(
        incumbent = ?search.incumbent,
        states = search.best_known.len(),
        physical_moves = episode.moves(),
        "branch-and-bound exhausted"
    );
    Ok(match search.incumbent {
        Some(moves) => Outcome::Arrived { moves },
        None => Outcome::Failed(FailureReason::Unreachable),
    })
}

impl BranchAndBound {
    fn dominated(&self, state: &AgentState, depth: u32) -> bool {
        self.incumbent.is_some_and(|best| depth >= best)
            || self.best_known.get(state).is_some_and(|best| depth >= *best)
    }

    /// `state` is the logical search state; the physical agent stands on `state.pos`
    /// with the same cloak setting (its armor flag may already be set).
    fn explore<P: EnvironmentPort>(
        &mut self,
        episode: &mut Episode<P>,
        state: AgentState,
        depth: u32,
    ) -> Result<Flow, AgentError> {
        if self.dominated(&state, depth) {
            return Ok(Flow::Continue);
        }
        self.best_known.insert(state, depth);

        if episode.knowledge().destination() == Some(state.pos) {
            if self.incumbent.is_none_or(|best| depth < best) {
                debug!(depth, "new incumbent");
                self.incumbent = Some(depth);
            }
            return Ok(Flow::Continue);
        }

        let flipped = state.loadout.with_cloak(!state.loadout.cloak);
        if !is_dangerous(episode.knowledge(), state.pos, flipped) {
            if episode.set_cloak(flipped.cloak)? == Survival::Killed {
                return Ok(Flow::Killed);
            }
            let toggled = AgentState { loadout: flipped, ..state };
            if self.explore(episode, toggled, depth)? == Flow::Killed {
                return Ok(Flow::Killed);
            }
            if episode.set_cloak(state.loadout.cloak)? == Survival::Killed {
                return Ok(Flow::Killed);
            }
        }

        for next in self.ordered_neighbors(episode.knowledge(), state) {
            // Knowledge may have grown while exploring earlier siblings.
            if is_dangerous(episode.knowledge(), next, state.loadout) {
                continue;
            }
            let loadout = if episode.knowledge().is_armor(next) {
                state.loadout.with_armor()
            } else {
                state.loadout
            };
            let next_state = AgentState { pos: next, loadout };
            if self.dominated(&next_state, depth + 1) {
                continue;
            }

            if episode.move_to(next)? == Survival::Killed {
                return Ok(Flow::Killed);
            }
            self.visited.insert(next);
            if self.explore(episode, next_state, depth + 1)? == Flow::Killed {
                return Ok(Flow::Killed);
            }
            if episode.move_to(state.pos)? == Survival::Killed {
                return Ok(Flow::Killed);
            }
        }
        Ok(Flow::Continue)
    }

    /// Safe neighbours, previously visited cells first.
    fn ordered_neighbors(&self, knowledge: &Knowledge, state: AgentState) -> Vec<Pos> {
        let (mut ordered, fresh): (Vec<Pos>, Vec<Pos>) = state
            .pos
            .neighbors()
            .into_iter()
            .filter(|next| !is_dangerous(knowledge, *next, state.loadout))
            .partition(|next| self.visited.contains(next));
        ordered.extend(fresh);
        ordered
    }
}
