//! Forward execution loop: plan, execute step by step, replan, explore when stuck.
//! This module exists to own the target state machine and plan invalidation rules.
//! It does not own route search or the lethality table.

use tracing::{debug, warn};

use super::auto_explore::choose_frontier_step;
use super::pathfinding::plan_route;
use super::Episode;
use crate::error::AgentError;
use crate::port::EnvironmentPort;
use crate::threat::is_dangerous;
use crate::types::*;

pub(super) fn drive<P: EnvironmentPort>(episode: &mut Episode<P>) -> Result<Outcome, AgentError> {
    loop {
        let state = episode.state();
        let knowledge = episode.knowledge();
        if knowledge.destination() == Some(state.pos) {
            return Ok(Outcome::Arrived { moves: episode.moves() });
        }

        let plan = knowledge
            .target()
            .and_then(|target| plan_route(knowledge, state, target))
            .filter(|plan| !plan.steps.is_empty());

        let survival = match plan {
            Some(plan) => {
                debug!(steps = plan.steps.len(), moves = plan.moves, "executing plan");
                execute_plan(episode, &plan)?
            }
            None => {
                let Some(step) =
                    choose_frontier_step(knowledge, state, episode.perception_radius())
                else {
                    return Ok(Outcome::Failed(FailureReason::NoSafeMove));
                };
                if step.reveals == 0 {
                    return Ok(Outcome::Failed(FailureReason::NoNewInformation));
                }
                debug!(x = step.to.x, y = step.to.y, reveals = step.reveals, "frontier step");
                episode.move_to(step.to)?
            }
        };

        if survival == Survival::Killed {
            let pos = episode.state().pos;
            warn!(x = pos.x, y = pos.y, "agent landed on a lethal cell");
            return Ok(Outcome::Failed(FailureReason::Killed));
        }
    }
}

/// Runs plan steps until the plan ends, goes stale, or a checkpoint is reached.
fn execute_plan<P: EnvironmentPort>(
    episode: &mut Episode<P>,
    plan: &Plan,
) -> Result<Survival, AgentError> {
    for step in &plan.steps {
        let state = episode.state();
        let survival = match *step {
            Step::Move(next) => {
                if state.pos.manhattan(next) != 1
                    || is_dangerous(episode.knowledge(), next, state.loadout)
                {
                    debug!(x = next.x, y = next.y, "plan invalidated by new knowledge");
                    return Ok(Survival::Alive);
                }
                episode.move_to(next)?
            }
            Step::CloakOn | Step::CloakOff => {
                let on = *step == Step::CloakOn;
                if is_dangerous(episode.knowledge(), state.pos, state.loadout.with_cloak(on)) {
                    debug!(on, "cloak toggle invalidated by new knowledge");
                    return Ok(Survival::Alive);
                }
                episode.set_cloak(on)?
            }
        };
        if survival == Survival::Killed || episode.at_checkpoint() {
            return Ok(survival);
        }
    }
    Ok(Survival::Alive)
}
