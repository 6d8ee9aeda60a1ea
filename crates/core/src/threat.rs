//! Enemy threat envelopes and the cell lethality test.
//! This module exists to keep the danger taxonomy in one static table shared by planners,
//! the execution loop and the simulated environment.
//! It does not own percept bookkeeping or search.

use crate::knowledge::Knowledge;
use crate::types::{EnemyKind, Loadout, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Manhattan,
    Chebyshev,
}

impl Metric {
    pub fn distance(self, a: Pos, b: Pos) -> u32 {
        match self {
            Metric::Manhattan => a.manhattan(b),
            Metric::Chebyshev => a.chebyshev(b),
        }
    }
}

/// Radius of one enemy kind under each capability combination.
///
/// The cloak takes precedence when both flags are set. Brute radius therefore drops by
/// exactly one with either flag and does not stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreatEnvelope {
    pub metric: Metric,
    pub bare: u32,
    pub cloaked: u32,
    pub armored: u32,
}

impl ThreatEnvelope {
    pub fn radius(&self, loadout: Loadout) -> u32 {
        if loadout.cloak {
            self.cloaked
        } else if loadout.armor {
            self.armored
        } else {
            self.bare
        }
    }

    pub fn covers(&self, enemy: Pos, cell: Pos, loadout: Loadout) -> bool {
        self.metric.distance(enemy, cell) <= self.radius(loadout)
    }
}

const SCOUT: ThreatEnvelope =
    ThreatEnvelope { metric: Metric::Manhattan, bare: 1, cloaked: 0, armored: 0 };
const BRUTE: ThreatEnvelope =
    ThreatEnvelope { metric: Metric::Manhattan, bare: 2, cloaked: 1, armored: 1 };
const HUNTER: ThreatEnvelope =
    ThreatEnvelope { metric: Metric::Chebyshev, bare: 1, cloaked: 2, armored: 1 };
const SENTINEL: ThreatEnvelope =
    ThreatEnvelope { metric: Metric::Chebyshev, bare: 2, cloaked: 3, armored: 2 };

pub fn envelope(kind: EnemyKind) -> &'static ThreatEnvelope {
    match kind {
        EnemyKind::Scout => &SCOUT,
        EnemyKind::Brute => &BRUTE,
        EnemyKind::Hunter => &HUNTER,
        EnemyKind::Sentinel => &SENTINEL,
    }
}

pub fn threat_radius(kind: EnemyKind, loadout: Loadout) -> u32 {
    envelope(kind).radius(loadout)
}

/// Whether standing on `pos` with `loadout` is lethal given what the agent knows.
pub fn is_dangerous(knowledge: &Knowledge, pos: Pos, loadout: Loadout) -> bool {
    if !knowledge.in_bounds(pos) || knowledge.is_enemy(pos) || knowledge.is_no_go(pos) {
        return true;
    }
    knowledge.enemies().iter().any(|enemy| envelope(enemy.kind).covers(enemy.pos, pos, loadout))
}
