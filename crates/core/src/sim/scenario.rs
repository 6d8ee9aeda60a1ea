//! Ground-truth map for the in-memory environment.
//! This module exists so generated and hand-written maps share one lethality rule.
//! It does not own the command/percept conversation.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::knowledge::{GridSize, Knowledge};
use crate::threat::envelope;
use crate::types::*;

/// Smallest grid the random generator accepts; smaller requests are widened.
pub const MIN_GENERATED_SIZE: usize = 8;

fn default_variant() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub size: usize,
    #[serde(default = "default_variant")]
    pub variant: u32,
    pub guide: Pos,
    pub destination: Pos,
    #[serde(default)]
    pub armor: Option<Pos>,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    /// Cells lethal under every loadout.
    #[serde(default)]
    pub hazards: Vec<Pos>,
}

impl Scenario {
    pub fn grid(&self) -> GridSize {
        GridSize::square(self.size)
    }

    pub fn enemy_at(&self, pos: Pos) -> Option<EnemyKind> {
        self.enemies.iter().find(|enemy| enemy.pos == pos).map(|enemy| enemy.kind)
    }

    /// Whether standing on `pos` with `loadout` kills the agent.
    pub fn is_lethal(&self, pos: Pos, loadout: Loadout) -> bool {
        if !self.grid().contains(pos) || self.hazards.contains(&pos) {
            return true;
        }
        self.enemies.iter().any(|enemy| {
            enemy.pos == pos || envelope(enemy.kind).covers(enemy.pos, pos, loadout)
        })
    }

    /// Knowledge of an agent that has seen the whole map and heard the destination report.
    pub fn full_knowledge(&self) -> Knowledge {
        let mut knowledge = Knowledge::new(self.grid());
        knowledge.set_guide(self.guide);
        if let Some(armor) = self.armor {
            knowledge.set_cell(armor, Cell::Armor);
        }
        for hazard in &self.hazards {
            knowledge.set_no_go(*hazard);
        }
        for enemy in &self.enemies {
            knowledge.add_enemy(*enemy);
        }
        knowledge.learn_destination(self.destination);
        for pos in self.grid().cells() {
            knowledge.mark_seen(pos);
        }
        knowledge
    }

    /// Random map with one sentinel, one brute, a hunter half of the time, one or two
    /// scouts and one armor cell.
    ///
    /// Every object gets its own cell and only the goal cells keep off the start.
    /// Maps where the start, guide, destination or armor cell is lethal without
    /// capabilities are discarded and redrawn from the same stream.
    pub fn generate(seed: u64, size: usize) -> Scenario {
        let size = size.max(MIN_GENERATED_SIZE);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        loop {
            let scenario = draw(&mut rng, size);
            let keys = [Pos::ORIGIN, scenario.guide, scenario.destination];
            let armor = scenario.armor.into_iter();
            if keys.into_iter().chain(armor).all(|pos| !scenario.is_lethal(pos, Loadout::BARE)) {
                return scenario;
            }
        }
    }

    /// One character per cell, one row per x coordinate.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size * 2 + 1));
        for x in 0..self.size as i32 {
            let row: Vec<String> =
                (0..self.size as i32).map(|y| self.glyph(Pos { x, y }).to_string()).collect();
            out.push_str(&row.join(" "));
            out.push('\n');
        }
        out
    }

    fn glyph(&self, pos: Pos) -> char {
        if pos == Pos::ORIGIN {
            'S'
        } else if pos == self.guide {
            'G'
        } else if pos == self.destination {
            'M'
        } else if self.armor == Some(pos) {
            'C'
        } else if let Some(kind) = self.enemy_at(pos) {
            kind.tag()
        } else if self.hazards.contains(&pos) {
            '#'
        } else {
            '.'
        }
    }
}

fn draw(rng: &mut ChaCha8Rng, size: usize) -> Scenario {
    let mut taken = vec![Pos::ORIGIN];
    let mut place = |rng: &mut ChaCha8Rng| loop {
        let pos = Pos {
            x: (rng.next_u64() % size as u64) as i32,
            y: (rng.next_u64() % size as u64) as i32,
        };
        if !taken.contains(&pos) {
            taken.push(pos);
            return pos;
        }
    };

    let guide = place(rng);
    let destination = place(rng);
    let mut enemies = vec![
        Enemy { pos: place(rng), kind: EnemyKind::Sentinel },
        Enemy { pos: place(rng), kind: EnemyKind::Brute },
    ];
    if rng.next_u64() % 2 == 0 {
        enemies.push(Enemy { pos: place(rng), kind: EnemyKind::Hunter });
    }
    let scouts = 1 + rng.next_u64() % 2;
    for _ in 0..scouts {
        enemies.push(Enemy { pos: place(rng), kind: EnemyKind::Scout });
    }
    let armor = Some(place(rng));

    Scenario { size, variant: 1, guide, destination, armor, enemies, hazards: Vec::new() }
}
