//! Everything the agent has perceived about the grid.
//! This module exists so percept bookkeeping stays separate from danger and search rules.
//! It does not own lethality decisions or planning.

use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn square(side: usize) -> Self {
        Self { width: side, height: side }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| Pos { x: x as i32, y: y as i32 })
        })
    }
}

/// Monotonic map knowledge: cells, no-go flags, seen cells, enemies and the two goal cells.
#[derive(Clone, Debug)]
pub struct Knowledge {
    size: GridSize,
    cells: Vec<Cell>,
    no_go: Vec<bool>,
    seen: Vec<bool>,
    enemies: Vec<Enemy>,
    guide: Option<Pos>,
    destination: Option<Pos>,
}

impl Knowledge {
    pub fn new(size: GridSize) -> Self {
        let len = size.width * size.height;
        Self {
            size,
            cells: vec![Cell::Unknown; len],
            no_go: vec![false; len],
            seen: vec![false; len],
            enemies: Vec::new(),
            guide: None,
            destination: None,
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.size.contains(pos)
    }

    pub fn cell(&self, pos: Pos) -> Cell {
        match self.index(pos) {
            Some(idx) => self.cells[idx],
            None => Cell::Unknown,
        }
    }

    pub fn is_no_go(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.no_go[idx])
    }

    pub fn is_seen(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.seen[idx])
    }

    pub fn is_enemy(&self, pos: Pos) -> bool {
        matches!(self.cell(pos), Cell::Enemy(_))
    }

    pub fn is_armor(&self, pos: Pos) -> bool {
        self.cell(pos) == Cell::Armor
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn guide(&self) -> Option<Pos> {
        self.guide
    }

    pub fn destination(&self) -> Option<Pos> {
        self.destination
    }

    /// The cell the agent should head for next: the destination once known, else the guide.
    pub fn target(&self) -> Option<Pos> {
        self.destination.or(self.guide)
    }

    /// Records the guide cell announced at session start. Out-of-bounds coordinates are ignored.
    pub fn set_guide(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.guide = Some(pos);
            self.cells[idx] = Cell::Guide;
        }
    }

    /// Fixes the destination. Returns `false` when it was already known or lies off the grid.
    pub fn learn_destination(&mut self, pos: Pos) -> bool {
        if self.destination.is_some() {
            return false;
        }
        let Some(idx) = self.index(pos) else {
            return false;
        };
        self.destination = Some(pos);
        self.cells[idx] = Cell::Destination;
        true
    }

    pub fn set_no_go(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.no_go[idx] = true;
        }
    }

    pub fn set_cell(&mut self, pos: Pos, cell: Cell) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    pub fn add_enemy(&mut self, enemy: Enemy) {
        let Some(idx) = self.index(enemy.pos) else {
            return;
        };
        self.cells[idx] = Cell::Enemy(enemy.kind);
        self.no_go[idx] = true;
        match self.enemies.iter_mut().find(|known| known.pos == enemy.pos) {
            Some(known) => known.kind = enemy.kind,
            None => self.enemies.push(enemy),
        }
    }

    /// Applies one percept batch. Out-of-bounds records are dropped; repeats are idempotent.
    /// Returns how many records were applied.
    pub fn absorb(&mut self, percepts: &[Percept]) -> usize {
        let mut applied = 0;
        for percept in percepts {
            if !self.in_bounds(percept.pos) {
                continue;
            }
            match percept.tag {
                PerceptTag::Ambient => self.set_no_go(percept.pos),
                PerceptTag::Armor => self.set_cell(percept.pos, Cell::Armor),
                PerceptTag::Guide => self.set_cell(percept.pos, Cell::Guide),
                PerceptTag::Destination => {
                    self.learn_destination(percept.pos);
                }
                PerceptTag::Enemy(kind) => self.add_enemy(Enemy { pos: percept.pos, kind }),
            }
            applied += 1;
        }
        applied
    }

    /// Marks every in-bounds cell within Chebyshev `radius` of `center` as seen.
    pub fn mark_seen_around(&mut self, center: Pos, radius: i32) {
        for pos in footprint(center, radius) {
            if let Some(idx) = self.index(pos) {
                self.seen[idx] = true;
            }
        }
    }

    pub fn mark_seen(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.seen[idx] = true;
        }
    }

    /// Number of in-bounds cells within the footprint at `center` that have never been seen.
    pub fn unseen_in_footprint(&self, center: Pos, radius: i32) -> usize {
        footprint(center, radius).filter(|pos| self.in_bounds(*pos) && !self.is_seen(*pos)).count()
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.x as usize) * self.size.height + (pos.y as usize))
    }
}

/// Cells within Chebyshev `radius` of `center`, bounds not checked.
pub fn footprint(center: Pos, radius: i32) -> impl Iterator<Item = Pos> {
    (-radius..=radius).flat_map(move |dx| {
        (-radius..=radius).map(move |dy| Pos { x: center.x + dx, y: center.y + dy })
    })
}
