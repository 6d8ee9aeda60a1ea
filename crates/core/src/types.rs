use serde::{Deserialize, Serialize};

/// Grid coordinate in protocol order: `x` is the first number on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const ORIGIN: Pos = Pos { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Orthogonal neighbours in the fixed expansion order used by every planner.
    pub fn neighbors(self) -> [Pos; 4] {
        [
            Pos { x: self.x - 1, y: self.y },
            Pos { x: self.x, y: self.y + 1 },
            Pos { x: self.x + 1, y: self.y },
            Pos { x: self.x, y: self.y - 1 },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Scout,
    Brute,
    Hunter,
    Sentinel,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] =
        [EnemyKind::Scout, EnemyKind::Brute, EnemyKind::Hunter, EnemyKind::Sentinel];

    pub fn tag(self) -> char {
        match self {
            EnemyKind::Scout => 'O',
            EnemyKind::Brute => 'U',
            EnemyKind::Hunter => 'N',
            EnemyKind::Sentinel => 'W',
        }
    }
}

/// Stored content of one grid cell. Exactly one value per coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Unknown,
    Enemy(EnemyKind),
    Armor,
    Guide,
    Destination,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Pos,
    pub kind: EnemyKind,
}

/// Capability flags carried by the agent. `armor` is never lost once acquired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Loadout {
    pub cloak: bool,
    pub armor: bool,
}

impl Loadout {
    pub const BARE: Loadout = Loadout { cloak: false, armor: false };

    pub fn with_cloak(self, cloak: bool) -> Self {
        Self { cloak, ..self }
    }

    pub fn with_armor(self) -> Self {
        Self { armor: true, ..self }
    }

    pub fn all() -> [Loadout; 4] {
        [
            Loadout { cloak: false, armor: false },
            Loadout { cloak: true, armor: false },
            Loadout { cloak: false, armor: true },
            Loadout { cloak: true, armor: true },
        ]
    }
}

/// Augmented search state: position together with the capability flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentState {
    pub pos: Pos,
    pub loadout: Loadout,
}

impl AgentState {
    pub fn start() -> Self {
        Self { pos: Pos::ORIGIN, loadout: Loadout::BARE }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Move(Pos),
    CloakOn,
    CloakOff,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
    pub moves: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerceptTag {
    Ambient,
    Armor,
    Guide,
    Destination,
    Enemy(EnemyKind),
}

impl PerceptTag {
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'P' => Some(PerceptTag::Ambient),
            'C' => Some(PerceptTag::Armor),
            'G' => Some(PerceptTag::Guide),
            'M' => Some(PerceptTag::Destination),
            other => {
                EnemyKind::ALL.into_iter().find(|kind| kind.tag() == other).map(PerceptTag::Enemy)
            }
        }
    }

    pub fn tag(self) -> char {
        match self {
            PerceptTag::Ambient => 'P',
            PerceptTag::Armor => 'C',
            PerceptTag::Guide => 'G',
            PerceptTag::Destination => 'M',
            PerceptTag::Enemy(kind) => kind.tag(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Percept {
    pub pos: Pos,
    pub tag: PerceptTag,
}

/// Everything the environment sends before the first percept batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStart {
    pub variant: u32,
    pub guide: Pos,
}

impl SessionStart {
    pub fn perception_radius(&self) -> i32 {
        if self.variant == 1 { 1 } else { 2 }
    }
}

/// One line emitted by the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Pos),
    CloakOn,
    CloakOff,
    End(Option<u32>),
}

impl From<Step> for Command {
    fn from(step: Step) -> Self {
        match step {
            Step::Move(pos) => Command::Move(pos),
            Step::CloakOn => Command::CloakOn,
            Step::CloakOff => Command::CloakOff,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Forward,
    BranchAndBound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    Killed,
    NoSafeMove,
    NoNewInformation,
    Unreachable,
    ActionBudgetExhausted,
    PortClosed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Arrived { moves: u32 },
    Failed(FailureReason),
}

impl Outcome {
    /// Value carried by the episode-end command.
    pub fn reported_moves(&self) -> Option<u32> {
        match self {
            Outcome::Arrived { moves } => Some(*moves),
            Outcome::Failed(_) => None,
        }
    }
}

/// Whether the agent is still alive after an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Survival {
    Alive,
    Killed,
}
