use serde::Serialize;

/// Movement direction. Opposite directions are two apart so reversal is a
/// modular test on the discriminants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left = 0,
    Down = 1,
    Right = 2,
    Up = 3,
    Stop = 4,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Down,
            2 => Self::Right,
            3 => Self::Up,
            _ => Self::Stop,
        }
    }

    pub fn vector(self) -> (i32, i32) {
        match self {
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
            Self::Right => (1, 0),
            Self::Up => (0, -1),
            Self::Stop => (0, 0),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Stop => Self::Stop,
            dir => Self::from_index((dir.index() + 2) % 4),
        }
    }

    /// True when moving along `self` right after `previous` turns back.
    pub fn is_reversal_of(self, previous: Direction) -> bool {
        if self == Self::Stop || previous == Self::Stop {
            return false;
        }
        (4 + self.index() - previous.index()) % 4 == 2
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "down" => Some(Self::Down),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "stop" => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Discrete maze coordinate (column, row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.vector();
        self.offset(dx, dy)
    }
}

/// Continuous position in board pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostId {
    Red,
    Teal,
    Pink,
    Orange,
}

impl GhostId {
    pub const ALL: [GhostId; 4] = [GhostId::Red, GhostId::Teal, GhostId::Pink, GhostId::Orange];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "red" => Some(Self::Red),
            "teal" => Some(Self::Teal),
            "pink" => Some(Self::Pink),
            "orange" => Some(Self::Orange),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Teal => "teal",
            Self::Pink => "pink",
            Self::Orange => "orange",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacmanColor {
    Yellow,
    Green,
}

impl PacmanColor {
    pub fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellContent {
    Empty,
    Dot,
    Powerup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    None,
    Scatter,
    Chase,
}

impl GamePhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Scatter => "scatter",
            Self::Chase => "chase",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Chase,
    Scatter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostStatus {
    Normal,
    Frightened,
    Dead,
}

/// Ghost lifecycle. Frightened and dead only exist while playing, so they
/// live inside the `Playing` variant instead of as loose flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GhostState {
    Stopped,
    Imprisoned,
    LeavingPrison,
    Playing { mode: GhostMode, status: GhostStatus },
}

impl GhostState {
    pub const CHASING: GhostState = GhostState::Playing {
        mode: GhostMode::Chase,
        status: GhostStatus::Normal,
    };

    pub fn mode(self) -> Option<GhostMode> {
        match self {
            Self::Playing { mode, .. } => Some(mode),
            _ => None,
        }
    }

    pub fn status(self) -> Option<GhostStatus> {
        match self {
            Self::Playing { status, .. } => Some(status),
            _ => None,
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing { .. })
    }
}

/// Animation selector handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "dir", rename_all = "snake_case")]
pub enum GhostSprite {
    Body(Direction),
    Frightened,
    FrightenedBlink,
    Eyes(Direction),
}

impl GhostSprite {
    /// Frame-set index: bodies 0..=3, frightened 4, blink 5, eyes 6..=9.
    pub fn index(self) -> u8 {
        match self {
            Self::Body(dir) => dir.index(),
            Self::Frightened => 4,
            Self::FrightenedBlink => 5,
            Self::Eyes(dir) => 6 + dir.index(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputCommand {
    Move { player: usize, dir: Direction },
    AddPlayer,
    KillGhost,
    TogglePhase,
    ToggleFrighten,
    SkipLevel,
    ReleaseGhost(GhostId),
}

impl InputCommand {
    /// Parses `left`, `p2-up`, `add-player`, `release-teal`, ...
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(dir) = Direction::parse_move(value) {
            return Some(Self::Move { player: 0, dir });
        }
        if let Some(rest) = value.strip_prefix("p2-") {
            return Direction::parse_move(rest).map(|dir| Self::Move { player: 1, dir });
        }
        if let Some(rest) = value.strip_prefix("release-") {
            return GhostId::parse(rest).map(Self::ReleaseGhost);
        }
        match value {
            "add-player" => Some(Self::AddPlayer),
            "kill-ghost" => Some(Self::KillGhost),
            "toggle-phase" => Some(Self::TogglePhase),
            "toggle-frighten" => Some(Self::ToggleFrighten),
            "skip-level" => Some(Self::SkipLevel),
            _ => None,
        }
    }

    /// Every key except the one adding a player counts as the start key.
    pub fn starts_round(self) -> bool {
        !matches!(self, Self::AddPlayer)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PacmanView {
    pub color: PacmanColor,
    pub x: f32,
    pub y: f32,
    pub cell: Cell,
    pub dir: Direction,
    #[serde(rename = "nextDir")]
    pub next_dir: Direction,
    pub points: i32,
    pub lives: i32,
    pub alive: bool,
    pub sprite: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: GhostId,
    pub x: f32,
    pub y: f32,
    pub cell: Cell,
    pub dir: Direction,
    #[serde(rename = "nextDir")]
    pub next_dir: Direction,
    pub target: Cell,
    pub state: GhostState,
    pub frightened: bool,
    pub dead: bool,
    pub sprite: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    GameStarted,
    LevelStarted {
        level: u32,
    },
    LevelCleared {
        level: u32,
    },
    PhaseChanged {
        phase: GamePhase,
        #[serde(rename = "phaseNum")]
        phase_num: u32,
        duration: f32,
        broadcast: bool,
    },
    FrightenStarted {
        duration: f32,
    },
    FrightenEnded,
    DotEaten {
        x: i32,
        y: i32,
        by: PacmanColor,
    },
    PowerupEaten {
        x: i32,
        y: i32,
        by: PacmanColor,
    },
    GhostEaten {
        ghost: GhostId,
        by: PacmanColor,
    },
    GhostRevived {
        ghost: GhostId,
    },
    GhostReleased {
        ghost: GhostId,
    },
    GhostLeftPrison {
        ghost: GhostId,
    },
    GhostStuck {
        ghost: GhostId,
        x: i32,
        y: i32,
    },
    PacmanKilled {
        pacman: PacmanColor,
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    GameOver {
        level: u32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedSecs")]
    pub elapsed_secs: f64,
    pub level: u32,
    pub phase: GamePhase,
    #[serde(rename = "phaseNum")]
    pub phase_num: u32,
    #[serde(rename = "phaseTimer")]
    pub phase_timer: f32,
    #[serde(rename = "frightenMode")]
    pub frighten_mode: bool,
    #[serde(rename = "frightenedTimer")]
    pub frightened_timer: f32,
    #[serde(rename = "dotsLeft")]
    pub dots_left: i32,
    pub started: bool,
    pub ended: bool,
    pub pacmen: Vec<PacmanView>,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RuntimeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_is_involutive() {
        for dir in Direction::CARDINAL {
            assert_eq!(dir.reverse().reverse(), dir);
            assert!(dir.reverse().is_reversal_of(dir));
            assert!(!dir.is_reversal_of(dir));
        }
        assert_eq!(Direction::Stop.reverse(), Direction::Stop);
        assert!(!Direction::Left.is_reversal_of(Direction::Stop));
    }

    #[test]
    fn perpendicular_turns_are_not_reversals() {
        assert!(!Direction::Up.is_reversal_of(Direction::Left));
        assert!(!Direction::Down.is_reversal_of(Direction::Right));
        assert!(Direction::Left.is_reversal_of(Direction::Right));
        assert!(Direction::Up.is_reversal_of(Direction::Down));
    }

    #[test]
    fn sprite_indices_follow_frame_set_layout() {
        assert_eq!(GhostSprite::Body(Direction::Up).index(), 3);
        assert_eq!(GhostSprite::Frightened.index(), 4);
        assert_eq!(GhostSprite::FrightenedBlink.index(), 5);
        assert_eq!(GhostSprite::Eyes(Direction::Left).index(), 6);
        assert_eq!(GhostSprite::Eyes(Direction::Up).index(), 9);
    }

    #[test]
    fn input_commands_parse() {
        assert_eq!(
            InputCommand::parse("left"),
            Some(InputCommand::Move {
                player: 0,
                dir: Direction::Left
            })
        );
        assert_eq!(
            InputCommand::parse("p2-down"),
            Some(InputCommand::Move {
                player: 1,
                dir: Direction::Down
            })
        );
        assert_eq!(
            InputCommand::parse("release-orange"),
            Some(InputCommand::ReleaseGhost(GhostId::Orange))
        );
        assert_eq!(InputCommand::parse("skip-level"), Some(InputCommand::SkipLevel));
        assert_eq!(InputCommand::parse("jump"), None);
        assert!(!InputCommand::AddPlayer.starts_round());
        assert!(InputCommand::KillGhost.starts_round());
    }

    #[test]
    fn runtime_events_serialize_with_type_tag() {
        let value = serde_json::to_value(RuntimeEvent::GhostStuck {
            ghost: GhostId::Teal,
            x: 3,
            y: 4,
        })
        .expect("event should serialize");
        assert_eq!(value["type"], "ghost_stuck");
        assert_eq!(value["ghost"], "teal");
    }
}
