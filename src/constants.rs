use crate::types::{Cell, Direction, GhostId, PacmanColor, PixelPos};

pub const CELL_WIDTH: f32 = 7.05;
pub const CELL_HEIGHT: f32 = 7.58;
pub const PIXEL_BIAS: f32 = 2.0;
pub const CELL_BIAS: i32 = 11;

pub const TUNNEL_MIN_X: f32 = -4.0;
pub const TUNNEL_MAX_X: f32 = 248.0;

pub const PACMAN_SPEED: f32 = 50.0;
pub const GHOST_SPEED: f32 = 40.0;
pub const GHOST_EYES_SPEED: f32 = 200.0;
pub const CORNERING_STEP: f32 = 1.0;
pub const MAX_SUBSTEPS: u32 = 240;

pub const DOTS_TO_EAT: i32 = 264;
pub const STARTING_LIVES: i32 = 3;
pub const FRIGHTENED_DURATION: f32 = 4.0;
pub const RNG_SEED: u32 = 13;

pub const DOT_POINTS: i32 = 10;
pub const POWERUP_POINTS: i32 = 50;
pub const GHOST_POINTS: i32 = 1000;

/// Never expires within any realistic run.
pub const FINAL_PHASE_DURATION: f32 = 9_999_999.0;
pub const TABLED_PHASES: u32 = 8;

pub const PEN_TOP_Y: f32 = 108.0;
pub const PEN_BOTTOM_Y: f32 = 113.0;
pub const PRISON_CENTER_X: f32 = 119.0;
pub const PRISON_EXIT_Y: f32 = 90.0;
pub const HOME_CELL: Cell = Cell::new(27, 22);

pub const BLINK_INSTANTS: [f32; 2] = [1.0, 0.5];
pub const BLINK_WINDOW: f32 = 0.1;

pub const ORANGE_SHY_DISTANCE_SQ: i32 = 64;
pub const PINK_LOOKAHEAD: i32 = 4;

pub fn scatter_cell(id: GhostId) -> Cell {
    match id {
        GhostId::Red => Cell::new(41, 9),
        GhostId::Pink => Cell::new(13, 9),
        GhostId::Teal => Cell::new(42, 42),
        GhostId::Orange => Cell::new(12, 42),
    }
}

pub fn ghost_spawn(id: GhostId) -> (PixelPos, Direction) {
    match id {
        GhostId::Red => (PixelPos::new(120.0, 90.0), Direction::Left),
        GhostId::Teal => (PixelPos::new(105.0, 110.0), Direction::Up),
        GhostId::Pink => (PixelPos::new(120.0, 110.0), Direction::Up),
        GhostId::Orange => (PixelPos::new(135.0, 110.0), Direction::Up),
    }
}

pub fn pacman_spawn(color: PacmanColor) -> PixelPos {
    match color {
        PacmanColor::Yellow => PixelPos::new(125.0, 180.0),
        PacmanColor::Green => PixelPos::new(112.0, 180.0),
    }
}
