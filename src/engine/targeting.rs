use crate::board::Board;
use crate::constants::{scatter_cell, ORANGE_SHY_DISTANCE_SQ, PINK_LOOKAHEAD};
use crate::geometry::{cell_distance_sq, distance_sq, grid_distance_sq};
use crate::rng::Rng;
use crate::types::{Cell, Direction, GhostId, GhostMode, PixelPos};

/// Evaluation order for pursuit. The first strictly closer candidate wins.
const PURSUIT_ORDER: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub pos: PixelPos,
    pub cell: Cell,
    pub dir: Direction,
    pub alive: bool,
}

/// Read-only view of the other agents, frozen before any ghost moves.
#[derive(Clone, Debug, Default)]
pub struct Peers {
    pub players: Vec<PlayerSnapshot>,
    pub red_cell: Option<Cell>,
}

/// Living player with the smallest squared pixel distance. Falls back to the
/// first player when nobody is alive.
pub fn closest_player(players: &[PlayerSnapshot], from: PixelPos) -> Option<&PlayerSnapshot> {
    let mut best: Option<(&PlayerSnapshot, f32)> = None;
    for player in players.iter().filter(|player| player.alive) {
        let distance = distance_sq(from, player.pos);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((player, distance)),
        }
    }
    best.map(|(player, _)| player).or_else(|| players.first())
}

pub fn identity_target(
    id: GhostId,
    mode: GhostMode,
    own_pos: PixelPos,
    own_cell: Cell,
    peers: &Peers,
) -> Cell {
    let scatter = scatter_cell(id);
    if mode == GhostMode::Scatter {
        return scatter;
    }
    let Some(player) = closest_player(&peers.players, own_pos) else {
        return scatter;
    };
    match id {
        GhostId::Red => player.cell,
        GhostId::Pink => {
            let (dx, dy) = player.dir.vector();
            player.cell.offset(dx * PINK_LOOKAHEAD, dy * PINK_LOOKAHEAD)
        }
        GhostId::Teal => {
            let red = peers.red_cell.unwrap_or(own_cell);
            let dx = player.cell.x - red.x;
            let dy = player.cell.y - red.y;
            player.cell.offset(dx, dy)
        }
        GhostId::Orange => {
            if grid_distance_sq(player.cell, own_cell) >= ORANGE_SHY_DISTANCE_SQ {
                player.cell
            } else {
                scatter
            }
        }
    }
}

/// Erratic pick: start at a random slot of the cardinal order and take the
/// first open, non-reversing neighbour of the cell ahead.
pub fn frightened_target(
    board: &dyn Board,
    ahead: Cell,
    heading: Direction,
    rng: &mut Rng,
    fallback: Cell,
) -> Cell {
    let start = rng.int(0, 3) as usize;
    (0..Direction::CARDINAL.len())
        .map(|offset| Direction::CARDINAL[(start + offset) % Direction::CARDINAL.len()])
        .filter(|dir| !dir.is_reversal_of(heading))
        .map(|dir| ahead.step(dir))
        .find(|cell| board.passable(*cell))
        .unwrap_or(fallback)
}

/// Greedy choice of the next direction, evaluated from the cell one step
/// ahead. `None` means every non-reversing neighbour is blocked.
pub fn select_direction(
    board: &dyn Board,
    ahead: Cell,
    heading: Direction,
    target: Cell,
) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in PURSUIT_ORDER {
        if dir.is_reversal_of(heading) {
            continue;
        }
        let candidate = ahead.step(dir);
        if !board.passable(candidate) {
            continue;
        }
        let distance = cell_distance_sq(candidate, target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((dir, distance)),
        }
    }
    best.map(|(dir, _)| dir)
}
