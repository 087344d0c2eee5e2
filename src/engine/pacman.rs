use crate::board::Board;
use crate::constants::{pacman_spawn, CORNERING_STEP};
use crate::geometry::{cell_center, pixel_to_cell, wrap_tunnel};
use crate::types::{Cell, Direction, PacmanColor, PacmanView, PixelPos};

use super::targeting::PlayerSnapshot;

#[derive(Clone, Debug)]
pub struct Pacman {
    pub color: PacmanColor,
    pub pos: PixelPos,
    pub dir: Direction,
    pub next_dir: Direction,
    pub points: i32,
    pub lives: i32,
}

impl Pacman {
    pub fn new(color: PacmanColor, lives: i32) -> Self {
        Self {
            color,
            pos: pacman_spawn(color),
            dir: Direction::Stop,
            next_dir: Direction::Stop,
            points: 0,
            lives,
        }
    }

    /// Back to the spawn point. Points and lives carry over.
    pub fn reset(&mut self) {
        self.pos = pacman_spawn(self.color);
        self.dir = Direction::Stop;
        self.next_dir = Direction::Stop;
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn cell(&self) -> Cell {
        pixel_to_cell(self.pos)
    }

    /// The queued direction always applies. Walking into a wall holds the
    /// position but keeps the direction.
    pub fn update(&mut self, dt: f32, speed: f32, board: &dyn Board) {
        self.dir = self.next_dir;
        let (dx, dy) = self.dir.vector();
        let mut nx = self.pos.x + dx as f32 * dt * speed;
        let mut ny = self.pos.y + dy as f32 * dt * speed;

        let desired = cell_center(self.cell());
        if self.dir.is_vertical() {
            if nx < desired.x {
                nx += CORNERING_STEP;
            }
            if nx > desired.x {
                nx -= CORNERING_STEP;
            }
        }
        if self.dir.is_horizontal() {
            if ny < desired.y {
                ny += CORNERING_STEP;
            }
            if ny > desired.y {
                ny -= CORNERING_STEP;
            }
        }

        let candidate = PixelPos::new(wrap_tunnel(nx), ny);
        if board.passable(pixel_to_cell(candidate)) {
            self.pos = candidate;
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            pos: self.pos,
            cell: self.cell(),
            dir: self.dir,
            alive: self.is_alive(),
        }
    }

    pub fn view(&self) -> PacmanView {
        PacmanView {
            color: self.color,
            x: self.pos.x,
            y: self.pos.y,
            cell: self.cell(),
            dir: self.dir,
            next_dir: self.next_dir,
            points: self.points,
            lives: self.lives,
            alive: self.is_alive(),
            sprite: self.dir.index(),
        }
    }
}
