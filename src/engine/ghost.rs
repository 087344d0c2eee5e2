use crate::board::Board;
use crate::constants::{
    ghost_spawn, HOME_CELL, PEN_BOTTOM_Y, PEN_TOP_Y, PRISON_CENTER_X, PRISON_EXIT_Y,
};
use crate::geometry::{cell_center, pixel_to_cell, wrap_tunnel};
use crate::rng::Rng;
use crate::types::{
    Cell, Direction, GamePhase, GhostId, GhostMode, GhostSprite, GhostState, GhostStatus,
    GhostView, PixelPos, RuntimeEvent,
};

use super::targeting::{frightened_target, identity_target, select_direction, Peers};

/// Everything a ghost reads or writes besides itself during one update.
pub struct GhostEnv<'a> {
    pub board: &'a dyn Board,
    pub peers: &'a Peers,
    pub rng: &'a mut Rng,
    pub events: &'a mut Vec<RuntimeEvent>,
    pub speed: f32,
    pub eyes_speed: f32,
    pub frighten_mode: bool,
    /// Global phase, adopted by ghosts as they enter the maze.
    pub phase: GamePhase,
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub id: GhostId,
    pub pos: PixelPos,
    pub dir: Direction,
    pub next_dir: Direction,
    pub state: GhostState,
    pub target: Cell,
    prev_cell: Cell,
    curr_cell: Cell,
}

impl Ghost {
    pub fn new(id: GhostId, initial_target: Cell) -> Self {
        let (pos, dir) = ghost_spawn(id);
        let cell = pixel_to_cell(pos);
        Self {
            id,
            pos,
            dir,
            next_dir: dir,
            state: GhostState::Stopped,
            target: initial_target,
            prev_cell: cell,
            curr_cell: cell,
        }
    }

    pub fn cell(&self) -> Cell {
        pixel_to_cell(self.pos)
    }

    pub fn is_dead(&self) -> bool {
        self.state.status() == Some(GhostStatus::Dead)
    }

    pub fn is_frightened(&self) -> bool {
        self.state.status() == Some(GhostStatus::Frightened)
    }

    pub fn start(&mut self) {
        if self.state == GhostState::Stopped {
            self.state = GhostState::Imprisoned;
        }
    }

    /// Only pen ghosts can be released; RED walks out on its own.
    pub fn release(&mut self) -> bool {
        if self.id == GhostId::Red || self.state != GhostState::Imprisoned {
            return false;
        }
        self.state = GhostState::LeavingPrison;
        true
    }

    pub fn frighten(&mut self) {
        if let GhostState::Playing { mode, status } = self.state {
            if status != GhostStatus::Dead {
                self.reverse();
                self.state = GhostState::Playing {
                    mode,
                    status: GhostStatus::Frightened,
                };
            }
        }
    }

    pub fn unfrighten(&mut self) {
        if let GhostState::Playing {
            mode,
            status: GhostStatus::Frightened,
        } = self.state
        {
            self.state = GhostState::Playing {
                mode,
                status: GhostStatus::Normal,
            };
        }
    }

    /// Turns a playing ghost into eyes. Returns false when nothing changed.
    pub fn kill(&mut self) -> bool {
        match self.state {
            GhostState::Playing { mode, status } if status != GhostStatus::Dead => {
                self.state = GhostState::Playing {
                    mode,
                    status: GhostStatus::Dead,
                };
                true
            }
            _ => false,
        }
    }

    pub fn scatter(&mut self) {
        self.switch_mode(GhostMode::Scatter);
    }

    pub fn chase(&mut self) {
        self.switch_mode(GhostMode::Chase);
    }

    fn switch_mode(&mut self, to: GhostMode) {
        if let GhostState::Playing { mode, status } = self.state {
            if mode != to {
                self.reverse();
            }
            self.state = GhostState::Playing { mode: to, status };
        }
    }

    fn reverse(&mut self) {
        self.next_dir = self.dir.reverse();
    }

    pub fn update(&mut self, dt: f32, env: &mut GhostEnv<'_>) {
        match self.state {
            GhostState::Stopped => return,
            GhostState::Imprisoned => self.update_imprisoned(env.phase),
            GhostState::LeavingPrison => self.update_leaving_prison(dt, env),
            GhostState::Playing { .. } => self.update_playing(env),
        }

        let speed = if self.is_dead() {
            env.eyes_speed
        } else {
            env.speed
        };
        let (dx, dy) = self.dir.vector();
        self.pos = PixelPos::new(
            wrap_tunnel(self.pos.x + dx as f32 * dt * speed),
            self.pos.y + dy as f32 * dt * speed,
        );
    }

    fn update_imprisoned(&mut self, phase: GamePhase) {
        if self.id == GhostId::Red {
            self.enter_maze(phase);
        }
        if self.dir == Direction::Up && self.pos.y <= PEN_TOP_Y {
            self.dir = Direction::Down;
        } else if self.dir == Direction::Down && self.pos.y > PEN_BOTTOM_Y {
            self.dir = Direction::Up;
        }
    }

    /// Walk sideways to the pen center, then straight up through the door.
    fn update_leaving_prison(&mut self, dt: f32, env: &mut GhostEnv<'_>) {
        let snap = (env.speed * dt).max(1.0);
        if (self.pos.x - PRISON_CENTER_X).abs() <= snap {
            self.pos.x = PRISON_CENTER_X;
            self.dir = Direction::Up;
            self.target = HOME_CELL;
        } else if self.pos.x < PRISON_CENTER_X {
            self.dir = Direction::Right;
        } else {
            self.dir = Direction::Left;
        }

        if self.pos.y < PRISON_EXIT_Y {
            self.dir = Direction::Left;
            self.enter_maze(env.phase);
            env.events.push(RuntimeEvent::GhostLeftPrison { ghost: self.id });
            self.pursue(env);
        }
    }

    /// Scatter while the global phase is scatter, chase otherwise.
    fn enter_maze(&mut self, phase: GamePhase) {
        self.state = match phase {
            GamePhase::Scatter => GhostState::Playing {
                mode: GhostMode::Scatter,
                status: GhostStatus::Normal,
            },
            GamePhase::Chase | GamePhase::None => GhostState::CHASING,
        };
    }

    fn update_playing(&mut self, env: &mut GhostEnv<'_>) {
        if self.is_dead() && self.curr_cell == HOME_CELL {
            if let GhostState::Playing { mode, .. } = self.state {
                let status = if env.frighten_mode {
                    GhostStatus::Frightened
                } else {
                    GhostStatus::Normal
                };
                self.state = GhostState::Playing { mode, status };
                env.events.push(RuntimeEvent::GhostRevived { ghost: self.id });
            }
        }

        self.curr_cell = self.cell();
        let center = cell_center(self.curr_cell);
        let before_center = match self.dir {
            Direction::Left => self.pos.x > center.x,
            Direction::Right => self.pos.x < center.x,
            Direction::Up => self.pos.y > center.y,
            Direction::Down => self.pos.y < center.y,
            Direction::Stop => false,
        };
        if before_center || self.curr_cell == self.prev_cell {
            return;
        }

        self.prev_cell = self.curr_cell;
        self.dir = self.next_dir;
        self.pos = center;
        self.target = self.choose_target(env);
        self.pursue(env);
    }

    fn choose_target(&self, env: &mut GhostEnv<'_>) -> Cell {
        match self.state {
            GhostState::Playing {
                status: GhostStatus::Dead,
                ..
            } => HOME_CELL,
            GhostState::Playing {
                status: GhostStatus::Frightened,
                ..
            } => frightened_target(
                env.board,
                self.curr_cell.step(self.dir),
                self.dir,
                env.rng,
                self.target,
            ),
            GhostState::Playing { mode, .. } => {
                identity_target(self.id, mode, self.pos, self.curr_cell, env.peers)
            }
            _ => self.target,
        }
    }

    fn pursue(&mut self, env: &mut GhostEnv<'_>) {
        let here = self.cell();
        match select_direction(env.board, here.step(self.dir), self.dir, self.target) {
            Some(dir) => self.next_dir = dir,
            None => env.events.push(RuntimeEvent::GhostStuck {
                ghost: self.id,
                x: here.x,
                y: here.y,
            }),
        }
    }

    pub fn sprite(&self, blinking: bool) -> GhostSprite {
        match self.state.status() {
            Some(GhostStatus::Dead) => GhostSprite::Eyes(self.dir),
            Some(GhostStatus::Frightened) if blinking => GhostSprite::FrightenedBlink,
            Some(GhostStatus::Frightened) => GhostSprite::Frightened,
            _ => GhostSprite::Body(self.dir),
        }
    }

    pub fn view(&self, blinking: bool) -> GhostView {
        GhostView {
            id: self.id,
            x: self.pos.x,
            y: self.pos.y,
            cell: self.cell(),
            dir: self.dir,
            next_dir: self.next_dir,
            target: self.target,
            state: self.state,
            frightened: self.is_frightened(),
            dead: self.is_dead(),
            sprite: self.sprite(blinking).index(),
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, cell: Cell, dir: Direction) {
        self.pos = cell_center(cell);
        self.dir = dir;
        self.next_dir = dir;
        self.prev_cell = cell;
        self.curr_cell = cell;
    }
}
