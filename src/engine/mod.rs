use crate::board::{Board, MazeBoard};
use crate::config::EngineConfig;
use crate::constants::MAX_SUBSTEPS;
use crate::rng::Rng;
use crate::types::{
    CellContent, GamePhase, GhostId, GhostMode, InputCommand, PacmanColor, RuntimeEvent,
    Snapshot,
};

pub mod ghost;
pub mod pacman;
pub mod phase;
pub mod targeting;

use self::ghost::{Ghost, GhostEnv};
use self::pacman::Pacman;
use self::phase::{PhaseController, PhaseTick};
use self::targeting::Peers;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Interrupted,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: EngineConfig,
    template: MazeBoard,
    board: MazeBoard,

    rng: Rng,
    pacmen: Vec<Pacman>,
    ghosts: Vec<Ghost>,
    phase: PhaseController,
    events: Vec<RuntimeEvent>,

    level: u32,
    dots_left: i32,
    started: bool,
    ended: bool,
    round_secs: f32,
    tick_counter: u64,
    elapsed_secs: f64,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_board(config, MazeBoard::reference())
    }

    /// `template` is copied fresh at the start of every level.
    pub fn with_board(config: EngineConfig, template: MazeBoard) -> Self {
        let pacmen = vec![Pacman::new(PacmanColor::Yellow, config.starting_lives)];
        let mut engine = Self {
            rng: Rng::new(config.rng_seed),
            board: template.clone(),
            template,
            pacmen,
            ghosts: Vec::new(),
            phase: PhaseController::new(),
            events: Vec::new(),
            level: 0,
            dots_left: config.dots_to_eat,
            started: false,
            ended: false,
            round_secs: 0.0,
            tick_counter: 0,
            elapsed_secs: 0.0,
            config,
        };
        engine.set_level(1);
        engine
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn dots_left(&self) -> i32 {
        self.dots_left
    }

    pub fn board(&self) -> &MazeBoard {
        &self.board
    }

    pub fn pacmen(&self) -> &[Pacman] {
        &self.pacmen
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn ghost(&self, id: GhostId) -> Option<&Ghost> {
        self.ghosts.iter().find(|ghost| ghost.id == id)
    }

    pub fn phase(&self) -> &PhaseController {
        &self.phase
    }

    /// Advances the simulation by `dt` seconds. Does nothing until the first
    /// start input and after the game is over.
    pub fn step(&mut self, dt: f32) {
        if self.ended || !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_secs += dt as f64;
        if !self.started {
            return;
        }

        self.tick_phase(dt);
        self.round_secs += dt;
        self.apply_release_schedule();

        let cap = self.config.max_substep_secs;
        let substeps = ((dt / cap).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            if self.advance_agents(sub_dt) == Flow::Interrupted {
                break;
            }
        }
    }

    pub fn apply_input(&mut self, command: InputCommand) {
        if self.ended {
            return;
        }
        if command.starts_round() {
            self.start_game();
        }
        match command {
            InputCommand::Move { player, dir } => {
                if let Some(pacman) = self.pacmen.get_mut(player) {
                    pacman.next_dir = dir;
                }
            }
            InputCommand::AddPlayer => {
                self.add_second_pacman();
            }
            InputCommand::KillGhost => {
                // Debug key: first ghost that can die becomes eyes.
                for ghost in &mut self.ghosts {
                    if ghost.kill() {
                        break;
                    }
                }
            }
            InputCommand::TogglePhase => {
                for ghost in &mut self.ghosts {
                    match ghost.state.mode() {
                        Some(GhostMode::Chase) => ghost.scatter(),
                        Some(GhostMode::Scatter) => ghost.chase(),
                        None => {}
                    }
                }
            }
            InputCommand::ToggleFrighten => {
                if self.phase.frighten_mode {
                    self.unfrighten_ghosts();
                } else {
                    self.frighten_ghosts();
                }
            }
            InputCommand::SkipLevel => self.go_to_next_level(),
            InputCommand::ReleaseGhost(id) => {
                self.release_ghost(id);
            }
        }
    }

    /// Adds the green player. Only one extra player is supported.
    pub fn add_second_pacman(&mut self) -> bool {
        if self.pacmen.len() >= 2 {
            return false;
        }
        self.pacmen
            .push(Pacman::new(PacmanColor::Green, self.config.starting_lives));
        true
    }

    pub fn release_ghost(&mut self, id: GhostId) -> bool {
        let released = self
            .ghosts
            .iter_mut()
            .find(|ghost| ghost.id == id)
            .is_some_and(|ghost| ghost.release());
        if released {
            self.events.push(RuntimeEvent::GhostReleased { ghost: id });
        }
        released
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let blinking = self.phase.is_blinking();
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_secs: self.elapsed_secs,
            level: self.level,
            phase: self.phase.phase,
            phase_num: self.phase.phase_num,
            phase_timer: self.phase.phase_timer,
            frighten_mode: self.phase.frighten_mode,
            frightened_timer: self.phase.frightened_timer,
            dots_left: self.dots_left,
            started: self.started,
            ended: self.ended,
            pacmen: self.pacmen.iter().map(Pacman::view).collect(),
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| ghost.view(blinking))
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn start_game(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.events.push(RuntimeEvent::GameStarted);
        for ghost in &mut self.ghosts {
            ghost.start();
        }
    }

    fn set_level(&mut self, level: u32) {
        self.board = self.template.clone();
        self.phase.reset_level();
        self.level = level;
        self.reset_round_state();
        self.dots_left = self.config.dots_to_eat;
        self.events.push(RuntimeEvent::LevelStarted { level });
    }

    fn go_to_next_level(&mut self) {
        self.set_level(self.level + 1);
    }

    /// Everything a lost life undoes. Scores, lives and eaten dots survive.
    fn reset_round_state(&mut self) {
        self.phase.reset_round();
        self.started = false;
        self.round_secs = 0.0;
        self.rng = Rng::new(self.config.rng_seed);
        for pacman in self.pacmen.iter_mut().filter(|pacman| pacman.is_alive()) {
            pacman.reset();
        }
        let initial_target = self.pacmen.first().map(Pacman::cell).unwrap_or_default();
        self.ghosts = GhostId::ALL
            .iter()
            .map(|id| Ghost::new(*id, initial_target))
            .collect();
    }

    fn tick_phase(&mut self, dt: f32) {
        match self.phase.tick(dt, self.level, &self.config.phases) {
            PhaseTick::Idle => {}
            PhaseTick::FrightenExpired => {
                self.events.push(RuntimeEvent::FrightenEnded);
                for ghost in &mut self.ghosts {
                    ghost.unfrighten();
                }
            }
            PhaseTick::Changed {
                phase,
                phase_num,
                duration,
                broadcast,
            } => {
                self.events.push(RuntimeEvent::PhaseChanged {
                    phase,
                    phase_num,
                    duration,
                    broadcast,
                });
                if !broadcast {
                    return;
                }
                for ghost in &mut self.ghosts {
                    match phase {
                        GamePhase::Chase => ghost.chase(),
                        GamePhase::Scatter => ghost.scatter(),
                        GamePhase::None => {}
                    }
                }
            }
        }
    }

    fn apply_release_schedule(&mut self) {
        for idx in 0..self.ghosts.len() {
            let id = self.ghosts[idx].id;
            let due = self
                .config
                .release
                .release_after(id)
                .is_some_and(|after| self.round_secs >= after);
            if due {
                self.release_ghost(id);
            }
        }
    }

    fn frighten_ghosts(&mut self) {
        self.phase.frighten(self.config.frightened_duration);
        self.events.push(RuntimeEvent::FrightenStarted {
            duration: self.config.frightened_duration,
        });
        for ghost in &mut self.ghosts {
            ghost.frighten();
        }
    }

    fn unfrighten_ghosts(&mut self) {
        self.phase.unfrighten();
        self.events.push(RuntimeEvent::FrightenEnded);
        for ghost in &mut self.ghosts {
            ghost.unfrighten();
        }
    }

    fn advance_agents(&mut self, dt: f32) -> Flow {
        for pacman in self.pacmen.iter_mut().filter(|pacman| pacman.is_alive()) {
            pacman.update(dt, self.config.pacman_speed, &self.board);
        }

        let peers = self.peers();
        let mut env = GhostEnv {
            board: &self.board,
            peers: &peers,
            rng: &mut self.rng,
            events: &mut self.events,
            speed: self.config.ghost_speed,
            eyes_speed: self.config.ghost_eyes_speed,
            frighten_mode: self.phase.frighten_mode,
            phase: self.phase.phase,
        };
        for ghost in &mut self.ghosts {
            ghost.update(dt, &mut env);
        }

        if self.resolve_pickups() == Flow::Interrupted {
            return Flow::Interrupted;
        }
        self.resolve_collisions()
    }

    fn peers(&self) -> Peers {
        Peers {
            players: self.pacmen.iter().map(Pacman::snapshot).collect(),
            red_cell: self.ghost(GhostId::Red).map(Ghost::cell),
        }
    }

    fn resolve_pickups(&mut self) -> Flow {
        for idx in 0..self.pacmen.len() {
            if !self.pacmen[idx].is_alive() {
                continue;
            }
            let cell = self.pacmen[idx].cell();
            let by = self.pacmen[idx].color;
            match self.board.cell_content(cell) {
                CellContent::Empty => {}
                CellContent::Powerup => {
                    self.pacmen[idx].points += self.config.powerup_points;
                    self.board.consume(cell);
                    self.events.push(RuntimeEvent::PowerupEaten {
                        x: cell.x,
                        y: cell.y,
                        by,
                    });
                    self.frighten_ghosts();
                }
                CellContent::Dot => {
                    self.pacmen[idx].points += self.config.dot_points;
                    self.board.consume(cell);
                    self.dots_left -= 1;
                    self.events.push(RuntimeEvent::DotEaten {
                        x: cell.x,
                        y: cell.y,
                        by,
                    });
                    if self.dots_left <= 0 {
                        self.events
                            .push(RuntimeEvent::LevelCleared { level: self.level });
                        self.go_to_next_level();
                        return Flow::Interrupted;
                    }
                }
            }
        }
        Flow::Continue
    }

    fn resolve_collisions(&mut self) -> Flow {
        for pacman_idx in 0..self.pacmen.len() {
            if !self.pacmen[pacman_idx].is_alive() {
                continue;
            }
            let cell = self.pacmen[pacman_idx].cell();
            for ghost_idx in 0..self.ghosts.len() {
                let ghost = &self.ghosts[ghost_idx];
                if ghost.is_dead() || ghost.cell() != cell {
                    continue;
                }
                if self.phase.frighten_mode {
                    if self.ghosts[ghost_idx].kill() {
                        self.pacmen[pacman_idx].points += self.config.ghost_points;
                        self.events.push(RuntimeEvent::GhostEaten {
                            ghost: self.ghosts[ghost_idx].id,
                            by: self.pacmen[pacman_idx].color,
                        });
                    }
                } else {
                    self.kill_pacman(pacman_idx);
                    return Flow::Interrupted;
                }
            }
        }
        Flow::Continue
    }

    fn kill_pacman(&mut self, idx: usize) {
        let Some(pacman) = self.pacmen.get_mut(idx) else {
            return;
        };
        pacman.lives -= 1;
        let event = RuntimeEvent::PacmanKilled {
            pacman: pacman.color,
            lives_left: pacman.lives,
        };
        self.events.push(event);
        self.reset_round_state();
        if !self.pacmen.iter().any(Pacman::is_alive) {
            self.ended = true;
            self.events.push(RuntimeEvent::GameOver { level: self.level });
        }
    }
}
