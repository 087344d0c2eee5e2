use crate::config::PhaseTable;
use crate::constants::{BLINK_INSTANTS, BLINK_WINDOW};
use crate::types::GamePhase;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhaseTick {
    Idle,
    FrightenExpired,
    Changed {
        phase: GamePhase,
        phase_num: u32,
        duration: f32,
        /// A zero-length dwell only moves the bookkeeping forward.
        broadcast: bool,
    },
}

/// Global scatter/chase alternation plus the shared frightened countdown.
#[derive(Clone, Debug)]
pub struct PhaseController {
    pub phase: GamePhase,
    pub phase_num: u32,
    pub phase_timer: f32,
    pub frighten_mode: bool,
    pub frightened_timer: f32,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseController {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::None,
            phase_num: 0,
            phase_timer: 0.0,
            frighten_mode: false,
            frightened_timer: 0.0,
        }
    }

    /// Round reset after a lost life. The phase index survives.
    pub fn reset_round(&mut self) {
        self.phase = GamePhase::None;
        self.phase_timer = 0.0;
        self.frighten_mode = false;
        self.frightened_timer = 0.0;
    }

    pub fn reset_level(&mut self) {
        self.reset_round();
        self.phase_num = 0;
    }

    /// Frightened mode suspends the phase countdown without resetting it.
    pub fn tick(&mut self, dt: f32, level: u32, table: &PhaseTable) -> PhaseTick {
        if self.frighten_mode {
            self.frightened_timer -= dt;
            if self.frightened_timer <= 0.0 {
                self.unfrighten();
                return PhaseTick::FrightenExpired;
            }
            return PhaseTick::Idle;
        }
        self.phase_timer -= dt;
        if self.phase_timer <= 0.0 {
            return self.advance(level, table);
        }
        PhaseTick::Idle
    }

    pub fn advance(&mut self, level: u32, table: &PhaseTable) -> PhaseTick {
        self.phase = match self.phase {
            GamePhase::None | GamePhase::Chase => GamePhase::Scatter,
            GamePhase::Scatter => GamePhase::Chase,
        };
        self.phase_num += 1;
        self.phase_timer = table.duration(level, self.phase_num);
        PhaseTick::Changed {
            phase: self.phase,
            phase_num: self.phase_num,
            duration: self.phase_timer,
            broadcast: self.phase_timer != 0.0,
        }
    }

    /// Re-triggering restarts the countdown instead of stacking.
    pub fn frighten(&mut self, duration: f32) {
        self.frighten_mode = true;
        self.frightened_timer = duration;
    }

    pub fn unfrighten(&mut self) {
        self.frighten_mode = false;
        self.frightened_timer = 0.0;
    }

    pub fn is_blinking(&self) -> bool {
        self.frighten_mode
            && BLINK_INSTANTS
                .iter()
                .any(|instant| (self.frightened_timer - instant).abs() < BLINK_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FINAL_PHASE_DURATION;

    #[test]
    fn first_tick_enters_scatter() {
        let table = PhaseTable::default();
        let mut phase = PhaseController::new();
        let tick = phase.tick(0.016, 1, &table);
        assert_eq!(
            tick,
            PhaseTick::Changed {
                phase: GamePhase::Scatter,
                phase_num: 1,
                duration: 7.0,
                broadcast: true,
            }
        );
    }

    #[test]
    fn phases_alternate_and_final_phase_never_expires() {
        let table = PhaseTable::default();
        let mut phase = PhaseController::new();
        let mut seen = Vec::new();
        for _ in 0..8 {
            if let PhaseTick::Changed { phase, duration, .. } = phase.advance(1, &table) {
                seen.push((phase, duration));
            }
        }
        assert_eq!(seen[0], (GamePhase::Scatter, 7.0));
        assert_eq!(seen[1], (GamePhase::Chase, 20.0));
        assert_eq!(seen[6], (GamePhase::Scatter, 5.0));
        assert_eq!(seen[7], (GamePhase::Chase, FINAL_PHASE_DURATION));

        for _ in 0..10_000 {
            assert_eq!(phase.tick(1.0, 1, &table), PhaseTick::Idle);
        }
        assert_eq!(phase.phase_num, 8);
    }

    #[test]
    fn zero_duration_skips_broadcast() {
        let table = PhaseTable::default();
        let mut phase = PhaseController::new();
        phase.phase_num = 6;
        phase.phase = GamePhase::Scatter;
        match phase.advance(2, &table) {
            PhaseTick::Changed {
                phase_num,
                duration,
                broadcast,
                ..
            } => {
                assert_eq!(phase_num, 7);
                assert_eq!(duration, 0.0);
                assert!(!broadcast);
            }
            other => panic!("unexpected tick {other:?}"),
        }
        // The zero dwell expires on the very next tick.
        assert!(matches!(
            phase.tick(0.01, 2, &table),
            PhaseTick::Changed { phase_num: 8, .. }
        ));
    }

    #[test]
    fn frightened_mode_suspends_phase_countdown() {
        let table = PhaseTable::default();
        let mut phase = PhaseController::new();
        phase.advance(1, &table);
        phase.tick(2.0, 1, &table);
        assert_eq!(phase.phase_timer, 5.0);

        phase.frighten(4.0);
        for _ in 0..7 {
            assert_eq!(phase.tick(0.5, 1, &table), PhaseTick::Idle);
        }
        assert!(phase.frighten_mode);
        assert_eq!(phase.tick(0.5, 1, &table), PhaseTick::FrightenExpired);
        assert!(!phase.frighten_mode);
        assert_eq!(phase.frightened_timer, 0.0);
        assert_eq!(phase.phase_timer, 5.0);
    }

    #[test]
    fn refrighten_restarts_countdown() {
        let mut phase = PhaseController::new();
        phase.frighten(4.0);
        phase.frightened_timer = 1.5;
        phase.frighten(4.0);
        assert_eq!(phase.frightened_timer, 4.0);
    }

    #[test]
    fn round_reset_keeps_phase_index() {
        let table = PhaseTable::default();
        let mut phase = PhaseController::new();
        phase.advance(1, &table);
        phase.advance(1, &table);
        phase.frighten(4.0);
        phase.reset_round();
        assert_eq!(phase.phase, GamePhase::None);
        assert_eq!(phase.phase_num, 2);
        assert!(!phase.frighten_mode);
        phase.reset_level();
        assert_eq!(phase.phase_num, 0);
    }

    #[test]
    fn blinks_near_end_of_frightened_mode() {
        let mut phase = PhaseController::new();
        phase.frighten(4.0);
        assert!(!phase.is_blinking());
        phase.frightened_timer = 1.05;
        assert!(phase.is_blinking());
        phase.frightened_timer = 0.45;
        assert!(phase.is_blinking());
        phase.frightened_timer = 0.75;
        assert!(!phase.is_blinking());
    }
}
