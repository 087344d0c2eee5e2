use std::fmt;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DOTS_TO_EAT, DOT_POINTS, FINAL_PHASE_DURATION, FRIGHTENED_DURATION, GHOST_EYES_SPEED,
    GHOST_POINTS, GHOST_SPEED, PACMAN_SPEED, POWERUP_POINTS, RNG_SEED, STARTING_LIVES,
    TABLED_PHASES,
};
use crate::types::GhostId;

/// Scatter/chase dwell times per level tier, indexed by phase number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseTable {
    #[serde(rename = "level1")]
    pub level_1: [f32; 8],
    #[serde(rename = "level2To4")]
    pub level_2_to_4: [f32; 8],
    #[serde(rename = "level5Plus")]
    pub level_5_plus: [f32; 8],
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self {
            level_1: [0.0, 7.0, 20.0, 7.0, 20.0, 5.0, 20.0, 5.0],
            level_2_to_4: [0.0, 7.0, 20.0, 7.0, 20.0, 5.0, 1033.0, 0.0],
            level_5_plus: [0.0, 5.0, 20.0, 5.0, 20.0, 5.0, 1037.0, 0.0],
        }
    }
}

impl PhaseTable {
    pub fn duration(&self, level: u32, phase_num: u32) -> f32 {
        if phase_num >= TABLED_PHASES {
            return FINAL_PHASE_DURATION;
        }
        let tier = match level {
            0 | 1 => &self.level_1,
            2..=4 => &self.level_2_to_4,
            _ => &self.level_5_plus,
        };
        tier[phase_num as usize]
    }
}

/// Seconds of started play before each pen ghost is let out. `None` keeps
/// the ghost in the pen until released explicitly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSchedule {
    pub pink: Option<f32>,
    pub teal: Option<f32>,
    pub orange: Option<f32>,
}

impl Default for ReleaseSchedule {
    fn default() -> Self {
        Self {
            pink: Some(0.0),
            teal: Some(4.0),
            orange: Some(8.0),
        }
    }
}

impl ReleaseSchedule {
    pub fn never() -> Self {
        Self {
            pink: None,
            teal: None,
            orange: None,
        }
    }

    pub fn release_after(&self, id: GhostId) -> Option<f32> {
        match id {
            GhostId::Red => None,
            GhostId::Pink => self.pink,
            GhostId::Teal => self.teal,
            GhostId::Orange => self.orange,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(rename = "pacmanSpeed")]
    pub pacman_speed: f32,
    #[serde(rename = "ghostSpeed")]
    pub ghost_speed: f32,
    #[serde(rename = "ghostEyesSpeed")]
    pub ghost_eyes_speed: f32,
    #[serde(rename = "dotsToEat")]
    pub dots_to_eat: i32,
    #[serde(rename = "frightenedDuration")]
    pub frightened_duration: f32,
    #[serde(rename = "startingLives")]
    pub starting_lives: i32,
    #[serde(rename = "rngSeed")]
    pub rng_seed: u32,
    #[serde(rename = "dotPoints")]
    pub dot_points: i32,
    #[serde(rename = "powerupPoints")]
    pub powerup_points: i32,
    #[serde(rename = "ghostPoints")]
    pub ghost_points: i32,
    pub phases: PhaseTable,
    pub release: ReleaseSchedule,
    #[serde(rename = "maxSubstepSecs")]
    pub max_substep_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacman_speed: PACMAN_SPEED,
            ghost_speed: GHOST_SPEED,
            ghost_eyes_speed: GHOST_EYES_SPEED,
            dots_to_eat: DOTS_TO_EAT,
            frightened_duration: FRIGHTENED_DURATION,
            starting_lives: STARTING_LIVES,
            rng_seed: RNG_SEED,
            dot_points: DOT_POINTS,
            powerup_points: POWERUP_POINTS,
            ghost_points: GHOST_POINTS,
            phases: PhaseTable::default(),
            release: ReleaseSchedule::default(),
            max_substep_secs: 1.0 / 60.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "failed to read config: {error}"),
            Self::Parse(error) => write!(f, "failed to parse config: {error}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Parse(error) => Some(error),
            Self::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error)
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let speeds = [
            ("pacmanSpeed", self.pacman_speed),
            ("ghostSpeed", self.ghost_speed),
            ("ghostEyesSpeed", self.ghost_eyes_speed),
        ];
        for (name, value) in speeds {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be >= 0, got {value}")));
            }
        }
        if self.dots_to_eat <= 0 {
            return Err(ConfigError::Invalid("dotsToEat must be positive".to_string()));
        }
        if self.starting_lives <= 0 {
            return Err(ConfigError::Invalid("startingLives must be positive".to_string()));
        }
        if !self.frightened_duration.is_finite() || self.frightened_duration <= 0.0 {
            return Err(ConfigError::Invalid(
                "frightenedDuration must be positive".to_string(),
            ));
        }
        if !self.max_substep_secs.is_finite() || self.max_substep_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "maxSubstepSecs must be positive".to_string(),
            ));
        }
        let tiers = [
            &self.phases.level_1,
            &self.phases.level_2_to_4,
            &self.phases.level_5_plus,
        ];
        if tiers
            .iter()
            .flat_map(|tier| tier.iter())
            .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::Invalid(
                "phase durations must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
