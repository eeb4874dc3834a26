// config.rs - Gameplay tuning, with an optional RON override file.
//
// Everything gameplay-related is measured in "canvas" units: a fixed playfield
// with the origin at the top-left corner and y growing downward. Only the
// renderer converts to Bevy's centred, y-up world space.

use std::fmt;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "flappy.ron";

/// All tuning knobs for a session.
///
/// Per-tick values (gravity, speeds) assume the fixed tick rate in `tick_hz`,
/// so changing the tick rate changes how the game feels.
#[derive(Resource, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Added to the bird's velocity every tick.
    pub gravity: f32,
    /// Velocity the bird is set to on a flap. Negative is upward.
    pub flap_strength: f32,
    /// Pixels the pipes move left every tick.
    pub pipe_speed: f32,
    pub pipe_gap: f32,
    /// Horizontal distance between consecutive pipes, in pixels.
    pub pipe_spacing: f32,
    /// Smallest allowed height for either pipe segment.
    pub pipe_min_height: f32,
    pub pipe_width: f32,
    pub bird_x: f32,
    /// Visual size of the bird sprite.
    pub bird_size: f32,
    /// Collision box size. Smaller than the sprite so near misses feel fair.
    pub bird_hitbox_size: f32,
    pub tick_hz: f64,
    pub music_volume: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 400.0,
            canvas_height: 600.0,
            gravity: 0.045,
            flap_strength: -3.0,
            pipe_speed: 1.35,
            pipe_gap: 180.0,
            pipe_spacing: 250.0,
            pipe_min_height: 50.0,
            pipe_width: 70.0,
            bird_x: 80.0,
            bird_size: 68.0,
            bird_hitbox_size: 30.0,
            tick_hz: 60.0,
            music_volume: 0.5,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read config: {e}"),
            ConfigError::Parse(e) => write!(f, "could not parse config: {e}"),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    /// Number of ticks between pipe spawns. Never zero.
    pub fn spawn_interval(&self) -> u64 {
        ((self.pipe_spacing / self.pipe_speed).floor() as u64).max(1)
    }

    /// Largest `top_height` a freshly spawned pipe may get.
    pub fn max_top_height(&self) -> f32 {
        self.canvas_height - self.pipe_gap - self.pipe_min_height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width <= 0.0 || self.canvas_height <= 0.0 {
            return Err(ConfigError::Invalid("canvas size must be positive"));
        }
        if self.pipe_speed <= 0.0 {
            return Err(ConfigError::Invalid("pipe_speed must be positive"));
        }
        if self.pipe_gap <= 0.0 || self.pipe_width <= 0.0 {
            return Err(ConfigError::Invalid("pipe_gap and pipe_width must be positive"));
        }
        if self.pipe_min_height < 0.0 || self.max_top_height() < self.pipe_min_height {
            return Err(ConfigError::Invalid(
                "pipe_gap plus two minimum heights must fit the canvas",
            ));
        }
        if self.bird_size <= 0.0 || self.bird_hitbox_size <= 0.0 {
            return Err(ConfigError::Invalid("bird sizes must be positive"));
        }
        if self.tick_hz <= 0.0 {
            return Err(ConfigError::Invalid("tick_hz must be positive"));
        }
        Ok(())
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the override file if there is one. Any problem with it falls back
    /// to the built-in tuning; a broken config file never stops the game.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {:?}. Using default tuning.", path);
            return Self::default();
        }

        let loaded = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .and_then(|contents| Self::from_ron(&contents));

        match loaded {
            Ok(config) => {
                info!("Loaded tuning from {:?}", path);
                config
            }
            Err(e) => {
                warn!("{}. Using default tuning.", e);
                Self::default()
            }
        }
    }
}
