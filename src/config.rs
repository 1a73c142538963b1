//! Simulation and algorithm options.
//!
//! Options are read once at start-up from a TOML file. Every section and field is optional:
//!
//! ```toml
//! [maze]
//! wall_length = 0.168
//! wall_width = 0.012
//!
//! [timing]
//! min_sleep_ms = 5
//! frame_rate = 60.0
//!
//! [display]
//! discrete_interface_declare_wall_on_read = true
//! declare_both_wall_halves = true
//! print_late_sensor_reads = false
//! tile_base_color = "black"
//! algorithm_controls_tile_fog = false
//!
//! [algorithm]
//! interface_type = "discrete"
//! initial_direction = "north"
//! wheel_speed_fraction = 1.0
//! tile_text_rows = 2
//! tile_text_cols = 3
//! ```

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    display::Color,
    domain::{Direction, TileGeometry},
    state::InterfaceType,
};

const MAX_TILE_TEXT_ROWS: u32 = 10;
const MAX_TILE_TEXT_COLS: u32 = 10;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub maze: MazeConfig,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub algorithm: AlgorithmConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MazeConfig {
    pub wall_length: f64,
    pub wall_width: f64,
}

impl Default for MazeConfig {
    fn default() -> Self {
        let geometry = TileGeometry::default();
        Self {
            wall_length: geometry.wall_length,
            wall_width: geometry.wall_width,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    /// Granularity of every busy-wait in the mouse interface.
    pub min_sleep_ms: u64,
    /// Simulation frame rate; sensor reads are paced to one per frame.
    pub frame_rate: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_sleep_ms: 5,
            frame_rate: 60.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub discrete_interface_declare_wall_on_read: bool,
    pub declare_both_wall_halves: bool,
    pub print_late_sensor_reads: bool,
    pub tile_base_color: Color,
    pub algorithm_controls_tile_fog: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            discrete_interface_declare_wall_on_read: true,
            declare_both_wall_halves: true,
            print_late_sensor_reads: false,
            tile_base_color: Color::Black,
            algorithm_controls_tile_fog: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub interface_type: InterfaceType,
    pub initial_direction: Direction,
    /// Fraction of the mouse's maximum wheel speed used for discrete movements.
    pub wheel_speed_fraction: f64,
    pub tile_text_rows: u32,
    pub tile_text_cols: u32,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            interface_type: InterfaceType::Discrete,
            initial_direction: Direction::North,
            wheel_speed_fraction: 1.0,
            tile_text_rows: 2,
            tile_text_cols: 3,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = basic_toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maze.wall_length <= 0.0 || self.maze.wall_width < 0.0 {
            return Err(ConfigError::InvalidTileGeometry {
                wall_length: self.maze.wall_length,
                wall_width: self.maze.wall_width,
            });
        }
        if !(self.timing.frame_rate > 0.0) {
            return Err(ConfigError::InvalidFrameRate(self.timing.frame_rate));
        }
        Duration::try_from_secs_f64(1.0 / self.timing.frame_rate)
            .map_err(|_| ConfigError::FramePeriodOutOfRange(self.timing.frame_rate))?;
        if self.timing.min_sleep_ms == 0 {
            return Err(ConfigError::InvalidMinSleep);
        }
        let fraction = self.algorithm.wheel_speed_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ConfigError::InvalidWheelSpeedFraction(fraction));
        }
        let (rows, cols) = (self.algorithm.tile_text_rows, self.algorithm.tile_text_cols);
        if !(1..=MAX_TILE_TEXT_ROWS).contains(&rows) || !(1..=MAX_TILE_TEXT_COLS).contains(&cols) {
            return Err(ConfigError::InvalidTileText { rows, cols });
        }
        Ok(())
    }

    pub fn tile_geometry(&self) -> TileGeometry {
        TileGeometry::new(self.maze.wall_length, self.maze.wall_width)
    }

    pub fn min_sleep_duration(&self) -> Duration {
        Duration::from_millis(self.timing.min_sleep_ms)
    }

    /// Period of one simulation frame. Saturates for frame rates that `validate` rejects.
    pub fn frame_duration(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.timing.frame_rate).unwrap_or(Duration::MAX)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] basic_toml::Error),
    #[error("invalid tile geometry (wall length {wall_length}, wall width {wall_width})")]
    InvalidTileGeometry { wall_length: f64, wall_width: f64 },
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f64),
    #[error("frame rate {0} is too low to give a representable frame period")]
    FramePeriodOutOfRange(f64),
    #[error("minimum sleep duration must be at least one millisecond")]
    InvalidMinSleep,
    #[error("wheel speed fraction {0} is outside of (0, 1]")]
    InvalidWheelSpeedFraction(f64),
    #[error("tile text of {rows}x{cols} characters is not supported")]
    InvalidTileText { rows: u32, cols: u32 },
}
