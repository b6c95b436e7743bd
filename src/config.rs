//! Simulation configuration
//!
//! Every physical and reward constant lives here so headless experiments can
//! tweak them from a JSON file. Defaults reproduce the classic game.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised when validating or loading a [`SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("gap origin range [{min}, {max}) is empty")]
    EmptyGapRange { min: i32, max: i32 },
    #[error("gap [{top}, {bottom}] does not fit between the ceiling and the floor at {floor}")]
    GapOffField { top: f32, bottom: f32, floor: f32 },
    #[error("floor at {floor} lies outside a field {height}px tall")]
    FloorOffField { floor: f32, height: f32 },
    #[error("bird start y {y} is outside the playable band ({ceiling}, {floor})")]
    BirdOffField { y: f32, ceiling: f32, floor: f32 },
    #[error("pipe body inset {inset} leaves no body in a {width}px wide pipe")]
    PipeInsetTooWide { inset: u32, width: u32 },
    #[error("pipe cap height {cap} exceeds pipe height {height}")]
    PipeCapTooTall { cap: u32, height: u32 },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Visible field width; replacement pipes spawn at this x
    pub field_width: f32,
    /// Visible field height; the floor must sit inside it
    pub field_height: f32,
    /// Ground plane y
    pub floor_y: f32,
    /// Floor tile width used for seamless scrolling
    pub ground_tile_width: f32,

    // === Bird ===
    pub bird_start_x: f32,
    pub bird_start_y: f32,
    pub bird_width: u32,
    pub bird_height: u32,
    /// Velocity set by a jump (negative is up)
    pub jump_velocity: f32,
    pub gravity: f32,
    /// Displacement per tick is clamped to +/- this value
    pub terminal_displacement: f32,
    pub rise_bias: f32,
    pub tilt_hold_height: f32,
    pub max_tilt: f32,
    pub min_tilt: f32,
    pub tilt_decay: f32,

    // === Pipes ===
    pub pipe_gap: f32,
    pub pipe_width: u32,
    pub pipe_height: u32,
    pub pipe_cap_height: u32,
    pub pipe_body_inset: u32,
    /// Inclusive lower bound of the gap origin draw
    pub gap_origin_min: i32,
    /// Exclusive upper bound of the gap origin draw
    pub gap_origin_max: i32,
    pub scroll_velocity: f32,
    pub initial_pipe_x: f32,

    // === Death thresholds ===
    /// A bird dies once `y + bird_height - floor_margin >= floor_y`
    pub floor_margin: f32,
    /// A bird dies once `y < ceiling_y`
    pub ceiling_y: f32,

    // === Fitness ===
    pub alive_reward: f64,
    pub pass_reward: f64,
    pub collision_penalty: f64,
    pub jump_threshold: f32,

    /// Hard cap on ticks per generation (None = run until every bird dies)
    pub max_ticks: Option<u64>,
    /// Emit bird-to-gap debug segments in frame snapshots
    pub debug_lines: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            floor_y: FLOOR_Y,
            ground_tile_width: GROUND_TILE_WIDTH,

            bird_start_x: BIRD_START_X,
            bird_start_y: BIRD_START_Y,
            bird_width: BIRD_WIDTH,
            bird_height: BIRD_HEIGHT,
            jump_velocity: JUMP_VELOCITY,
            gravity: GRAVITY,
            terminal_displacement: TERMINAL_DISPLACEMENT,
            rise_bias: RISE_BIAS,
            tilt_hold_height: TILT_HOLD_HEIGHT,
            max_tilt: MAX_TILT,
            min_tilt: MIN_TILT,
            tilt_decay: TILT_DECAY,

            pipe_gap: PIPE_GAP,
            pipe_width: PIPE_WIDTH,
            pipe_height: PIPE_HEIGHT,
            pipe_cap_height: PIPE_CAP_HEIGHT,
            pipe_body_inset: PIPE_BODY_INSET,
            gap_origin_min: GAP_ORIGIN_MIN,
            gap_origin_max: GAP_ORIGIN_MAX,
            scroll_velocity: SCROLL_VELOCITY,
            initial_pipe_x: INITIAL_PIPE_X,

            floor_margin: FLOOR_MARGIN,
            ceiling_y: CEILING_Y,

            alive_reward: ALIVE_REWARD,
            pass_reward: PASS_REWARD,
            collision_penalty: COLLISION_PENALTY,
            jump_threshold: JUMP_THRESHOLD,

            max_ticks: None,
            debug_lines: false,
        }
    }
}

impl SimConfig {
    /// Check the constants once, before any generation runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("field_width", self.field_width as f64),
            ("field_height", self.field_height as f64),
            ("ground_tile_width", self.ground_tile_width as f64),
            ("bird_width", self.bird_width as f64),
            ("bird_height", self.bird_height as f64),
            ("gravity", self.gravity as f64),
            ("terminal_displacement", self.terminal_displacement as f64),
            ("pipe_gap", self.pipe_gap as f64),
            ("pipe_width", self.pipe_width as f64),
            ("pipe_height", self.pipe_height as f64),
            ("scroll_velocity", self.scroll_velocity as f64),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.max_ticks == Some(0) {
            return Err(ConfigError::NotPositive {
                field: "max_ticks",
                value: 0.0,
            });
        }

        if self.floor_y <= 0.0 || self.floor_y >= self.field_height {
            return Err(ConfigError::FloorOffField {
                floor: self.floor_y,
                height: self.field_height,
            });
        }

        if self.gap_origin_min >= self.gap_origin_max {
            return Err(ConfigError::EmptyGapRange {
                min: self.gap_origin_min,
                max: self.gap_origin_max,
            });
        }

        // Highest and lowest gaps the draw can produce must both be reachable
        let top = self.gap_origin_min as f32;
        let bottom = (self.gap_origin_max - 1) as f32 + self.pipe_gap;
        if top < 0.0 || bottom > self.floor_y {
            return Err(ConfigError::GapOffField {
                top,
                bottom,
                floor: self.floor_y,
            });
        }

        let lowest_alive = self.floor_y - self.bird_height as f32 + self.floor_margin;
        if self.bird_start_y < self.ceiling_y || self.bird_start_y >= lowest_alive {
            return Err(ConfigError::BirdOffField {
                y: self.bird_start_y,
                ceiling: self.ceiling_y,
                floor: lowest_alive,
            });
        }

        if self.pipe_body_inset * 2 >= self.pipe_width {
            return Err(ConfigError::PipeInsetTooWide {
                inset: self.pipe_body_inset,
                width: self.pipe_width,
            });
        }
        if self.pipe_cap_height > self.pipe_height {
            return Err(ConfigError::PipeCapTooTall {
                cap: self.pipe_cap_height,
                height: self.pipe_height,
            });
        }

        Ok(())
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: SimConfig = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply a command-line tick cap on top of whatever the config set
    ///
    /// `Some(0)` lifts the cap. Without an override an existing cap is kept and
    /// `fallback` only fills in when none was set.
    pub fn override_max_ticks(&mut self, flag: Option<u64>, fallback: u64) {
        self.max_ticks = match flag {
            Some(0) => None,
            Some(ticks) => Some(ticks),
            None => self.max_ticks.or(Some(fallback)),
        };
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
