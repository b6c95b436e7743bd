//! Flap Evolve - headless flappy-bird simulation for neuroevolution
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bird physics, pipes, collisions, generation runner)
//! - `policy`: Decision functions bound to each bird
//! - `optimizer`: Boundary to the evolutionary algorithm that produces policies
//! - `trainer`: Drives an optimizer through successive generations
//! - `hall_of_fame`: Fittest genomes seen across a training run
//! - `config`: Data-driven simulation constants

pub mod config;
pub mod hall_of_fame;
pub mod optimizer;
pub mod policy;
pub mod sim;
pub mod trainer;

pub use config::{ConfigError, SimConfig};
pub use hall_of_fame::HallOfFame;
pub use optimizer::{GenomeId, HillClimber, Optimizer};
pub use policy::{LinearPolicy, Observation, Policy};
pub use trainer::{GenerationStats, Trainer, TrainingSummary};

/// Default simulation constants
///
/// These seed [`SimConfig::default`]; the simulation itself only ever reads the config.
pub mod consts {
    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 600.0;
    pub const FIELD_HEIGHT: f32 = 800.0;
    /// Ground plane height (top of the floor tiles)
    pub const FLOOR_Y: f32 = 730.0;
    /// Width of one floor tile
    pub const GROUND_TILE_WIDTH: f32 = 672.0;

    /// Bird spawn point
    pub const BIRD_START_X: f32 = 230.0;
    pub const BIRD_START_Y: f32 = 350.0;
    /// Bird silhouette size (pixels)
    pub const BIRD_WIDTH: u32 = 68;
    pub const BIRD_HEIGHT: u32 = 48;

    /// Vertical velocity applied on jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -10.5;
    /// Gravity in the displacement curve d = v*t + 0.5*g*t^2
    pub const GRAVITY: f32 = 3.0;
    /// Terminal displacement per tick
    pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
    /// Upward bias added while rising
    pub const RISE_BIAS: f32 = 2.0;
    /// Height above the last jump point where the bird still tilts up
    pub const TILT_HOLD_HEIGHT: f32 = 50.0;
    /// Tilt limits (degrees)
    pub const MAX_TILT: f32 = 25.0;
    pub const MIN_TILT: f32 = -90.0;
    /// Tilt decay per tick while falling (degrees)
    pub const TILT_DECAY: f32 = 20.0;

    /// Pipe geometry
    pub const PIPE_GAP: f32 = 200.0;
    pub const PIPE_WIDTH: u32 = 104;
    pub const PIPE_HEIGHT: u32 = 640;
    /// Pipe cap height, drawn full width; the body is inset on both sides
    pub const PIPE_CAP_HEIGHT: u32 = 24;
    pub const PIPE_BODY_INSET: u32 = 4;
    /// Gap origin is drawn uniformly from [GAP_ORIGIN_MIN, GAP_ORIGIN_MAX)
    pub const GAP_ORIGIN_MIN: i32 = 50;
    pub const GAP_ORIGIN_MAX: i32 = 450;
    /// Scroll speed shared by pipes and ground
    pub const SCROLL_VELOCITY: f32 = 5.0;
    /// First pipe spawns here; later pipes spawn at the field's right edge
    pub const INITIAL_PIPE_X: f32 = 700.0;

    /// Death thresholds
    pub const FLOOR_MARGIN: f32 = 10.0;
    pub const CEILING_Y: f32 = -50.0;

    /// Fitness shaping
    pub const ALIVE_REWARD: f64 = 0.1;
    pub const PASS_REWARD: f64 = 5.0;
    pub const COLLISION_PENALTY: f64 = 1.0;
    /// Policy output above this triggers a jump
    pub const JUMP_THRESHOLD: f32 = 0.5;
}

/// Round a float coordinate to the nearest pixel
#[inline]
pub fn to_pixel(v: f32) -> i32 {
    v.round() as i32
}
