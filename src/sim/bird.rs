//! Bird flight physics
//!
//! Flight is a fixed quadratic curve restarted on every jump. Nothing here is
//! random, so two birds fed the same decisions fly identical paths.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// One flying agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Top-left of the silhouette; x stays fixed for a run
    pub pos: Vec2,
    /// Velocity set by the last jump (0 before the first jump)
    pub vel_y: f32,
    /// Ticks since the last jump
    pub ticks_since_jump: u32,
    /// Rotation in degrees, positive is nose-up
    pub tilt: f32,
    /// y captured at the last jump
    pub reference_height: f32,
    pub alive: bool,
}

impl Bird {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel_y: 0.0,
            ticks_since_jump: 0,
            tilt: 0.0,
            reference_height: pos.y,
            alive: true,
        }
    }

    /// Flap: restart the flight curve from the current height
    pub fn jump(&mut self, config: &SimConfig) {
        debug_assert!(self.alive, "dead birds never jump");
        self.vel_y = config.jump_velocity;
        self.ticks_since_jump = 0;
        self.reference_height = self.pos.y;
    }

    /// Vertical displacement for the next tick, given the tick count after increment
    pub fn displacement(vel_y: f32, ticks: u32, config: &SimConfig) -> f32 {
        let t = ticks as f32;
        let mut d = vel_y * t + 0.5 * config.gravity * t * t;
        d = d.clamp(-config.terminal_displacement, config.terminal_displacement);
        if d < 0.0 {
            d += config.rise_bias;
        }
        d
    }

    /// Advance one tick of flight. Returns the displacement applied.
    pub fn advance_tick(&mut self, config: &SimConfig) -> f32 {
        debug_assert!(self.alive, "dead birds are never advanced");
        self.ticks_since_jump += 1;

        let d = Self::displacement(self.vel_y, self.ticks_since_jump, config);
        self.pos.y += d;

        if d < 0.0 || self.pos.y < self.reference_height + config.tilt_hold_height {
            self.tilt = self.tilt.max(config.max_tilt);
        } else {
            self.tilt = (self.tilt - config.tilt_decay).max(config.min_tilt);
        }
        d
    }

    /// Center of the silhouette
    pub fn center(&self, config: &SimConfig) -> Vec2 {
        self.pos + Vec2::new(config.bird_width as f32, config.bird_height as f32) / 2.0
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}
