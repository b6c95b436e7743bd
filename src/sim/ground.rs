//! Scrolling floor
//!
//! Two tiles leapfrog each other so the floor never shows a seam. Collision only
//! ever reads `y`.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
    tile_width: f32,
}

impl Ground {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            y: config.floor_y,
            x1: 0.0,
            x2: config.ground_tile_width,
            tile_width: config.ground_tile_width,
        }
    }

    pub fn advance_tick(&mut self, config: &SimConfig) {
        self.x1 -= config.scroll_velocity;
        self.x2 -= config.scroll_velocity;

        if self.x1 + self.tile_width < 0.0 {
            self.x1 = self.x2 + self.tile_width;
        }
        if self.x2 + self.tile_width < 0.0 {
            self.x2 = self.x1 + self.tile_width;
        }
    }
}
