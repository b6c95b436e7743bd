//! Collision detection between birds, pipes and the field bounds
//!
//! Pipe hits are resolved on silhouettes: the bird's mask is tested against the
//! top and bottom segment masks at integer pixel offsets. Bounds are plain
//! threshold checks. Nothing here holds state.

use glam::IVec2;

use super::bird::Bird;
use super::mask::Mask;
use super::pipe::Pipe;
use crate::config::SimConfig;
use crate::to_pixel;

/// Silhouettes shared by every entity of a generation
#[derive(Debug, Clone)]
pub struct Sprites {
    pub bird: Mask,
    /// Hanging segment above the gap (cap at the bottom)
    pub pipe_top: Mask,
    /// Standing segment below the gap (cap at the top)
    pub pipe_bottom: Mask,
}

impl Sprites {
    pub fn new(config: &SimConfig) -> Self {
        let pipe_bottom = Mask::pipe(
            config.pipe_width,
            config.pipe_height,
            config.pipe_cap_height,
            config.pipe_body_inset,
        );
        Self {
            bird: Mask::bird(config.bird_width, config.bird_height),
            pipe_top: pipe_bottom.flipped_vertical(),
            pipe_bottom,
        }
    }
}

/// Why a bird died
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Death {
    /// Touched a pipe segment
    Pipe,
    /// Fell into the floor
    Ground,
    /// Flew off the top of the field
    Ceiling,
}

/// Does the bird's silhouette touch either segment of the pipe?
pub fn bird_hits_pipe(bird: &Bird, pipe: &Pipe, sprites: &Sprites, config: &SimConfig) -> bool {
    let bird_x = to_pixel(bird.pos.x);
    let bird_y = to_pixel(bird.pos.y);
    let dx = to_pixel(pipe.x) - bird_x;

    let top = IVec2::new(dx, to_pixel(pipe.top_segment_y(config)) - bird_y);
    let bottom = IVec2::new(dx, to_pixel(pipe.bottom_segment_y()) - bird_y);

    sprites.bird.overlaps(&sprites.pipe_bottom, bottom) || sprites.bird.overlaps(&sprites.pipe_top, top)
}

/// Has the bird's lower body reached the floor?
pub fn bird_hits_ground(bird: &Bird, ground_y: f32, config: &SimConfig) -> bool {
    bird.pos.y + config.bird_height as f32 - config.floor_margin >= ground_y
}

/// Has the bird flown off the top of the field?
pub fn bird_escaped_top(bird: &Bird, config: &SimConfig) -> bool {
    bird.pos.y < config.ceiling_y
}

/// Boundary check in the order the runner applies it
pub fn boundary_death(bird: &Bird, ground_y: f32, config: &SimConfig) -> Option<Death> {
    if bird_hits_ground(bird, ground_y, config) {
        Some(Death::Ground)
    } else if bird_escaped_top(bird, config) {
        Some(Death::Ceiling)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn pipe_at(x: f32, gap_top: f32) -> Pipe {
        Pipe {
            id: 1,
            x,
            gap_origin: gap_top as i32,
            gap_top,
            gap_bottom: gap_top + 200.0,
            passed: false,
        }
    }

    #[test]
    fn test_bird_in_gap_is_clear() {
        let config = SimConfig::default();
        let sprites = Sprites::new(&config);
        let bird = Bird::new(Vec2::new(230.0, 350.0));
        assert!(!bird_hits_pipe(&bird, &pipe_at(230.0, 300.0), &sprites, &config));
    }

    #[test]
    fn test_bird_hits_top_segment() {
        let config = SimConfig::default();
        let sprites = Sprites::new(&config);
        let bird = Bird::new(Vec2::new(230.0, 290.0));
        assert!(bird_hits_pipe(&bird, &pipe_at(230.0, 300.0), &sprites, &config));
    }

    #[test]
    fn test_bird_hits_bottom_segment() {
        let config = SimConfig::default();
        let sprites = Sprites::new(&config);
        // Bird bottom row at 497 + 47 = 544, bottom segment starts at 500
        let bird = Bird::new(Vec2::new(230.0, 497.0));
        assert!(bird_hits_pipe(&bird, &pipe_at(230.0, 300.0), &sprites, &config));
    }

    #[test]
    fn test_silhouette_not_bounding_box() {
        let config = SimConfig::default();
        let sprites = Sprites::new(&config);
        // Bird alongside the pipe body, well below the cap. Boxes overlap by
        // two columns but the body is inset by four.
        let bird = Bird::new(Vec2::new(230.0, 600.0));
        assert!(!bird_hits_pipe(&bird, &pipe_at(296.0, 300.0), &sprites, &config));
        // Six columns further in, the body meets the oval's flank
        assert!(bird_hits_pipe(&bird, &pipe_at(290.0, 300.0), &sprites, &config));
    }

    #[test]
    fn test_pipe_far_away_is_clear() {
        let config = SimConfig::default();
        let sprites = Sprites::new(&config);
        let bird = Bird::new(Vec2::new(230.0, 100.0));
        assert!(!bird_hits_pipe(&bird, &pipe_at(700.0, 300.0), &sprites, &config));
    }

    #[test]
    fn test_ground_threshold() {
        let config = SimConfig::default();
        // 692 + 48 - 10 = 730
        assert!(bird_hits_ground(&Bird::new(Vec2::new(230.0, 692.0)), 730.0, &config));
        assert!(!bird_hits_ground(&Bird::new(Vec2::new(230.0, 691.5)), 730.0, &config));
    }

    #[test]
    fn test_ceiling_threshold() {
        let config = SimConfig::default();
        assert!(bird_escaped_top(&Bird::new(Vec2::new(230.0, -50.5)), &config));
        assert!(!bird_escaped_top(&Bird::new(Vec2::new(230.0, -50.0)), &config));
        assert_eq!(
            boundary_death(&Bird::new(Vec2::new(230.0, -60.0)), 730.0, &config),
            Some(Death::Ceiling)
        );
        assert_eq!(
            boundary_death(&Bird::new(Vec2::new(230.0, 350.0)), 730.0, &config),
            None
        );
    }
}
