//! Pipes and the stream that feeds them
//!
//! A pipe is a pair of segments with a fixed-size gap between them. The stream
//! keeps at least one pipe ahead of the birds, spawning a replacement each time
//! the cohort passes one and retiring pipes that scroll off the left edge.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;

/// A gapped obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Random draw the gap is derived from
    pub gap_origin: i32,
    /// Lower edge of the top segment
    pub gap_top: f32,
    /// Upper edge of the bottom segment
    pub gap_bottom: f32,
    /// Set once, when the cohort flies past
    pub passed: bool,
}

impl Pipe {
    pub fn new(id: u32, x: f32, rng: &mut impl Rng, config: &SimConfig) -> Self {
        let mut pipe = Self {
            id,
            x,
            gap_origin: 0,
            gap_top: 0.0,
            gap_bottom: 0.0,
            passed: false,
        };
        pipe.set_gap(rng, config);
        pipe
    }

    /// Draw the gap position. Only called from the constructor.
    fn set_gap(&mut self, rng: &mut impl Rng, config: &SimConfig) {
        self.gap_origin = rng.random_range(config.gap_origin_min..config.gap_origin_max);
        self.gap_top = self.gap_origin as f32;
        self.gap_bottom = self.gap_top + config.pipe_gap;
    }

    /// y of the top segment's top-left corner (the segment hangs above the gap)
    pub fn top_segment_y(&self, config: &SimConfig) -> f32 {
        self.gap_top - config.pipe_height as f32
    }

    /// y of the bottom segment's top-left corner
    pub fn bottom_segment_y(&self) -> f32 {
        self.gap_bottom
    }

    pub fn right_edge(&self, config: &SimConfig) -> f32 {
        self.x + config.pipe_width as f32
    }

    /// Scroll left. Gap geometry never changes after construction.
    pub fn advance_tick(&mut self, config: &SimConfig) {
        self.x -= config.scroll_velocity;
    }

    pub fn is_off_screen(&self, config: &SimConfig) -> bool {
        self.right_edge(config) < 0.0
    }
}

/// Outcome of one stream update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamUpdate {
    /// Pipes newly marked passed this tick
    pub passed: Vec<u32>,
    /// Pipes removed this tick
    pub retired: Vec<u32>,
    /// Pipes spawned this tick
    pub spawned: Vec<u32>,
}

/// Ordered pipe collection (ascending x, which is also spawn order)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipeStream {
    pipes: Vec<Pipe>,
    next_id: u32,
}

impl PipeStream {
    /// Start with a single pipe at the configured initial x
    pub fn new(rng: &mut impl Rng, config: &SimConfig) -> Self {
        let mut stream = Self {
            pipes: Vec::new(),
            next_id: 1,
        };
        stream.spawn(config.initial_pipe_x, rng, config);
        stream
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Pipe> {
        self.pipes.get(index)
    }

    fn spawn(&mut self, x: f32, rng: &mut impl Rng, config: &SimConfig) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.pipes.push(Pipe::new(id, x, rng, config));
        id
    }

    /// Insert an already-built pipe, keeping x order (test and replay setups)
    pub fn insert(&mut self, mut pipe: Pipe) -> u32 {
        pipe.id = self.next_id;
        self.next_id += 1;
        let id = pipe.id;
        let at = self.pipes.partition_point(|p| p.x <= pipe.x);
        self.pipes.insert(at, pipe);
        id
    }

    /// Scroll every pipe one tick
    pub fn advance_tick(&mut self, config: &SimConfig) {
        for pipe in &mut self.pipes {
            pipe.advance_tick(config);
        }
    }

    /// Mark pipes behind `lead_x` as passed, retire off-screen pipes and
    /// spawn one replacement per pass.
    ///
    /// `lead_x` is the largest x among live birds: a pipe counts as passed as
    /// soon as any live bird is ahead of it. `None` means no bird is alive, in
    /// which case nothing is passed or spawned.
    pub fn update(
        &mut self,
        lead_x: Option<f32>,
        rng: &mut impl Rng,
        config: &SimConfig,
    ) -> StreamUpdate {
        let mut update = StreamUpdate::default();

        if let Some(bird_x) = lead_x {
            for pipe in &mut self.pipes {
                if !pipe.passed && pipe.x < bird_x {
                    pipe.passed = true;
                    update.passed.push(pipe.id);
                }
            }
        }

        self.pipes.retain(|pipe| {
            let keep = !pipe.is_off_screen(config);
            if !keep {
                update.retired.push(pipe.id);
            }
            keep
        });

        for _ in 0..update.passed.len() {
            let id = self.spawn(config.field_width, rng, config);
            update.spawned.push(id);
        }

        update
    }

    /// Index of the first pipe whose right edge is not yet behind `lead_x`.
    /// Falls back to the last pipe once every pipe is behind.
    pub fn active_index(&self, lead_x: f32, config: &SimConfig) -> Option<usize> {
        if self.pipes.is_empty() {
            return None;
        }
        let ahead = self
            .pipes
            .iter()
            .position(|p| lead_x <= p.right_edge(config));
        Some(ahead.unwrap_or(self.pipes.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_gap_draw_in_range() {
        let config = SimConfig::default();
        let mut rng = rng();
        for id in 0..500 {
            let pipe = Pipe::new(id, 600.0, &mut rng, &config);
            assert!((50..450).contains(&pipe.gap_origin));
            assert_eq!(pipe.gap_bottom - pipe.gap_top, 200.0);
            assert_eq!(pipe.top_segment_y(&config), pipe.gap_top - 640.0);
        }
    }

    #[test]
    fn test_advance_only_moves_x() {
        let config = SimConfig::default();
        let mut pipe = Pipe::new(1, 600.0, &mut rng(), &config);
        let before = pipe.clone();
        pipe.advance_tick(&config);
        assert_eq!(pipe.x, 595.0);
        assert_eq!(
            Pipe {
                x: before.x,
                ..pipe.clone()
            },
            before
        );
    }

    #[test]
    fn test_pass_spawns_once() {
        let config = SimConfig::default();
        let mut rng = rng();
        let mut stream = PipeStream::new(&mut rng, &config);
        assert_eq!(stream.len(), 1);

        // Scroll the pipe just past a bird at x=230
        while stream.pipes()[0].x >= 230.0 {
            stream.advance_tick(&config);
        }
        let update = stream.update(Some(230.0), &mut rng, &config);
        assert_eq!(update.passed, vec![1]);
        assert_eq!(update.spawned, vec![2]);
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.pipes()[1].x, 600.0);

        // Already passed: no second spawn
        stream.advance_tick(&config);
        let update = stream.update(Some(230.0), &mut rng, &config);
        assert!(update.passed.is_empty());
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn test_no_live_birds_no_pass() {
        let config = SimConfig::default();
        let mut rng = rng();
        let mut stream = PipeStream::new(&mut rng, &config);
        for _ in 0..100 {
            stream.advance_tick(&config);
        }
        let update = stream.update(None, &mut rng, &config);
        assert!(update.passed.is_empty());
        assert!(!stream.pipes()[0].passed);
    }

    #[test]
    fn test_retire_after_right_edge_leaves() {
        let config = SimConfig::default();
        let mut rng = rng();
        let mut stream = PipeStream::new(&mut rng, &config);
        // 700 - 5n + 104 < 0 once n > 160.8
        for _ in 0..160 {
            stream.advance_tick(&config);
        }
        let update = stream.update(Some(230.0), &mut rng, &config);
        assert!(update.retired.is_empty());
        stream.advance_tick(&config);
        let update = stream.update(Some(230.0), &mut rng, &config);
        assert_eq!(update.retired, vec![1]);
    }

    #[test]
    fn test_active_index_skips_pipes_behind_lead() {
        let config = SimConfig::default();
        let mut rng = rng();
        let mut stream = PipeStream::new(&mut rng, &config);
        stream.insert(Pipe::new(0, 900.0, &mut rng, &config));
        assert_eq!(stream.active_index(230.0, &config), Some(0));

        // First pipe's right edge (100 + 104) is behind 230
        for _ in 0..120 {
            stream.advance_tick(&config);
        }
        assert_eq!(stream.pipes()[0].x, 100.0);
        assert_eq!(stream.active_index(230.0, &config), Some(1));
    }

    #[test]
    fn test_insert_keeps_x_order() {
        let config = SimConfig::default();
        let mut rng = rng();
        let mut stream = PipeStream::new(&mut rng, &config);
        stream.insert(Pipe::new(0, 300.0, &mut rng, &config));
        let xs: Vec<f32> = stream.pipes().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![300.0, 700.0]);
    }
}
