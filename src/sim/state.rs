//! Generation state and core simulation types
//!
//! One [`Generation`] owns everything a single evaluation run touches: one
//! [`Entrant`] per genome (bird, policy and fitness kept together so they can
//! never drift apart), the pipe stream, the ground and a private RNG.
//! Nothing survives between generations except what [`SimContext`] carries.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bird::Bird;
use super::collision::{Death, Sprites};
use super::ground::Ground;
use super::pipe::PipeStream;
use crate::config::{ConfigError, SimConfig};
use crate::policy::Policy;

/// Identifier handed out by the optimizer for each genome
pub type GenomeId = u64;

/// Errors that abort a generation
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("policy for genome {id} returned an empty action vector")]
    EmptyAction { id: GenomeId },
    #[error("policy for genome {id} returned non-finite action {value}")]
    NonFiniteAction { id: GenomeId, value: f32 },
    #[error("observation for genome {id} is not finite: {observation:?}")]
    NonFiniteObservation { id: GenomeId, observation: [f32; 3] },
    #[error("no pipe ahead of the birds at tick {tick}")]
    NoPipeAhead { tick: u64 },
    #[error("genome id {id} appears more than once in the population")]
    DuplicateGenome { id: GenomeId },
}

/// Lifecycle of a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// Built, no tick run yet
    Initializing,
    /// Ticking
    Running,
    /// Done; fitness values are frozen
    Finished,
}

/// Why a generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Every bird died
    Extinct,
    /// The configured tick cap was reached
    TickCap,
    /// Stopped from outside
    Cancelled,
    /// A policy broke the action contract
    Aborted,
}

/// One genome's bird, policy and running fitness
#[derive(Debug, Clone)]
pub struct Entrant<P> {
    pub id: GenomeId,
    pub bird: Bird,
    pub policy: P,
    pub fitness: f64,
    /// Ticks survived
    pub ticks_alive: u64,
    /// Cause and tick of death
    pub death: Option<(Death, u64)>,
}

impl<P> Entrant<P> {
    pub fn new(id: GenomeId, policy: P, config: &SimConfig) -> Self {
        Self {
            id,
            bird: Bird::new(Vec2::new(config.bird_start_x, config.bird_start_y)),
            policy,
            fitness: 0.0,
            ticks_alive: 0,
            death: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.bird.alive
    }

    /// Freeze this entrant. Fitness never changes afterwards.
    pub fn kill(&mut self, cause: Death, tick: u64) {
        debug_assert!(self.is_alive());
        self.bird.kill();
        self.death = Some((cause, tick));
    }
}

/// Per-run context: config, generation counter and the seed stream
///
/// Each generation draws its own RNG from the context's seed stream, so a run
/// replays exactly from the same seed and population sequence.
#[derive(Debug, Clone)]
pub struct SimContext {
    config: SimConfig,
    sprites: Sprites,
    seed: u64,
    rng: Pcg32,
    generation: u32,
}

impl SimContext {
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sprites: Sprites::new(&config),
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            generation: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of generations started so far
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Bind one bird to each policy and start a fresh generation
    pub fn begin_generation<P: Policy>(
        &mut self,
        population: Vec<(GenomeId, P)>,
    ) -> Result<Generation<P>, SimError> {
        let mut seen = std::collections::HashSet::with_capacity(population.len());
        for (id, _) in &population {
            if !seen.insert(*id) {
                return Err(SimError::DuplicateGenome { id: *id });
            }
        }

        self.generation += 1;
        let rng = Pcg32::from_rng(&mut self.rng);
        log::debug!(
            "Generation {} starting with {} entrants",
            self.generation,
            population.len()
        );
        Ok(Generation::new(
            self.generation,
            population,
            self.config.clone(),
            self.sprites.clone(),
            rng,
        ))
    }
}

/// Fitness handed back to the optimizer after a generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    pub generation: u32,
    /// Every genome in the population, in the order they were supplied
    pub entries: Vec<(GenomeId, f64)>,
    /// Pipes passed by the cohort
    pub score: u32,
    /// Ticks simulated
    pub ticks: u64,
    pub reason: Option<FinishReason>,
}

impl FitnessReport {
    pub fn get(&self, id: GenomeId) -> Option<f64> {
        self.entries.iter().find(|(g, _)| *g == id).map(|(_, f)| *f)
    }

    /// Fittest genome (first one wins ties)
    pub fn best(&self) -> Option<(GenomeId, f64)> {
        self.entries.iter().copied().fold(None, |best, entry| match best {
            Some((_, f)) if f >= entry.1 => best,
            _ => Some(entry),
        })
    }

    pub fn mean(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.entries.iter().map(|(_, f)| f).sum::<f64>() / self.entries.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only bird state for drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdView {
    pub id: GenomeId,
    pub pos: Vec2,
    pub tilt: f32,
}

/// Read-only pipe state for drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeView {
    pub x: f32,
    pub gap_top: f32,
    pub gap_bottom: f32,
    pub passed: bool,
}

/// Segment from a bird to one edge of the active gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugLine {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything a renderer needs to draw one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub generation: u32,
    pub tick: u64,
    pub score: u32,
    pub alive: usize,
    pub birds: Vec<BirdView>,
    pub pipes: Vec<PipeView>,
    pub ground: (f32, f32),
    pub ground_y: f32,
    pub active_pipe: Option<usize>,
    /// Empty unless `debug_lines` is enabled
    pub debug_lines: Vec<DebugLine>,
}

/// A single generation's world
#[derive(Debug)]
pub struct Generation<P> {
    pub(crate) generation: u32,
    pub(crate) phase: GenerationPhase,
    pub(crate) reason: Option<FinishReason>,
    pub(crate) config: SimConfig,
    pub(crate) sprites: Sprites,
    pub(crate) rng: Pcg32,
    pub(crate) entrants: Vec<Entrant<P>>,
    pub(crate) pipes: PipeStream,
    pub(crate) ground: Ground,
    pub(crate) score: u32,
    pub(crate) tick: u64,
    pub(crate) active_pipe: Option<usize>,
}

impl<P> Generation<P> {
    pub(crate) fn new(
        generation: u32,
        population: Vec<(GenomeId, P)>,
        config: SimConfig,
        sprites: Sprites,
        mut rng: Pcg32,
    ) -> Self {
        let entrants = population
            .into_iter()
            .map(|(id, policy)| Entrant::new(id, policy, &config))
            .collect();
        let pipes = PipeStream::new(&mut rng, &config);
        let ground = Ground::new(&config);

        Self {
            generation,
            phase: GenerationPhase::Initializing,
            reason: None,
            config,
            sprites,
            rng,
            entrants,
            pipes,
            ground,
            score: 0,
            tick: 0,
            active_pipe: None,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.reason
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GenerationPhase::Finished
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn entrants(&self) -> &[Entrant<P>] {
        &self.entrants
    }

    pub fn entrant(&self, id: GenomeId) -> Option<&Entrant<P>> {
        self.entrants.iter().find(|e| e.id == id)
    }

    pub fn pipes(&self) -> &PipeStream {
        &self.pipes
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    /// Pipes passed by the cohort this generation
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Ticks simulated so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn alive_count(&self) -> usize {
        self.entrants.iter().filter(|e| e.is_alive()).count()
    }

    /// Largest x among live birds
    pub fn lead_x(&self) -> Option<f32> {
        self.entrants
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| e.bird.pos.x)
            .reduce(f32::max)
    }

    /// Index of the pipe that feeds observations, if it is in bounds
    pub fn active_pipe(&self) -> Option<usize> {
        self.active_pipe.filter(|&i| i < self.pipes.len())
    }

    /// Leave `Initializing`. An empty population finishes immediately.
    pub fn start(&mut self) {
        if self.phase != GenerationPhase::Initializing {
            return;
        }
        match self.lead_x() {
            Some(lead) => {
                self.active_pipe = self.pipes.active_index(lead, &self.config);
                self.phase = GenerationPhase::Running;
            }
            None => self.finish(FinishReason::Extinct),
        }
    }

    /// Stop now; accrued fitness is kept for every entrant
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            log::warn!(
                "Generation {} cancelled at tick {} with {} birds alive",
                self.generation,
                self.tick,
                self.alive_count()
            );
            self.finish(FinishReason::Cancelled);
        }
    }

    pub(crate) fn finish(&mut self, reason: FinishReason) {
        self.phase = GenerationPhase::Finished;
        self.reason = Some(reason);
    }

    /// Fitness for every genome, dead or alive, in input order
    pub fn report(&self) -> FitnessReport {
        FitnessReport {
            generation: self.generation,
            entries: self.entrants.iter().map(|e| (e.id, e.fitness)).collect(),
            score: self.score,
            ticks: self.tick,
            reason: self.reason,
        }
    }

    /// Snapshot for the rendering boundary
    pub fn frame(&self) -> Frame {
        let birds: Vec<BirdView> = self
            .entrants
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| BirdView {
                id: e.id,
                pos: e.bird.pos,
                tilt: e.bird.tilt,
            })
            .collect();

        let mut debug_lines = Vec::new();
        if self.config.debug_lines {
            if let Some(pipe) = self.active_pipe().and_then(|i| self.pipes.get(i)) {
                let pipe_mid = pipe.x + self.config.pipe_width as f32 / 2.0;
                for e in self.entrants.iter().filter(|e| e.is_alive()) {
                    let from = e.bird.center(&self.config);
                    debug_lines.push(DebugLine {
                        from,
                        to: Vec2::new(pipe_mid, pipe.gap_top),
                    });
                    debug_lines.push(DebugLine {
                        from,
                        to: Vec2::new(pipe_mid, pipe.gap_bottom),
                    });
                }
            }
        }

        Frame {
            generation: self.generation,
            tick: self.tick,
            score: self.score,
            alive: birds.len(),
            birds,
            pipes: self
                .pipes
                .pipes()
                .iter()
                .map(|p| PipeView {
                    x: p.x,
                    gap_top: p.gap_top,
                    gap_bottom: p.gap_bottom,
                    passed: p.passed,
                })
                .collect(),
            ground: (self.ground.x1, self.ground.x2),
            ground_y: self.ground.y,
            active_pipe: self.active_pipe(),
            debug_lines,
        }
    }
}
