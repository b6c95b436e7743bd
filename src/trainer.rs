//! Training loop
//!
//! Alternates between an [`Optimizer`] and fresh generations until the
//! generation budget runs out, the fitness threshold is met or the run is
//! cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::hall_of_fame::{HallOfFame, HallOfFameEntry};
use crate::optimizer::Optimizer;
use crate::sim::{FinishReason, FitnessReport, GenomeId, SimContext, SimError, run};

/// Generation budget when none is given
pub const DEFAULT_MAX_GENERATIONS: u32 = 50;

/// One line of training statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub population: usize,
    pub best_genome: Option<GenomeId>,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    /// Pipes passed by the cohort
    pub score: u32,
    /// Ticks the generation lasted
    pub ticks: u64,
    pub reason: Option<FinishReason>,
}

impl GenerationStats {
    fn from_report(report: &FitnessReport) -> Self {
        let best = report.best();
        Self {
            generation: report.generation,
            population: report.entries.len(),
            best_genome: best.map(|(id, _)| id),
            best_fitness: best.map(|(_, f)| f).unwrap_or(0.0),
            mean_fitness: report.mean().unwrap_or(0.0),
            score: report.score,
            ticks: report.ticks,
            reason: report.reason,
        }
    }
}

/// Why training stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Ran every generation in the budget
    GenerationLimit,
    /// A genome met the fitness threshold
    ThresholdReached,
    Cancelled,
    /// The optimizer produced an empty population
    EmptyPopulation,
}

/// Result of a full training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub generations: u32,
    pub stop: StopReason,
    pub history: Vec<GenerationStats>,
    pub hall_of_fame: HallOfFame,
}

impl TrainingSummary {
    /// Fittest genome across the run
    pub fn best(&self) -> Option<&HallOfFameEntry> {
        self.hall_of_fame.best()
    }
}

/// Drives an optimizer through successive generations
pub struct Trainer {
    context: SimContext,
    max_generations: u32,
    fitness_threshold: Option<f64>,
    cancel: Arc<AtomicBool>,
}

impl Trainer {
    pub fn new(context: SimContext) -> Self {
        Self {
            context,
            max_generations: DEFAULT_MAX_GENERATIONS,
            fitness_threshold: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = generations;
        self
    }

    /// Stop once any genome's fitness reaches `threshold`
    pub fn with_fitness_threshold(mut self, threshold: Option<f64>) -> Self {
        self.fitness_threshold = threshold;
        self
    }

    /// Flag that stops the current generation and the run when raised
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn context(&self) -> &SimContext {
        &self.context
    }

    /// Train until a stop condition is met
    ///
    /// A generation aborted by a policy still reports its fitness to the
    /// optimizer before the error is returned.
    pub fn run<O: Optimizer>(&mut self, optimizer: &mut O) -> Result<TrainingSummary, SimError> {
        let mut history = Vec::new();
        let mut hall_of_fame = HallOfFame::new();
        let mut stop = StopReason::GenerationLimit;

        log::info!(
            "Training for up to {} generations (seed {})",
            self.max_generations,
            self.context.seed()
        );

        for _ in 0..self.max_generations {
            if self.cancel.load(Ordering::Relaxed) {
                stop = StopReason::Cancelled;
                break;
            }

            let population = optimizer.population();
            if population.is_empty() {
                log::warn!("Optimizer produced an empty population, stopping");
                stop = StopReason::EmptyPopulation;
                break;
            }

            let mut generation = self.context.begin_generation(population)?;
            let outcome = run(&mut generation, &self.cancel);
            let report = generation.report();

            let stats = GenerationStats::from_report(&report);
            log::info!(
                "Generation {}: best {:.1}, mean {:.2}, score {}, {} ticks",
                stats.generation,
                stats.best_fitness,
                stats.mean_fitness,
                stats.score,
                stats.ticks
            );
            for (genome, fitness) in &report.entries {
                hall_of_fame.record(HallOfFameEntry {
                    genome: *genome,
                    fitness: *fitness,
                    generation: report.generation,
                    score: report.score,
                });
            }
            history.push(stats);
            optimizer.tell(&report);
            outcome?;

            if report.reason == Some(FinishReason::Cancelled) {
                stop = StopReason::Cancelled;
                break;
            }
            if let Some(threshold) = self.fitness_threshold {
                if report.best().is_some_and(|(_, f)| f >= threshold) {
                    log::info!("Fitness threshold {threshold} reached");
                    stop = StopReason::ThresholdReached;
                    break;
                }
            }
        }

        if let Some(best) = hall_of_fame.best() {
            log::info!(
                "Best genome {} with fitness {:.1} (generation {})",
                best.genome,
                best.fitness,
                best.generation
            );
        }

        Ok(TrainingSummary {
            generations: history.len() as u32,
            stop,
            history,
            hall_of_fame,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::policy::FnPolicy;
    use crate::policy::Observation;

    type Flat = FnPolicy<fn(&Observation) -> Vec<f32>>;

    fn never_flap(_: &Observation) -> Vec<f32> {
        vec![0.0]
    }

    fn broken(_: &Observation) -> Vec<f32> {
        Vec::new()
    }

    /// Hands out the same policy under fresh ids and records every report
    struct Fixed {
        size: usize,
        policy: fn(&Observation) -> Vec<f32>,
        next_id: GenomeId,
        reports: Vec<FitnessReport>,
    }

    impl Fixed {
        fn new(size: usize, policy: fn(&Observation) -> Vec<f32>) -> Self {
            Self {
                size,
                policy,
                next_id: 0,
                reports: Vec::new(),
            }
        }
    }

    impl Optimizer for Fixed {
        type Policy = Flat;

        fn population(&mut self) -> Vec<(GenomeId, Flat)> {
            (0..self.size)
                .map(|_| {
                    self.next_id += 1;
                    (self.next_id, FnPolicy(self.policy))
                })
                .collect()
        }

        fn tell(&mut self, report: &FitnessReport) {
            self.reports.push(report.clone());
        }
    }

    fn context() -> SimContext {
        SimContext::new(SimConfig::default(), 9).unwrap()
    }

    #[test]
    fn test_runs_generation_budget() {
        let mut optimizer = Fixed::new(3, never_flap);
        let summary = Trainer::new(context())
            .with_max_generations(4)
            .run(&mut optimizer)
            .unwrap();

        assert_eq!(summary.generations, 4);
        assert_eq!(summary.stop, StopReason::GenerationLimit);
        assert_eq!(optimizer.reports.len(), 4);
        let gens: Vec<_> = summary.history.iter().map(|s| s.generation).collect();
        assert_eq!(gens, vec![1, 2, 3, 4]);
        // Free fall lasts 24 ticks at 0.1 per tick
        for stats in &summary.history {
            assert_eq!(stats.ticks, 24);
            assert!((stats.best_fitness - 2.4).abs() < 1e-9);
            assert_eq!(stats.population, 3);
        }
    }

    #[test]
    fn test_threshold_stops_early() {
        let mut optimizer = Fixed::new(2, never_flap);
        let summary = Trainer::new(context())
            .with_max_generations(10)
            .with_fitness_threshold(Some(1.0))
            .run(&mut optimizer)
            .unwrap();
        assert_eq!(summary.generations, 1);
        assert_eq!(summary.stop, StopReason::ThresholdReached);
    }

    #[test]
    fn test_hall_of_fame_tracks_all_genomes() {
        let mut optimizer = Fixed::new(4, never_flap);
        let summary = Trainer::new(context())
            .with_max_generations(5)
            .run(&mut optimizer)
            .unwrap();
        assert_eq!(summary.hall_of_fame.entries.len(), 10);
        // Ties keep the earliest entrant in front
        assert_eq!(summary.best().unwrap().genome, 1);
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut optimizer = Fixed::new(2, never_flap);
        let mut trainer = Trainer::new(context());
        trainer.cancel_handle().store(true, Ordering::Relaxed);
        let summary = trainer.run(&mut optimizer).unwrap();
        assert_eq!(summary.generations, 0);
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert!(summary.best().is_none());
    }

    #[test]
    fn test_empty_population_stops() {
        let mut optimizer = Fixed::new(0, never_flap);
        let summary = Trainer::new(context()).run(&mut optimizer).unwrap();
        assert_eq!(summary.stop, StopReason::EmptyPopulation);
        assert!(summary.history.is_empty());
    }

    #[test]
    fn test_broken_policy_reports_then_fails() {
        let mut optimizer = Fixed::new(2, broken);
        let err = Trainer::new(context()).run(&mut optimizer).unwrap_err();
        assert_eq!(err, SimError::EmptyAction { id: 1 });
        assert_eq!(optimizer.reports.len(), 1);
        assert_eq!(optimizer.reports[0].reason, Some(FinishReason::Aborted));
        assert_eq!(optimizer.reports[0].entries, vec![(1, 0.0), (2, 0.0)]);
    }
}
