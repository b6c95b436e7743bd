//! Boundary to the evolutionary algorithm
//!
//! The simulation never sees genomes, species or mutation operators. Each
//! generation an [`Optimizer`] hands out `(id, policy)` pairs and later gets a
//! [`FitnessReport`] back for exactly those ids.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::policy::{LinearPolicy, Policy};
use crate::sim::FitnessReport;

pub use crate::sim::GenomeId;

/// Produces policies and learns from their fitness
pub trait Optimizer {
    type Policy: Policy;

    /// Policies to evaluate in the next generation. Ids must be unique.
    fn population(&mut self) -> Vec<(GenomeId, Self::Policy)>;

    /// Fitness for the population returned by the last `population` call
    fn tell(&mut self, report: &FitnessReport);
}

/// Elitist random search over [`LinearPolicy`] weights
///
/// Each generation evaluates the current champion again alongside mutated
/// copies of it; the fittest of the batch becomes the next champion. Useful
/// for headless smoke runs; not a substitute for a real neuroevolution library.
#[derive(Debug, Clone)]
pub struct HillClimber {
    population_size: usize,
    init_scale: f32,
    mutation_power: f32,
    rng: Pcg32,
    next_id: GenomeId,
    pending: Vec<(GenomeId, LinearPolicy)>,
    champion: Option<(GenomeId, LinearPolicy, f64)>,
}

impl HillClimber {
    pub fn new(population_size: usize, seed: u64) -> Self {
        Self {
            population_size,
            init_scale: 1.0,
            mutation_power: 0.1,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            pending: Vec::new(),
            champion: None,
        }
    }

    pub fn with_mutation_power(mut self, power: f32) -> Self {
        self.mutation_power = power;
        self
    }

    pub fn with_init_scale(mut self, scale: f32) -> Self {
        self.init_scale = scale;
        self
    }

    /// Best policy seen so far and the fitness it scored
    pub fn champion(&self) -> Option<(GenomeId, &LinearPolicy, f64)> {
        self.champion.as_ref().map(|(id, p, f)| (*id, p, *f))
    }

    fn fresh_id(&mut self) -> GenomeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Optimizer for HillClimber {
    type Policy = LinearPolicy;

    fn population(&mut self) -> Vec<(GenomeId, LinearPolicy)> {
        let mut batch = Vec::with_capacity(self.population_size);

        if let Some((id, parent, _)) = self.champion.clone() {
            if self.population_size > 0 {
                batch.push((id, parent.clone()));
            }
            while batch.len() < self.population_size {
                let child = parent.perturbed(&mut self.rng, self.mutation_power);
                let id = self.fresh_id();
                batch.push((id, child));
            }
        } else {
            while batch.len() < self.population_size {
                let policy = LinearPolicy::random(&mut self.rng, self.init_scale);
                let id = self.fresh_id();
                batch.push((id, policy));
            }
        }

        self.pending = batch.clone();
        batch
    }

    fn tell(&mut self, report: &FitnessReport) {
        let Some((best_id, fitness)) = report.best() else {
            return;
        };
        if let Some((_, policy)) = self.pending.iter().find(|(id, _)| *id == best_id) {
            log::debug!("Champion is genome {best_id} with fitness {fitness:.1}");
            self.champion = Some((best_id, policy.clone(), fitness));
        }
        self.pending.clear();
    }
}
