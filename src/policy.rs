//! Decision functions bound to birds
//!
//! A policy sees three numbers per tick and answers with an action vector whose
//! first value decides whether the bird flaps. Policies are read-only for the
//! whole generation they are evaluated in.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bird height, distance to the gap's top edge, distance to the gap's bottom edge
pub type Observation = [f32; 3];

/// Number of observation inputs
pub const OBSERVATION_SIZE: usize = 3;

/// Maps an observation to an action vector
pub trait Policy {
    /// Only the first output is read; it must exist and be finite.
    fn activate(&self, observation: &Observation) -> Vec<f32>;
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn activate(&self, observation: &Observation) -> Vec<f32> {
        (**self).activate(observation)
    }
}

/// Adapter for plain closures
#[derive(Debug, Clone, Copy)]
pub struct FnPolicy<F>(pub F);

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&Observation) -> Vec<f32>,
{
    fn activate(&self, observation: &Observation) -> Vec<f32> {
        (self.0)(observation)
    }
}

/// Single tanh unit over the three inputs
///
/// Equivalent to a feed-forward net with no hidden nodes, which is enough to
/// clear pipes indefinitely once the weights are right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPolicy {
    pub weights: [f32; OBSERVATION_SIZE],
    pub bias: f32,
}

impl LinearPolicy {
    pub fn new(weights: [f32; OBSERVATION_SIZE], bias: f32) -> Self {
        Self { weights, bias }
    }

    /// Weights and bias drawn uniformly from [-scale, scale]
    pub fn random(rng: &mut impl Rng, scale: f32) -> Self {
        let mut weights = [0.0; OBSERVATION_SIZE];
        for w in &mut weights {
            *w = rng.random_range(-scale..=scale);
        }
        Self {
            weights,
            bias: rng.random_range(-scale..=scale),
        }
    }

    /// Copy with every parameter nudged by up to `power`
    pub fn perturbed(&self, rng: &mut impl Rng, power: f32) -> Self {
        let mut child = self.clone();
        for w in &mut child.weights {
            *w += rng.random_range(-power..=power);
        }
        child.bias += rng.random_range(-power..=power);
        child
    }
}

impl Policy for LinearPolicy {
    fn activate(&self, observation: &Observation) -> Vec<f32> {
        let sum: f32 = self
            .weights
            .iter()
            .zip(observation)
            .map(|(w, x)| w * x)
            .sum();
        vec![(sum + self.bias).tanh()]
    }
}
