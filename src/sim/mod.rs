//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - Seeded RNG only
//! - Stable iteration order (entrants keep their input order)
//! - No rendering or platform dependencies

pub mod bird;
pub mod collision;
pub mod ground;
pub mod mask;
pub mod pipe;
pub mod state;
pub mod tick;

pub use bird::Bird;
pub use collision::{Death, Sprites, bird_hits_ground, bird_hits_pipe, bird_escaped_top};
pub use ground::Ground;
pub use mask::Mask;
pub use pipe::{Pipe, PipeStream, StreamUpdate};
pub use state::{
    BirdView, DebugLine, Entrant, FinishReason, FitnessReport, Frame, Generation,
    GenerationPhase, GenomeId, PipeView, SimContext, SimError,
};
pub use tick::{TickOutcome, observe, run, run_observed, tick};
