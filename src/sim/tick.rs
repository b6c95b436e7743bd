//! Fixed tick simulation
//!
//! One tick is a full pass over the live cohort, in a fixed order:
//! 1. every live bird observes the active pipe, asks its policy, maybe flaps,
//!    collects the alive reward and moves;
//! 2. ground and pipes scroll;
//! 3. birds touching a pipe lose the collision penalty and die;
//! 4. birds past the floor or ceiling die;
//! 5. the pipe stream retires, scores and spawns, paying the pass reward to
//!    birds still alive at that point;
//! 6. the active pipe is re-selected.
//!
//! Birds that die in steps 3-4 never see the pass reward of the same tick.

use std::sync::atomic::{AtomicBool, Ordering};

use super::bird::Bird;
use super::collision::{Death, bird_hits_pipe, boundary_death};
use super::pipe::Pipe;
use super::state::{
    Entrant, FinishReason, FitnessReport, GenerationPhase, Generation, GenomeId, SimError,
};
use crate::policy::{Observation, Policy};

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Birds that died this tick
    pub deaths: Vec<(GenomeId, Death)>,
    /// Pipes the cohort passed this tick
    pub passed: u32,
    /// Birds that flapped this tick
    pub jumps: u32,
}

/// Observation fed to a bird's policy
pub fn observe(bird: &Bird, pipe: &Pipe) -> Observation {
    let y = bird.pos.y;
    [y, (y - pipe.gap_top).abs(), (y - pipe.gap_bottom).abs()]
}

/// First action value, or the contract violation that makes it unusable
fn decision(id: GenomeId, action: &[f32]) -> Result<f32, SimError> {
    let value = *action.first().ok_or(SimError::EmptyAction { id })?;
    if !value.is_finite() {
        return Err(SimError::NonFiniteAction { id, value });
    }
    Ok(value)
}

/// Observe, decide, reward and move every live bird
fn fly<P: Policy>(
    entrants: &mut [Entrant<P>],
    pipe: &Pipe,
    config: &crate::config::SimConfig,
) -> Result<u32, SimError> {
    let mut jumps = 0;
    for entrant in entrants.iter_mut().filter(|e| e.is_alive()) {
        let observation = observe(&entrant.bird, pipe);
        if observation.iter().any(|v| !v.is_finite()) {
            return Err(SimError::NonFiniteObservation {
                id: entrant.id,
                observation,
            });
        }

        let action = entrant.policy.activate(&observation);
        if decision(entrant.id, &action)? > config.jump_threshold {
            entrant.bird.jump(config);
            jumps += 1;
        }

        entrant.fitness += config.alive_reward;
        entrant.ticks_alive += 1;
        entrant.bird.advance_tick(config);
    }
    Ok(jumps)
}

/// Advance the generation by one tick
///
/// Starts the generation if it is still initializing. Ticking a finished
/// generation is a no-op. A policy that breaks the action contract aborts the
/// generation and the error is returned; accrued fitness is kept.
pub fn tick<P: Policy>(generation: &mut Generation<P>) -> Result<TickOutcome, SimError> {
    let mut outcome = TickOutcome::default();

    match generation.phase {
        GenerationPhase::Initializing => {
            generation.start();
            if generation.is_finished() {
                return Ok(outcome);
            }
        }
        GenerationPhase::Finished => return Ok(outcome),
        GenerationPhase::Running => {}
    }

    let now = generation.tick;
    let config = &generation.config;

    // 1. Decisions and flight
    let Some(pipe) = generation
        .active_pipe()
        .and_then(|i| generation.pipes.get(i))
        .cloned()
    else {
        generation.finish(FinishReason::Aborted);
        return Err(SimError::NoPipeAhead { tick: now });
    };
    match fly(&mut generation.entrants, &pipe, config) {
        Ok(jumps) => outcome.jumps = jumps,
        Err(err) => {
            log::error!("Generation {} aborted: {err}", generation.generation);
            generation.finish(FinishReason::Aborted);
            return Err(err);
        }
    }

    // 2. Scroll
    generation.ground.advance_tick(config);
    generation.pipes.advance_tick(config);

    // 3. Pipe collisions, against every pipe on screen
    for entrant in generation.entrants.iter_mut().filter(|e| e.is_alive()) {
        let hit = generation
            .pipes
            .pipes()
            .iter()
            .any(|pipe| bird_hits_pipe(&entrant.bird, pipe, &generation.sprites, config));
        if hit {
            entrant.fitness -= config.collision_penalty;
            entrant.kill(Death::Pipe, now);
            outcome.deaths.push((entrant.id, Death::Pipe));
        }
    }

    // 4. Floor and ceiling
    let ground_y = generation.ground.y;
    for entrant in generation.entrants.iter_mut().filter(|e| e.is_alive()) {
        if let Some(cause) = boundary_death(&entrant.bird, ground_y, config) {
            entrant.kill(cause, now);
            outcome.deaths.push((entrant.id, cause));
        }
    }

    for (id, cause) in &outcome.deaths {
        log::debug!("Genome {id} died at tick {now}: {cause:?}");
    }

    // 5. Pipe stream
    let lead_x = generation.lead_x();
    let update = generation.pipes.update(lead_x, &mut generation.rng, config);
    for pipe_id in &update.passed {
        generation.score += 1;
        outcome.passed += 1;
        for entrant in generation.entrants.iter_mut().filter(|e| e.is_alive()) {
            entrant.fitness += config.pass_reward;
        }
        log::debug!(
            "Pipe {pipe_id} passed, score {} ({} birds alive)",
            generation.score,
            generation.alive_count()
        );
    }

    // 6. Next observation target
    generation.tick += 1;
    generation.active_pipe = lead_x.and_then(|x| generation.pipes.active_index(x, config));

    if lead_x.is_none() {
        generation.finish(FinishReason::Extinct);
    } else if generation
        .config
        .max_ticks
        .is_some_and(|cap| generation.tick >= cap)
    {
        log::warn!(
            "Generation {} hit the {} tick cap with {} birds alive",
            generation.generation,
            generation.tick,
            generation.alive_count()
        );
        generation.finish(FinishReason::TickCap);
    }

    Ok(outcome)
}

/// Tick until every bird is dead, the tick cap is hit or `cancel` is raised
pub fn run<P: Policy>(
    generation: &mut Generation<P>,
    cancel: &AtomicBool,
) -> Result<FitnessReport, SimError> {
    run_observed(generation, cancel, |_| {})
}

/// Like [`run`], calling `on_tick` after every tick (frame capture, pacing)
pub fn run_observed<P: Policy>(
    generation: &mut Generation<P>,
    cancel: &AtomicBool,
    mut on_tick: impl FnMut(&Generation<P>),
) -> Result<FitnessReport, SimError> {
    generation.start();
    while !generation.is_finished() {
        if cancel.load(Ordering::Relaxed) {
            generation.cancel();
            break;
        }
        tick(generation)?;
        on_tick(generation);
    }

    let report = generation.report();
    log::info!(
        "Generation {} finished after {} ticks: score {}, best fitness {:.1} ({:?})",
        report.generation,
        report.ticks,
        report.score,
        report.best().map(|(_, f)| f).unwrap_or(0.0),
        report.reason
    );
    Ok(report)
}
