//! Flap Evolve entry point
//!
//! Trains linear flap policies headlessly and prints the best genome found.
//!
//! Usage:
//!   cargo run --release -- --population 50 --generations 50
//!   RUST_LOG=debug cargo run -- --config sim.json --summary out.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use flap_evolve::optimizer::HillClimber;
use flap_evolve::trainer::{DEFAULT_MAX_GENERATIONS, Trainer};
use flap_evolve::{SimConfig, sim::SimContext};

/// Tick cap used when neither the config file nor the flag sets one
const DEFAULT_MAX_TICKS: u64 = 20_000;

#[derive(Parser)]
#[command(name = "flap-evolve")]
#[command(about = "Evolve flappy-bird policies in a headless simulation")]
struct Args {
    /// Birds per generation
    #[arg(short, long, default_value_t = 50)]
    population: usize,

    /// Maximum number of generations
    #[arg(short, long, default_value_t = DEFAULT_MAX_GENERATIONS)]
    generations: u32,

    /// Seed for pipe layouts and policy initialization
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Tick cap per generation, overriding the config file (0 disables the cap)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Stop once a genome reaches this fitness
    #[arg(long)]
    fitness_threshold: Option<f64>,

    /// Range of the initial random weights
    #[arg(long, default_value_t = 1.0)]
    init_scale: f32,

    /// Per-parameter mutation range for offspring
    #[arg(long, default_value_t = 0.1)]
    mutation_power: f32,

    /// JSON file overriding simulation constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the training summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    config.override_max_ticks(args.max_ticks, DEFAULT_MAX_TICKS);

    let context = SimContext::new(config, args.seed).context("Invalid simulation config")?;
    let mut optimizer = HillClimber::new(args.population, args.seed)
        .with_init_scale(args.init_scale)
        .with_mutation_power(args.mutation_power);
    let mut trainer = Trainer::new(context)
        .with_max_generations(args.generations)
        .with_fitness_threshold(args.fitness_threshold);

    let summary = trainer
        .run(&mut optimizer)
        .context("Training aborted by a misbehaving policy")?;

    println!();
    println!("=== TRAINING RESULTS ===");
    println!("  Generations: {}", summary.generations);
    println!("  Stopped:     {:?}", summary.stop);
    match summary.best() {
        Some(best) => {
            println!("  Best genome: {}", best.genome);
            println!("  Fitness:     {:.1}", best.fitness);
            println!("  Generation:  {}", best.generation);
            println!("  Score:       {}", best.score);
        }
        None => println!("  No genome was evaluated"),
    }
    if let Some((id, policy, _)) = optimizer.champion() {
        println!(
            "  Champion {id}: weights {:?}, bias {:.3}",
            policy.weights, policy.bias
        );
    }

    if let Some(path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        log::info!("Summary written to {}", path.display());
    }

    Ok(())
}
