//! Property tests for physics and pipe invariants

use std::sync::atomic::AtomicBool;

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use flap_evolve::policy::{FnPolicy, Observation, Policy};
use flap_evolve::sim::{Bird, Pipe, SimContext, run_observed};
use flap_evolve::SimConfig;

proptest! {
    #[test]
    fn gap_is_always_fixed_size(seed in any::<u64>(), min in 0i32..300, width in 1i32..200) {
        let config = SimConfig {
            gap_origin_min: min,
            gap_origin_max: min + width,
            ..SimConfig::default()
        };
        let mut rng = Pcg32::seed_from_u64(seed);
        let pipe = Pipe::new(1, 600.0, &mut rng, &config);
        prop_assert_eq!(pipe.gap_bottom - pipe.gap_top, config.pipe_gap);
        prop_assert!(pipe.gap_origin >= min && pipe.gap_origin < min + width);
    }

    #[test]
    fn scrolling_only_moves_x(seed in any::<u64>(), ticks in 1usize..200) {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut pipe = Pipe::new(1, 700.0, &mut rng, &config);
        let before = pipe.clone();
        for _ in 0..ticks {
            pipe.advance_tick(&config);
        }
        prop_assert_eq!(pipe.gap_top, before.gap_top);
        prop_assert_eq!(pipe.gap_bottom, before.gap_bottom);
        prop_assert_eq!(pipe.passed, before.passed);
        prop_assert!(pipe.x < before.x);
    }

    #[test]
    fn flight_stays_bounded(jumps in prop::collection::vec(any::<bool>(), 1..300)) {
        let config = SimConfig::default();
        let mut bird = Bird::new(Vec2::new(230.0, 350.0));
        for jump in jumps {
            if jump {
                bird.jump(&config);
            }
            let d = bird.advance_tick(&config);
            prop_assert!(d.abs() <= config.terminal_displacement);
            prop_assert!(bird.tilt >= config.min_tilt && bird.tilt <= config.max_tilt);
        }
    }

    #[test]
    fn fitness_drops_at_most_once(seed in any::<u64>(), periods in prop::collection::vec(2u32..12, 1..8)) {
        let config = SimConfig { max_ticks: Some(1_500), ..SimConfig::default() };
        let mut ctx = SimContext::new(config, seed).unwrap();
        let population: Vec<(u64, Box<dyn Policy>)> = periods
            .iter()
            .enumerate()
            .map(|(i, &period)| {
                let count = std::cell::Cell::new(0u32);
                let policy: Box<dyn Policy> = Box::new(FnPolicy(move |_: &Observation| {
                    let n = count.get();
                    count.set(n + 1);
                    vec![if n % period == 0 { 1.0 } else { 0.0 }]
                }));
                (i as u64, policy)
            })
            .collect();
        let mut generation = ctx.begin_generation(population).unwrap();

        let mut last: Vec<f64> = vec![0.0; periods.len()];
        let mut drops = vec![0u32; periods.len()];
        run_observed(&mut generation, &AtomicBool::new(false), |g| {
            for (i, e) in g.entrants().iter().enumerate() {
                if e.fitness < last[i] {
                    drops[i] += 1;
                }
                last[i] = e.fitness;
            }
        })
        .unwrap();

        prop_assert!(drops.iter().all(|&d| d <= 1));
    }
}
