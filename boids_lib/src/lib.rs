use birdwatcher::{Birdwatcher, BoidData, Recorder};
use error::BoidsError;
use math_helpers::Space;
use options::RunOptions;
use simulation::Simulation;

pub mod boid;
pub mod flock;

pub mod birdwatcher;
pub mod error;
pub mod field;
pub mod math_helpers;
pub mod options;
pub mod simulation;
pub mod trail;

/// Runs a whole simulation headless and returns every sampled boid state
pub fn flock_base<V: Space>(run_options: RunOptions) -> Result<Vec<BoidData>, BoidsError> {
    let mut bird_watcher = Recorder::new(run_options.sample_rate);
    let mut sim = Simulation::<V>::new(run_options)?;

    let mut watchers: [&mut dyn Birdwatcher<V>; 1] = [&mut bird_watcher];
    sim.run(&mut watchers)?;

    Ok(bird_watcher.pop_data())
}
