use std::mem;

use rand::Rng;
use rand_distr::Normal;
use tracing::warn;

use crate::{
    boid::Boid,
    error::BoidsError,
    field::EnvironmentField,
    math_helpers::{simple_distance_boid, Space},
    options::{RunOptions, UpdateMode},
};

pub mod rules;

/// A naive flock, the population is scanned all-pairs, O(N^2) per tick.
///
/// Boid ids always match their index, the population is fixed for the whole run.
#[derive(Debug, Clone)]
pub struct Flock<V: Space> {
    boids: Vec<Boid<V>>,
    /// next generation, swapped with `boids` at the end of a snapshot tick
    back: Vec<Boid<V>>,
}

impl<V: Space> Flock<V> {
    /// Spawns `init_boids` random boids inside the run's bounding volume
    pub fn new<R: Rng + ?Sized>(run_options: &RunOptions, rng: &mut R) -> Result<Self, BoidsError> {
        let normal = Normal::new(0., run_options.init_speed_deviation)
            .map_err(|err| BoidsError::invalid("init_speed_deviation", err.to_string()))?;
        let extent = run_options.extent::<V>();

        let boids = (0..run_options.init_boids)
            .map(|id| Boid::random(id, extent, run_options.max_speed, &normal, &mut *rng))
            .collect();

        Ok(Self::from_boids(boids))
    }

    /// Takes over an existing population, ids get reassigned to indices
    pub fn from_boids(mut boids: Vec<Boid<V>>) -> Self {
        boids.iter_mut().enumerate().for_each(|(id, b)| b.id = id);
        let back = Vec::with_capacity(boids.len());

        Flock { boids, back }
    }

    /// Advances every boid by one tick
    pub fn update<F>(&mut self, field: &F, run_options: &RunOptions, tick: u64)
    where
        F: EnvironmentField<V> + ?Sized,
    {
        let extent = run_options.extent::<V>();

        match run_options.update_mode {
            UpdateMode::Snapshot => {
                // calculation loop, reads only the tick-start generation
                self.back.clear();
                self.back.extend(
                    self.boids
                        .iter()
                        .map(|b| rules::steer(b, &self.boids, field, extent, run_options, tick)),
                );
                mem::swap(&mut self.boids, &mut self.back);
            }
            UpdateMode::InPlace => {
                for i_cur in 0..self.boids.len() {
                    let next =
                        rules::steer(&self.boids[i_cur], &self.boids, field, extent, run_options, tick);
                    self.boids[i_cur] = next;
                }
            }
        }

        if let Some(lost) = self.boids.iter().find(|b| !b.velocity.is_finite()) {
            warn!(tick, id = lost.id, "boid velocity is no longer finite");
        }
    }

    /// Every boid strictly within the sensory distance of `boid`, itself excluded
    pub fn get_neighbours<'a>(&'a self, boid: &Boid<V>, run_options: &RunOptions) -> Vec<&'a Boid<V>> {
        self.boids
            .iter()
            .filter(|other| {
                other.id != boid.id
                    && simple_distance_boid(boid, other) < run_options.sensory_distance
            })
            .collect()
    }

    pub fn view(&self) -> &[Boid<V>] {
        &self.boids
    }

    pub fn get_no_entities(&self) -> usize {
        self.boids.len()
    }
}
