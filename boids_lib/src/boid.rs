use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::math_helpers::Space;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid<V: Space> {
    // sequential id starting from 0, doubles as the index in the flock
    pub id: usize,
    pub position: V,
    pub velocity: V,
}

impl<V: Space> Boid<V> {
    /// Creates a new [`Boid`].
    pub fn new(id: usize, position: V, velocity: V) -> Self {
        Boid {
            id,
            position,
            velocity,
        }
    }

    /// Places a boid uniformly in `[0, extent)` on every axis, heading in a
    /// direction drawn per axis from `initial_velocity`, scaled by `max_speed`.
    pub fn random<R: Rng + ?Sized>(
        id: usize,
        extent: V,
        max_speed: f32,
        initial_velocity: &Normal<f32>,
        rng: &mut R,
    ) -> Self {
        let position = V::from_fn(|axis| rng.gen::<f32>() * extent[axis]);
        let velocity = V::from_fn(|_| initial_velocity.sample(&mut *rng) * max_speed);

        Boid::new(id, position, velocity)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
