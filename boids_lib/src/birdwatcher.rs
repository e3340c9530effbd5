use std::mem;

use serde::Serialize;

use crate::{
    boid::Boid,
    math_helpers::{simple_distance_boid, Space},
    trail::TrailView,
};

/// Everything a renderer gets to see after a tick
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a, V: Space> {
    pub tick: u64,
    pub boids: &'a [Boid<V>],
    pub trail: TrailView<'a, V>,
}

/// Watches the flock tick by tick, the place where drawing plugs in.
pub trait Birdwatcher<V: Space> {
    fn watch(&mut self, frame: &Frame<'_, V>);

    /// Called once after the last tick of a run
    fn finish(&mut self) {}
}

// planar boids report z = 0
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct BoidData {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    pub time: u64,
}

impl BoidData {
    pub fn new<V: Space>(boid: &Boid<V>, time: u64) -> Self {
        let axis = |v: V, i: usize| if i < V::DIM { v[i] } else { 0. };

        BoidData {
            id: boid.id,
            x: axis(boid.position, 0),
            y: axis(boid.position, 1),
            z: axis(boid.position, 2),
            vx: axis(boid.velocity, 0),
            vy: axis(boid.velocity, 1),
            vz: axis(boid.velocity, 2),
            time,
        }
    }
}

/// Keeps every `sample_rate`-th frame in memory as [`BoidData`] rows
#[derive(Debug)]
pub struct Recorder {
    locations: Vec<BoidData>,
    sample_rate: u64,
}

impl Recorder {
    pub fn new(sample_rate: u64) -> Self {
        Recorder {
            locations: Vec::new(),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn pop_data(&mut self) -> Vec<BoidData> {
        mem::take(&mut self.locations)
    }

    pub fn data(&self) -> &[BoidData] {
        &self.locations
    }

    fn should_sample(&self, tick: u64) -> bool {
        tick % self.sample_rate == 0
    }
}

impl<V: Space> Birdwatcher<V> for Recorder {
    fn watch(&mut self, frame: &Frame<'_, V>) {
        if !self.should_sample(frame.tick) {
            return;
        }

        self.locations
            .extend(frame.boids.iter().map(|b| BoidData::new(b, frame.tick)));
    }
}

/// Summary of a flock's state, cheap enough to log every now and then
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockStats<V: Space> {
    pub mean_speed: f32,
    pub max_speed: f32,
    pub centroid: V,
    pub mean_neighbours: f32,
}

impl<V: Space> FlockStats<V> {
    pub fn from_boids(boids: &[Boid<V>], sensory_distance: f32) -> Self {
        if boids.is_empty() {
            return FlockStats {
                mean_speed: 0.,
                max_speed: 0.,
                centroid: V::ZERO,
                mean_neighbours: 0.,
            };
        }

        let n = boids.len() as f32;
        let mut centroid = V::ZERO;
        let mut speed_sum = 0.;
        let mut max_speed: f32 = 0.;
        let mut neighbour_pairs = 0_usize;

        for (i, b) in boids.iter().enumerate() {
            centroid += b.position;
            speed_sum += b.speed();
            max_speed = max_speed.max(b.speed());
            neighbour_pairs += boids[i + 1..]
                .iter()
                .filter(|other| simple_distance_boid(b, other) < sensory_distance)
                .count();
        }

        FlockStats {
            mean_speed: speed_sum / n,
            max_speed,
            centroid: centroid / n,
            // every pair is a neighbour of both its members
            mean_neighbours: 2. * neighbour_pairs as f32 / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    use super::{Birdwatcher, BoidData, FlockStats, Frame, Recorder};
    use crate::{boid::Boid, trail::TrailBuffer};

    #[test]
    fn recorder_respects_sample_rate() {
        let boids = [
            Boid::new(0, Vec2::new(1., 2.), Vec2::new(0.1, 0.2)),
            Boid::new(1, Vec2::new(3., 4.), Vec2::ZERO),
        ];
        let trail = TrailBuffer::new(2, 2).unwrap();
        let mut recorder = Recorder::new(3);

        for tick in 0..7 {
            let frame = Frame {
                tick,
                boids: &boids,
                trail: trail.read_all(),
            };
            recorder.watch(&frame);
        }

        let data = recorder.pop_data();
        // ticks 0, 3 and 6
        assert_eq!(data.len(), 3 * 2);
        assert_eq!(data[2].time, 3);
        assert!(recorder.data().is_empty());
    }

    #[test]
    fn planar_data_has_flat_z() {
        let row = BoidData::new(&Boid::new(4, Vec2::new(1., 2.), Vec2::new(3., 4.)), 9);
        assert_eq!((row.x, row.y, row.z), (1., 2., 0.));
        assert_eq!((row.vx, row.vy, row.vz), (3., 4., 0.));

        let row = BoidData::new(&Boid::new(4, Vec3::new(1., 2., 5.), Vec3::ZERO), 9);
        assert_eq!(row.z, 5.);
    }

    #[test]
    fn stats_of_small_flock() {
        let boids = [
            Boid::new(0, Vec2::new(0., 0.), Vec2::new(3., 4.)),
            Boid::new(1, Vec2::new(10., 0.), Vec2::new(1., 0.)),
            Boid::new(2, Vec2::new(500., 0.), Vec2::ZERO),
        ];
        let stats = FlockStats::from_boids(&boids, 40.);

        assert_relative_eq!(stats.mean_speed, 2.);
        assert_eq!(stats.max_speed, 5.);
        assert_relative_eq!(stats.centroid.x, 170.);
        assert_relative_eq!(stats.mean_neighbours, 2. / 3.);
    }
}
