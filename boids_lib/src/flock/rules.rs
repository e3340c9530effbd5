use crate::{
    boid::Boid,
    field::EnvironmentField,
    math_helpers::{clamp_speed, separation_push, simple_distance_boid, Space},
    options::RunOptions,
};

/// What a boid sees of its neighbours within one tick, gathered in a single pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbourhood<V: Space> {
    pub separation_push: V,
    pub count: usize,
    pub centroid_sum: V,
    pub velocity_sum: V,
}

impl<V: Space> Neighbourhood<V> {
    pub fn empty() -> Self {
        Neighbourhood {
            separation_push: V::ZERO,
            count: 0,
            centroid_sum: V::ZERO,
            velocity_sum: V::ZERO,
        }
    }

    /// All-pairs scan of `flock` around `boid`, every other boid strictly
    /// closer than the sensory distance counts.
    pub fn scan(boid: &Boid<V>, flock: &[Boid<V>], run_options: &RunOptions) -> Self {
        let radius = run_options.sensory_distance;
        let mut res = Self::empty();

        for other in flock {
            if other.id == boid.id {
                continue;
            }

            if simple_distance_boid(boid, other) >= radius {
                continue;
            }

            for axis in 0..V::DIM {
                res.separation_push[axis] += separation_push(
                    radius,
                    boid.position[axis] - other.position[axis],
                    run_options.separation_guard,
                );
            }

            res.centroid_sum += other.position;
            res.velocity_sum += other.velocity;
            res.count += 1;
        }

        res
    }

    pub fn separation(&self, run_options: &RunOptions) -> V {
        self.separation_push * run_options.separation_coefficient
    }

    /// Steers towards the centre of the neighbours
    pub fn cohesion(&self, boid: &Boid<V>, run_options: &RunOptions) -> V {
        if self.count == 0 {
            return V::ZERO;
        }

        let centre = self.centroid_sum / self.count as f32;
        (centre - boid.position) * run_options.cohesion_coefficient
    }

    /// Steers towards the neighbours' average heading
    pub fn alignment(&self, boid: &Boid<V>, run_options: &RunOptions) -> V {
        if self.count == 0 {
            return V::ZERO;
        }

        let avg = self.velocity_sum / self.count as f32;
        (avg - boid.velocity) * run_options.alignment_coefficient
    }
}

/// Soft margin around the bounding volume, one `turn_strength` kick per face
/// the boid is closer to than the sensory distance.
pub fn redirect<V: Space>(position: V, extent: V, run_options: &RunOptions) -> V {
    let margin = run_options.sensory_distance;
    let turn = run_options.turn_strength;

    V::from_fn(|axis| {
        let mut kick = 0.;
        if position[axis] < margin {
            kick += turn;
        }
        if position[axis] > extent[axis] - margin {
            kick -= turn;
        }
        kick
    })
}

/// Advances one boid by a single tick against the given view of the flock.
///
/// Every contribution is computed from `boid` as passed in, the result is a
/// new boid, `flock` is never written to.
pub fn steer<V, F>(
    boid: &Boid<V>,
    flock: &[Boid<V>],
    field: &F,
    extent: V,
    run_options: &RunOptions,
    tick: u64,
) -> Boid<V>
where
    V: Space,
    F: EnvironmentField<V> + ?Sized,
{
    let hood = Neighbourhood::scan(boid, flock, run_options);

    let mut velocity = boid.velocity
        + hood.separation(run_options)
        + hood.cohesion(boid, run_options)
        + hood.alignment(boid, run_options);

    velocity += field.sample(boid.position, tick);
    velocity = clamp_speed(velocity, run_options.max_speed, run_options.speed_clamp);
    velocity += redirect(boid.position, extent, run_options);

    Boid::new(boid.id, boid.position + velocity, velocity)
}
