use std::f32::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::math_helpers::Space;

/// A perturbation every boid feels regardless of its neighbours.
///
/// Implementations must be pure functions of `(position, tick)`, the same field
/// gets sampled by the flock and by whoever draws it.
pub trait EnvironmentField<V: Space> {
    fn sample(&self, position: V, tick: u64) -> V;
}

/// No environment at all
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calm;

impl<V: Space> EnvironmentField<V> for Calm {
    #[inline]
    fn sample(&self, _: V, _: u64) -> V {
        V::ZERO
    }
}

/// Slowly drifting sinusoidal wind.
///
/// Axis `i` of the gust at `p` is `strength * sin(frequency * p[i + 1] + phase + i * π/2)`,
/// where the phase only advances once every `period` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindField {
    pub strength: f32,
    /// ticks the field holds still for
    pub period: u64,
    /// spatial frequency, radians per unit of distance
    pub frequency: f32,
}

impl WindField {
    /// phase advance per period
    const DRIFT: f32 = 0.7;

    pub fn new(strength: f32, period: u64, frequency: f32) -> Self {
        WindField {
            strength,
            period,
            frequency,
        }
    }

    /// Coarsened time index, the field only changes when this does
    #[inline]
    pub fn epoch(&self, tick: u64) -> u64 {
        tick / self.period.max(1)
    }
}

impl<V: Space> EnvironmentField<V> for WindField {
    fn sample(&self, position: V, tick: u64) -> V {
        let phase = self.epoch(tick) as f32 * Self::DRIFT;

        V::from_fn(|axis| {
            let across = position[(axis + 1) % V::DIM];
            self.strength * (self.frequency * across + phase + axis as f32 * FRAC_PI_2).sin()
        })
    }
}

/// Regular grid of points covering `[0, extent)` with the given spacing, for
/// drawing a field next to the flock.
pub fn lattice<V: Space>(extent: V, spacing: f32) -> Vec<V> {
    if !(spacing > 0.) {
        return Vec::new();
    }

    let counts: Vec<usize> = (0..V::DIM)
        .map(|axis| (extent[axis].max(0.) / spacing).ceil() as usize)
        .collect();
    let total: usize = counts.iter().product();

    (0..total)
        .map(|flat| {
            let mut rest = flat;
            V::from_fn(|axis| {
                let i = rest % counts[axis];
                rest /= counts[axis];
                i as f32 * spacing
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    use super::{lattice, Calm, EnvironmentField, WindField};

    #[test]
    fn calm_is_zero() {
        assert_eq!(Calm.sample(Vec3::new(4., 5., 6.), 99), Vec3::ZERO);
    }

    #[test]
    fn wind_holds_within_a_period() {
        let wind = WindField::new(0.3, 50, 0.02);
        let p = Vec2::new(120., 33.);

        let first: Vec2 = wind.sample(p, 50);
        assert_eq!(first, wind.sample(p, 99));
        assert_ne!(first, wind.sample(p, 100));
    }

    #[test]
    fn wind_is_bounded_by_strength() {
        let wind = WindField::new(0.3, 10, 0.05);
        for tick in [0, 7, 10, 1_000] {
            for p in lattice(Vec3::new(100., 100., 50.), 13.) {
                let gust: Vec3 = wind.sample(p, tick);
                for axis in 0..3 {
                    assert!(gust[axis].abs() <= 0.3 + f32::EPSILON);
                }
            }
        }
    }

    #[test]
    fn wind_matches_closed_form() {
        let wind = WindField::new(2., 1, 0.5);
        let gust: Vec2 = wind.sample(Vec2::new(1., 2.), 0);

        assert_relative_eq!(gust.x, 2. * (0.5_f32 * 2.).sin(), epsilon = 1e-5);
        assert_relative_eq!(gust.y, 2. * (0.5_f32 * 1. + std::f32::consts::FRAC_PI_2).sin(), epsilon = 1e-5);
    }

    #[test]
    fn lattice_covers_extent() {
        let points = lattice(Vec2::new(100., 50.), 25.);
        assert_eq!(points.len(), 4 * 2);
        assert_eq!(points[0], Vec2::ZERO);
        assert!(points.contains(&Vec2::new(75., 25.)));
        assert!(points.iter().all(|p| p.x < 100. && p.y < 50.));
    }

    #[test]
    fn lattice_rejects_degenerate_spacing() {
        assert!(lattice(Vec2::new(100., 50.), 0.).is_empty());
    }
}
