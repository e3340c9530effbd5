use std::{
    fmt::Debug,
    ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign},
};

use glam::{Vec2, Vec3};

use crate::{
    boid::Boid,
    options::{SeparationGuard, SpeedClamp},
};

/// A D-dimensional real vector the flocking rules can run in.
///
/// Implemented for [`Vec2`] and [`Vec3`], so one engine covers both the planar
/// and the volumetric flock.
pub trait Space:
    'static
    + Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign<f32>
    + DivAssign<f32>
    + Index<usize, Output = f32>
    + IndexMut<usize>
{
    /// number of axes
    const DIM: usize;
    const ZERO: Self;

    /// Builds a vector axis by axis
    fn from_fn(f: impl FnMut(usize) -> f32) -> Self;

    fn length(self) -> f32;

    fn is_finite(self) -> bool;
}

impl Space for Vec2 {
    const DIM: usize = 2;
    const ZERO: Self = Vec2::ZERO;

    #[inline]
    fn from_fn(mut f: impl FnMut(usize) -> f32) -> Self {
        Vec2::new(f(0), f(1))
    }

    #[inline]
    fn length(self) -> f32 {
        Vec2::length(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Vec2::is_finite(self)
    }
}

impl Space for Vec3 {
    const DIM: usize = 3;
    const ZERO: Self = Vec3::ZERO;

    #[inline]
    fn from_fn(mut f: impl FnMut(usize) -> f32) -> Self {
        Vec3::new(f(0), f(1), f(2))
    }

    #[inline]
    fn length(self) -> f32 {
        Vec3::length(self)
    }

    #[inline]
    fn is_finite(self) -> bool {
        Vec3::is_finite(self)
    }
}

#[inline]
pub fn simple_distance<V: Space>(p1: V, p2: V) -> f32 {
    (p1 - p2).length()
}

pub fn simple_distance_boid<V: Space>(b1: &Boid<V>, b2: &Boid<V>) -> f32 {
    simple_distance(b1.position, b2.position)
}

/// Limits the magnitude of `velocity` to `max_speed`.
///
/// [`SpeedClamp::Legacy`] divides by `speed * max_speed` instead of rescaling,
/// which leaves a clamped vector with magnitude `1 / max_speed`.
pub fn clamp_speed<V: Space>(velocity: V, max_speed: f32, mode: SpeedClamp) -> V {
    let speed = velocity.length();

    // also lets NaN through untouched, there is nothing sensible to scale it to
    if !(speed > max_speed) {
        return velocity;
    }

    match mode {
        SpeedClamp::Scaled => velocity * (max_speed / speed),
        SpeedClamp::Legacy => velocity / (speed * max_speed),
    }
}

/// Separation push along one axis, `radius / delta`, with `delta` the signed
/// per axis offset from the neighbour to the boid.
///
/// Under [`SeparationGuard::Floor`] an axis on which both boids line up exactly
/// contributes nothing and offsets smaller than epsilon are floored to
/// `±epsilon`, so the push stays finite.
#[inline]
pub fn separation_push(radius: f32, delta: f32, guard: SeparationGuard) -> f32 {
    match guard {
        SeparationGuard::Unguarded => radius / delta,
        SeparationGuard::Floor { epsilon } => {
            if delta == 0. {
                0.
            } else if delta.abs() < epsilon {
                radius / epsilon.copysign(delta)
            } else {
                radius / delta
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};
    use rstest::rstest;

    use super::{clamp_speed, separation_push, simple_distance, Space};
    use crate::options::{SeparationGuard, SpeedClamp};

    macro_rules! assert_eqf32 {
        ($x:expr, $y:expr) => {
            assert_relative_eq!($x, $y, epsilon = 1e-3_f32)
        };
    }

    #[test]
    fn distance_planar() {
        let res = simple_distance(Vec2::new(3., 2.), Vec2::new(0., 0.));
        assert_eqf32!(res, 3.606);
    }

    #[test]
    fn distance_volumetric() {
        let res = simple_distance(Vec3::new(1., 2., 2.), Vec3::ZERO);
        assert_eqf32!(res, 3.);
    }

    #[test]
    fn from_fn_fills_every_axis() {
        let v = <Vec3 as Space>::from_fn(|axis| axis as f32 + 1.);
        assert_eq!(v, Vec3::new(1., 2., 3.));
        assert_eq!(<Vec2 as Space>::DIM, 2);
        assert_eq!(<Vec3 as Space>::DIM, 3);
    }

    #[rstest]
    #[case(1.)]
    #[case(2.5)]
    #[case(0.3)]
    fn scaled_clamp_caps_at_max_speed(#[case] max_speed: f32) {
        let res = clamp_speed(Vec2::new(30., -40.), max_speed, SpeedClamp::Scaled);
        assert_eqf32!(res.length(), max_speed);
        // direction is kept
        assert_eqf32!(res.x / res.y, 30. / -40.);
    }

    #[rstest]
    #[case(2.)]
    #[case(4.)]
    fn legacy_clamp_shrinks_to_reciprocal(#[case] max_speed: f32) {
        let res = clamp_speed(Vec3::new(10., 0., 0.), max_speed, SpeedClamp::Legacy);
        assert_eqf32!(res.length(), 1. / max_speed);
    }

    #[test]
    fn clamp_leaves_slow_vectors_alone() {
        let v = Vec2::new(0.3, 0.4);
        assert_eq!(clamp_speed(v, 1., SpeedClamp::Scaled), v);
        assert_eq!(clamp_speed(v, 1., SpeedClamp::Legacy), v);
    }

    #[test]
    fn floor_guard_is_finite_and_signed() {
        let guard = SeparationGuard::Floor { epsilon: 1e-3 };

        assert_eq!(separation_push(40., 0., guard), 0.);
        assert_eqf32!(separation_push(40., 1e-6, guard), 40_000.);
        assert_eqf32!(separation_push(40., -1e-6, guard), -40_000.);
        assert_eqf32!(separation_push(40., -10., guard), -4.);
    }

    #[test]
    fn unguarded_push_diverges() {
        let res = separation_push(40., 0., SeparationGuard::Unguarded);
        assert!(res.is_infinite());
    }
}
