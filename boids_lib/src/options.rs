use serde::{Deserialize, Serialize};

use crate::{error::BoidsError, field::WindField, math_helpers::Space};

/// Everything a run needs to know, fixed before the first tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub init_boids: usize,
    /// number of ticks a full run lasts
    pub ticks: u64,
    /// seeds the initial flock, entropy when unset
    pub seed: Option<u64>,

    /// extent of the x axis, positions live in [0, width)
    pub width: f32,
    /// extent of the y axis
    pub height: f32,
    /// extent of the z axis, only read by volumetric flocks
    pub depth: f32,

    pub max_speed: f32,
    /// standard deviation of the initial per axis velocity, before scaling by max_speed
    pub init_speed_deviation: f32,
    pub speed_clamp: SpeedClamp,

    /// locality radius, boids closer than this are neighbours
    pub sensory_distance: f32,

    pub alignment_coefficient: f32,
    pub cohesion_coefficient: f32,
    pub separation_coefficient: f32,
    pub separation_guard: SeparationGuard,

    /// velocity added per axis when a boid is inside the boundary margin
    pub turn_strength: f32,

    pub wind: Option<WindField>,
    pub update_mode: UpdateMode,

    pub trail_len: usize,
    pub sample_rate: u64,
}

impl RunOptions {
    /// Bounding volume as a vector, one extent per axis of `V`
    pub fn extent<V: Space>(&self) -> V {
        V::from_fn(|axis| match axis {
            0 => self.width,
            1 => self.height,
            _ => self.depth,
        })
    }

    /// Checks everything the engine divides by, takes a modulo of or allocates from
    pub fn validate(&self) -> Result<(), BoidsError> {
        if self.init_boids == 0 {
            return Err(BoidsError::invalid("init_boids", "a flock needs at least one boid"));
        }

        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("depth", self.depth),
            ("max_speed", self.max_speed),
            ("sensory_distance", self.sensory_distance),
        ] {
            if !(value.is_finite() && value > 0.) {
                return Err(BoidsError::invalid(
                    name,
                    format!("must be finite and positive, got {value}"),
                ));
            }
        }

        for (name, value) in [
            ("init_speed_deviation", self.init_speed_deviation),
            ("turn_strength", self.turn_strength),
        ] {
            if !(value.is_finite() && value >= 0.) {
                return Err(BoidsError::invalid(
                    name,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }

        if let SeparationGuard::Floor { epsilon } = self.separation_guard {
            if !(epsilon.is_finite() && epsilon > 0.) {
                return Err(BoidsError::invalid(
                    "separation_guard",
                    format!("epsilon must be finite and positive, got {epsilon}"),
                ));
            }
        }

        if let Some(wind) = &self.wind {
            if wind.period == 0 {
                return Err(BoidsError::invalid("wind.period", "must be at least one tick"));
            }
            if !(wind.strength.is_finite() && wind.frequency.is_finite()) {
                return Err(BoidsError::invalid("wind", "strength and frequency must be finite"));
            }
        }

        if self.trail_len == 0 {
            return Err(BoidsError::invalid("trail_len", "must hold at least one tick"));
        }

        if self.sample_rate == 0 {
            return Err(BoidsError::invalid("sample_rate", "must be at least one"));
        }

        Ok(())
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            init_boids: 100,
            ticks: 10_000,
            seed: None,
            width: 720.,
            height: 480.,
            depth: 100.,
            max_speed: 1.,
            init_speed_deviation: 5.,
            speed_clamp: SpeedClamp::Scaled,
            sensory_distance: 40.,
            alignment_coefficient: 0.1,
            cohesion_coefficient: 0.01,
            separation_coefficient: 0.025,
            separation_guard: SeparationGuard::Floor { epsilon: 1e-3 },
            turn_strength: 0.5,
            wind: None,
            update_mode: UpdateMode::Snapshot,
            trail_len: 10,
            sample_rate: 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Scaled"}
pub enum SpeedClamp {
    /// rescale to exactly max_speed
    Scaled,
    /// divide by speed * max_speed
    Legacy,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Floor", "epsilon": 0.001}
pub enum SeparationGuard {
    Floor { epsilon: f32 },
    /// raw division, coincident axes push with infinite velocity
    Unguarded,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UpdateMode {
    /// every boid reads the flock as it was at the start of the tick
    Snapshot,
    /// boids are updated one after another, later boids see earlier updates
    InPlace,
}
