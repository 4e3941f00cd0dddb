use crate::foundation::error::{FilmrollError, FilmrollResult};

/// Largest integration substep, in seconds.
const MAX_SUBSTEP_SECS: f64 = 1.0 / 240.0;
/// Longer gaps between ticks (e.g. a suspended host) are integrated as this much time.
const MAX_STEP_SECS: f64 = 1.0;

/// Physical parameters of a damped spring.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpringParams {
    /// Restoring force per unit of displacement.
    pub stiffness: f64,
    /// Opposing force per unit of velocity.
    pub damping: f64,
    /// Inertia of the simulated body.
    pub mass: f64,
    /// Displacement below which the spring may settle.
    pub rest_delta: f64,
    /// Speed below which the spring may settle.
    pub rest_speed: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 70.0,
            damping: 30.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 0.01,
        }
    }
}

impl SpringParams {
    pub fn validate(&self) -> FilmrollResult<()> {
        let all = [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
            ("rest_delta", self.rest_delta),
            ("rest_speed", self.rest_speed),
        ];
        for (name, v) in all {
            if !v.is_finite() || v <= 0.0 {
                return Err(FilmrollError::validation(format!(
                    "spring {name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// `damping / (2 * sqrt(stiffness * mass))`; `>= 1` means no overshoot.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// Damped spring integrator that smooths a target value over time.
///
/// The spring is advanced explicitly with [`Spring::step`], so its output depends only on
/// the sequence of targets and time deltas it was fed.
#[derive(Clone, Debug)]
pub struct Spring {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    /// Create a spring resting at `initial`.
    pub fn new(params: SpringParams, initial: f64) -> Self {
        Self {
            params,
            position: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Retarget the spring. Non-finite targets are ignored.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Teleport to `value` and come to rest there.
    pub fn jump_to(&mut self, value: f64) {
        if value.is_finite() {
            self.position = value;
            self.target = value;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    /// Advance the simulation by `dt_secs` and return the new position.
    pub fn step(&mut self, dt_secs: f64) -> f64 {
        if !dt_secs.is_finite() || dt_secs <= 0.0 || self.is_at_rest() {
            return self.position;
        }

        let dt_secs = dt_secs.min(MAX_STEP_SECS);
        let substeps = (dt_secs / MAX_SUBSTEP_SECS).ceil().max(1.0) as u32;
        let h = dt_secs / f64::from(substeps);
        let SpringParams {
            stiffness,
            damping,
            mass,
            rest_delta,
            rest_speed,
        } = self.params;

        for _ in 0..substeps {
            let displacement = self.position - self.target;
            let accel = (-stiffness * displacement - damping * self.velocity) / mass;
            // Semi-implicit Euler: velocity first, then position with the new velocity.
            self.velocity += accel * h;
            self.position += self.velocity * h;

            if (self.position - self.target).abs() < rest_delta && self.velocity.abs() < rest_speed
            {
                self.position = self.target;
                self.velocity = 0.0;
                break;
            }
        }
        self.position
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
