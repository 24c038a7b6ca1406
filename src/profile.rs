//! Smooth transport-barrier profiles.
//!
//! Profiles are flat in the core, the barrier and the SOL, joined by edges whose
//! first derivative is continuous. Each edge blends a quadratic-to-linear ramp
//! with the CDF of a symmetric triangle distribution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Level of the profile inside the transport barrier.
const BARRIER_LEVEL: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    #[error("expected {expected} profile parameters, found {found}")]
    WrongParameterCount { expected: usize, found: usize },
    #[error("{name} must be non-negative, found {value}")]
    NegativeLength { name: &'static str, value: f64 },
}

/// Which way an edge faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Edge on the core side of the barrier, the ramp extends towards smaller x.
    Left,
    /// Edge on the SOL side of the barrier, the ramp extends towards larger x.
    Right,
}

/// CDF of the symmetric triangle distribution on `[start, end]`.
pub fn triangle_cdf(x: f64, start: f64, end: f64) -> f64 {
    let mid = 0.5 * (start + end);

    if x >= end {
        1.0
    } else if x > mid {
        1.0 - (x - end).powi(2) / ((end - start) * (end - mid))
    } else if x > start {
        (x - start).powi(2) / ((end - start) * (mid - start))
    } else {
        0.0
    }
}

/// Integral of [`triangle_cdf`], i.e. zero before `start` and `x - mid` after `end`.
pub fn triangle_ramp(x: f64, start: f64, end: f64) -> f64 {
    let mid = 0.5 * (start + end);
    let dx = end - start;

    if x >= end {
        x - mid
    } else if x > mid {
        x - (x - end).powi(3) / (dx * dx * 1.5) - mid
    } else if x > start {
        (x - start).powi(3) / (dx * dx * 1.5)
    } else {
        0.0
    }
}

/// Quadratic ramp on `[start, end]` continued as a line of unit slope away from
/// the barrier.
pub fn smooth_ramp(x: f64, start: f64, end: f64, side: Side) -> f64 {
    let dx = end - start;
    let inside = x > start && x <= end;

    match side {
        Side::Right if inside => 0.5 * (x - start).powi(2) / dx,
        Side::Right if x > end => x + (0.5 * dx - end),
        Side::Left if inside => -0.5 * (end - x).powi(2) / dx,
        Side::Left if x < start => x + (0.5 * dx - end),
        _ => 0.0,
    }
}

/// A step of unit height on `[start, end]` plus `gradient` times [`smooth_ramp`].
pub fn smooth_barrier_edge(x: f64, start: f64, end: f64, gradient: f64, side: Side) -> f64 {
    let cdf = triangle_cdf(x, start, end);
    let sigmoid = match side {
        Side::Right => cdf,
        Side::Left => 1.0 - cdf,
    };

    gradient * smooth_ramp(x, start, end, side) + sigmoid
}

/// Parameters of [`smooth_transport_profile`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileParams {
    /// Level of the flat core region.
    pub core_level: f64,
    /// Level of the flat SOL region.
    pub sol_level: f64,
    /// Center of the transport barrier.
    pub barrier_center: f64,
    /// Width of the flat barrier region.
    pub barrier_width: f64,
    /// Width of the edge joining core and barrier.
    pub core_rise: f64,
    /// Width of the edge joining barrier and SOL.
    pub sol_rise: f64,
    /// Slope of the profile inside the core, relative to the core step.
    #[serde(default)]
    pub core_gradient: f64,
    /// Slope of the profile inside the SOL, relative to the SOL step.
    #[serde(default)]
    pub sol_gradient: f64,
}

impl ProfileParams {
    pub const COUNT: usize = 8;

    /// Reads parameters in the order core level, SOL level, barrier center,
    /// barrier width, core rise, SOL rise, core gradient, SOL gradient.
    pub fn from_slice(params: &[f64]) -> Result<Self, ProfileError> {
        let &[
            core_level,
            sol_level,
            barrier_center,
            barrier_width,
            core_rise,
            sol_rise,
            core_gradient,
            sol_gradient,
        ] = params
        else {
            return Err(ProfileError::WrongParameterCount {
                expected: Self::COUNT,
                found: params.len(),
            });
        };

        let result = Self {
            core_level,
            sol_level,
            barrier_center,
            barrier_width,
            core_rise,
            sol_rise,
            core_gradient,
            sol_gradient,
        };
        result.validate()?;
        Ok(result)
    }

    pub fn to_array(&self) -> [f64; Self::COUNT] {
        [
            self.core_level,
            self.sol_level,
            self.barrier_center,
            self.barrier_width,
            self.core_rise,
            self.sol_rise,
            self.core_gradient,
            self.sol_gradient,
        ]
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        for (name, value) in [
            ("barrier_width", self.barrier_width),
            ("core_rise", self.core_rise),
            ("sol_rise", self.sol_rise),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ProfileError::NegativeLength { name, value });
            }
        }

        Ok(())
    }

    /// Evaluates the profile at a single position.
    pub fn evaluate(&self, x: f64) -> f64 {
        let left_end = self.barrier_center - 0.5 * self.barrier_width;
        let left_start = left_end - self.core_rise;
        let left = smooth_barrier_edge(x, left_start, left_end, self.core_gradient, Side::Left);

        let right_start = self.barrier_center + 0.5 * self.barrier_width;
        let right_end = right_start + self.sol_rise;
        let right = smooth_barrier_edge(x, right_start, right_end, self.sol_gradient, Side::Right);

        left * (self.core_level - BARRIER_LEVEL)
            + right * (self.sol_level - BARRIER_LEVEL)
            + BARRIER_LEVEL
    }
}

/// Evaluates a smooth transport profile at every position of `axis`.
pub fn smooth_transport_profile(axis: &[f64], params: &ProfileParams) -> Vec<f64> {
    axis.iter().map(|&x| params.evaluate(x)).collect()
}
