//! Serializable descriptions of diffusion problems.

use crate::diffusion::{DiffusionError, DiffusionSolver};
use crate::geometry::{Axis, AxisError};
use crate::profile::{ProfileError, ProfileParams, smooth_transport_profile};
use divi_app::file::{FileError, import_toml};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    File(#[from] FileError),
    #[error("invalid axis: {0}")]
    Axis(#[from] AxisError),
    #[error("invalid diffusivity profile: {0}")]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Diffusion(#[from] DiffusionError),
}

/// How the grid positions are generated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AxisConfig {
    /// `points` evenly spaced positions spanning `[start, end]`.
    Uniform { start: f64, end: f64, points: usize },
    /// Positions listed explicitly.
    Explicit { positions: Vec<f64> },
}

impl AxisConfig {
    pub fn build(&self) -> Result<Axis, AxisError> {
        match self {
            AxisConfig::Uniform { start, end, points } => Axis::uniform(*start, *end, *points),
            AxisConfig::Explicit { positions } => Axis::new(positions.clone()),
        }
    }
}

/// A steady-state diffusion problem whose diffusivity follows a smooth
/// transport profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffusionConfig {
    pub axis: AxisConfig,
    pub diffusivity: ProfileParams,
    pub core_value: f64,
    pub sol_value: f64,
}

/// Result of solving a [`DiffusionConfig`].
#[derive(Clone, Debug)]
pub struct DiffusionSolution {
    pub positions: Vec<f64>,
    pub diffusivity: Vec<f64>,
    pub values: Vec<f64>,
}

impl DiffusionConfig {
    /// Loads a problem from a toml file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(import_toml(path)?)
    }

    pub fn solver(&self) -> Result<DiffusionSolver, ConfigError> {
        Ok(DiffusionSolver::new(self.axis.build()?)?)
    }

    /// Evaluates the diffusivity profile on the axis and solves for the
    /// steady-state values, estimating the diffusivity gradient numerically.
    pub fn solve(&self) -> Result<DiffusionSolution, ConfigError> {
        self.diffusivity.validate()?;

        let solver = self.solver()?;
        let positions = solver.axis().positions().to_vec();
        let diffusivity = smooth_transport_profile(&positions, &self.diffusivity);
        let values = solver.solve_profile(&diffusivity, self.core_value, self.sol_value)?;

        Ok(DiffusionSolution {
            positions,
            diffusivity,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
core_value = 5.0
sol_value = 0.5

[axis]
kind = "uniform"
start = 0.0
end = 1.2
points = 121

[diffusivity]
core_level = 2.0
sol_level = 1.5
barrier_center = 0.9
barrier_width = 0.1
core_rise = 0.05
sol_rise = 0.1
"#;

    #[test]
    fn parse() {
        let config: DiffusionConfig = toml::from_str(SOURCE).unwrap();

        assert_eq!(
            config.axis,
            AxisConfig::Uniform {
                start: 0.0,
                end: 1.2,
                points: 121
            }
        );
        assert_eq!(config.diffusivity.core_gradient, 0.0);
        assert_eq!(config.diffusivity.barrier_center, 0.9);
        assert_eq!(config.core_value, 5.0);
    }

    #[test]
    fn explicit_axis() {
        let axis: AxisConfig =
            toml::from_str("kind = \"explicit\"\npositions = [0.0, 0.1, 0.3, 0.6]").unwrap();
        assert_eq!(axis.build().unwrap().len(), 4);

        let axis: AxisConfig =
            toml::from_str("kind = \"explicit\"\npositions = [0.0, 0.3, 0.1]").unwrap();
        assert!(axis.build().is_err());
    }

    #[test]
    fn solve() {
        let config: DiffusionConfig = toml::from_str(SOURCE).unwrap();
        let solution = config.solve().unwrap();

        assert_eq!(solution.positions.len(), 121);
        assert_eq!(solution.values[0], 5.0);
        assert_eq!(solution.values[120], 0.5);

        // The flux D u' is constant, so u is monotone and drops fastest
        // where the diffusivity is smallest.
        for pair in solution.values.windows(2) {
            assert!(pair[1] < pair[0]);
        }
    }

    #[test]
    fn invalid_profile() {
        let mut config: DiffusionConfig = toml::from_str(SOURCE).unwrap();
        config.diffusivity.sol_rise = -1.0;

        assert!(matches!(
            config.solve(),
            Err(ConfigError::Profile(ProfileError::NegativeLength { .. }))
        ));
    }
}
