//! Steady-state one dimensional diffusion with Dirichlet boundaries.
//!
//! Solves `D(x) u''(x) + D'(x) u'(x) = 0` on a fixed axis, with the value of
//! `u` prescribed at the first (core) and last (SOL) nodes.

use crate::banded::{BandedError, BandedMatrix};
use crate::geometry::{Axis, AxisError};
use crate::operator::{
    DifferenceOperator, OperatorError, apply_operator, build_difference_operator,
};
use faer::{Mat, MatRef};
use thiserror::Error;

/// Number of points in the stencils of the cached operators. Three point
/// stencils keep the assembled system tridiagonal.
const STENCIL_POINTS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffusionError {
    #[error("invalid axis: {0}")]
    InvalidAxis(#[from] AxisError),
    #[error("failed to build difference operators: {0}")]
    Operator(#[from] OperatorError),
    #[error("{field} has length {found} but the axis has {expected} points")]
    ShapeMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("failed to solve banded system: {0}")]
    Banded(#[from] BandedError),
}

/// Steady-state diffusion solver for a fixed axis.
///
/// The gradient and Laplacian operators are built once and never modified;
/// every solve assembles a fresh system, so a single solver may be shared
/// between threads.
#[derive(Clone, Debug)]
pub struct DiffusionSolver {
    axis: Axis,
    grad: DifferenceOperator,
    laplace: DifferenceOperator,
}

impl DiffusionSolver {
    pub fn new(axis: Axis) -> Result<Self, DiffusionError> {
        let grad = build_difference_operator(axis.positions(), 1, STENCIL_POINTS)?;
        let laplace = build_difference_operator(axis.positions(), 2, STENCIL_POINTS)?;

        log::debug!(
            "Diffusion solver initialized on {} nodes spanning [{}, {}]",
            axis.len(),
            axis.start(),
            axis.end()
        );

        Ok(Self {
            axis,
            grad,
            laplace,
        })
    }

    /// Validates `positions` as an axis and builds a solver on it.
    pub fn from_positions(positions: impl Into<Vec<f64>>) -> Result<Self, DiffusionError> {
        Self::new(Axis::new(positions)?)
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// First derivative operator.
    pub fn gradient(&self) -> MatRef<'_, f64> {
        self.grad.as_ref()
    }

    /// Second derivative operator.
    pub fn laplacian(&self) -> MatRef<'_, f64> {
        self.laplace.as_ref()
    }

    /// Estimates the first derivative of `field` along the axis.
    pub fn differentiate(&self, field: &[f64]) -> Result<Vec<f64>, DiffusionError> {
        self.check_len("field", field.len())?;

        let mut result = vec![0.0; field.len()];
        apply_operator(self.grad.as_ref(), field, &mut result);
        Ok(result)
    }

    /// Assembles `diag(D') grad + diag(D) laplace` and replaces the first and
    /// last rows with identity rows.
    pub fn assemble(
        &self,
        diffusivity: &[f64],
        diffusivity_gradient: &[f64],
    ) -> Result<Mat<f64>, DiffusionError> {
        self.check_len("diffusivity", diffusivity.len())?;
        self.check_len("diffusivity_gradient", diffusivity_gradient.len())?;

        let n = self.axis.len();
        let last = n - 1;

        Ok(Mat::from_fn(n, n, |i, j| {
            if i == 0 || i == last {
                if i == j { 1.0 } else { 0.0 }
            } else {
                diffusivity_gradient[i] * self.grad[(i, j)]
                    + diffusivity[i] * self.laplace[(i, j)]
            }
        }))
    }

    /// Solves for the steady-state profile with `core_value` imposed at the
    /// first node and `sol_value` at the last.
    pub fn solve(
        &self,
        diffusivity: &[f64],
        diffusivity_gradient: &[f64],
        core_value: f64,
        sol_value: f64,
    ) -> Result<Vec<f64>, DiffusionError> {
        let operator = self.assemble(diffusivity, diffusivity_gradient)?;

        let n = self.axis.len();
        let mut rhs = vec![0.0; n];
        rhs[0] = core_value;
        rhs[n - 1] = sol_value;

        let banded = BandedMatrix::from_dense(operator.as_ref(), 1, 1)?;
        let mut solution = banded.solve(&rhs).inspect_err(|err| {
            log::error!("Diffusion solve failed: {err}");
        })?;

        // The boundary rows are identity rows, but row interchanges during
        // elimination can still perturb the last bit of these entries.
        solution[0] = core_value;
        solution[n - 1] = sol_value;

        if log::log_enabled!(log::Level::Trace) {
            let mut residual = vec![0.0; n];
            banded.apply(&solution, &mut residual)?;
            let norm = residual
                .iter()
                .zip(&rhs)
                .map(|(r, b)| (r - b).abs())
                .fold(0.0, f64::max);
            log::trace!("Diffusion solve residual: {norm:.5e}");
        }

        Ok(solution)
    }

    /// Same as [`DiffusionSolver::solve`], with the diffusivity gradient
    /// estimated from `diffusivity` by the cached gradient operator.
    pub fn solve_profile(
        &self,
        diffusivity: &[f64],
        core_value: f64,
        sol_value: f64,
    ) -> Result<Vec<f64>, DiffusionError> {
        let gradient = self.differentiate(diffusivity)?;
        self.solve(diffusivity, &gradient, core_value, sol_value)
    }

    fn check_len(&self, field: &'static str, found: usize) -> Result<(), DiffusionError> {
        if found != self.axis.len() {
            return Err(DiffusionError::ShapeMismatch {
                field,
                expected: self.axis.len(),
                found,
            });
        }

        Ok(())
    }
}
