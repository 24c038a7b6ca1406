//! Global finite-difference operators on non-uniform axes.

use crate::geometry::{AxisError, check_increasing};
use crate::stencil::{StencilError, StencilSolver};
use faer::{Mat, MatRef};
use rayon::prelude::*;
use std::ops::Range;
use thiserror::Error;

/// Dense `N x N` matrix whose i-th row holds the stencil weights estimating a
/// derivative at the i-th axis position.
pub type DifferenceOperator = Mat<f64>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    #[error("invalid axis: {0}")]
    InvalidAxis(#[from] AxisError),
    #[error("stencil of {points} points can not estimate a derivative of order {order} (width must be odd, > 2 and > order)")]
    InvalidStencil { points: usize, order: usize },
    #[error("failed to build stencil for row {row}: {source}")]
    Stencil { row: usize, source: StencilError },
}

/// The `n_points` consecutive axis indices used to estimate a derivative at
/// `row`. Windows are centered where possible and shifted inward near the
/// boundaries, so every row uses exactly `n_points` points.
pub fn stencil_window(row: usize, len: usize, n_points: usize) -> Range<usize> {
    debug_assert!(n_points <= len && row < len);

    let start = row.saturating_sub(n_points / 2).min(len - n_points);
    start..start + n_points
}

/// Builds the dense operator estimating the `order`-th derivative of a field
/// sampled on `axis`, using `n_points` points per row.
pub fn build_difference_operator(
    axis: &[f64],
    order: usize,
    n_points: usize,
) -> Result<DifferenceOperator, OperatorError> {
    if n_points % 2 == 0 || n_points <= 2 || n_points <= order {
        return Err(OperatorError::InvalidStencil {
            points: n_points,
            order,
        });
    }

    check_increasing(axis)?;

    let len = axis.len();
    if len < n_points {
        return Err(AxisError::TooShort {
            len,
            required: n_points,
        }
        .into());
    }

    // Rows are independent, so each worker solves its own stencils.
    let rows = (0..len)
        .into_par_iter()
        .map_init(StencilSolver::new, |solver, row| {
            let window = stencil_window(row, len, n_points);
            let origin = axis[row];
            let offsets = axis[window.clone()]
                .iter()
                .map(|x| x - origin)
                .collect::<Vec<_>>();

            let mut weights = vec![0.0; n_points];
            solver
                .compute(&offsets, order, &mut weights)
                .map_err(|source| OperatorError::Stencil { row, source })?;

            Ok((window, weights))
        })
        .collect::<Result<Vec<_>, OperatorError>>()?;

    let mut operator = Mat::zeros(len, len);
    for (row, (window, weights)) in rows.into_iter().enumerate() {
        for (col, weight) in window.zip(weights) {
            operator[(row, col)] = weight;
        }
    }

    log::trace!(
        "Built order {} difference operator with {} point stencils on {} nodes",
        order,
        n_points,
        len
    );

    Ok(operator)
}

/// Computes `dest = operator * field`.
pub fn apply_operator(operator: MatRef<'_, f64>, field: &[f64], dest: &mut [f64]) {
    assert!(operator.ncols() == field.len() && operator.nrows() == dest.len());

    for (row, value) in dest.iter_mut().enumerate() {
        *value = (0..field.len())
            .map(|col| operator[(row, col)] * field[col])
            .sum();
    }
}
