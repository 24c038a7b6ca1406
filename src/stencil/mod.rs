//! Finite-difference weights for arbitrary point sets.
//!
//! Given offsets `h_j` from an evaluation point and a derivative order `k`,
//! the weights `w_j` satisfy `sum_j w_j h_j^i = k! δ_ik` for `i < n`, i.e.
//! the stencil differentiates every polynomial of degree below `n` exactly.
//! This is a (transposed) Vandermonde system, solved densely.

mod lsq;

use faer::Mat;
use lsq::SquareSolve;
use reborrow::{Reborrow, ReborrowMut};
use thiserror::Error;

/// Failures while solving for stencil weights.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StencilError {
    #[error("a derivative of order {order} needs more than {points} points")]
    InvalidStencil { points: usize, order: usize },
    #[error("stencil system is singular (offsets must be finite and distinct)")]
    SingularSystem,
    #[error("stencil system is numerically singular (rcond {rcond:e})")]
    IllConditioned { rcond: f64 },
    #[error("singular value decomposition failed to converge")]
    NoConvergence,
}

/// Computes finite-difference weights, reusing its scratch buffers between calls.
#[derive(Clone, Default)]
pub struct StencilSolver {
    lls: SquareSolve,
    scaled: Vec<f64>,
}

impl StencilSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `dest` with the weights approximating the `order`-th derivative at
    /// offset zero from samples at `offsets`.
    pub fn compute(
        &mut self,
        offsets: &[f64],
        order: usize,
        dest: &mut [f64],
    ) -> Result<(), StencilError> {
        let n = offsets.len();
        assert_eq!(dest.len(), n);

        if n <= order {
            return Err(StencilError::InvalidStencil { points: n, order });
        }

        if offsets.iter().any(|h| !h.is_finite()) || has_duplicates(offsets) {
            return Err(StencilError::SingularSystem);
        }

        // Work with offsets in [-1, 1] and undo the scaling on the weights.
        let scale = offsets.iter().fold(0.0, |acc: f64, h| acc.max(h.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };

        self.scaled.clear();
        self.scaled.extend(offsets.iter().map(|h| h / scale));

        let scaled = &self.scaled;
        let vandermonde = Mat::from_fn(n, n, |i, j| scaled[j].powi(i as i32));
        let rhs = Mat::from_fn(n, 1, |i, _| if i == order { factorial(order) } else { 0.0 });
        let mut weights = Mat::<f64>::zeros(n, 1);

        let rcond = self
            .lls
            .solve(vandermonde.rb(), weights.rb_mut(), rhs.rb())
            .map_err(|_| StencilError::NoConvergence)?;

        if rcond.is_nan() || rcond <= n as f64 * f64::EPSILON {
            return Err(StencilError::IllConditioned { rcond });
        }

        let rescale = scale.powi(order as i32);
        for (j, weight) in dest.iter_mut().enumerate() {
            *weight = weights[(j, 0)] / rescale;
        }

        if dest.iter().any(|w| !w.is_finite()) {
            return Err(StencilError::IllConditioned { rcond });
        }

        Ok(())
    }
}

/// Finite-difference weights for the `order`-th derivative at offset zero.
pub fn fd_weights(offsets: &[f64], order: usize) -> Result<Vec<f64>, StencilError> {
    let mut weights = vec![0.0; offsets.len()];
    StencilSolver::new().compute(offsets, order, &mut weights)?;
    Ok(weights)
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}

fn has_duplicates(offsets: &[f64]) -> bool {
    let mut sorted = offsets.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.windows(2).any(|pair| pair[0] == pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= tol, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn centered() {
        let offsets = [-1.0, 0.0, 1.0];
        assert_close(&fd_weights(&offsets, 0).unwrap(), &[0.0, 1.0, 0.0], 1e-12);
        assert_close(&fd_weights(&offsets, 1).unwrap(), &[-0.5, 0.0, 0.5], 1e-12);
        assert_close(&fd_weights(&offsets, 2).unwrap(), &[1.0, -2.0, 1.0], 1e-12);

        let offsets = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert_close(
            &fd_weights(&offsets, 1).unwrap(),
            &[1.0 / 12.0, -2.0 / 3.0, 0.0, 2.0 / 3.0, -1.0 / 12.0],
            1e-12,
        );
        assert_close(
            &fd_weights(&offsets, 2).unwrap(),
            &[-1.0 / 12.0, 4.0 / 3.0, -5.0 / 2.0, 4.0 / 3.0, -1.0 / 12.0],
            1e-12,
        );
    }

    #[test]
    fn one_sided() {
        // Second order forward difference for the first derivative.
        let weights = fd_weights(&[0.0, 0.1, 0.2], 1).unwrap();
        assert_close(&weights, &[-15.0, 20.0, -5.0], 1e-9);
    }

    #[test]
    fn polynomial_exactness() {
        let offsets = [-0.31, -0.12, 0.0, 0.07, 0.26, 0.4];
        let coefs = [0.3, -1.2, 2.0, 0.7, -0.4, 1.1];
        // p(x) = sum_i c_i x^i, degree 5 < 6 points.
        let p = |x: f64| coefs.iter().rev().fold(0.0, |acc, c| acc * x + c);

        let mut solver = StencilSolver::new();
        let mut weights = [0.0; 6];

        for order in 0..6 {
            solver.compute(&offsets, order, &mut weights).unwrap();
            let estimate: f64 = weights.iter().zip(&offsets).map(|(w, h)| w * p(*h)).sum();
            // The k-th derivative of p at zero is k! c_k.
            let exact = factorial(order) * coefs[order];
            assert!(
                (estimate - exact).abs() <= 1e-7 * exact.abs().max(1.0),
                "order {order}: {estimate} vs {exact}"
            );
        }
    }

    #[test]
    fn rejection() {
        assert_eq!(
            fd_weights(&[-1.0, 0.0], 2),
            Err(StencilError::InvalidStencil {
                points: 2,
                order: 2
            })
        );
        assert_eq!(
            fd_weights(&[-1.0, 0.0, 0.0], 1),
            Err(StencilError::SingularSystem)
        );
        assert_eq!(
            fd_weights(&[-1.0, f64::NAN, 1.0], 1),
            Err(StencilError::SingularSystem)
        );
    }

    #[test]
    fn ill_conditioned() {
        // Distinct offsets, but two of them closer than rounding can resolve.
        assert!(matches!(
            fd_weights(&[-1.0, 0.0, 1e-17, 1.0], 1),
            Err(StencilError::IllConditioned { .. })
        ));

        // Wide stencils on a stretched axis lose all precision at the edge.
        let axis = divi_app::float::accumulate(
            divi_app::float::lin_range(0.0, 12.0, 128).map(|t| 0.1 * (1.0 + 0.5 * t.sin())),
        );
        let offsets: Vec<f64> = axis[..21].iter().map(|x| x - axis[0]).collect();
        assert!(matches!(
            fd_weights(&offsets, 1),
            Err(StencilError::IllConditioned { .. })
        ));
    }
}
