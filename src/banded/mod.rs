//! Diagonal-ordered storage of banded matrices.
//!
//! A matrix with `lower` sub-diagonals and `upper` super-diagonals is stored in
//! `lower + upper + 1` rows, one per diagonal. Entry `A[i, j]` lives at
//! `(upper + i - j, j)`, so the main diagonal is row `upper`, super-diagonals are
//! right aligned (leading entries padded with zero) and sub-diagonals are left
//! aligned (trailing entries padded with zero). This is the layout expected by
//! LAPACK style banded solvers.

mod lu;

use faer::{Mat, MatRef};
use thiserror::Error;

pub use lu::BandedLu;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandedError {
    #[error("matrix must be square, found {nrows} x {ncols}")]
    NotSquare { nrows: usize, ncols: usize },
    #[error("bandwidths ({lower}, {upper}) must be smaller than the dimension {dimension}")]
    InvalidBandwidth {
        lower: usize,
        upper: usize,
        dimension: usize,
    },
    #[error("expected vector of length {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("banded system is singular (zero pivot in column {column})")]
    SingularSystem { column: usize },
}

#[derive(Clone, Debug)]
pub struct BandedMatrix {
    lower: usize,
    upper: usize,
    data: Mat<f64>,
}

impl BandedMatrix {
    /// An all-zero banded matrix of the given dimension.
    pub fn zeros(dimension: usize, lower: usize, upper: usize) -> Result<Self, BandedError> {
        check_bandwidth(dimension, lower, upper)?;

        Ok(Self {
            lower,
            upper,
            data: Mat::zeros(lower + upper + 1, dimension),
        })
    }

    /// Packs the band of a dense square matrix. Entries outside of the band are
    /// ignored.
    pub fn from_dense(
        matrix: MatRef<'_, f64>,
        lower: usize,
        upper: usize,
    ) -> Result<Self, BandedError> {
        if matrix.nrows() != matrix.ncols() {
            return Err(BandedError::NotSquare {
                nrows: matrix.nrows(),
                ncols: matrix.ncols(),
            });
        }

        let mut result = Self::zeros(matrix.nrows(), lower, upper)?;

        for j in 0..result.dimension() {
            for i in result.column_range(j) {
                result.data[(upper + i - j, j)] = matrix[(i, j)];
            }
        }

        Ok(result)
    }

    /// Unpacks into a dense square matrix.
    pub fn to_dense(&self) -> Mat<f64> {
        let n = self.dimension();
        let mut dense = Mat::zeros(n, n);

        for j in 0..n {
            for i in self.column_range(j) {
                dense[(i, j)] = self.data[(self.upper + i - j, j)];
            }
        }

        dense
    }

    pub fn dimension(&self) -> usize {
        self.data.ncols()
    }

    pub fn lower(&self) -> usize {
        self.lower
    }

    pub fn upper(&self) -> usize {
        self.upper
    }

    /// The diagonal-ordered storage, `(lower + upper + 1) x dimension`.
    pub fn storage(&self) -> MatRef<'_, f64> {
        self.data.as_ref()
    }

    /// Entry `A[i, j]`, zero outside of the band.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if self.column_range(j).contains(&i) {
            self.data[(self.upper + i - j, j)]
        } else {
            0.0
        }
    }

    /// Computes `dest = A x`.
    pub fn apply(&self, x: &[f64], dest: &mut [f64]) -> Result<(), BandedError> {
        let n = self.dimension();
        check_len(n, x.len())?;
        check_len(n, dest.len())?;

        dest.fill(0.0);
        for j in 0..n {
            for i in self.column_range(j) {
                dest[i] += self.data[(self.upper + i - j, j)] * x[j];
            }
        }

        Ok(())
    }

    /// Solves `A x = rhs` by LU factorization with partial pivoting.
    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, BandedError> {
        check_len(self.dimension(), rhs.len())?;

        let lu = BandedLu::factor(self)?;
        let mut solution = rhs.to_vec();
        lu.solve_in_place(&mut solution)?;
        Ok(solution)
    }

    /// Rows of column `j` that fall inside the band.
    fn column_range(&self, j: usize) -> std::ops::Range<usize> {
        j.saturating_sub(self.upper)..(j + self.lower + 1).min(self.dimension())
    }
}

fn check_bandwidth(dimension: usize, lower: usize, upper: usize) -> Result<(), BandedError> {
    if lower >= dimension || upper >= dimension {
        return Err(BandedError::InvalidBandwidth {
            lower,
            upper,
            dimension,
        });
    }

    Ok(())
}

fn check_len(expected: usize, found: usize) -> Result<(), BandedError> {
    if expected != found {
        return Err(BandedError::ShapeMismatch { expected, found });
    }

    Ok(())
}

/// Packs a dense square matrix into diagonal-ordered form (see [`BandedMatrix`]).
pub fn diagonal_form(
    matrix: MatRef<'_, f64>,
    lower: usize,
    upper: usize,
) -> Result<Mat<f64>, BandedError> {
    BandedMatrix::from_dense(matrix, lower, upper).map(|banded| banded.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_banded(n: usize, lower: usize, upper: usize, rng: &mut impl Rng) -> Mat<f64> {
        let noise: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();
        Mat::from_fn(n, n, |i, j| {
            if j + lower >= i && i + upper >= j {
                noise[i * n + j]
            } else {
                0.0
            }
        })
    }

    #[test]
    fn layout() {
        let dense = Mat::from_fn(4, 4, |i, j| {
            if i.abs_diff(j) <= 1 {
                (10 * (i + 1) + j + 1) as f64
            } else {
                0.0
            }
        });

        let storage = diagonal_form(dense.as_ref(), 1, 1).unwrap();
        assert_eq!(storage.nrows(), 3);
        assert_eq!(storage.ncols(), 4);

        let expected = [
            [0.0, 12.0, 23.0, 34.0],
            [11.0, 22.0, 33.0, 44.0],
            [21.0, 32.0, 43.0, 0.0],
        ];
        for r in 0..3 {
            for c in 0..4 {
                assert_eq!(storage[(r, c)], expected[r][c]);
            }
        }
    }

    #[test]
    fn asymmetric_layout() {
        let dense = Mat::from_fn(5, 5, |i, j| {
            if j + 1 >= i && i + 2 >= j {
                (i * 5 + j + 1) as f64
            } else {
                0.0
            }
        });
        let banded = BandedMatrix::from_dense(dense.as_ref(), 1, 2).unwrap();
        let storage = banded.storage();

        assert_eq!(storage.nrows(), 4);
        // Second super-diagonal, padded at the front.
        assert_eq!(storage[(0, 0)], 0.0);
        assert_eq!(storage[(0, 1)], 0.0);
        assert_eq!(storage[(0, 2)], dense[(0, 2)]);
        assert_eq!(storage[(0, 4)], dense[(2, 4)]);
        // Main diagonal.
        assert_eq!(storage[(2, 3)], dense[(3, 3)]);
        // Sub-diagonal, padded at the back.
        assert_eq!(storage[(3, 0)], dense[(1, 0)]);
        assert_eq!(storage[(3, 4)], 0.0);
    }

    #[test]
    fn round_trip() {
        let mut rng = rand::rng();

        for (n, lower, upper) in [(1, 0, 0), (6, 1, 1), (7, 2, 0), (7, 0, 3), (9, 3, 2)] {
            let dense = random_banded(n, lower, upper, &mut rng);
            let banded = BandedMatrix::from_dense(dense.as_ref(), lower, upper).unwrap();
            let restored = banded.to_dense();

            for i in 0..n {
                for j in 0..n {
                    assert_eq!(restored[(i, j)], dense[(i, j)]);
                    assert_eq!(banded.get(i, j), dense[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn apply_matches_dense() {
        let mut rng = rand::rng();
        let dense = random_banded(8, 2, 1, &mut rng);
        let banded = BandedMatrix::from_dense(dense.as_ref(), 2, 1).unwrap();

        let x: Vec<f64> = (0..8).map(|i| i as f64 - 3.5).collect();
        let mut result = vec![0.0; 8];
        banded.apply(&x, &mut result).unwrap();

        for i in 0..8 {
            let expected: f64 = (0..8).map(|j| dense[(i, j)] * x[j]).sum();
            assert!((result[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn rejection() {
        let rect = Mat::<f64>::zeros(3, 4);
        assert_eq!(
            BandedMatrix::from_dense(rect.as_ref(), 1, 1).unwrap_err(),
            BandedError::NotSquare { nrows: 3, ncols: 4 }
        );

        let square = Mat::<f64>::zeros(3, 3);
        assert_eq!(
            BandedMatrix::from_dense(square.as_ref(), 3, 0).unwrap_err(),
            BandedError::InvalidBandwidth {
                lower: 3,
                upper: 0,
                dimension: 3
            }
        );
        assert!(BandedMatrix::from_dense(square.as_ref(), 0, 2).is_ok());

        let banded = BandedMatrix::zeros(3, 1, 1).unwrap();
        assert_eq!(
            banded.solve(&[1.0, 2.0]).unwrap_err(),
            BandedError::ShapeMismatch {
                expected: 3,
                found: 2
            }
        );
    }
}
