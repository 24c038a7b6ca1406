use super::{BandedError, BandedMatrix, check_len};

/// LU factorization of a banded matrix with partial (row) pivoting, computed
/// in band storage.
///
/// Row interchanges can push entries of `U` up to `lower` diagonals above the
/// original band, so the factor is stored with `2 * lower + upper + 1` rows:
/// `U[i, j]` at `(kv + i - j, j)` and the multipliers of `L` at
/// `(kv + i - j, j)` for `i > j`, where `kv = lower + upper`.
#[derive(Clone, Debug)]
pub struct BandedLu {
    dimension: usize,
    lower: usize,
    kv: usize,
    /// Row major over diagonals, `rows * dimension` entries.
    factor: Vec<f64>,
    /// Row swapped with row `j` at elimination step `j`.
    pivots: Vec<usize>,
}

impl BandedLu {
    pub fn factor(matrix: &BandedMatrix) -> Result<Self, BandedError> {
        let n = matrix.dimension();
        let lower = matrix.lower();
        let upper = matrix.upper();
        let kv = lower + upper;
        let rows = kv + lower + 1;

        let mut lu = Self {
            dimension: n,
            lower,
            kv,
            factor: vec![0.0; rows * n],
            pivots: vec![0; n],
        };

        // Copy the band below the fill-in rows.
        let storage = matrix.storage();
        for r in 0..=kv {
            for j in 0..n {
                lu.factor[(lower + r) * n + j] = storage[(r, j)];
            }
        }

        for j in 0..n {
            // Rows that may hold nonzeros in column j below the diagonal.
            let km = lower.min(n - 1 - j);
            // Columns that may hold nonzeros in row j of U.
            let last = (j + kv).min(n - 1);

            let pivot = (0..=km)
                .max_by(|&a, &b| lu.at(j + a, j).abs().total_cmp(&lu.at(j + b, j).abs()))
                .unwrap_or(0);
            lu.pivots[j] = j + pivot;

            let value = lu.at(j + pivot, j);
            if value == 0.0 || !value.is_finite() {
                return Err(BandedError::SingularSystem { column: j });
            }

            if pivot != 0 {
                for c in j..=last {
                    let a = lu.index(j, c);
                    let b = lu.index(j + pivot, c);
                    lu.factor.swap(a, b);
                }
            }

            for r in 1..=km {
                let index = lu.index(j + r, j);
                lu.factor[index] /= value;
            }

            for c in j + 1..=last {
                let u = lu.at(j, c);
                if u == 0.0 {
                    continue;
                }

                for r in 1..=km {
                    let l = lu.at(j + r, j);
                    let index = lu.index(j + r, c);
                    lu.factor[index] -= l * u;
                }
            }
        }

        Ok(lu)
    }

    /// Overwrites `rhs` with the solution of `A x = rhs`.
    pub fn solve_in_place(&self, rhs: &mut [f64]) -> Result<(), BandedError> {
        let n = self.dimension;
        check_len(n, rhs.len())?;

        // Forward substitution with L (unit diagonal), applying the row swaps.
        for j in 0..n {
            rhs.swap(j, self.pivots[j]);

            let km = self.lower.min(n - 1 - j);
            for r in 1..=km {
                rhs[j + r] -= self.at(j + r, j) * rhs[j];
            }
        }

        // Backward substitution with U.
        for j in (0..n).rev() {
            rhs[j] /= self.at(j, j);

            for i in j.saturating_sub(self.kv)..j {
                rhs[i] -= self.at(i, j) * rhs[j];
            }
        }

        Ok(())
    }

    /// Position of entry `(i, j)` in the factor storage. Only valid for
    /// `j <= i + kv` and `i <= j + lower`.
    fn index(&self, i: usize, j: usize) -> usize {
        (self.kv + i - j) * self.dimension + j
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.factor[self.index(i, j)]
    }
}
