use divi_app::float::lin_range;
use thiserror::Error;

/// Reasons a sequence of positions can not be used as a grid axis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    #[error("axis has {len} points but at least {required} are required")]
    TooShort { len: usize, required: usize },
    #[error("axis is not strictly increasing at index {index} ({left} >= {right})")]
    NotIncreasing { index: usize, left: f64, right: f64 },
    #[error("axis position {index} is not finite")]
    NonFinite { index: usize },
}

/// Checks that every position is finite and every consecutive difference
/// is strictly positive.
pub fn check_increasing(positions: &[f64]) -> Result<(), AxisError> {
    if let Some(index) = positions.iter().position(|x| !x.is_finite()) {
        return Err(AxisError::NonFinite { index });
    }

    for (index, pair) in positions.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(AxisError::NotIncreasing {
                index: index + 1,
                left: pair[0],
                right: pair[1],
            });
        }
    }

    Ok(())
}

/// An ordered set of strictly increasing grid positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    positions: Box<[f64]>,
}

impl Axis {
    /// Smallest number of points an axis may hold.
    pub const MIN_POINTS: usize = 3;

    pub fn new(positions: impl Into<Vec<f64>>) -> Result<Self, AxisError> {
        let positions = positions.into();

        if positions.len() < Self::MIN_POINTS {
            return Err(AxisError::TooShort {
                len: positions.len(),
                required: Self::MIN_POINTS,
            });
        }

        check_increasing(&positions)?;

        Ok(Self {
            positions: positions.into_boxed_slice(),
        })
    }

    /// Evenly spaced axis spanning `[start, end]`.
    pub fn uniform(start: f64, end: f64, points: usize) -> Result<Self, AxisError> {
        Self::new(lin_range(start, end, points).collect::<Vec<_>>())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn start(&self) -> f64 {
        self.positions[0]
    }

    pub fn end(&self) -> f64 {
        self.positions[self.positions.len() - 1]
    }

    /// Distances between consecutive positions.
    pub fn spacing(&self) -> impl Iterator<Item = f64> + '_ {
        self.positions.windows(2).map(|pair| pair[1] - pair[0])
    }

    pub fn min_spacing(&self) -> f64 {
        self.spacing().fold(f64::INFINITY, f64::min)
    }
}

impl AsRef<[f64]> for Axis {
    fn as_ref(&self) -> &[f64] {
        &self.positions
    }
}
