//! One dimensional grids on which operators are assembled.

mod axis;

pub use axis::{Axis, AxisError, check_increasing};
