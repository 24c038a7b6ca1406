//! Finite-difference operators on non-uniform one dimensional grids and a
//! banded solver for steady-state diffusion profiles.

#![allow(clippy::needless_range_loop)]

pub mod banded;
pub mod config;
pub mod diffusion;
pub mod geometry;
pub mod operator;
pub mod profile;
pub mod stencil;

/// Provides common types used by most `divi` applications.
pub mod prelude {
    pub use crate::banded::{BandedError, BandedMatrix, diagonal_form};
    pub use crate::config::{AxisConfig, DiffusionConfig, DiffusionSolution};
    pub use crate::diffusion::{DiffusionError, DiffusionSolver};
    pub use crate::geometry::{Axis, AxisError};
    pub use crate::operator::{
        DifferenceOperator, OperatorError, apply_operator, build_difference_operator,
    };
    pub use crate::profile::{ProfileParams, smooth_transport_profile};
    pub use crate::stencil::{StencilError, StencilSolver, fd_weights};
}
