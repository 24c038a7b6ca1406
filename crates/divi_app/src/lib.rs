//! Common utilities used by divi-based applications.
//!
//! Includes helpers for loading and storing toml problem descriptions
//! and for generating grid positions (linear ranges and running sums
//! of spacings).

pub mod file;
pub mod float;
