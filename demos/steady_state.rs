//! Solves the steady-state diffusion problem described by a toml file
//! (`demos/steady_state.toml` by default) and logs the resulting profile.

use divi::prelude::*;
use divi_app::file::abs_or_relative;
use std::path::PathBuf;

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demos/steady_state.toml"));
    let path = abs_or_relative(&path)?;

    log::info!("Loading problem from {}", path.display());
    let config = DiffusionConfig::load(&path)?;

    log::info!("Solving steady-state diffusion.");
    let solution = config.solve()?;

    let stride = (solution.positions.len() / 20).max(1);
    for i in (0..solution.positions.len()).step_by(stride) {
        log::info!(
            "x = {:.4}, D = {:.4}, u = {:.6}",
            solution.positions[i],
            solution.diffusivity[i],
            solution.values[i]
        );
    }

    Ok(())
}
