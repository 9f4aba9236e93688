//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sample generation -> fit every model -> selection -> residuals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::info;

use crate::data::{SampleData, generate_sample};
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::fit::selection::{FitSelection, fit_and_select};
use crate::report::{ModelResiduals, compute_all_residuals};

/// All computed outputs of a single `chi2fit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    pub selection: FitSelection,
    /// Residuals per fitted model, in the order of `selection.fits`.
    pub residuals: Vec<ModelResiduals>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Generate the synthetic dataset.
    let sample = generate_sample(config)?;
    info!(
        "generated {} points (seed={}, noise={})",
        sample.points.len(),
        config.sample_seed,
        config.noise
    );

    // 2) Fit every requested model and select the preferred one.
    let selection = fit_and_select(&sample.points, config)?;
    info!(
        "fitted {} model(s), skipped {}; preferred: {}",
        selection.fits.len(),
        selection.skipped.len(),
        selection.best.model.display_name
    );

    // 3) Residuals for plotting/export.
    let residuals = compute_all_residuals(&sample.points, &selection.fits)?;

    Ok(RunOutput {
        sample,
        selection,
        residuals,
    })
}
