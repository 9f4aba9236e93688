//! Read/write fits JSON files.
//!
//! A fits file is the portable record of one run:
//! - run metadata (tool, UTC timestamp, model set, seed)
//! - the observations the models were fitted to
//! - every fitted model with its parameters, statistics and solver summary
//!
//! The schema is defined by `domain::FitsFile`. Curves are re-evaluated from the
//! parameters when plotting, so no fitted grid is stored.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::Utc;

use crate::domain::{FitConfig, FitResult, FitsFile, Observation};
use crate::error::AppError;

/// Tool name recorded in every fits file.
pub const TOOL_NAME: &str = "chi2fit";

/// Assemble a fits file for the current run.
pub fn build_fits_file(config: &FitConfig, points: &[Observation], fits: &[FitResult]) -> FitsFile {
    FitsFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        model_set: config.model_set,
        seed: config.sample_seed,
        points: points.to_vec(),
        fits: fits.to_vec(),
    }
}

/// Write a fits JSON file.
pub fn write_fits_json(path: &Path, fits: &FitsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fits JSON '{}': {e}", path.display())))?;

    write_fits(BufWriter::new(file), fits)?;
    log::info!("wrote {} fit(s) to {}", fits.fits.len(), path.display());
    Ok(())
}

/// Write a fits file as pretty JSON to any writer, flushing it.
pub fn write_fits<W: Write>(mut out: W, fits: &FitsFile) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut out, fits)
        .map_err(|e| AppError::new(2, format!("Failed to write fits JSON: {e}")))?;
    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush fits JSON: {e}")))
}

/// Read a fits JSON file.
pub fn read_fits_json(path: &Path) -> Result<FitsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fits JSON '{}': {e}", path.display())))?;
    let fits: FitsFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid fits JSON: {e}")))?;

    if fits.fits.iter().any(|f| f.model.params.len() != f.model.kind.param_count()) {
        return Err(AppError::new(
            2,
            "Invalid fits JSON: parameter count does not match model kind.",
        ));
    }
    Ok(fits)
}
