//! Export per-point results to CSV.
//!
//! One row per observation per fitted model, meant to be easy to consume in
//! spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;
use crate::report::ModelResiduals;

/// Write per-point results for every model to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[ModelResiduals]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    write_results(&mut writer, residuals)?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    log::info!("wrote {} model(s) to {}", residuals.len(), path.display());
    Ok(())
}

/// Write the CSV rows to any writer.
pub fn write_results<W: Write>(mut out: W, residuals: &[ModelResiduals]) -> Result<(), AppError> {
    writeln!(out, "model,index,x,y_obs,sigma,y_fit,residual,pull")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for model in residuals {
        for r in &model.rows {
            let p = &r.point;
            let pull = r.residual / p.sigma;
            writeln!(
                out,
                "{},{},{:.10},{:.6},{:.6},{:.6},{:.6},{:.6}",
                model.model.display_name(),
                p.index,
                p.x,
                p.y_obs,
                p.sigma,
                r.y_fit,
                r.residual,
                pull,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}
