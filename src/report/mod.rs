//! Reporting utilities: residuals and formatted terminal output.

use crate::domain::{FitResult, ModelKind, Observation, Residual};
use crate::error::AppError;
use crate::models::predict;

pub mod format;

pub use format::*;

/// Residuals of every observation against one fitted model.
#[derive(Debug, Clone)]
pub struct ModelResiduals {
    pub model: ModelKind,
    pub rows: Vec<Residual>,
}

/// Compute fitted values and residuals for each observation.
pub fn compute_residuals(points: &[Observation], fit: &FitResult) -> Result<Vec<Residual>, AppError> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let y_fit = predict(fit.model.kind, p.x, &fit.model.params);
        if !y_fit.is_finite() {
            return Err(AppError::new(
                4,
                format!(
                    "Non-finite {} prediction during residual computation.",
                    fit.model.display_name
                ),
            ));
        }
        out.push(Residual {
            point: p.clone(),
            y_fit,
            residual: p.y_obs - y_fit,
        });
    }
    Ok(out)
}

/// Residuals for every fitted model, in the order of `fits`.
pub fn compute_all_residuals(
    points: &[Observation],
    fits: &[FitResult],
) -> Result<Vec<ModelResiduals>, AppError> {
    fits.iter()
        .map(|fit| {
            Ok(ModelResiduals {
                model: fit.model.kind,
                rows: compute_residuals(points, fit)?,
            })
        })
        .collect()
}
