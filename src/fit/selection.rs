//! Model comparison using chi-squared and BIC.
//!
//! The tool fits each enabled model and computes:
//! - χ² = Σ ((y − ŷ)/σ)² (plain sum, see `math::stats`)
//! - BIC = χ² + k·ln(n)
//!
//! Selection rules:
//! 1. Skip models with no degrees of freedom left: require `n ≥ k + 1`
//! 2. Choose the model with minimum BIC
//! 3. If a simpler model is within 2 BIC of the best, pick the simplest such model

use log::{info, warn};

use crate::domain::{
    FitConfig, FitQuality, FitResult, FittedModel, ModelKind, ModelSpec, Observation, SolverSummary,
};
use crate::error::AppError;
use crate::fit::fitter::{FitOptions, ModelFit, fit_model};
use crate::fit::starts::start_grid;
use crate::math::{LmConfig, bic, bic_gaussian, chi2_per_dof, reduced_chi_squared, sse};
use crate::models::predict_many;

/// Minimum number of observations beyond the parameter count.
const MIN_DOF: usize = 1;

/// BIC difference below which the simpler model is preferred.
const BIC_SIMPLICITY_MARGIN: f64 = 2.0;

/// Output of fitting + selection.
#[derive(Debug, Clone)]
pub struct FitSelection {
    pub best: FitResult,
    /// Fits for all attempted models, in set order (simplest first).
    pub fits: Vec<FitResult>,
    /// Any models that were skipped and why (for diagnostics).
    pub skipped: Vec<(ModelKind, String)>,
}

impl FitSelection {
    /// `BIC − min BIC` for each fit, in the order of `fits`.
    pub fn delta_bic(&self) -> Vec<f64> {
        delta_bic(&self.fits)
    }
}

/// Fit every requested model to `points` and select the preferred one.
pub fn fit_and_select(points: &[Observation], config: &FitConfig) -> Result<FitSelection, AppError> {
    let n = points.len();
    let model_kinds = config.model_spec.resolve(config.model_set);

    let opts = FitOptions {
        lm: LmConfig {
            max_evals: config.max_evals,
            ..LmConfig::default()
        },
    };

    let mut fits = Vec::new();
    let mut skipped = Vec::new();

    for kind in model_kinds {
        let k = kind.param_count();
        if n < k + MIN_DOF {
            let reason = format!("Underdetermined: n={n} < k+{MIN_DOF}={}", k + MIN_DOF);
            warn!("skipping {}: {reason}", kind.display_name());
            skipped.push((kind, reason));
            continue;
        }

        let starts = start_grid(kind, config.starts)?;
        let fit = fit_model(kind, points, &starts, &opts)?;
        let result = to_fit_result(fit, points);
        info!(
            "{}: chi2={:.3} bic={:.3}",
            result.model.display_name, result.quality.chi2, result.quality.bic
        );
        fits.push(result);
    }

    if fits.is_empty() {
        return Err(AppError::new(
            3,
            "Insufficient data to fit any model after guardrails.",
        ));
    }

    // If the user requested a single model, it's already the best.
    let best = if config.model_spec == ModelSpec::All {
        select_by_bic(&fits)
    } else {
        fits[0].clone()
    };

    Ok(FitSelection {
        best,
        fits,
        skipped,
    })
}

fn to_fit_result(fit: ModelFit, points: &[Observation]) -> FitResult {
    let n = points.len();
    let k = fit.model.param_count();

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y_obs).collect();
    let sigmas: Vec<f64> = points.iter().map(|p| p.sigma).collect();
    let y_fit = predict_many(fit.model, &xs, &fit.params);

    // Statistics are recomputed from the final parameters so chi2 and SSE agree.
    let chi2 = reduced_chi_squared(&ys, &y_fit, &sigmas);
    let sse = sse(&ys, &y_fit);
    let rmse = (sse / n as f64).sqrt();

    FitResult {
        model: FittedModel {
            kind: fit.model,
            display_name: fit.model.display_name().to_string(),
            params: fit.params,
        },
        quality: FitQuality {
            chi2,
            chi2_per_dof: chi2_per_dof(chi2, n, k),
            bic: bic(k, n, chi2),
            bic_gaussian: bic_gaussian(k, n, sse),
            sse,
            rmse,
            n,
            k,
        },
        solver: SolverSummary {
            iterations: fit.iterations,
            evals: fit.evals,
            start: fit.start,
            message: fit.message,
        },
    }
}

/// `BIC − min BIC` for each fit.
pub fn delta_bic(fits: &[FitResult]) -> Vec<f64> {
    let min = fits
        .iter()
        .map(|f| f.quality.bic)
        .fold(f64::INFINITY, f64::min);
    fits.iter().map(|f| f.quality.bic - min).collect()
}

fn select_by_bic(fits: &[FitResult]) -> FitResult {
    // Find minimum BIC.
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.quality.bic < best.quality.bic {
            best = f;
        }
    }

    let best_bic = best.quality.bic;

    // Prefer simplicity if within the margin: walk by increasing parameter count
    // and pick the first fit that is close enough to the best.
    let mut by_complexity: Vec<&FitResult> = fits.iter().collect();
    by_complexity.sort_by_key(|f| f.quality.k);
    for f in by_complexity {
        if f.quality.bic <= best_bic + BIC_SIMPLICITY_MARGIN {
            return f.clone();
        }
    }

    best.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelSet;

    fn fit_with(kind: ModelKind, bic: f64) -> FitResult {
        FitResult {
            model: FittedModel {
                kind,
                display_name: kind.display_name().to_string(),
                params: vec![],
            },
            quality: FitQuality {
                chi2: 0.0,
                chi2_per_dof: 0.0,
                bic,
                bic_gaussian: 0.0,
                sse: 0.0,
                rmse: 0.0,
                n: 20,
                k: kind.param_count(),
            },
            solver: SolverSummary {
                iterations: 0,
                evals: 0,
                start: 0,
                message: String::new(),
            },
        }
    }

    fn linear_points(n: usize) -> Vec<Observation> {
        crate::math::linspace(0.0, 10.0, n)
            .into_iter()
            .enumerate()
            .map(|(index, x)| Observation {
                index,
                x,
                y_obs: x,
                sigma: 1.0,
            })
            .collect()
    }

    #[test]
    fn bic_prefers_simpler_when_close() {
        let fits = vec![
            fit_with(ModelKind::Linear, 10.0),
            fit_with(ModelKind::Quadratic, 8.5),
        ];
        let chosen = select_by_bic(&fits);
        assert_eq!(chosen.model.kind, ModelKind::Linear);
    }

    #[test]
    fn bic_keeps_complex_model_when_clearly_better() {
        let fits = vec![
            fit_with(ModelKind::Linear, 30.0),
            fit_with(ModelKind::Quadratic, 20.0),
            fit_with(ModelKind::Sinusoidal, 21.5),
        ];
        let chosen = select_by_bic(&fits);
        assert_eq!(chosen.model.kind, ModelKind::Quadratic);
    }

    #[test]
    fn delta_bic_is_relative_to_minimum() {
        let fits = vec![
            fit_with(ModelKind::Linear, 12.0),
            fit_with(ModelKind::Quadratic, 10.0),
        ];
        assert_eq!(delta_bic(&fits), vec![2.0, 0.0]);
    }

    #[test]
    fn fit_and_select_skips_underdetermined() {
        let points = linear_points(3);
        let config = FitConfig {
            model_spec: ModelSpec::Periodic,
            ..FitConfig::default()
        };
        let err = fit_and_select(&points, &config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn underdetermined_models_are_reported_not_fatal() {
        let points = linear_points(4);
        let config = FitConfig {
            model_spec: ModelSpec::All,
            ..FitConfig::default()
        };
        let selection = fit_and_select(&points, &config).unwrap();
        assert_eq!(selection.fits.len(), 2);
        assert_eq!(selection.skipped.len(), 1);
        assert_eq!(selection.skipped[0].0, ModelKind::Sinusoidal);
    }

    #[test]
    fn statistics_use_plain_chi2_and_bic() {
        let points = linear_points(20);
        let config = FitConfig {
            model_spec: ModelSpec::Linear,
            ..FitConfig::default()
        };
        let selection = fit_and_select(&points, &config).unwrap();
        let q = &selection.best.quality;
        assert!(q.chi2 < 1e-10);
        assert!((q.bic - (q.chi2 + 2.0 * 20f64.ln())).abs() < 1e-12);
        assert_eq!(q.n, 20);
        assert_eq!(q.k, 2);
    }

    #[test]
    fn linear_data_prefers_linear_ephemeris() {
        let points: Vec<Observation> = linear_points(20)
            .into_iter()
            .map(|mut p| {
                // Small deterministic wiggle so chi2 is not identically zero.
                p.y_obs += if p.index % 2 == 0 { 0.1 } else { -0.1 };
                p
            })
            .collect();
        let config = FitConfig {
            model_set: ModelSet::Ephemeris,
            model_spec: ModelSpec::All,
            starts: 4,
            ..FitConfig::default()
        };

        let selection = fit_and_select(&points, &config).unwrap();
        assert_eq!(selection.best.model.kind, ModelKind::LinearEphemeris);
        assert_eq!(selection.delta_bic().len(), selection.fits.len());
    }
}
