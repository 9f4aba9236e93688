//! Low-level fitting routine for a single model kind.
//!
//! Given:
//! - samples `x_i`
//! - observed values `y_i`
//! - a list of starting guesses
//!
//! we run Levenberg–Marquardt from every start and return the best (lowest SSE)
//! converged candidate.

use log::{debug, warn};
use nalgebra::DVector;
use rayon::prelude::*;

use crate::domain::{ModelKind, Observation};
use crate::error::{AppError, FitError};
use crate::math::{LmConfig, LmOutcome, minimize};
use crate::models::predict;

/// Fitting options that affect how each model is calibrated.
#[derive(Debug, Clone, Default)]
pub struct FitOptions {
    pub lm: LmConfig,
}

/// Best fit for a single model kind.
#[derive(Debug, Clone)]
pub struct ModelFit {
    pub model: ModelKind,
    pub params: Vec<f64>,
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
    pub evals: usize,
    /// Index of the winning start.
    pub start: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
struct Candidate {
    idx: usize,
    outcome: LmOutcome,
}

/// Fit a single model kind from each start in `starts`.
pub fn fit_model(
    model: ModelKind,
    points: &[Observation],
    starts: &[Vec<f64>],
    opts: &FitOptions,
) -> Result<ModelFit, AppError> {
    if points.is_empty() {
        return Err(AppError::new(3, "No data points to fit."));
    }
    if starts.is_empty() {
        return Err(AppError::new(4, "Start grid is empty."));
    }
    if points.iter().any(|p| !(p.x.is_finite() && p.y_obs.is_finite())) {
        return Err(AppError::new(2, "Non-finite observation in dataset."));
    }
    if let Some(bad) = starts.iter().find(|s| s.len() != model.param_count()) {
        return Err(FitError::DimensionMismatch(format!(
            "{} expects {} parameters, start has {}",
            model.display_name(),
            model.param_count(),
            bad.len()
        ))
        .into());
    }

    let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.y_obs).collect();
    let n = xs.len();

    // Evaluate each start independently (parallel).
    let results: Vec<(usize, Result<LmOutcome, FitError>)> = starts
        .par_iter()
        .enumerate()
        .map(|(idx, start)| {
            let residuals = |p: &DVector<f64>| {
                DVector::from_iterator(
                    n,
                    xs.iter()
                        .zip(ys.iter())
                        .map(|(&x, &y)| y - predict(model, x, p.as_slice())),
                )
            };
            (idx, minimize(residuals, start, &opts.lm))
        })
        .collect();

    let mut candidates = Vec::new();
    let mut first_err = None;
    for (idx, res) in results {
        match res {
            Ok(outcome) => candidates.push(Candidate { idx, outcome }),
            Err(e) => {
                if starts.len() > 1 {
                    warn!("{} start {idx} failed: {e}", model.display_name());
                }
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
    }

    if candidates.is_empty() {
        let err = first_err.map(|e| e.to_string()).unwrap_or_default();
        return Err(AppError::new(
            4,
            format!("{} fit failed: {err}", model.display_name()),
        ));
    }

    // Deterministic selection: pick the minimum SSE; break ties by start index.
    let mut best = &candidates[0];
    for c in &candidates[1..] {
        if c.outcome.cost < best.outcome.cost
            || (c.outcome.cost == best.outcome.cost && c.idx < best.idx)
        {
            best = c;
        }
    }

    debug!(
        "{} fit: start={} iterations={} evals={} sse={:.6} ({})",
        model.display_name(),
        best.idx,
        best.outcome.iterations,
        best.outcome.evals,
        best.outcome.cost,
        best.outcome.message
    );

    let rmse = (best.outcome.cost / n as f64).sqrt();
    Ok(ModelFit {
        model,
        params: best.outcome.params.clone(),
        sse: best.outcome.cost,
        rmse,
        iterations: best.outcome.iterations,
        evals: best.outcome.evals,
        start: best.idx,
        message: best.outcome.message.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::starts::start_grid;
    use crate::models::default_guess;

    fn points_from(xs: &[f64], f: impl Fn(f64) -> f64) -> Vec<Observation> {
        xs.iter()
            .enumerate()
            .map(|(index, &x)| Observation {
                index,
                x,
                y_obs: f(x),
                sigma: 1.0,
            })
            .collect()
    }

    fn xs() -> Vec<f64> {
        crate::math::linspace(0.0, 10.0, 20)
    }

    #[test]
    fn linear_model_recovers_noise_free_line() {
        let points = points_from(&xs(), |x| 1.7 * x - 0.4);
        let starts = vec![default_guess(ModelKind::Linear)];
        let fit = fit_model(ModelKind::Linear, &points, &starts, &FitOptions::default()).unwrap();

        assert!((fit.params[0] - 1.7).abs() < 1e-6, "{:?}", fit.params);
        assert!((fit.params[1] + 0.4).abs() < 1e-6, "{:?}", fit.params);
        assert!(fit.sse < 1e-10);
    }

    #[test]
    fn quadratic_term_vanishes_on_linear_data() {
        let points = points_from(&xs(), |x| x);
        let starts = vec![default_guess(ModelKind::Quadratic)];
        let fit = fit_model(ModelKind::Quadratic, &points, &starts, &FitOptions::default()).unwrap();

        assert!(fit.params[0].abs() < 1e-6, "{:?}", fit.params);
        assert!((fit.params[1] - 1.0).abs() < 1e-6, "{:?}", fit.params);
        assert!(fit.params[2].abs() < 1e-6, "{:?}", fit.params);
    }

    #[test]
    fn ephemeris_quadratic_recovers_period_derivative() {
        let points = points_from(&xs(), |e| 2.0 + 3.0 * e + 0.5 * 0.02 * e * e);
        let starts = vec![default_guess(ModelKind::QuadraticEphemeris)];
        let fit =
            fit_model(ModelKind::QuadraticEphemeris, &points, &starts, &FitOptions::default()).unwrap();

        assert!((fit.params[0] - 2.0).abs() < 1e-6);
        assert!((fit.params[1] - 3.0).abs() < 1e-6);
        assert!((fit.params[2] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn near_truth_start_recovers_sinusoid() {
        let points = points_from(&crate::math::linspace(0.0, 10.0, 60), |x| {
            2.0 * (1.5 * x + 0.3).sin() + 0.5 * x + 1.0
        });
        let starts = vec![
            default_guess(ModelKind::Sinusoidal),
            vec![1.8, 1.45, 0.35, 0.5, 1.0],
        ];
        let fit = fit_model(ModelKind::Sinusoidal, &points, &starts, &FitOptions::default()).unwrap();

        assert!(fit.sse < 1e-8, "sse={} params={:?}", fit.sse, fit.params);
        assert!((fit.rmse - (fit.sse / 60.0).sqrt()).abs() < 1e-15);
    }

    #[test]
    fn start_grid_never_worse_than_default_start() {
        let points = points_from(&crate::math::linspace(0.0, 10.0, 40), |x| {
            1.5 * (0.8 * x).sin() + x
        });
        let opts = FitOptions::default();
        let grid = start_grid(ModelKind::Sinusoidal, 6).unwrap();

        let single = fit_model(ModelKind::Sinusoidal, &points, &grid[..1], &opts).unwrap();
        let multi = fit_model(ModelKind::Sinusoidal, &points, &grid, &opts).unwrap();
        assert!(multi.sse <= single.sse);
        assert!(multi.start < grid.len());
    }

    #[test]
    fn identical_starts_break_ties_by_index() {
        let points = points_from(&xs(), |x| x);
        let starts = vec![default_guess(ModelKind::Linear); 3];
        let fit = fit_model(ModelKind::Linear, &points, &starts, &FitOptions::default()).unwrap();
        assert_eq!(fit.start, 0);
    }

    #[test]
    fn exhausted_budget_propagates_as_numerical_error() {
        let points = points_from(&xs(), |x| x);
        let starts = vec![default_guess(ModelKind::Quadratic)];
        let opts = FitOptions {
            lm: LmConfig {
                max_evals: Some(4),
                ..LmConfig::default()
            },
        };
        let err = fit_model(ModelKind::Quadratic, &points, &starts, &opts).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("Quadratic fit failed"));
    }

    #[test]
    fn wrong_start_length_is_rejected() {
        let points = points_from(&xs(), |x| x);
        let err = fit_model(ModelKind::Linear, &points, &[vec![1.0; 3]], &FitOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_dataset_is_insufficient_data() {
        let err = fit_model(
            ModelKind::Linear,
            &[],
            &[default_guess(ModelKind::Linear)],
            &FitOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
