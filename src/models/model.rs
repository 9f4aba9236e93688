//! Model evaluation for every candidate model kind.
//!
//! The fitter relies on two primitive operations:
//! - predict `y(x)` given a parameter vector (for residuals/plots)
//! - the default starting point of the nonlinear fit
//!
//! These are implemented here for each model kind.

use std::f64::consts::PI;

use crate::domain::ModelKind;

/// Predict `y(x)` for the given model kind.
///
/// # Panics
/// Panics if `params` is shorter than `model.param_count()`. Callers should size
/// the parameter vector correctly.
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> f64 {
    match model {
        ModelKind::Linear => params[0] * x + params[1],
        ModelKind::Quadratic => params[0] * x * x + params[1] * x + params[2],
        ModelKind::Sinusoidal => {
            params[0] * (params[1] * x + params[2]).sin() + params[3] * x + params[4]
        }
        ModelKind::LinearEphemeris => params[0] + params[1] * x,
        ModelKind::QuadraticEphemeris => params[0] + params[1] * x + 0.5 * params[2] * x * x,
        ModelKind::Precession => {
            let (t0, period, ecc, dw_de, w0) = (params[0], params[1], params[2], params[3], params[4]);
            // Anomalistic period from the sidereal period and the precession rate.
            let p_anom = period / (1.0 - dw_de / (2.0 * PI));
            t0 + period * x - (ecc * p_anom / PI) * (w0 + dw_de * x).cos()
        }
    }
}

/// Predict over a slice of x-values.
pub fn predict_many(model: ModelKind, xs: &[f64], params: &[f64]) -> Vec<f64> {
    xs.iter().map(|&x| predict(model, x, params)).collect()
}

/// Default starting point: every parameter at 1.
pub fn default_guess(model: ModelKind) -> Vec<f64> {
    vec![1.0; model.param_count()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polynomial_models_evaluate() {
        assert_eq!(predict(ModelKind::Linear, 2.0, &[3.0, 1.0]), 7.0);
        assert_eq!(predict(ModelKind::Quadratic, 2.0, &[1.0, -1.0, 0.5]), 2.5);
        assert_eq!(predict(ModelKind::LinearEphemeris, 2.0, &[3.0, 1.0]), 5.0);
        assert_eq!(predict(ModelKind::QuadraticEphemeris, 2.0, &[1.0, 1.0, 1.0]), 5.0);
    }

    #[test]
    fn sinusoid_reduces_to_line_without_amplitude() {
        let y = predict(ModelKind::Sinusoidal, 4.0, &[0.0, 1.3, 0.2, 2.0, -1.0]);
        assert!((y - 7.0).abs() < 1e-15);
    }

    #[test]
    fn precession_reduces_to_linear_ephemeris_without_eccentricity() {
        let params = [10.0, 2.0, 0.0, 0.1, 0.3];
        for x in [0.0, 1.0, 5.5] {
            let y = predict(ModelKind::Precession, x, &params);
            assert!((y - (10.0 + 2.0 * x)).abs() < 1e-12);
        }
    }

    #[test]
    fn precession_amplitude_uses_anomalistic_period() {
        // dw/dE = π gives P_a = 2P; at E=0 with w0=0: T0 − e·2P/π.
        let y = predict(ModelKind::Precession, 0.0, &[0.0, 1.0, 0.5, PI, 0.0]);
        assert!((y + 1.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn default_guess_matches_param_count() {
        assert_eq!(default_guess(ModelKind::Precession), vec![1.0; 5]);
        assert_eq!(default_guess(ModelKind::Linear).len(), 2);
    }
}
