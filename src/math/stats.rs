//! Goodness-of-fit statistics.
//!
//! The two headline statistics keep their historical forms:
//!
//! - `reduced_chi_squared` is a plain chi-squared sum; it does **not** divide by
//!   the degrees of freedom despite its name.
//! - `bic` is the simplified `χ² + k·ln(N)`, not the Gaussian-likelihood form.
//!
//! The conventional variants are provided next to them (`chi2_per_dof`,
//! `bic_gaussian`) and reported alongside, never substituted.

/// `Σ ((obs − fit)/σ)²`.
pub fn reduced_chi_squared(obs: &[f64], fit: &[f64], sigma: &[f64]) -> f64 {
    debug_assert_eq!(obs.len(), fit.len());
    debug_assert_eq!(obs.len(), sigma.len());
    obs.iter()
        .zip(fit)
        .zip(sigma)
        .map(|((o, f), s)| ((o - f) / s).powi(2))
        .sum::<f64>()
}

/// `chi2 + k·ln(n)`.
pub fn bic(k: usize, n: usize, chi2: f64) -> f64 {
    chi2 + (k as f64) * (n as f64).ln()
}

/// `chi2 / (n − k)`, or NaN when there are no degrees of freedom left.
pub fn chi2_per_dof(chi2: f64, n: usize, k: usize) -> f64 {
    if n <= k {
        return f64::NAN;
    }
    chi2 / (n - k) as f64
}

/// `n·ln(sse/n) + k·ln(n)`.
pub fn bic_gaussian(k: usize, n: usize, sse: f64) -> f64 {
    let n_f = n as f64;
    let sse_per = (sse / n_f).max(1e-300);
    n_f * sse_per.ln() + (k as f64) * n_f.ln()
}

/// Sum of squared residuals.
pub fn sse(obs: &[f64], fit: &[f64]) -> f64 {
    obs.iter().zip(fit).map(|(o, f)| (o - f).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chi_squared_of_perfect_fit_is_zero() {
        let v = reduced_chi_squared(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], &[1.0, 1.0, 1.0]);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn chi_squared_is_not_divided_by_dof() {
        let v = reduced_chi_squared(&[0.0, 2.0], &[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(v, 4.0);
    }

    #[test]
    fn chi_squared_scales_with_sigma() {
        let v = reduced_chi_squared(&[0.0, 2.0], &[0.0, 0.0], &[2.0, 2.0]);
        assert!((v - 1.0).abs() < 1e-15);
    }

    #[test]
    fn bic_adds_parameter_penalty() {
        let v = bic(2, 20, 10.0);
        assert!((v - (10.0 + 2.0 * 20f64.ln())).abs() < 1e-12);
        assert!((v - 15.99).abs() < 0.01);
    }

    #[test]
    fn chi2_per_dof_divides_by_remaining_dof() {
        assert!((chi2_per_dof(18.0, 20, 2) - 1.0).abs() < 1e-15);
        assert!(chi2_per_dof(1.0, 3, 3).is_nan());
    }

    #[test]
    fn gaussian_bic_matches_closed_form() {
        let v = bic_gaussian(3, 10, 20.0);
        let expected = 10.0 * 2f64.ln() + 3.0 * 10f64.ln();
        assert!((v - expected).abs() < 1e-12);
    }
}
