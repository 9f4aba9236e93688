//! Least-squares solves for the damped Levenberg–Marquardt step.
//!
//! Each LM iteration solves a tiny `k × k` system (k ≤ 5):
//!
//! ```text
//! (JᵀJ + λ·D) δ = −Jᵀr
//! ```
//!
//! The matrix is symmetric positive definite whenever the damping is positive
//! and the Jacobian is not degenerate, so Cholesky is tried first. When the
//! Jacobian loses rank (e.g. a sinusoid whose amplitude collapsed to zero makes
//! its phase and frequency columns vanish) Cholesky fails and we fall back to an
//! SVD least-squares solve.

use nalgebra::{DMatrix, DVector};

/// Solve a symmetric positive definite system, falling back to SVD.
///
/// Returns `None` if neither decomposition produces a finite solution.
pub fn solve_normal_equations(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }
    solve_least_squares(a, b)
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
