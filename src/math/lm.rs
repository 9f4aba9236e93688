//! Levenberg–Marquardt nonlinear least squares.
//!
//! Given a residual function `r(θ)` (observed minus model), we minimize
//! `Σ r_i(θ)²` by repeatedly solving the damped normal equations
//!
//! ```text
//! (JᵀJ + λ·D) δ = −Jᵀr,    D = diag(JᵀJ)
//! ```
//!
//! where `J = ∂r/∂θ` is approximated by forward finite differences. Accepted
//! steps shrink `λ` (towards Gauss–Newton), rejected steps grow it (towards
//! scaled gradient descent).
//!
//! Convergence tests follow the MINPACK family:
//! - gradient: the largest cosine between `r` and a Jacobian column is `≤ gtol`
//! - step: `‖δ‖ ≤ xtol·(‖θ‖ + xtol)`
//! - cost: the relative reduction of an accepted step is `≤ ftol`
//! - stall: `λ` saturates without finding a lower cost
//!
//! Running out of function evaluations is the only non-convergence outcome.

use nalgebra::DVector;

use crate::error::FitError;
use crate::math::ols::solve_normal_equations;

const MIN_LAMBDA: f64 = 1e-12;
const MAX_LAMBDA: f64 = 1e12;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;

/// Floor on the Marquardt scaling so degenerate columns still receive damping.
const DIAG_FLOOR: f64 = 1e-12;

/// Solver settings.
#[derive(Debug, Clone)]
pub struct LmConfig {
    /// Function-evaluation budget (Jacobian columns included).
    /// `None` uses `200·(k+1)` for `k` parameters.
    pub max_evals: Option<usize>,
    pub ftol: f64,
    pub xtol: f64,
    pub gtol: f64,
    pub initial_lambda: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_evals: None,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 0.0,
            initial_lambda: 1e-3,
        }
    }
}

impl LmConfig {
    pub fn eval_budget(&self, n_params: usize) -> usize {
        self.max_evals.unwrap_or(200 * (n_params + 1))
    }
}

/// Result of a converged minimization.
#[derive(Debug, Clone)]
pub struct LmOutcome {
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    pub residuals: Vec<f64>,
    /// Accepted steps.
    pub iterations: usize,
    pub evals: usize,
    pub message: String,
}

/// Minimize `Σ r(θ)²` starting from `x0`.
pub fn minimize<F>(residual_fn: F, x0: &[f64], config: &LmConfig) -> Result<LmOutcome, FitError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let k = x0.len();
    if k == 0 {
        return Err(FitError::DimensionMismatch("no parameters to fit".to_string()));
    }
    let max_evals = config.eval_budget(k);

    let mut p = DVector::from_column_slice(x0);
    let mut r = residual_fn(&p);
    let mut evals = 1usize;

    let m = r.len();
    if m < k {
        return Err(FitError::DimensionMismatch(format!(
            "{k} parameters exceed {m} residuals"
        )));
    }
    if !r.iter().all(|v| v.is_finite()) {
        return Err(FitError::NonFinite(p.iter().copied().collect()));
    }

    let mut cost = r.norm_squared();
    let mut lambda = config.initial_lambda;
    let mut iterations = 0usize;

    let finish = |p: &DVector<f64>, r: &DVector<f64>, cost: f64, iterations, evals, message: &str| {
        LmOutcome {
            params: p.iter().copied().collect(),
            cost,
            residuals: r.iter().copied().collect(),
            iterations,
            evals,
            message: message.to_string(),
        }
    };

    if evals + k > max_evals {
        return Err(FitError::NonConvergence { evals, max_evals });
    }
    let mut jac = jacobian(&residual_fn, &p, &r)?;
    evals += k;

    loop {
        if cost == 0.0 {
            return Ok(finish(&p, &r, cost, iterations, evals, "exact fit: residuals vanish"));
        }

        let g = jac.transpose() * &r;

        let r_norm = cost.sqrt();
        let mut g_cos = 0.0_f64;
        for j in 0..k {
            let col_norm = jac.column(j).norm();
            if col_norm > 0.0 {
                g_cos = g_cos.max(g[j].abs() / (col_norm * r_norm));
            }
        }
        if g_cos <= config.gtol {
            return Ok(finish(&p, &r, cost, iterations, evals, "gradient orthogonal to residuals"));
        }

        let jtj = jac.transpose() * &jac;
        let rhs = -&g;

        // Inner loop: adjust damping until a step lowers the cost.
        loop {
            if evals >= max_evals {
                return Err(FitError::NonConvergence { evals, max_evals });
            }

            let mut a = jtj.clone();
            for i in 0..k {
                a[(i, i)] += lambda * jtj[(i, i)].max(DIAG_FLOOR);
            }
            let delta = solve_normal_equations(&a, &rhs).ok_or(FitError::SingularSystem)?;

            let step_small = delta.norm() <= config.xtol * (p.norm() + config.xtol);

            let p_try = &p + &delta;
            let r_try = residual_fn(&p_try);
            evals += 1;

            let cost_try = if r_try.iter().all(|v| v.is_finite()) {
                r_try.norm_squared()
            } else {
                f64::INFINITY
            };

            if cost_try < cost {
                let reduction = (cost - cost_try) / cost;
                p = p_try;
                r = r_try;
                cost = cost_try;
                lambda = (lambda * LAMBDA_DOWN).max(MIN_LAMBDA);
                iterations += 1;

                if step_small {
                    return Ok(finish(&p, &r, cost, iterations, evals, "step below xtol"));
                }
                if reduction <= config.ftol {
                    return Ok(finish(&p, &r, cost, iterations, evals, "relative cost reduction below ftol"));
                }

                if evals + k > max_evals {
                    return Err(FitError::NonConvergence { evals, max_evals });
                }
                jac = jacobian(&residual_fn, &p, &r)?;
                evals += k;
                break;
            }

            if step_small {
                return Ok(finish(&p, &r, cost, iterations, evals, "step below xtol"));
            }
            if lambda >= MAX_LAMBDA {
                return Ok(finish(&p, &r, cost, iterations, evals, "no further reduction possible"));
            }
            lambda = (lambda * LAMBDA_UP).min(MAX_LAMBDA);
        }
    }
}

/// Forward-difference Jacobian `J[i, j] = ∂r_i/∂θ_j`.
fn jacobian<F>(
    residual_fn: &F,
    p: &DVector<f64>,
    r: &DVector<f64>,
) -> Result<nalgebra::DMatrix<f64>, FitError>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let m = r.len();
    let k = p.len();
    let eps = f64::EPSILON.sqrt();
    let mut jac = nalgebra::DMatrix::<f64>::zeros(m, k);

    for j in 0..k {
        let h = eps * p[j].abs().max(1.0);
        let mut p_h = p.clone();
        p_h[j] += h;
        let r_h = residual_fn(&p_h);
        if r_h.len() != m {
            return Err(FitError::DimensionMismatch(format!(
                "residual length changed from {m} to {}",
                r_h.len()
            )));
        }
        for i in 0..m {
            jac[(i, j)] = (r_h[i] - r[i]) / h;
        }
    }

    if jac.iter().all(|v| v.is_finite()) {
        Ok(jac)
    } else {
        Err(FitError::NonFinite(p.iter().copied().collect()))
    }
}
