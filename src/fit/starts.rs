//! Start grids for the nonlinear fits.
//!
//! Every model starts from its default guess. Periodic models can additionally
//! be started from a log-spaced grid of frequencies, since the sinusoidal and
//! precession fits are highly sensitive to where the frequency starts.

use crate::domain::ModelKind;
use crate::error::AppError;
use crate::math::log_space;
use crate::models::default_guess;

/// Lowest frequency-like value tried by the start grid.
pub const FREQ_MIN: f64 = 0.1;
/// Highest frequency-like value tried by the start grid.
pub const FREQ_MAX: f64 = 5.0;

/// Build `n_starts` initial guesses for `kind` (the default guess first).
///
/// Non-periodic models always get the default guess only.
pub fn start_grid(kind: ModelKind, n_starts: usize) -> Result<Vec<Vec<f64>>, AppError> {
    let base = default_guess(kind);
    let Some(freq_idx) = kind.frequency_index() else {
        return Ok(vec![base]);
    };
    if n_starts <= 1 {
        return Ok(vec![base]);
    }

    let varied = n_starts - 1;
    let freqs = if varied >= 2 {
        log_space(FREQ_MIN, FREQ_MAX, varied)?
    } else {
        vec![(FREQ_MIN * FREQ_MAX).sqrt()]
    };

    let mut out = Vec::with_capacity(n_starts);
    out.push(base.clone());
    for f in freqs {
        let mut guess = base.clone();
        guess[freq_idx] = f;
        out.push(guess);
    }
    Ok(out)
}
