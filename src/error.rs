use thiserror::Error;

/// Error surfaced to the binary: a message plus the process exit code.
///
/// Exit codes: `2` invalid configuration or IO, `3` insufficient data,
/// `4` numerical failure.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Solver-level failures of a single nonlinear least-squares fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// The evaluation budget ran out before any convergence test passed.
    #[error("optimal parameters not found: {evals} function evaluations reached the limit of {max_evals}")]
    NonConvergence { evals: usize, max_evals: usize },

    /// The model produced NaN/inf residuals at the given parameters.
    #[error("model produced non-finite residuals at parameters {0:?}")]
    NonFinite(Vec<f64>),

    /// Neither Cholesky nor SVD could solve the damped normal equations.
    #[error("damped normal equations are singular")]
    SingularSystem,

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let code = match err {
            FitError::DimensionMismatch(_) => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}
