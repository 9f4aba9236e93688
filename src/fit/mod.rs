//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - build start grids for the periodic models
//! - run Levenberg–Marquardt from each start (parallel)
//! - score every model and select the preferred one using BIC + guardrails

pub mod fitter;
pub mod selection;
pub mod starts;

pub use fitter::*;
pub use selection::*;
pub use starts::*;
