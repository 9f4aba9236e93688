//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - configuration enums (`ModelSet`, `ModelSpec`)
//! - the concrete model kinds (`ModelKind`)
//! - observations and residuals (`Observation`, `Residual`)
//! - fit outputs (`FitResult`, `FittedModel`, `FitQuality`) and the saved fits file

pub mod types;

pub use types::*;
