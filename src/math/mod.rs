//! Mathematical utilities: grids, least-squares solves, the Levenberg–Marquardt
//! solver, and goodness-of-fit statistics.

pub mod grid;
pub mod lm;
pub mod ols;
pub mod stats;

pub use grid::*;
pub use lm::*;
pub use ols::*;
pub use stats::*;
