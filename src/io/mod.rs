//! Input/output helpers.
//!
//! - per-point result export (`export`)
//! - fits JSON read/write (`fits`)

pub mod export;
pub mod fits;

pub use export::*;
pub use fits::*;
