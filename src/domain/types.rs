//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Which family of three candidate models to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSet {
    /// Polynomial trends plus a sinusoid riding on a line.
    Trend,
    /// Transit-timing ephemerides: linear, decaying period, apsidal precession.
    Ephemeris,
}

impl ModelSet {
    /// The three model kinds of this set, ordered by increasing complexity.
    pub fn kinds(self) -> [ModelKind; 3] {
        match self {
            ModelSet::Trend => [ModelKind::Linear, ModelKind::Quadratic, ModelKind::Sinusoidal],
            ModelSet::Ephemeris => [
                ModelKind::LinearEphemeris,
                ModelKind::QuadraticEphemeris,
                ModelKind::Precession,
            ],
        }
    }

    /// Standard deviation of the Gaussian noise added to the synthetic data.
    pub fn default_noise(self) -> f64 {
        match self {
            ModelSet::Trend => 3.0,
            ModelSet::Ephemeris => 1.0,
        }
    }

    /// Whether panel titles carry the fit statistics.
    pub fn titles_with_stats(self) -> bool {
        matches!(self, ModelSet::Ephemeris)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ModelSet::Trend => "trend",
            ModelSet::Ephemeris => "ephemeris",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ModelSet::Trend => ModelSet::Ephemeris,
            ModelSet::Ephemeris => ModelSet::Trend,
        }
    }
}

/// Which model(s) of the set to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    All,
    Linear,
    Quadratic,
    Periodic,
}

impl ModelSpec {
    /// The model kinds this selection picks out of `set`.
    pub fn resolve(self, set: ModelSet) -> Vec<ModelKind> {
        let [linear, quadratic, periodic] = set.kinds();
        match self {
            ModelSpec::All => vec![linear, quadratic, periodic],
            ModelSpec::Linear => vec![linear],
            ModelSpec::Quadratic => vec![quadratic],
            ModelSpec::Periodic => vec![periodic],
        }
    }
}

/// Concrete fitted model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// `a·x + b`
    Linear,
    /// `a·x² + b·x + c`
    Quadratic,
    /// `a·sin(b·x + c) + d·x + e`
    Sinusoidal,
    /// `T0 + P·E`
    LinearEphemeris,
    /// `T0 + P·E + ½·(dP/dE)·E²`
    QuadraticEphemeris,
    /// `T0 + P·E − (e·P_a/π)·cos(ω0 + (dω/dE)·E)`
    Precession,
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Linear | ModelKind::LinearEphemeris => "Linear",
            ModelKind::Quadratic | ModelKind::QuadraticEphemeris => "Quadratic",
            ModelKind::Sinusoidal | ModelKind::Precession => "Sinusoidal",
        }
    }

    /// Number of free parameters (`k` in the information criteria).
    pub fn param_count(self) -> usize {
        self.param_names().len()
    }

    /// Parameter names in the order the parameter vector stores them.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Linear => &["a", "b"],
            ModelKind::Quadratic => &["a", "b", "c"],
            ModelKind::Sinusoidal => &["a", "b", "c", "d", "e"],
            ModelKind::LinearEphemeris => &["T0", "P"],
            ModelKind::QuadraticEphemeris => &["T0", "P", "dP/dE"],
            ModelKind::Precession => &["T0", "P", "e", "dw/dE", "w0"],
        }
    }

    /// Index of the parameter varied by the start grid, if any.
    ///
    /// Only the periodic models have a frequency-like parameter that makes the
    /// fit sensitive to its starting point.
    pub fn frequency_index(self) -> Option<usize> {
        match self {
            ModelKind::Sinusoidal => Some(1),
            ModelKind::Precession => Some(3),
            _ => None,
        }
    }

    /// Panel color as RGB: red for the linear slot, blue for the quadratic
    /// slot, green for the periodic slot.
    pub fn panel_rgb(self) -> (u8, u8, u8) {
        match self {
            ModelKind::Linear | ModelKind::LinearEphemeris => (255, 0, 0),
            ModelKind::Quadratic | ModelKind::QuadraticEphemeris => (0, 0, 255),
            ModelKind::Sinusoidal | ModelKind::Precession => (0, 160, 0),
        }
    }

    /// Panel title, e.g. `Linear Fit (2-Parameter Model)`.
    pub fn panel_title(self) -> String {
        format!("{} Fit ({}-Parameter Model)", self.display_name(), self.param_count())
    }
}

/// A single synthetic observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub index: usize,
    pub x: f64,
    pub y_obs: f64,
    /// Per-point uncertainty (constant across the dataset).
    pub sigma: f64,
}

/// Summary statistics of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// A per-point fitted value.
#[derive(Debug, Clone)]
pub struct Residual {
    pub point: Observation,
    pub y_fit: f64,
    pub residual: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    /// `Σ ((obs − fit)/σ)²` (named "reduced" upstream, but not divided by dof).
    pub chi2: f64,
    /// `chi2 / (n − k)`; NaN when `n ≤ k` (written as `null` in JSON).
    #[serde(deserialize_with = "nan_if_null")]
    pub chi2_per_dof: f64,
    /// `chi2 + k·ln(n)`; used for ranking.
    pub bic: f64,
    /// `n·ln(sse/n) + k·ln(n)`; reported for reference.
    pub bic_gaussian: f64,
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    pub k: usize,
}

fn nan_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}

/// Fitted model parameters and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub kind: ModelKind,
    pub display_name: String,
    pub params: Vec<f64>,
}

/// How the solver reached the reported parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSummary {
    pub iterations: usize,
    pub evals: usize,
    /// Index of the winning start in the start grid.
    pub start: usize,
    pub message: String,
}

/// Fit output for a single model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: FittedModel,
    pub quality: FitQuality,
    pub solver: SolverSummary,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub model_set: ModelSet,
    pub model_spec: ModelSpec,

    pub sample_count: usize,
    pub sample_seed: u64,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of the Gaussian noise on `y`.
    pub noise: f64,
    /// Per-point uncertainty used by the chi-squared statistic.
    pub sigma: f64,

    /// Number of starts for periodic models (1 = default guess only).
    pub starts: usize,
    /// Function-evaluation budget per start; `None` uses `200·(k+1)`.
    pub max_evals: Option<usize>,

    /// Points on the smooth grid used to draw fitted curves.
    pub smooth_points: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_fits: Option<PathBuf>,
}

/// Default start count for periodic models. A lone default guess often stalls
/// the sinusoid in a flat valley before it reaches the budget.
pub const DEFAULT_STARTS: usize = 8;

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            model_set: ModelSet::Trend,
            model_spec: ModelSpec::All,
            sample_count: 20,
            sample_seed: 42,
            x_min: 0.0,
            x_max: 10.0,
            noise: ModelSet::Trend.default_noise(),
            sigma: 1.0,
            starts: DEFAULT_STARTS,
            max_evals: None,
            smooth_points: 100,
            plot: true,
            plot_width: 40,
            plot_height: 16,
            export_results: None,
            export_fits: None,
        }
    }
}

/// A saved fits file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model_set: ModelSet,
    pub seed: u64,
    pub points: Vec<Observation>,
    pub fits: Vec<FitResult>,
}
