//! Command-line parsing for the chi-squared model comparison tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelSet, ModelSpec};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "chi2fit",
    version,
    about = "Fit candidate models to noisy data and compare them with chi-squared and BIC"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every candidate model, print the comparison, and optionally plot/export.
    Fit(FitArgs),
    /// Print the score table only (useful for scripting).
    Rank(FitArgs),
    /// Plot a previously exported fits JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `chi2fit fit`, but renders the
    /// three panels in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for fitting and ranking.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Candidate model set (trend: line/parabola/sinusoid, ephemeris: transit timing).
    #[arg(long, value_enum, default_value_t = ModelSet::Trend)]
    pub set: ModelSet,

    /// Which model(s) of the set to fit.
    #[arg(long, value_enum, default_value_t = ModelSpec::All)]
    pub model: ModelSpec,

    /// Number of synthetic observations.
    #[arg(short = 'n', long = "points", default_value_t = 20)]
    pub sample_count: usize,

    /// Random seed for the synthetic noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Standard deviation of the added noise (default depends on --set: 3 for trend, 1 for ephemeris).
    #[arg(long)]
    pub noise: Option<f64>,

    /// Per-point uncertainty used in chi-squared.
    #[arg(long, default_value_t = 1.0)]
    pub sigma: f64,

    /// Smallest x value.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub x_min: f64,

    /// Largest x value.
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    pub x_max: f64,

    /// Number of starting points for the periodic model (1 = default guess only).
    #[arg(long, default_value_t = crate::domain::DEFAULT_STARTS)]
    pub starts: usize,

    /// Function-evaluation budget per start (default: 200·(k+1)).
    #[arg(long)]
    pub max_evals: Option<usize>,

    /// Points on the smooth grid used to draw fitted curves.
    #[arg(long, default_value_t = 100)]
    pub smooth: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Panel width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    /// Panel height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export per-point results for every model to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export observations and fitted models to JSON.
    #[arg(long = "export-fits")]
    pub export_fits: Option<PathBuf>,
}

/// Options for plotting saved fits.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Fits JSON file produced by `chi2fit fit --export-fits`.
    ///
    /// When omitted, JSON files under the current directory are offered for selection.
    #[arg(long, value_name = "JSON")]
    pub fits: Option<PathBuf>,

    /// Points on the smooth grid used to draw fitted curves.
    #[arg(long, default_value_t = 100)]
    pub smooth: usize,

    /// Panel width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    /// Panel height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}
