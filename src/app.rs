//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `chi2fit` binary.
pub fn run() -> Result<(), AppError> {
    // We want `chi2fit` and `chi2fit --set ephemeris` to behave like `chi2fit tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args, OutputMode::Full),
        Command::Rank(args) => handle_fit(args, OutputMode::RankOnly),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_fit(args: FitArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    info!("running {:?} on the {} model set", mode, config.model_set.display_name());
    let run = pipeline::run_fit(&config)?;

    if mode == OutputMode::Full {
        println!(
            "{}",
            crate::report::format_run_summary(&run.sample.stats, &run.selection, &config)
        );
    }

    println!("{}", crate::report::format_scores(&run.selection));

    if mode == OutputMode::Full && config.plot {
        let plot = crate::plot::render_panels(
            &run.sample.points,
            &run.selection.fits,
            config.model_set,
            config.smooth_points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals)?;
    }
    if let Some(path) = &config.export_fits {
        let file = crate::io::fits::build_fits_file(&config, &run.sample.points, &run.selection.fits);
        crate::io::fits::write_fits_json(path, &file)?;
    }

    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(fit_config_from_args(&args))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let path: PathBuf = match &args.fits {
        Some(path) => crate::cli::picker::validate_fits_path(path)?,
        None => crate::cli::picker::prompt_for_fits_path()?,
    };
    let file = crate::io::fits::read_fits_json(&path)?;
    info!("loaded {} fit(s) from {}", file.fits.len(), path.display());

    let plot = crate::plot::render_panels(
        &file.points,
        &file.fits,
        file.model_set,
        args.smooth,
        args.width,
        args.height,
    );
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        model_set: args.set,
        model_spec: args.model,
        sample_count: args.sample_count,
        sample_seed: args.seed,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise.unwrap_or_else(|| args.set.default_noise()),
        sigma: args.sigma,
        starts: args.starts.max(1),
        max_evals: args.max_evals,
        smooth_points: args.smooth,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_fits: args.export_fits.clone(),
    }
}

/// Rewrite argv so `chi2fit` defaults to `chi2fit tui`.
///
/// Rules:
/// - `chi2fit`                      -> `chi2fit tui`
/// - `chi2fit --set ephemeris ...`  -> `chi2fit tui --set ephemeris ...`
/// - `chi2fit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "rank" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::{ModelSet, ModelSpec};

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["chi2fit"])), argv(&["chi2fit", "tui"]));
    }

    #[test]
    fn leading_flag_is_treated_as_tui_flag() {
        assert_eq!(
            rewrite_args(argv(&["chi2fit", "--set", "ephemeris"])),
            argv(&["chi2fit", "tui", "--set", "ephemeris"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [
            argv(&["chi2fit", "fit", "-n", "30"]),
            argv(&["chi2fit", "--help"]),
            argv(&["chi2fit", "-V"]),
            argv(&["chi2fit", "plot", "--fits", "run.json"]),
        ] {
            assert_eq!(rewrite_args(args.clone()), args);
        }
    }

    #[test]
    fn noise_defaults_follow_model_set() {
        let cli = Cli::parse_from(argv(&["chi2fit", "fit", "--set", "ephemeris"]));
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        let config = fit_config_from_args(&args);
        assert_eq!(config.model_set, ModelSet::Ephemeris);
        assert_eq!(config.noise, 1.0);
        assert_eq!(config.starts, FitConfig::default().starts);

        let cli = Cli::parse_from(argv(&["chi2fit", "fit", "--noise", "0.5"]));
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(fit_config_from_args(&args).noise, 0.5);
        assert_eq!(fit_config_from_args(&args).model_set, ModelSet::Trend);
    }

    #[test]
    fn flags_map_onto_fit_config() {
        let cli = Cli::parse_from(argv(&[
            "chi2fit", "rank", "--model", "periodic", "-n", "40", "--seed", "7", "--starts", "0",
            "--max-evals", "500", "--no-plot", "--x-min", "-5",
        ]));
        let Command::Rank(args) = cli.command else {
            panic!("expected rank subcommand");
        };
        let config = fit_config_from_args(&args);
        assert_eq!(config.model_spec, ModelSpec::Periodic);
        assert_eq!(config.sample_count, 40);
        assert_eq!(config.sample_seed, 7);
        assert_eq!(config.starts, 1);
        assert_eq!(config.max_evals, Some(500));
        assert_eq!(config.x_min, -5.0);
        assert!(!config.plot);
        assert_eq!(config.noise, 3.0);
    }

    #[test]
    fn plot_accepts_optional_fits_path() {
        let cli = Cli::parse_from(argv(&["chi2fit", "plot"]));
        let Command::Plot(args) = cli.command else {
            panic!("expected plot subcommand");
        };
        assert!(args.fits.is_none());
        assert_eq!(args.smooth, 100);
    }
}
