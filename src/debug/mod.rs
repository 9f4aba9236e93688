//! Debug bundle writer for inspecting one run.
//!
//! The bundle is a single markdown file with the run settings, every
//! observation next to its noise-free truth, and one section per fitted model
//! (parameters, statistics, solver summary, per-point residuals).

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};

use crate::app::pipeline::RunOutput;
use crate::domain::FitConfig;
use crate::error::AppError;
use crate::report::fmt_params;

/// Write a debug bundle for `run` under `dir` and return its path.
pub fn write_debug_bundle(run: &RunOutput, config: &FitConfig, dir: &Path) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(2, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!(
        "chi2fit_debug_{}_seed{}_{ts}.md",
        config.model_set.display_name(),
        config.sample_seed
    ));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create debug file: {e}")))?;
    file.write_all(render_debug_markdown(run, config).as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write debug file: {e}")))?;

    log::info!("wrote debug bundle {}", path.display());
    Ok(path)
}

/// Markdown body of a debug bundle.
pub fn render_debug_markdown(run: &RunOutput, config: &FitConfig) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "# chi2fit debug bundle");
    let _ = writeln!(out, "- generated: {}", Utc::now().to_rfc3339());
    let _ = writeln!(out, "- model_set: {}", config.model_set.display_name());
    let _ = writeln!(out, "- sample_seed: {}", config.sample_seed);
    let _ = writeln!(out, "- sample_count: {}", config.sample_count);
    let _ = writeln!(out, "- x_range: {:.3}..{:.3}", config.x_min, config.x_max);
    let _ = writeln!(out, "- noise: {:.4}, sigma: {:.4}", config.noise, config.sigma);
    let _ = writeln!(
        out,
        "- starts: {}, max_evals: {}",
        config.starts,
        config
            .max_evals
            .map(|v| v.to_string())
            .unwrap_or_else(|| "default".to_string())
    );
    let _ = writeln!(out, "- preferred: {}", run.selection.best.model.display_name);

    let _ = writeln!(out, "\n## Observations");
    let _ = writeln!(out, "| index | x | y_obs | truth | sigma |");
    let _ = writeln!(out, "| - | - | - | - | - |");
    for (p, truth) in run.sample.points.iter().zip(run.sample.truth.iter()) {
        let _ = writeln!(
            out,
            "| {} | {:.6} | {:.6} | {:.6} | {:.4} |",
            p.index, p.x, p.y_obs, truth, p.sigma
        );
    }

    for (kind, reason) in &run.selection.skipped {
        let _ = writeln!(out, "\n## {} (skipped)\n{reason}", kind.panel_title());
    }

    let deltas = run.selection.delta_bic();
    for ((fit, residuals), delta) in run.selection.fits.iter().zip(run.residuals.iter()).zip(deltas) {
        let q = &fit.quality;
        let _ = writeln!(out, "\n## {}", fit.model.kind.panel_title());
        let _ = writeln!(out, "- params: {}", fmt_params(fit));
        let _ = writeln!(
            out,
            "- chi2={:.6} chi2/dof={:.6} bic={:.6} dbic={:.6} bic_gaussian={:.6} sse={:.6} rmse={:.6}",
            q.chi2, q.chi2_per_dof, q.bic, delta, q.bic_gaussian, q.sse, q.rmse
        );
        let _ = writeln!(
            out,
            "- solver: start={} iterations={} evals={} ({})",
            fit.solver.start, fit.solver.iterations, fit.solver.evals, fit.solver.message
        );

        let _ = writeln!(out, "\n| index | y_fit | residual | pull |");
        let _ = writeln!(out, "| - | - | - | - |");
        for r in &residuals.rows {
            let _ = writeln!(
                out,
                "| {} | {:.6} | {:.6} | {:.4} |",
                r.point.index,
                r.y_fit,
                r.residual,
                r.residual / r.point.sigma
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_fit;
    use crate::domain::ModelSpec;

    fn linear_run() -> (RunOutput, FitConfig) {
        let config = FitConfig {
            model_spec: ModelSpec::Linear,
            sample_count: 5,
            ..FitConfig::default()
        };
        (run_fit(&config).unwrap(), config)
    }

    #[test]
    fn markdown_lists_observations_and_models() {
        let (run, config) = linear_run();
        let md = render_debug_markdown(&run, &config);

        assert!(md.starts_with("# chi2fit debug bundle\n"));
        assert!(md.contains("- model_set: trend"));
        assert!(md.contains("## Linear Fit (2-Parameter Model)"));
        // 5 observation rows + 5 residual rows, each starting with "| <index> |".
        let rows = md.lines().filter(|l| l.starts_with("| 4 |")).count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn bundle_is_written_to_directory() {
        let (run, config) = linear_run();
        let dir = std::env::temp_dir().join(format!("chi2fit-debug-{}", std::process::id()));
        let path = write_debug_bundle(&run, &config, &dir).unwrap();
        assert!(path.starts_with(&dir));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("## Observations"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
