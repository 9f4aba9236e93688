//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (snapshot-friendly)

use crate::domain::{DatasetStats, FitConfig, FitResult};
use crate::fit::selection::FitSelection;

/// Format the full run summary (dataset stats + fit diagnostics + chosen model).
pub fn format_run_summary(stats: &DatasetStats, selection: &FitSelection, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== chi2fit - Chi-squared Model Comparison ===\n");
    out.push_str(&format!("Model set: {}\n", config.model_set.display_name()));
    out.push_str(&format!(
        "Sample: n={} | x=[{:.2}, {:.2}] | seed={} | noise={:.3} | sigma={:.3}\n",
        config.sample_count, config.x_min, config.x_max, config.sample_seed, config.noise, config.sigma,
    ));
    out.push_str(&format!(
        "Points: n={} | x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));

    out.push_str("\nModel diagnostics:\n");
    let deltas = selection.delta_bic();
    for (fit, delta) in selection.fits.iter().zip(deltas) {
        let chosen = if fit.model.kind == selection.best.model.kind { "*" } else { " " };
        let q = &fit.quality;
        out.push_str(&format!(
            "{chosen} {:<11} k={} chi2={:.3} chi2/dof={:.3} BIC={:.3} dBIC={:.3} BIC(gauss)={:.3} RMSE={:.4} iters={}\n",
            fit.model.display_name,
            q.k,
            q.chi2,
            q.chi2_per_dof,
            q.bic,
            delta,
            q.bic_gaussian,
            q.rmse,
            fit.solver.iterations,
        ));
    }
    for (kind, reason) in &selection.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", kind.display_name()));
    }

    out.push_str("\nParameters:\n");
    for fit in &selection.fits {
        out.push_str(&format!("- {:<11} {}\n", fit.model.display_name, fmt_params(fit)));
    }

    out.push_str("\nChosen model:\n");
    out.push_str(&format!(
        "- {} (kind={:?}, start={}, evals={}, {})\n",
        selection.best.model.display_name,
        selection.best.model.kind,
        selection.best.solver.start,
        selection.best.solver.evals,
        selection.best.solver.message,
    ));
    out.push('\n');

    out
}

/// Format the score table (sorted by BIC, best first).
pub fn format_scores(selection: &FitSelection) -> String {
    let mut rows: Vec<(&FitResult, f64)> = selection.fits.iter().zip(selection.delta_bic()).collect();
    rows.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<3} {:<12} {:>2} {:>12} {:>10} {:>12} {:>10} {:>12}\n",
            "", "model", "k", "chi2", "chi2/dof", "BIC", "dBIC", "BIC(gauss)"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<3} {:-<12} {:-<2} {:-<12} {:-<10} {:-<12} {:-<10} {:-<12}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for (rank, (fit, delta)) in rows.iter().enumerate() {
        let q = &fit.quality;
        let marker = if fit.model.kind == selection.best.model.kind { "*" } else { "" };
        let rank_label = format!("{}{marker}", rank + 1);
        out.push_str(
            format!(
                "{:<3} {:<12} {:>2} {:>12.3} {:>10.3} {:>12.3} {:>10.3} {:>12.3}\n",
                rank_label, fit.model.display_name, q.k, q.chi2, q.chi2_per_dof, q.bic, delta, q.bic_gaussian,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// `name=value` pairs in parameter order.
pub fn fmt_params(fit: &FitResult) -> String {
    let names = fit.model.kind.param_names();
    let parts: Vec<String> = names
        .iter()
        .zip(fit.model.params.iter())
        .map(|(name, v)| format!("{name}={v:.6}"))
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, FittedModel, ModelKind, SolverSummary};

    fn fit(kind: ModelKind, params: Vec<f64>, chi2: f64, bic: f64) -> FitResult {
        FitResult {
            model: FittedModel {
                kind,
                display_name: kind.display_name().to_string(),
                params,
            },
            quality: FitQuality {
                chi2,
                chi2_per_dof: chi2 / 18.0,
                bic,
                bic_gaussian: 1.0,
                sse: chi2,
                rmse: 0.5,
                n: 20,
                k: kind.param_count(),
            },
            solver: SolverSummary {
                iterations: 4,
                evals: 15,
                start: 0,
                message: "converged".to_string(),
            },
        }
    }

    fn selection() -> FitSelection {
        let linear = fit(ModelKind::Linear, vec![1.0, 0.5], 10.0, 15.99);
        let quadratic = fit(ModelKind::Quadratic, vec![0.0, 1.0, 0.5], 9.0, 17.99);
        FitSelection {
            best: linear.clone(),
            fits: vec![linear, quadratic],
            skipped: vec![(ModelKind::Sinusoidal, "Underdetermined".to_string())],
        }
    }

    #[test]
    fn summary_marks_chosen_and_lists_skipped() {
        let stats = DatasetStats {
            n_points: 20,
            x_min: 0.0,
            x_max: 10.0,
            y_min: -1.0,
            y_max: 11.0,
        };
        let text = format_run_summary(&stats, &selection(), &FitConfig::default());

        assert!(text.contains("Model set: trend"));
        assert!(text.contains("* Linear"));
        assert!(text.contains("  Quadratic"));
        assert!(text.contains("dBIC=2.000"));
        assert!(text.contains("(skipped Sinusoidal) Underdetermined"));
        assert!(text.contains("a=1.000000, b=0.500000"));
    }

    #[test]
    fn scores_are_sorted_by_bic() {
        let mut sel = selection();
        sel.fits.reverse();
        let table = format_scores(&sel);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("BIC(gauss)"));
        assert!(lines[2].starts_with("1*"));
        assert!(lines[2].contains("Linear"));
        assert!(lines[3].starts_with("2 "));
        assert!(lines[3].contains("2.000"));
    }

    #[test]
    fn params_use_model_names() {
        let f = fit(ModelKind::LinearEphemeris, vec![2.0, 3.0], 0.0, 0.0);
        assert_eq!(fmt_params(&f), "[T0=2.000000, P=3.000000]");
    }
}
