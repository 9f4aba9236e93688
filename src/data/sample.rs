//! Synthetic dataset generation.
//!
//! The known-truth function is the identity line `y = x`; observations add
//! Gaussian noise drawn from a seeded RNG so that a given seed always produces
//! the same dataset (and therefore the same fits).

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DatasetStats, FitConfig, Observation};
use crate::error::AppError;
use crate::math::linspace;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleData {
    pub points: Vec<Observation>,
    /// Noise-free truth at each x.
    pub truth: Vec<f64>,
    pub stats: DatasetStats,
}

impl SampleData {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y_obs).collect()
    }

    pub fn sigmas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.sigma).collect()
    }
}

/// The known-truth function the noise is added to.
pub fn truth(x: f64) -> f64 {
    x
}

pub fn generate_sample(config: &FitConfig) -> Result<SampleData, AppError> {
    if config.sample_count < 2 {
        return Err(AppError::new(2, "Sample count must be >= 2."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(2, "Invalid x range for sample generation."));
    }
    if !(config.sigma.is_finite() && config.sigma > 0.0) {
        return Err(AppError::new(2, "Per-point uncertainty must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.sample_seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let xs = linspace(config.x_min, config.x_max, config.sample_count);
    let mut points = Vec::with_capacity(xs.len());
    let mut truths = Vec::with_capacity(xs.len());

    for (index, &x) in xs.iter().enumerate() {
        let y_true = truth(x);
        let y_obs = y_true + normal.sample(&mut rng);
        truths.push(y_true);
        points.push(Observation {
            index,
            x,
            y_obs,
            sigma: config.sigma,
        });
    }

    let stats = compute_stats(&points).ok_or_else(|| AppError::new(4, "Failed to compute sample stats."))?;

    Ok(SampleData {
        points,
        truth: truths,
        stats,
    })
}

pub fn compute_stats(points: &[Observation]) -> Option<DatasetStats> {
    if points.is_empty() {
        return None;
    }
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for p in points {
        x_min = x_min.min(p.x);
        x_max = x_max.max(p.x);
        y_min = y_min.min(p.y_obs);
        y_max = y_max.max(p.y_obs);
    }
    if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
        return None;
    }
    Some(DatasetStats {
        n_points: points.len(),
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let config = FitConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_noise() {
        let config = FitConfig::default();
        let other = FitConfig {
            sample_seed: config.sample_seed + 1,
            ..config.clone()
        };
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&other).unwrap();
        assert_eq!(a.xs(), b.xs());
        assert_ne!(a.ys(), b.ys());
    }

    #[test]
    fn zero_noise_reproduces_truth() {
        let config = FitConfig {
            noise: 0.0,
            ..FitConfig::default()
        };
        let sample = generate_sample(&config).unwrap();
        assert_eq!(sample.ys(), sample.truth);
        assert_eq!(sample.stats.n_points, 20);
        assert_eq!(sample.stats.x_min, 0.0);
        assert_eq!(sample.stats.x_max, 10.0);
    }

    #[test]
    fn sigma_is_broadcast() {
        let config = FitConfig {
            sigma: 0.5,
            ..FitConfig::default()
        };
        let sample = generate_sample(&config).unwrap();
        assert!(sample.sigmas().iter().all(|&s| s == 0.5));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_count = FitConfig {
            sample_count: 1,
            ..FitConfig::default()
        };
        assert_eq!(generate_sample(&bad_count).unwrap_err().exit_code(), 2);

        let bad_range = FitConfig {
            x_min: 5.0,
            x_max: 5.0,
            ..FitConfig::default()
        };
        assert_eq!(generate_sample(&bad_range).unwrap_err().exit_code(), 2);

        let bad_noise = FitConfig {
            noise: -1.0,
            ..FitConfig::default()
        };
        assert_eq!(generate_sample(&bad_noise).unwrap_err().exit_code(), 2);
    }
}
