// src/math_utils.rs
use statrs::function::erf;
use std::f64::consts::{PI, SQRT_2};

/// Standard normal cumulative distribution function Φ(x)
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Normal density with the given mean and standard deviation
///
/// A non-positive or non-finite `std_dev` describes a point mass, whose
/// density is reported as 0 everywhere.
pub fn norm_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return 0.0;
    }
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * PI).sqrt())
}

/// Sample mean and population variance; `(0, 0)` for an empty slice
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, variance)
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_cdf_symmetry() {
        assert_relative_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(1.3) + norm_cdf(-1.3), 1.0, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(1.959964), 0.975, epsilon = 1e-6);
    }

    #[test]
    fn test_norm_pdf() {
        assert_relative_eq!(norm_pdf(0.0, 0.0, 1.0), 1.0 / (2.0 * PI).sqrt(), epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(3.0, 1.0, 2.0), norm_pdf(1.0, 0.0, 1.0) / 2.0, epsilon = 1e-15);
        assert_eq!(norm_pdf(0.0, 0.0, 0.0), 0.0);
        assert_eq!(norm_pdf(1.0, 0.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean_and_variance(&[]), (0.0, 0.0));
        let (m, v) = mean_and_variance(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(m, 2.5);
        assert_relative_eq!(v, 1.25);
    }
}
