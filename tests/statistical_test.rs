// tests/statistical_test.rs
use approx::assert_relative_eq;
use rand_distr::{Distribution, StandardNormal};
use statrs::distribution::{Binomial, Continuous, Discrete, Normal};
use stochastic_lab::analytics::theory::binomial_pmf;
use stochastic_lab::math_utils::{mean_and_variance, norm_pdf};
use stochastic_lab::mc::{ExperimentState, SamplingConfig};
use stochastic_lab::params::{BrownianParams, SignedWalkParams};
use stochastic_lab::rng;

#[test]
fn test_brownian_terminal_moments() {
    let params = BrownianParams {
        horizon: 1.0,
        steps: 1000,
        drift: 0.0,
        volatility: 1.0,
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(2024);
    let report = state.run_batch(params, &SamplingConfig::default(), &mut rng);

    let out = report.as_continuous().expect("brownian output is continuous");
    assert_eq!(out.summary.total_runs, 5000);
    assert_eq!(out.trajectories.len(), 50);
    assert_eq!(out.histogram.counts.len(), 40);
    assert_eq!(out.histogram.total(), 5000);

    let (mean, variance) = mean_and_variance(state.terminal_values());
    println!("Brownian terminal mean {} variance {}", mean, variance);
    assert!(mean.abs() < 0.06, "mean {} too far from 0", mean);
    assert!((variance - 1.0).abs() < 0.1, "variance {} too far from 1", variance);
    assert_relative_eq!(out.summary.empirical_mean, mean);
}

#[test]
fn test_brownian_drift_shifts_terminal_mean() {
    let params = BrownianParams {
        horizon: 4.0,
        steps: 50,
        drift: 0.5,
        volatility: 0.5,
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(9);
    state.run_batch(params, &SamplingConfig::default(), &mut rng);
    let (mean, variance) = mean_and_variance(state.terminal_values());
    // X_T ~ N(2, 1)
    assert!((mean - 2.0).abs() < 0.06, "mean {}", mean);
    assert!((variance - 1.0).abs() < 0.1, "variance {}", variance);
}

#[test]
fn test_normal_curve_tracks_histogram() {
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(31);
    let report = state.run_batch(BrownianParams::default(), &SamplingConfig::default(), &mut rng);
    let theory_total = report.theory().total();
    // The padded range covers nearly all the mass
    assert!((theory_total - 5000.0).abs() < 150.0, "theory total {}", theory_total);
}

#[test]
fn test_binomial_pmf_matches_statrs() {
    for &(n, q) in &[(10u64, 0.3), (25, 0.81), (60, 0.5)] {
        let reference = Binomial::new(q, n).unwrap();
        for k in 0..=n {
            assert_relative_eq!(binomial_pmf(n, k, q), reference.pmf(k), epsilon = 1e-12, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_norm_pdf_matches_statrs() {
    let reference = Normal::new(1.5, 0.7).unwrap();
    for i in -20..=20 {
        let x = 1.5 + 0.1 * i as f64;
        assert_relative_eq!(norm_pdf(x, 1.5, 0.7), reference.pdf(x), epsilon = 1e-14);
    }
}

#[test]
fn test_box_muller_against_rand_distr() {
    let mut ours = rng::seed_rng_from_u64(100);
    let mut reference = rng::seed_rng_from_u64(200);
    let samples = 50_000;

    let a: Vec<f64> = (0..samples).map(|_| rng::standard_normal(&mut ours)).collect();
    let b: Vec<f64> = (0..samples)
        .map(|_| {
            let z: f64 = StandardNormal.sample(&mut reference);
            z
        })
        .collect();

    let (ma, va) = mean_and_variance(&a);
    let (mb, vb) = mean_and_variance(&b);
    assert!((ma - mb).abs() < 0.03, "means {} vs {}", ma, mb);
    assert!((va - vb).abs() < 0.04, "variances {} vs {}", va, vb);

    // Tail mass beyond two standard deviations, about 4.55%
    let tail_a = a.iter().filter(|x| x.abs() > 2.0).count() as f64 / samples as f64;
    let tail_b = b.iter().filter(|x| x.abs() > 2.0).count() as f64 / samples as f64;
    assert!((tail_a - tail_b).abs() < 0.006, "tails {} vs {}", tail_a, tail_b);
}

#[test]
fn test_signed_walk_hybrid_mean() {
    let params = SignedWalkParams { trials: 16, p: 0.05, repetitions: 5 };
    let q = params.step_probability();
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(12);
    let report = state.run_batch(params, &SamplingConfig::default(), &mut rng);
    let expected_mean = 16.0 * (2.0 * q - 1.0);
    let expected_var = 16.0 * 4.0 * q * (1.0 - q);
    let summary = report.summary();
    assert!((summary.empirical_mean - expected_mean).abs() < 0.2, "mean {}", summary.empirical_mean);
    assert!(
        (summary.empirical_variance - expected_var).abs() < 0.1 * expected_var,
        "variance {}",
        summary.empirical_variance
    );
}
