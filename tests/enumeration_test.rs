// tests/enumeration_test.rs
use stochastic_lab::analytics::theory::binomial_coefficient;
use stochastic_lab::mc::{ExactEnumerator, ExperimentState, SamplingConfig, SamplingMode};
use stochastic_lab::models::BernoulliWalk;
use stochastic_lab::params::{BernoulliParams, SignedWalkParams};
use stochastic_lab::rng;
use stochastic_lab::SimError;
use std::collections::HashSet;

#[test]
fn test_three_trials_enumerate_binomial_coefficients() {
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(42);
    let report = state.run_batch(
        BernoulliParams { trials: 3, p: 0.5 },
        &SamplingConfig::default(),
        &mut rng,
    );

    let out = report.as_discrete().expect("bernoulli output is discrete");
    assert_eq!(out.summary.mode, Some(SamplingMode::Exact));
    assert_eq!(out.trajectories.len(), 8);

    let distinct: HashSet<Vec<i64>> = out
        .trajectories
        .iter()
        .map(|t| t.values().to_vec())
        .collect();
    assert_eq!(distinct.len(), 8);

    assert_eq!(out.histogram.labels, vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(out.histogram.counts, vec![1, 3, 3, 1]);
    assert_eq!(out.theory.expected, vec![1.0, 3.0, 3.0, 1.0]);
    assert!(out.display_reduction.is_none());
}

#[test]
fn test_exact_mode_ignores_the_rng() {
    let params = BernoulliParams { trials: 6, p: 0.3 };
    let cfg = SamplingConfig::default();
    let a = ExperimentState::new().run_batch(params, &cfg, &mut rng::seed_rng_from_u64(1));
    let b = ExperimentState::new().run_batch(params, &cfg, &mut rng::seed_rng_from_u64(2));
    assert_eq!(a, b);
}

#[test]
fn test_exact_histogram_matches_coefficients() {
    let n = 12;
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(5);
    let report = state.run_batch(
        BernoulliParams { trials: n, p: 0.7 },
        &SamplingConfig::default(),
        &mut rng,
    );
    assert_eq!(report.summary().total_runs, 1 << n);
    for (k, &count) in report.histogram().counts.iter().enumerate() {
        assert_eq!(count as f64, binomial_coefficient(n as u64, k as u64));
    }
}

#[test]
fn test_display_cap_samples_without_replacement() {
    let cfg = SamplingConfig {
        exact_threshold: 14,
        hybrid_threshold: 20,
        ..Default::default()
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(77);
    let report = state.run_batch(
        SignedWalkParams { trials: 14, p: 0.1, repetitions: 1 },
        &cfg,
        &mut rng,
    );

    let out = report.as_discrete().unwrap();
    assert_eq!(out.summary.mode, Some(SamplingMode::Exact));
    assert_eq!(out.trajectories.len(), 5000);

    let reduction = out.display_reduction.expect("reduction is signalled");
    assert_eq!(reduction.available, 1 << 14);
    assert_eq!(reduction.shown, 5000);
    assert!(out
        .notices
        .iter()
        .any(|n| matches!(n, SimError::CapacityExceeded { requested: 16384, cap: 5000, .. })));

    let distinct: HashSet<Vec<i64>> = out
        .trajectories
        .iter()
        .map(|t| t.values().to_vec())
        .collect();
    assert_eq!(distinct.len(), 5000);

    // The histogram still covers the full enumeration
    assert_eq!(out.histogram.total(), 1 << 14);
}

#[test]
fn test_enumerator_order_is_msb_first() {
    let walk = BernoulliWalk::new(4, 0.5);
    let en = ExactEnumerator::new(&walk).unwrap();
    // 0b1000: success on trial 1 only
    assert_eq!(en.trajectory_at(8).values(), &[0, 1, 1, 1, 1]);
    // 0b0001: success on trial 4 only
    assert_eq!(en.trajectory_at(1).values(), &[0, 0, 0, 0, 1]);
}
