// tests/experiment_test.rs
use approx::assert_relative_eq;
use stochastic_lab::analytics::theory::NormalCurveMethod;
use stochastic_lab::mc::strategy::MAX_MONTE_CARLO_RUNS;
use stochastic_lab::mc::{ExperimentState, RunReport, SamplingConfig, SamplingMode};
use stochastic_lab::params::{BernoulliParams, BrownianParams, SignedWalkParams};
use stochastic_lab::rng;
use stochastic_lab::SimError;

fn batch(params: impl Into<stochastic_lab::SimulationParameters>, seed: u64) -> RunReport {
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(seed);
    state.run_batch(params, &SamplingConfig::default(), &mut rng)
}

#[test]
fn test_tier_selection_at_thresholds() {
    let cases = [
        (12, SamplingMode::Exact, 4096, 4096),
        (13, SamplingMode::HybridMonteCarlo, 5000, 100),
        (20, SamplingMode::HybridMonteCarlo, 5000, 100),
        (21, SamplingMode::EstimationOnly, 3000, 0),
    ];
    for &(n, mode, runs, displayed) in &cases {
        let report = batch(BernoulliParams { trials: n, p: 0.5 }, n as u64);
        let summary = report.summary();
        assert_eq!(summary.mode, Some(mode), "n = {}", n);
        assert_eq!(summary.total_runs, runs, "n = {}", n);
        assert_eq!(report.trajectory_count(), displayed, "n = {}", n);
        assert_eq!(report.histogram().total(), runs, "n = {}", n);
    }
}

#[test]
fn test_estimation_runs_capped() {
    let report = batch(BernoulliParams { trials: 400, p: 0.2 }, 4);
    assert_eq!(report.summary().mode, Some(SamplingMode::EstimationOnly));
    assert_eq!(report.summary().total_runs, 20_000);
    assert_eq!(report.trajectory_count(), 0);
    assert_relative_eq!(report.theory().total(), 20_000.0, epsilon = 1e-6);
}

#[test]
fn test_signed_walk_odd_bins_are_empty() {
    for &n in &[5usize, 8, 15, 30] {
        let report = batch(SignedWalkParams { trials: n, p: 0.2, repetitions: 2 }, n as u64);
        let hist = report.histogram();
        assert_eq!(hist.labels.len(), 2 * n + 1);
        for (label, &count) in hist.labels.iter().zip(&hist.counts) {
            if (*label as i64 - n as i64).rem_euclid(2) != 0 {
                assert_eq!(count, 0, "n = {} label = {}", n, label);
            }
        }
        for (label, &expected) in hist.labels.iter().zip(&report.theory().expected) {
            if (*label as i64 - n as i64).rem_euclid(2) != 0 {
                assert_eq!(expected, 0.0);
            }
        }
    }
}

#[test]
fn test_hybrid_fan_is_leading_subset() {
    let report = batch(SignedWalkParams { trials: 18, p: 0.3, repetitions: 1 }, 6);
    let out = report.as_discrete().unwrap();
    assert_eq!(out.trajectories.len(), 100);
    assert!(out.trajectories.iter().all(|t| t.len() == 19 && t.start() == 0));
    assert_eq!(out.x_axis.len(), 19);
    assert_eq!(out.expected_path.len(), 19);
    assert!(out.display_reduction.is_none());
}

#[test]
fn test_theory_scaled_to_runs() {
    let report = batch(BernoulliParams { trials: 17, p: 0.35 }, 3);
    assert_relative_eq!(report.theory().total(), 5000.0, epsilon = 1e-6);
    assert_eq!(report.theory().labels, report.histogram().labels);
}

#[test]
fn test_degenerate_probability() {
    let report = batch(BernoulliParams { trials: 15, p: 0.0 }, 1);
    let hist = report.histogram();
    assert_eq!(hist.counts[0], 5000);
    assert_eq!(report.theory().expected[0], 5000.0);
    assert!(report.theory().expected[1..].iter().all(|&x| x == 0.0));
    assert!(report
        .notices()
        .iter()
        .any(|n| matches!(n, SimError::DegenerateDistribution { .. })));

    let report = batch(SignedWalkParams { trials: 9, p: 0.0, repetitions: 3 }, 1);
    // q = 1: every exact sequence is counted, the theory is a point mass at +9
    assert_eq!(report.histogram().total(), 512);
    assert_eq!(*report.theory().expected.last().unwrap(), 512.0);
}

#[test]
fn test_degenerate_volatility() {
    let params = BrownianParams {
        horizon: 2.0,
        steps: 20,
        drift: 1.5,
        volatility: 0.0,
    };
    let report = batch(params, 2);
    let out = report.as_continuous().unwrap();
    assert!(out.theory.expected.iter().all(|x| x.is_finite()));
    assert_relative_eq!(out.theory.total(), 5000.0);
    assert!(out.histogram.counts.iter().any(|&c| c == 5000));
    assert!(out.histogram.bin_width > 0.0);
    assert_relative_eq!(out.summary.empirical_mean, 3.0, epsilon = 1e-9);
    assert!(out
        .notices
        .iter()
        .any(|n| matches!(n, SimError::DegenerateDistribution { .. })));
}

#[test]
fn test_invalid_parameters_recover() {
    let report = batch(BernoulliParams { trials: 0, p: f64::NAN }, 1);
    assert_eq!(report.summary().mode, Some(SamplingMode::Exact));
    assert_eq!(report.histogram().counts, vec![1, 1]);
    assert_eq!(
        report
            .notices()
            .iter()
            .filter(|n| matches!(n, SimError::InvalidParameter { .. }))
            .count(),
        2
    );

    let report = batch(
        BrownianParams {
            horizon: f64::INFINITY,
            steps: 0,
            drift: 0.0,
            volatility: -1.0,
        },
        1,
    );
    let out = report.as_continuous().unwrap();
    assert_eq!(out.x_axis.len(), 2);
    assert!(out.histogram.labels.iter().all(|x| x.is_finite()));
}

#[test]
fn test_brownian_single_runs_accumulate() {
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(10);
    let cfg = SamplingConfig::default();
    let params = BrownianParams::default();

    for i in 1..=5u64 {
        let report = state.run_single(params, &cfg, &mut rng);
        let out = report.as_continuous().unwrap();
        assert_eq!(out.summary.total_runs, i);
        assert_eq!(out.histogram.total(), i);
        assert_eq!(out.histogram.most_recent.iter().sum::<u64>(), 1);
        assert_eq!(out.trajectories.len(), 1);
        assert_eq!(out.x_axis.len(), params.steps + 1);
    }
}

#[test]
fn test_bin_mass_curve_option() {
    let cfg = SamplingConfig {
        normal_curve: NormalCurveMethod::BinMass,
        ..Default::default()
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(14);
    let report = state.run_batch(BrownianParams::default(), &cfg, &mut rng);
    let total = report.theory().total();
    assert!(total <= 5000.0 + 1e-6);
    assert!(total > 4900.0, "bin mass total {}", total);
}

#[test]
fn test_invalid_config_is_repaired() {
    let cfg = SamplingConfig {
        exact_threshold: 30,
        ..Default::default()
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(1);
    let report = state.run_batch(BernoulliParams { trials: 20, p: 0.5 }, &cfg, &mut rng);
    assert_eq!(report.summary().mode, Some(SamplingMode::Exact));
    assert_eq!(report.summary().total_runs, 1 << 20);
    assert_eq!(report.trajectory_count(), 5000);
    assert!(report.display_reduction().is_some());
}

#[test]
fn test_huge_run_override_is_capped() {
    let cfg = SamplingConfig {
        runs_override: Some(u64::MAX),
        ..Default::default()
    };
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(21);

    let params = BrownianParams {
        steps: 1,
        ..Default::default()
    };
    let report = state.run_batch(params, &cfg, &mut rng);
    assert_eq!(report.summary().total_runs, MAX_MONTE_CARLO_RUNS);
    assert_eq!(report.histogram().total(), MAX_MONTE_CARLO_RUNS);
    assert!(report.notices().iter().any(|n| matches!(
        n,
        SimError::CapacityExceeded { requested: u64::MAX, cap: MAX_MONTE_CARLO_RUNS, .. }
    )));

    // The estimation tier keeps its own, smaller cap
    let report = state.run_batch(BernoulliParams { trials: 400, p: 0.5 }, &cfg, &mut rng);
    assert_eq!(report.summary().mode, Some(SamplingMode::EstimationOnly));
    assert_eq!(report.summary().total_runs, 20_000);
}

#[test]
fn test_signed_walk_frequency_series() {
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(33);
    let cfg = SamplingConfig::default();

    for &n in &[200usize, 50, 100] {
        let report = state.run_batch(SignedWalkParams { trials: n, p: 0.2, repetitions: 1 }, &cfg, &mut rng);
        assert!(report.summary().reset);
    }
    let series = state.frequency_series();
    let trials: Vec<usize> = series.points.iter().map(|p| p.trials).collect();
    assert_eq!(trials, vec![50, 100, 200]);
    // q = 0.8: every batch frequency is an average over thousands of runs
    for point in &series.points {
        assert!((point.frequency - 0.8).abs() < 0.02, "{:?}", point);
    }
    assert!((series.mean_frequency - 0.8).abs() < 0.02);

    // Brownian runs carry no frequency series
    let report = state.run_batch(BrownianParams::default(), &cfg, &mut rng);
    assert!(report.as_continuous().unwrap().frequency.is_none());
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_partial_json() {
    let cfg: SamplingConfig = serde_json::from_str(r#"{ "exact_threshold": 10, "fan_size": 25 }"#).unwrap();
    assert_eq!(cfg.exact_threshold, 10);
    assert_eq!(cfg.fan_size, 25);
    assert_eq!(cfg.hybrid_threshold, SamplingConfig::default().hybrid_threshold);
    assert!(cfg.validate().is_ok());
}
