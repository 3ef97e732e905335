// src/mc/engine.rs
//! Run triggers over a caller-owned experiment
//!
//! An [`ExperimentState`] is one logical experiment: the parameters it was
//! built for plus everything aggregated since the last reset. Two triggers
//! act on it:
//!
//! 1. **Single run** ([`ExperimentState::run_single`]): simulate one
//!    trajectory and extend the aggregate. The new run becomes the histogram's
//!    most-recent overlay.
//! 2. **Batch** ([`ExperimentState::run_batch`]): discard the aggregate and
//!    rebuild it through the adaptive sampling tier for the problem size.
//!
//! Any parameter change discards the aggregate before the trigger runs. The
//! relative-frequency series of the discrete walks is the one exception: it
//! survives changes of `n` and restarts only when the success probability
//! or the process changes (see [`crate::frequency`]).
//! Triggers never fail: inputs are sanitised and every recovery, degenerate
//! distribution or display reduction is reported in [`RunOutput::notices`].

use crate::analytics::theory::{
    binomial_curve, binomial_degeneracy, normal_curve, normal_degeneracy, TheoreticalCurve,
};
use crate::error::SimError;
use crate::frequency::{FrequencySeries, FrequencyTracker};
use crate::histogram::{ContinuousHistogram, DiscreteHistogram, HistogramSnapshot};
use crate::math_utils::mean_and_variance;
use crate::mc::enumerate::ExactEnumerator;
use crate::mc::strategy::{SamplingConfig, SamplingMode};
use crate::models::{
    ArithmeticBrownian, BernoulliWalk, DiscreteProcess, DiscreteWalk, ProcessModel, SignedWalk,
    Trajectory,
};
use crate::params::{BrownianParams, SimulationParameters};
use crate::rng::{sample_indices, UniformSource};
use tracing::{debug, info, warn};

/// Signals that fewer trajectories are shown than were generated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayReduction {
    pub available: u64,
    pub shown: usize,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub process: String,
    /// Tier used by a batch; `None` for a single incremental run
    pub mode: Option<SamplingMode>,
    pub runs_this_trigger: u64,
    /// Runs aggregated since the last reset
    pub total_runs: u64,
    pub displayed: usize,
    /// Whether the trigger started from an empty aggregate
    pub reset: bool,
    pub empirical_mean: f64,
    pub empirical_variance: f64,
}

/// Everything the presentation sink needs for one trigger
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunOutput<T> {
    /// Trajectories tagged for display
    pub trajectories: Vec<Trajectory<T>>,
    /// Step index or time for each trajectory point
    pub x_axis: Vec<f64>,
    /// Expected state along the x-axis
    pub expected_path: Vec<f64>,
    pub histogram: HistogramSnapshot,
    pub theory: TheoreticalCurve,
    pub summary: RunSummary,
    pub display_reduction: Option<DisplayReduction>,
    /// Successes-over-trials series, discrete walks only
    pub frequency: Option<FrequencySeries>,
    pub notices: Vec<SimError>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunReport {
    Discrete(RunOutput<i64>),
    Continuous(RunOutput<f64>),
}

impl RunReport {
    pub fn histogram(&self) -> &HistogramSnapshot {
        match self {
            RunReport::Discrete(out) => &out.histogram,
            RunReport::Continuous(out) => &out.histogram,
        }
    }

    pub fn theory(&self) -> &TheoreticalCurve {
        match self {
            RunReport::Discrete(out) => &out.theory,
            RunReport::Continuous(out) => &out.theory,
        }
    }

    pub fn summary(&self) -> &RunSummary {
        match self {
            RunReport::Discrete(out) => &out.summary,
            RunReport::Continuous(out) => &out.summary,
        }
    }

    pub fn notices(&self) -> &[SimError] {
        match self {
            RunReport::Discrete(out) => &out.notices,
            RunReport::Continuous(out) => &out.notices,
        }
    }

    pub fn display_reduction(&self) -> Option<DisplayReduction> {
        match self {
            RunReport::Discrete(out) => out.display_reduction,
            RunReport::Continuous(out) => out.display_reduction,
        }
    }

    pub fn trajectory_count(&self) -> usize {
        match self {
            RunReport::Discrete(out) => out.trajectories.len(),
            RunReport::Continuous(out) => out.trajectories.len(),
        }
    }

    pub fn as_discrete(&self) -> Option<&RunOutput<i64>> {
        match self {
            RunReport::Discrete(out) => Some(out),
            RunReport::Continuous(_) => None,
        }
    }

    pub fn as_continuous(&self) -> Option<&RunOutput<f64>> {
        match self {
            RunReport::Continuous(out) => Some(out),
            RunReport::Discrete(_) => None,
        }
    }
}

/// One logical experiment, owned by the caller
#[derive(Clone, Debug, Default)]
pub struct ExperimentState {
    params: Option<SimulationParameters>,
    discrete: Option<DiscreteHistogram>,
    terminals: Vec<f64>,
    last_terminal: Option<f64>,
    runs: u64,
    frequency: FrequencyTracker,
}

impl ExperimentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all accumulated state, including the frequency series
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Discard the aggregate but keep the frequency series
    fn clear_aggregate(&mut self) {
        let frequency = std::mem::take(&mut self.frequency);
        *self = Self {
            frequency,
            ..Self::default()
        };
    }

    /// Sanitised parameters of the current experiment
    pub fn parameters(&self) -> Option<&SimulationParameters> {
        self.params.as_ref()
    }

    pub fn total_runs(&self) -> u64 {
        self.runs
    }

    pub fn discrete_histogram(&self) -> Option<&DiscreteHistogram> {
        self.discrete.as_ref()
    }

    /// Brownian terminal values aggregated since the last reset
    pub fn terminal_values(&self) -> &[f64] {
        &self.terminals
    }

    pub fn frequency_series(&self) -> FrequencySeries {
        self.frequency.snapshot()
    }

    /// Reset unless `params` match the current experiment; returns whether
    /// a reset happened
    fn begin(&mut self, params: &SimulationParameters) -> bool {
        if self.params.as_ref() == Some(params) && self.runs > 0 {
            return false;
        }
        self.clear_aggregate();
        self.params = Some(*params);
        true
    }

    /// Simulate one trajectory and extend the experiment
    pub fn run_single<U: UniformSource + ?Sized>(
        &mut self,
        params: impl Into<SimulationParameters>,
        config: &SamplingConfig,
        rng: &mut U,
    ) -> RunReport {
        let (params, mut notices) = params.into().sanitized();
        let (config, config_notices) = config.sanitized();
        notices.extend(config_notices);
        let reset = self.begin(&params);

        let report = match params {
            SimulationParameters::Bernoulli(p) => RunReport::Discrete(self.single_discrete(
                &DiscreteWalk::Bernoulli(BernoulliWalk::from(&p)),
                reset,
                notices,
                rng,
            )),
            SimulationParameters::SignedWalk(p) => RunReport::Discrete(self.single_discrete(
                &DiscreteWalk::Signed(SignedWalk::from(&p)),
                reset,
                notices,
                rng,
            )),
            SimulationParameters::Brownian(p) => {
                RunReport::Continuous(self.single_brownian(&p, &config, reset, notices, rng))
            }
        };
        log_summary(report.summary());
        report
    }

    /// Rebuild the experiment from scratch through the adaptive sampling tier
    pub fn run_batch<U: UniformSource + ?Sized>(
        &mut self,
        params: impl Into<SimulationParameters>,
        config: &SamplingConfig,
        rng: &mut U,
    ) -> RunReport {
        let (params, mut notices) = params.into().sanitized();
        let (config, config_notices) = config.sanitized();
        notices.extend(config_notices);
        self.clear_aggregate();
        self.params = Some(params);

        let report = match params {
            SimulationParameters::Bernoulli(p) => RunReport::Discrete(self.batch_discrete(
                &DiscreteWalk::Bernoulli(BernoulliWalk::from(&p)),
                &config,
                notices,
                rng,
            )),
            SimulationParameters::SignedWalk(p) => RunReport::Discrete(self.batch_discrete(
                &DiscreteWalk::Signed(SignedWalk::from(&p)),
                &config,
                notices,
                rng,
            )),
            SimulationParameters::Brownian(p) => {
                RunReport::Continuous(self.batch_brownian(&p, &config, notices, rng))
            }
        };
        log_summary(report.summary());
        report
    }

    fn single_discrete<U: UniformSource + ?Sized>(
        &mut self,
        walk: &DiscreteWalk,
        reset: bool,
        mut notices: Vec<SimError>,
        rng: &mut U,
    ) -> RunOutput<i64> {
        let traj = walk.simulate(rng);
        let key = self.process_key();
        self.frequency.record(
            key,
            walk.success_probability(),
            walk.steps(),
            walk.success_fraction(traj.terminal() as f64),
        );
        let hist = self
            .discrete
            .get_or_insert_with(|| DiscreteHistogram::for_process(walk));
        hist.record_run(traj.terminal());
        self.runs += 1;
        let histogram = hist.snapshot();

        notices.extend(binomial_degeneracy(walk.success_probability()));
        self.discrete_output(walk, histogram, vec![traj], None, 1, reset, notices)
    }

    fn batch_discrete<U: UniformSource + ?Sized>(
        &mut self,
        walk: &DiscreteWalk,
        config: &SamplingConfig,
        mut notices: Vec<SimError>,
        rng: &mut U,
    ) -> RunOutput<i64> {
        let n = walk.steps();
        let plan = config.plan(n);
        debug!(trials = n, mode = ?plan.mode, runs = plan.runs, displayed = plan.displayed, "sampling plan");

        let mut hist = DiscreteHistogram::for_process(walk);
        let mut trajectories = Vec::new();
        let mut reduction = None;
        let mut mode = plan.mode;

        match plan.mode {
            SamplingMode::Exact => match ExactEnumerator::new(walk) {
                Ok(enumerator) => {
                    hist.rebuild(enumerator.terminals());
                    let total = enumerator.total();
                    if total <= config.display_cap as u64 {
                        trajectories = enumerator.collect();
                    } else {
                        let picked = sample_indices(rng, total as usize, config.display_cap);
                        trajectories = picked
                            .into_iter()
                            .map(|i| enumerator.trajectory_at(i as u64))
                            .collect();
                        warn!(
                            available = total,
                            shown = trajectories.len(),
                            "display down-sampled to a uniform subset"
                        );
                        notices.push(SimError::CapacityExceeded {
                            what: "displayed trajectories".to_string(),
                            requested: total,
                            cap: config.display_cap as u64,
                        });
                        reduction = Some(DisplayReduction {
                            available: total,
                            shown: trajectories.len(),
                        });
                    }
                }
                Err(err) => {
                    warn!(%err, "exact enumeration unavailable, falling back to Monte Carlo");
                    notices.push(err);
                    mode = SamplingMode::HybridMonteCarlo;
                    let runs = config.hybrid_run_count();
                    trajectories = simulate_runs(walk, runs, config.fan_size, &mut hist, rng);
                }
            },
            SamplingMode::HybridMonteCarlo => {
                trajectories = simulate_runs(walk, plan.runs, plan.displayed, &mut hist, rng);
            }
            SamplingMode::EstimationOnly => {
                simulate_runs(walk, plan.runs, 0, &mut hist, rng);
            }
        }

        self.runs = hist.total();
        let histogram = hist.snapshot();
        self.discrete = Some(hist);

        let (mean_outcome, _) = snapshot_moments(&histogram);
        let key = self.process_key();
        self.frequency.record(
            key,
            walk.success_probability(),
            n,
            walk.success_fraction(mean_outcome),
        );

        notices.extend(binomial_degeneracy(walk.success_probability()));
        let runs = self.runs;
        let mut out = self.discrete_output(walk, histogram, trajectories, reduction, runs, true, notices);
        out.summary.mode = Some(mode);
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn discrete_output(
        &self,
        walk: &DiscreteWalk,
        histogram: HistogramSnapshot,
        trajectories: Vec<Trajectory<i64>>,
        display_reduction: Option<DisplayReduction>,
        runs_this_trigger: u64,
        reset: bool,
        notices: Vec<SimError>,
    ) -> RunOutput<i64> {
        let theory = binomial_curve(walk, self.runs);
        let (empirical_mean, empirical_variance) = snapshot_moments(&histogram);
        RunOutput {
            x_axis: (0..=walk.steps()).map(|i| i as f64).collect(),
            expected_path: walk.expected_path(),
            summary: RunSummary {
                process: self.process_name(),
                mode: None,
                runs_this_trigger,
                total_runs: self.runs,
                displayed: trajectories.len(),
                reset,
                empirical_mean,
                empirical_variance,
            },
            trajectories,
            histogram,
            theory,
            display_reduction,
            frequency: Some(self.frequency.snapshot()),
            notices,
        }
    }

    fn single_brownian<U: UniformSource + ?Sized>(
        &mut self,
        params: &BrownianParams,
        config: &SamplingConfig,
        reset: bool,
        notices: Vec<SimError>,
        rng: &mut U,
    ) -> RunOutput<f64> {
        let model = ArithmeticBrownian::from(params);
        let path = model.simulate(rng);
        self.terminals.push(path.terminal());
        self.last_terminal = Some(path.terminal());
        self.runs += 1;
        self.brownian_output(&model, params, config, vec![path], 1, reset, notices)
    }

    fn batch_brownian<U: UniformSource + ?Sized>(
        &mut self,
        params: &BrownianParams,
        config: &SamplingConfig,
        notices: Vec<SimError>,
        rng: &mut U,
    ) -> RunOutput<f64> {
        let model = ArithmeticBrownian::from(params);
        let plan = config.brownian_plan();
        debug!(steps = model.steps, runs = plan.runs, displayed = plan.displayed, "brownian sampling plan");

        let mut terminals = Vec::with_capacity(plan.runs as usize);
        let mut fan = Vec::with_capacity(plan.displayed);
        for r in 0..plan.runs {
            if (r as usize) < plan.displayed {
                let path = model.simulate(rng);
                terminals.push(path.terminal());
                fan.push(path);
            } else {
                terminals.push(model.simulate_terminal(rng));
            }
        }
        self.terminals = terminals;
        self.last_terminal = None;
        self.runs = plan.runs;

        let mut out = self.brownian_output(&model, params, config, fan, plan.runs, true, notices);
        out.summary.mode = Some(plan.mode);
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn brownian_output(
        &self,
        model: &ArithmeticBrownian,
        params: &BrownianParams,
        config: &SamplingConfig,
        trajectories: Vec<Trajectory<f64>>,
        runs_this_trigger: u64,
        reset: bool,
        mut notices: Vec<SimError>,
    ) -> RunOutput<f64> {
        let hist = ContinuousHistogram::from_values(&self.terminals, config.histogram_bins);
        let mut histogram = hist.snapshot();
        if let Some(last) = self.last_terminal {
            histogram.most_recent[hist.bin_index(last)] = 1;
        }

        let std_dev = params.terminal_std_dev();
        notices.extend(normal_degeneracy(std_dev));
        let theory = normal_curve(
            params.terminal_mean(),
            std_dev,
            &histogram.labels,
            histogram.bin_width,
            self.runs,
            config.normal_curve,
        );

        let (empirical_mean, empirical_variance) = mean_and_variance(&self.terminals);
        RunOutput {
            x_axis: model.time_grid(),
            expected_path: model.expected_path(),
            summary: RunSummary {
                process: self.process_name(),
                mode: None,
                runs_this_trigger,
                total_runs: self.runs,
                displayed: trajectories.len(),
                reset,
                empirical_mean,
                empirical_variance,
            },
            trajectories,
            histogram,
            theory,
            display_reduction: None,
            frequency: None,
            notices,
        }
    }

    fn process_key(&self) -> &'static str {
        self.params
            .as_ref()
            .map(|p| p.process_name())
            .unwrap_or("none")
    }

    fn process_name(&self) -> String {
        self.process_key().to_string()
    }
}

/// Run `runs` independent simulations into `hist`, keeping the first `fan`
/// trajectories for display
fn simulate_runs<P: DiscreteProcess, U: UniformSource + ?Sized>(
    walk: &P,
    runs: u64,
    fan: usize,
    hist: &mut DiscreteHistogram,
    rng: &mut U,
) -> Vec<Trajectory<i64>> {
    let mut trajectories = Vec::with_capacity(fan.min(runs as usize));
    for r in 0..runs {
        if (r as usize) < fan {
            let traj = walk.simulate(rng);
            hist.add(traj.terminal());
            trajectories.push(traj);
        } else {
            hist.add(walk.simulate_terminal(rng));
        }
    }
    trajectories
}

fn snapshot_moments(snapshot: &HistogramSnapshot) -> (f64, f64) {
    let total = snapshot.total();
    if total == 0 {
        return (0.0, 0.0);
    }
    let n = total as f64;
    let mean = snapshot
        .labels
        .iter()
        .zip(&snapshot.counts)
        .map(|(x, &c)| x * c as f64)
        .sum::<f64>()
        / n;
    let variance = snapshot
        .labels
        .iter()
        .zip(&snapshot.counts)
        .map(|(x, &c)| (x - mean).powi(2) * c as f64)
        .sum::<f64>()
        / n;
    (mean, variance)
}

fn log_summary(summary: &RunSummary) {
    info!(
        process = %summary.process,
        mode = ?summary.mode,
        runs = summary.runs_this_trigger,
        total_runs = summary.total_runs,
        displayed = summary.displayed,
        reset = summary.reset,
        "run complete"
    );
}
