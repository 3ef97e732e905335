// demos/demo.rs
use std::fs::File;
use std::io::{self, BufWriter};

use stochastic_lab::math_utils::Timer;
use stochastic_lab::output::{CsvSink, PresentationSink};
use stochastic_lab::params::{BernoulliParams, BrownianParams, SignedWalkParams};
use stochastic_lab::rng;
use stochastic_lab::{ExperimentState, RunReport, SamplingConfig};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let csv_path = args
        .iter()
        .position(|a| a == "--csv")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let config = SamplingConfig::default();
    let mut state = ExperimentState::new();
    let mut rng = rng::seed_rng_from_u64(42);
    let mut reports = Vec::new();

    println!("--- Bernoulli walk ---");
    for &trials in &[10usize, 16, 60] {
        let timer = Timer::new();
        let report = state.run_batch(BernoulliParams { trials, p: 0.5 }, &config, &mut rng);
        print_report(&format!("n = {}", trials), &report, timer.elapsed_ms());
        reports.push(report);
    }

    let series = state.frequency_series();
    for point in &series.points {
        println!("  n = {:>3}: successes/n = {:.4}", point.trials, point.frequency);
    }
    println!("  mean frequency = {:.4}", series.mean_frequency);

    println!("\n--- Signed walk, single runs ---");
    let signed = SignedWalkParams {
        trials: 20,
        p: 0.3,
        repetitions: 2,
    };
    println!("step probability q = {:.4}", signed.step_probability());
    for i in 1..=5 {
        let report = state.run_single(signed, &config, &mut rng);
        let out = report.as_discrete();
        let terminal = out
            .and_then(|o| o.trajectories.first())
            .map(|t| t.terminal())
            .unwrap_or_default();
        println!(
            "  run {}: terminal = {:+}, accumulated runs = {}",
            i,
            terminal,
            report.summary().total_runs
        );
    }
    let timer = Timer::new();
    let report = state.run_batch(signed, &config, &mut rng);
    print_report("batch", &report, timer.elapsed_ms());
    reports.push(report);

    println!("\n--- Arithmetic Brownian motion ---");
    let brownian = BrownianParams {
        horizon: 1.0,
        steps: 250,
        drift: 0.5,
        volatility: 1.2,
    };
    let timer = Timer::new();
    let report = state.run_batch(brownian, &config, &mut rng);
    print_report("T = 1, N = 250", &report, timer.elapsed_ms());
    println!(
        "  theory: mean = {:.4}, sd = {:.4}",
        brownian.terminal_mean(),
        brownian.terminal_std_dev()
    );
    reports.push(report);

    if let Some(path) = csv_path {
        let mut sink = CsvSink::new(BufWriter::new(File::create(&path)?));
        for report in &reports {
            sink.present(report)?;
        }
        println!("\nWrote {} reports to {}", reports.len(), path);
    }
    Ok(())
}

fn print_report(label: &str, report: &RunReport, elapsed_ms: f64) {
    let summary = report.summary();
    println!(
        "{} [{}] mode = {:?}, runs = {}, displayed = {}, {:.2} ms",
        summary.process, label, summary.mode, summary.runs_this_trigger, summary.displayed, elapsed_ms
    );
    println!(
        "  empirical mean = {:.4}, variance = {:.4}, theory total = {:.1}",
        summary.empirical_mean,
        summary.empirical_variance,
        report.theory().total()
    );
    if let Some(reduction) = report.display_reduction() {
        println!("  showing {} of {} trajectories", reduction.shown, reduction.available);
    }
    for notice in report.notices() {
        println!("  notice: {}", notice);
    }
}
