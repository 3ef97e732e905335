// scripts/benchmark.rs
use std::env;
use std::fs::File;
use std::io::Write;

use stochastic_lab::math_utils::Timer;
use stochastic_lab::params::{BernoulliParams, BrownianParams, SignedWalkParams};
use stochastic_lab::rng::{RngFactory, UniformSource};
use stochastic_lab::{ExperimentState, RunReport, SamplingConfig, SimulationParameters};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    generator: &'static str,
    mode: String,
    runs: u64,
    time_ms: f64,
    throughput_runs_per_sec: f64,
    empirical_mean: f64,
    theoretical_mean: f64,
    abs_error: f64,
}

/// Mean of the reference curve, weighted by label
fn theory_mean(report: &RunReport) -> f64 {
    let theory = report.theory();
    let total = theory.total();
    if total <= 0.0 {
        return f64::NAN;
    }
    theory
        .labels
        .iter()
        .zip(&theory.expected)
        .map(|(x, w)| x * w)
        .sum::<f64>()
        / total
}

fn bench_case<U: UniformSource>(
    name: &str,
    generator: &'static str,
    params: SimulationParameters,
    config: &SamplingConfig,
    repeats: usize,
    rng: &mut U,
) -> BenchmarkResult {
    let mut state = ExperimentState::new();

    // Warm-up run
    state.run_batch(params, config, rng);

    let timer = Timer::new();
    let mut report = state.run_batch(params, config, rng);
    for _ in 1..repeats {
        report = state.run_batch(params, config, rng);
    }
    let time_ms = timer.elapsed_ms() / repeats.max(1) as f64;

    let summary = report.summary();
    let runs = summary.runs_this_trigger;
    // Brownian theory is binned over a padded range, so the closed-form
    // terminal mean is the better reference there
    let theoretical_mean = match params {
        SimulationParameters::Brownian(p) => p.terminal_mean(),
        _ => theory_mean(&report),
    };
    let empirical_mean = summary.empirical_mean;

    BenchmarkResult {
        name: name.to_string(),
        generator,
        mode: summary
            .mode
            .map(|m| format!("{:?}", m))
            .unwrap_or_else(|| "-".to_string()),
        runs,
        time_ms,
        throughput_runs_per_sec: runs as f64 / (time_ms / 1000.0),
        empirical_mean,
        theoretical_mean,
        abs_error: (empirical_mean - theoretical_mean).abs(),
    }
}

/// Time one case with both the standard and the counter-based generator
fn bench_generators(
    results: &mut Vec<BenchmarkResult>,
    name: &str,
    params: SimulationParameters,
    config: &SamplingConfig,
    repeats: usize,
    seed: u64,
) {
    let factory = RngFactory::new(seed);
    let mut std_rng = factory.create_std_rng(0);
    results.push(bench_case(name, "std", params, config, repeats, &mut std_rng));
    let mut counter_rng = factory.create_counter_rng(0);
    results.push(bench_case(name, "counter", params, config, repeats, &mut counter_rng));
}

fn run_discrete_benchmarks(config: &SamplingConfig) -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    for &trials in &[8usize, 12, 16, 20, 100, 1000] {
        let params = BernoulliParams { trials, p: 0.5 };
        println!("  Bernoulli walk, n = {}", trials);
        bench_generators(
            &mut results,
            &format!("Bernoulli n={}", trials),
            params.into(),
            config,
            5,
            1000 + trials as u64,
        );
    }

    for &(trials, repetitions) in &[(12usize, 1u32), (20, 2), (200, 3)] {
        let params = SignedWalkParams {
            trials,
            p: 0.5,
            repetitions,
        };
        println!("  Signed walk, n = {}, m = {}", trials, repetitions);
        bench_generators(
            &mut results,
            &format!("Signed n={} m={}", trials, repetitions),
            params.into(),
            config,
            5,
            2000 + trials as u64,
        );
    }

    results
}

fn run_brownian_benchmarks(config: &SamplingConfig) -> Vec<BenchmarkResult> {
    let mut results = Vec::new();

    for &steps in &[10usize, 100, 1000] {
        let params = BrownianParams {
            horizon: 1.0,
            steps,
            drift: 0.2,
            volatility: 1.0,
        };
        println!("  Brownian, N = {}", steps);
        bench_generators(
            &mut results,
            &format!("Brownian N={}", steps),
            params.into(),
            config,
            3,
            3000 + steps as u64,
        );
    }

    results
}

fn write_results_to_csv(results: &[BenchmarkResult], filename: &str) -> std::io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(
        file,
        "benchmark,generator,mode,runs,time_ms,throughput_runs_per_sec,empirical_mean,theoretical_mean,abs_error"
    )?;
    for result in results {
        writeln!(
            file,
            "{},{},{},{},{:.3},{:.0},{:.6},{:.6},{:.6}",
            result.name,
            result.generator,
            result.mode,
            result.runs,
            result.time_ms,
            result.throughput_runs_per_sec,
            result.empirical_mean,
            result.theoretical_mean,
            result.abs_error
        )?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("stochastic-lab Sampling Benchmark Suite");
    println!("=======================================\n");
    println!("  OS: {}", env::consts::OS);
    println!("  RUSTFLAGS: {}", env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()));
    println!();

    let config = SamplingConfig::default();

    println!("Running discrete walk benchmarks...");
    let mut all_results = run_discrete_benchmarks(&config);

    println!("\nRunning Brownian benchmarks...");
    all_results.extend(run_brownian_benchmarks(&config));

    println!("\n{:=<110}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<110}", "");
    println!(
        "{:<22} {:>8} {:>17} {:>8} {:>11} {:>14} {:>10} {:>10} {:>10}",
        "Benchmark", "Rng", "Mode", "Runs", "Time (ms)", "Runs/sec", "Mean", "Theory", "Abs Err"
    );
    println!("{:-<110}", "");
    for result in &all_results {
        println!(
            "{:<22} {:>8} {:>17} {:>8} {:>11.3} {:>14.0} {:>10.4} {:>10.4} {:>10.4}",
            result.name,
            result.generator,
            result.mode,
            result.runs,
            result.time_ms,
            result.throughput_runs_per_sec,
            result.empirical_mean,
            result.theoretical_mean,
            result.abs_error
        );
    }
    println!("{:=<110}", "");

    let filename = env::args()
        .nth(1)
        .unwrap_or_else(|| "benchmark_results.csv".to_string());
    match write_results_to_csv(&all_results, &filename) {
        Ok(()) => println!("\nResults written to {}", filename),
        Err(e) => eprintln!("\nFailed to write {}: {}", filename, e),
    }

    println!("\nTo reproduce: cargo run --bin benchmark --release [output.csv]");
}
