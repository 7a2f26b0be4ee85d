//! RFML Experiment CLI
//!
//! Run localization experiments against the simulated RF channel.

use clap::Parser;
use rfml_core::{Kernel, MeasurementSelector};
use rfml_sim::experiments::ExperimentId;
use rfml_sim::{ExperimentConfig, ExperimentExport, ExperimentResult, ExperimentRunner};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// RFML localization experiment CLI
#[derive(Parser, Debug)]
#[command(name = "rfml-sim")]
#[command(about = "Run kernel-trick localization experiments on a simulated RF channel", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Experiment to run (fingerprint_grid, random_split, ideal_channel, all)
    #[arg(short = 'E', long, default_value = "all")]
    experiment: String,

    /// Number of receivers (default: the reference six-receiver layout)
    #[arg(short, long)]
    receivers: Option<usize>,

    /// Number of test runs
    #[arg(short, long, default_value = "200")]
    test_runs: usize,

    /// Measurement selector (0-6 or tdoa, drss, aoa, tdoa_drss, tdoa_aoa, drss_aoa, all)
    #[arg(long, default_value = "all")]
    features: String,

    /// Pairwise kernel (laplacian, rbf, linear, polynomial, sigmoid, cosine)
    #[arg(short, long, default_value = "laplacian")]
    kernel: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export results to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn build_config(args: &Args) -> ExperimentConfig {
    let selector: MeasurementSelector = args.features.parse().unwrap_or_else(|e| exit_with(e));
    let kernel: Kernel = args.kernel.parse().unwrap_or_else(|e| exit_with(e));

    let mut config = ExperimentConfig {
        kernel,
        ..Default::default()
    }
    .with_selector(selector)
    .with_test_runs(args.test_runs);

    if let Some(n_rx) = args.receivers {
        config = config.with_receivers(n_rx).unwrap_or_else(|e| exit_with(e));
    }
    config
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("RFML Experiment Harness v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse experiments
    let experiments: Vec<ExperimentId> = if args.experiment == "all" {
        ExperimentId::all()
    } else {
        vec![args.experiment.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available experiments: fingerprint_grid, random_split, ideal_channel, all");
            std::process::exit(1);
        })]
    };

    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let config = build_config(&args);
    let runner = ExperimentRunner::new(seed, config.clone());
    let mut export = ExperimentExport::new(seed, config);
    let mut all_results: Vec<ExperimentResult> = Vec::new();

    for experiment in &experiments {
        let result = match runner.run(*experiment) {
            Ok(result) => result,
            Err(e) => {
                error!("✗ {} (seed={}) ERROR: {}", experiment.name(), seed, e);
                std::process::exit(1);
            }
        };

        if !args.json {
            if result.passed {
                info!(
                    "✓ {} (seed={}) PASSED rmse={:.2}m",
                    experiment.name(),
                    seed,
                    result.report.rmse
                );
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    experiment.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }

        export.add_result(result.clone());
        all_results.push(result);
    }

    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if let Some(path) = &args.export {
        match export.write_to_file(path) {
            Ok(()) => info!("Exported {} results to {}", total, path),
            Err(e) => error!("Failed to write export: {}", e),
        }
    }

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "experiment": r.experiment.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "rmse": r.report.rmse,
                    "median_error": r.report.median_error,
                    "block_counts": r.block_counts,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with(e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} experiments passed!", total);
        } else {
            error!("❌ {}/{} experiments failed!", failed_count, total);
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
