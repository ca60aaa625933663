//! `trajeval` CLI: generate scenario datasets and score recorded predictions.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eval_core::{ContextReport, EvaluationConfig, EvaluationPipeline, ObstacleContainer};
use sim::{generate_dataset, load_dataset, save_dataset, FeatureDataset, PredictionModel};
use sim::{Scenario, ScenarioKind};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "trajeval", about = "Offline evaluation of motion-prediction output")]
struct Cli {
    /// Evaluation configuration file (JSON); defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a named scenario, evaluate it, and print per-context metrics.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// How recorded predictions are synthesized
        #[arg(long, value_enum, default_value_t = PredictionModel::Noisy)]
        predictions: PredictionModel,
        /// Output the evaluation report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the generated dataset
        #[arg(long)]
        save_dataset: Option<PathBuf>,
    },
    /// Evaluate a previously recorded dataset file.
    Evaluate {
        /// Path to dataset JSON file
        input: PathBuf,
        /// Output the evaluation report to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let pipeline =
        EvaluationPipeline::new(config).context("invalid evaluation configuration")?;

    match cli.command {
        Commands::RunScenario { scenario, seed, predictions, output, save_dataset: save_path } => {
            run_scenario(
                &pipeline,
                scenario,
                seed,
                predictions,
                output.as_deref(),
                save_path.as_deref(),
            )?;
        }
        Commands::Evaluate { input, output } => {
            run_evaluate(&pipeline, &input, output.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EvaluationConfig> {
    let Some(path) = path else {
        return Ok(EvaluationConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

fn run_scenario(
    pipeline: &EvaluationPipeline,
    kind: ScenarioKind,
    seed: u64,
    predictions: PredictionModel,
    output_path: Option<&Path>,
    dataset_path: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    let dataset = generate_dataset(&scenario, predictions, seed);
    println!(
        "Generated scenario '{}' (seed={}): {} records, {} agents",
        scenario.name,
        seed,
        dataset.records.len(),
        scenario.agents.len()
    );

    if let Some(path) = dataset_path {
        save_dataset(&dataset, path)?;
        println!("Dataset saved to {}", path.display());
    }

    evaluate_dataset(pipeline, &dataset, output_path)
}

fn run_evaluate(
    pipeline: &EvaluationPipeline,
    input: &Path,
    output_path: Option<&Path>,
) -> Result<()> {
    let dataset = load_dataset(input)?;
    println!("Loaded dataset '{}': {} records", dataset.name, dataset.records.len());

    evaluate_dataset(pipeline, &dataset, output_path)
}

fn evaluate_dataset(
    pipeline: &EvaluationPipeline,
    dataset: &FeatureDataset,
    output_path: Option<&Path>,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mut container = ObstacleContainer::new();
    let report = pipeline.evaluate(&mut container, dataset.records.iter().cloned());
    let elapsed = start.elapsed();

    println!(
        "Done: {} records, {} obstacles, {} unclassified, {} without future, elapsed={:.2}s",
        report.diagnostics.n_records,
        report.diagnostics.n_obstacles,
        report.diagnostics.n_skipped_unclassified,
        report.diagnostics.n_missing_future,
        elapsed.as_secs_f64(),
    );
    print_bucket("on-lane ", &report.on_lane);
    print_bucket("junction", &report.junction);

    if let Some(path) = output_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Report saved to {}", path.display());
    }

    Ok(())
}

fn print_bucket(name: &str, bucket: &ContextReport) {
    println!(
        "{name}: frames={:<6} samples={:<7} recall={} mse={}",
        bucket.counters.n_frame_obstacles,
        bucket.counters.n_predicted_samples,
        fmt_metric(bucket.summary.recall),
        fmt_metric(bucket.summary.mean_squared_error),
    );
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "undefined".into(),
    }
}
