//! Evaluate command - compare clean results against ground truth.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::warn;

use invex_core::{CleanResult, Evaluator, GroundTruthStore};

/// Arguments for the evaluate command.
#[derive(Args)]
pub struct EvaluateArgs {
    /// Clean results JSON file (output of `invex process`)
    #[arg(required = true)]
    results: PathBuf,

    /// Ground truth JSON file
    #[arg(short, long)]
    ground_truth: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Case-sensitive comparisons
    #[arg(long)]
    case_sensitive: bool,

    /// Partial-match similarity threshold (0.0 - 1.0)
    #[arg(long)]
    partial_threshold: Option<f64>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// Human-readable report
    Text,
    /// JSON report
    Json,
}

pub async fn run(args: EvaluateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let mut eval_config = config.eval.clone();
    if args.case_sensitive {
        eval_config.case_sensitive = true;
    }
    if let Some(threshold) = args.partial_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            anyhow::bail!("Partial threshold must be within 0.0 - 1.0, got {threshold}");
        }
        eval_config.partial_threshold = threshold;
    }

    let content = fs::read_to_string(&args.results)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.results.display(), e))?;
    let results: Vec<CleanResult> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", args.results.display(), e))?;

    let store = GroundTruthStore::load(&args.ground_truth)?;

    let summary = store.validate_records();
    if summary.complete_records < summary.total_records {
        warn!(
            "ground truth has {} incomplete records",
            summary.total_records - summary.complete_records
        );
    }

    let evaluator = Evaluator::new(eval_config);
    let report = evaluator.evaluate(&results, &store);

    let rendered = match args.format {
        ReportFormat::Text => report.render_text(),
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!(
                "{} Report written to {}",
                style("✓").green(),
                path.display()
            );
        }
        None => println!("{rendered}"),
    }

    println!(
        "{} Evaluated {} results against {} ground truth records ({:.1}% accuracy)",
        style("✓").green(),
        report.total_samples,
        store.len(),
        report.overall_accuracy * 100.0
    );

    Ok(())
}
