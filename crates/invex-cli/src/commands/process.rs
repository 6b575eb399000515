//! Process command - post-process raw extraction results.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, warn};

use invex_core::{CleanResult, FieldKind, PostProcessor, RawExtraction};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file or glob pattern of raw extraction JSON files
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Continue when a file fails to parse
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of clean results
    Json,
    /// Flat CSV, one row per result
    Csv,
}

/// A raw input file may hold one extraction or a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Batch(Vec<RawExtraction>),
    Single(Box<RawExtraction>),
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let processor = PostProcessor::new(&config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching JSON files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results: Vec<CleanResult> = Vec::new();
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for path in &files {
        match load_raw_extractions(path) {
            Ok(raws) => {
                debug!("loaded {} raw extractions from {}", raws.len(), path.display());
                for raw in raws {
                    results.push(processor.process(&raw));
                }
            }
            Err(e) => {
                if args.continue_on_error {
                    warn!("failed to load {}: {}", path.display(), e);
                    failed.push((path.clone(), e.to_string()));
                } else {
                    anyhow::bail!("Failed to load {}: {}", path.display(), e);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let content = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&results)?,
        OutputFormat::Csv => format_results_csv(&results)?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, content)?;
            println!(
                "{} Wrote {} clean results to {}",
                style("✓").green(),
                results.len(),
                path.display()
            );
        }
        None => println!("{content}"),
    }

    println!(
        "{} Processed {} extraction results from {} files in {:?}",
        style("✓").green(),
        results.len(),
        files.len(),
        start.elapsed()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

fn load_raw_extractions(path: &PathBuf) -> anyhow::Result<Vec<RawExtraction>> {
    let content = fs::read_to_string(path)?;
    let input: RawInput = serde_json::from_str(&content)?;

    let raws = match input {
        RawInput::Batch(raws) => raws,
        RawInput::Single(raw) => vec![*raw],
    };

    for raw in &raws {
        raw.ensure_complete()
            .map_err(|e| anyhow::anyhow!("{}: {}", raw.source_file, e))?;
    }

    Ok(raws)
}

fn format_results_csv(results: &[CleanResult]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<String> = vec!["source_file".to_string()];
    header.extend(FieldKind::ALL.iter().map(|k| k.as_str().to_string()));
    header.push("success".to_string());
    header.extend(FieldKind::ALL.iter().map(|k| format!("{k}_confidence")));
    wtr.write_record(&header)?;

    for result in results {
        let mut record: Vec<String> = vec![result.source_file.clone()];
        record.extend(
            FieldKind::ALL
                .iter()
                .map(|k| result.field(*k).normalized_value.clone()),
        );
        record.push(result.success.to_string());
        record.extend(
            FieldKind::ALL
                .iter()
                .map(|k| format!("{:.2}", result.field(*k).confidence)),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(String::from_utf8(wtr.into_inner()?)?)
}
