//! complaint-loss - train and serve the monetary-loss complaint classifier.
//!
//! Usage:
//!   complaint-loss train --input complaints.csv --output model.clpa
//!   complaint-loss predict --model model.clpa "I was charged twice."
//!   complaint-loss score --model model.clpa --input new.csv --output scored.csv

use clap::{Parser, Subcommand};
use complaint_loss::config::PipelineConfig;
use complaint_loss::data::{read_records_path, read_scoring_rows_path, write_scored};
use complaint_loss::error::ComplaintError;
use complaint_loss::pipeline::{ComplaintPipeline, FittedPipeline};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Classify consumer complaints by likelihood of monetary loss.
#[derive(Parser)]
#[command(name = "complaint-loss")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a pipeline on labeled complaints and write the artifact
    Train {
        /// Complaint table (CSV) with narrative and response-code columns
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact file to write
        #[arg(short, long, default_value = "model.clpa")]
        output: PathBuf,

        /// Pipeline configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Classify narratives given on the command line
    Predict {
        /// Fitted artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Narratives to classify
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Score every row of a table and write predictions as CSV
    Score {
        /// Fitted artifact
        #[arg(short, long)]
        model: PathBuf,

        /// Table to score (CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Scored table to write (CSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Identifier column header (default: complaint id)
        #[arg(long)]
        id_column: Option<String>,

        /// Narrative column header (default: narrative)
        #[arg(long)]
        narrative_column: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Train {
            input,
            output,
            config,
        } => cmd_train(&input, &output, config.as_deref(), cli.json),
        Commands::Predict { model, texts } => cmd_predict(&model, &texts, cli.json),
        Commands::Score {
            model,
            input,
            output,
            id_column,
            narrative_column,
        } => cmd_score(
            &model,
            &input,
            &output,
            id_column.as_deref(),
            narrative_column.as_deref(),
            cli.json,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    }
}

/// Exit status per error family.
fn exit_code(error: &ComplaintError) -> ExitCode {
    match error {
        ComplaintError::Config { .. } => ExitCode::from(2),
        ComplaintError::MissingColumn { .. }
        | ComplaintError::Csv { .. }
        | ComplaintError::InvalidRecord { .. }
        | ComplaintError::Io(_) => ExitCode::from(3),
        ComplaintError::EmptyInput(_)
        | ComplaintError::DimensionMismatch { .. }
        | ComplaintError::InvalidHyperparameter { .. }
        | ComplaintError::EmptyVocabulary { .. } => ExitCode::from(5),
        ComplaintError::Serialization(_)
        | ComplaintError::FormatError { .. }
        | ComplaintError::UnsupportedVersion { .. }
        | ComplaintError::ChecksumMismatch { .. }
        | ComplaintError::FingerprintMismatch { .. } => ExitCode::from(6),
        ComplaintError::Pattern(_) | ComplaintError::ThreadPool(_) => ExitCode::from(1),
    }
}

fn cmd_train(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    json: bool,
) -> complaint_loss::Result<()> {
    let config = match config {
        Some(path) => PipelineConfig::from_toml_path(path)?,
        None => PipelineConfig::default(),
    };

    let records = read_records_path(input)?;
    let (fitted, report) = ComplaintPipeline::new(config)?.fit_records(&records)?;
    fitted.save(output)?;

    let artifact = fitted.artifact();
    if json {
        let summary = serde_json::json!({
            "artifact": output.display().to_string(),
            "records": report.total(),
            "labeled": report.labeled,
            "in_progress": report.in_progress,
            "unknown": report.unknown,
            "positives": report.positives,
            "vocabulary": artifact.features.vocabulary_size(),
            "iterations": artifact.classifier.iterations(),
            "converged": artifact.classifier.converged(),
            "severity": artifact.severity.is_some(),
            "default_label": artifact.default_label().code(),
        });
        println!("{summary:#}");
    } else {
        println!("Trained {}", output.display());
        println!("  records:     {}", report.total());
        println!(
            "  labeled:     {} ({} in progress, {} unknown excluded)",
            report.labeled, report.in_progress, report.unknown
        );
        println!("  losses:      {}", report.positives);
        println!("  vocabulary:  {}", artifact.features.vocabulary_size());
        println!(
            "  iterations:  {}{}",
            artifact.classifier.iterations(),
            if artifact.classifier.converged() { "" } else { " (not converged)" }
        );
    }
    Ok(())
}

fn cmd_predict(model: &Path, texts: &[String], json: bool) -> complaint_loss::Result<()> {
    let fitted = FittedPipeline::load(model)?;
    let (predictions, severities) = fitted.predict_many_with_severity(texts);

    if json {
        let rows: Vec<serde_json::Value> = texts
            .iter()
            .zip(&predictions)
            .enumerate()
            .map(|(i, (text, prediction))| {
                serde_json::json!({
                    "text": text,
                    "prediction": prediction.label.code(),
                    "description": prediction.label.description(),
                    "probability": prediction.probability,
                    "severity": severities.as_ref().and_then(|s| s.get(i).copied()),
                })
            })
            .collect();
        println!("{:#}", serde_json::Value::Array(rows));
    } else {
        for (i, prediction) in predictions.iter().enumerate() {
            let severity = severities
                .as_ref()
                .and_then(|s| s.get(i))
                .map(|s| format!(" severity={s}"))
                .unwrap_or_default();
            println!(
                "{}\t{:.4}\t{}{severity}",
                prediction.label,
                prediction.probability,
                prediction.label.description()
            );
        }
    }
    Ok(())
}

fn cmd_score(
    model: &Path,
    input: &Path,
    output: &Path,
    id_column: Option<&str>,
    narrative_column: Option<&str>,
    json: bool,
) -> complaint_loss::Result<()> {
    // A bad artifact stops the run before any input is read.
    let fitted = FittedPipeline::load(model)?;
    let table = read_scoring_rows_path(input, narrative_column, id_column)?;
    let scored = fitted.score_rows(&table.rows);

    let file = File::create(output)?;
    write_scored(BufWriter::new(file), &table.id_header, &scored)?;

    let losses = scored
        .iter()
        .filter(|row| row.prediction.label.class() == 1)
        .count();
    if json {
        let summary = serde_json::json!({
            "output": output.display().to_string(),
            "rows": scored.len(),
            "likely_loss": losses,
        });
        println!("{summary:#}");
    } else {
        println!("Scored {} rows into {} ({losses} likely loss)", scored.len(), output.display());
    }
    Ok(())
}
