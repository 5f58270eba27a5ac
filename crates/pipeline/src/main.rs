//! Voyage pipeline CLI
//!
//! One subcommand per stage; each invocation is an independent process
//! that reads the previous stage's files and writes its own. A failed
//! stage logs the error and exits non-zero.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use voyage_core::{logging, DataLayout};
use voyage_pipeline::{evaluate, features, ingest, preprocess, train};

#[derive(Parser, Debug)]
#[command(name = "voyage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Linear file-based training pipeline over the passenger survival table", long_about = None)]
struct Cli {
    /// Data root holding raw/, interim/, and engineered/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Shared parameter document
    #[arg(long, default_value = "params.yaml")]
    params: PathBuf,

    /// Directory for per-stage log files
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the source dataset and write the seeded raw train/test split
    Ingest {
        /// Dataset URL or local CSV path
        #[arg(long, default_value = ingest::DEFAULT_SOURCE)]
        source: String,

        /// Seed for the reproducible partition
        #[arg(long, default_value_t = ingest::DEFAULT_SEED)]
        seed: u64,
    },
    /// Clean and encode the raw split
    Preprocess,
    /// Apply feature engineering to the interim split
    Features,
    /// Fit the classifier on the engineered training split
    Train {
        /// Where to write the model artifact
        #[arg(long, default_value = "models/model.json")]
        model: PathBuf,
    },
    /// Score the persisted model against the engineered test split
    Evaluate {
        /// Model artifact path
        #[arg(long, default_value = "models/model.json")]
        model: PathBuf,

        /// Where to write the metrics report
        #[arg(long, default_value = "reports/metrics.json")]
        report: PathBuf,
    },
    /// Run every stage in order, stopping at the first failure
    Run {
        /// Dataset URL or local CSV path
        #[arg(long, default_value = ingest::DEFAULT_SOURCE)]
        source: String,

        /// Seed for the reproducible partition
        #[arg(long, default_value_t = ingest::DEFAULT_SEED)]
        seed: u64,

        /// Where to write the model artifact
        #[arg(long, default_value = "models/model.json")]
        model: PathBuf,

        /// Where to write the metrics report
        #[arg(long, default_value = "reports/metrics.json")]
        report: PathBuf,
    },
}

impl Command {
    /// Per-stage log file name, matching the stage's namespace.
    fn stage_name(&self) -> &'static str {
        match self {
            Command::Ingest { .. } => "data_ingestion",
            Command::Preprocess => "data_preprocessing",
            Command::Features => "feature_engineering",
            Command::Train { .. } => "model_building",
            Command::Evaluate { .. } => "model_evaluation",
            Command::Run { .. } => "pipeline",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.command.stage_name(), &cli.log_dir)
        .context("Failed to initialize logging")?;

    let layout = DataLayout::new(&cli.data_dir);

    match cli.command {
        Command::Ingest { source, seed } => {
            ingest::run(&source, &layout, &cli.params, seed).context("Ingestion stage failed")?;
        }
        Command::Preprocess => {
            preprocess::run(&layout).context("Preprocessing stage failed")?;
        }
        Command::Features => {
            features::run(&layout).context("Feature engineering stage failed")?;
        }
        Command::Train { model } => {
            train::run(&layout, &cli.params, &model).context("Training stage failed")?;
        }
        Command::Evaluate { model, report } => {
            evaluate::run(&layout, &model, &report).context("Evaluation stage failed")?;
        }
        Command::Run {
            source,
            seed,
            model,
            report,
        } => {
            ingest::run(&source, &layout, &cli.params, seed).context("Ingestion stage failed")?;
            preprocess::run(&layout).context("Preprocessing stage failed")?;
            features::run(&layout).context("Feature engineering stage failed")?;
            train::run(&layout, &cli.params, &model).context("Training stage failed")?;
            evaluate::run(&layout, &model, &report).context("Evaluation stage failed")?;
            info!("Pipeline completed; metrics at {}", report.display());
        }
    }

    Ok(())
}
