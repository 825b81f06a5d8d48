//! Train the diabetes-indicator model.
//!
//! ```bash
//! train_model data/train.csv models/model.pickle
//! TRAIN_DATA_PATH=s3://bucket/train.parquet MODEL_DEST_PATH=s3://bucket/model.pickle train_model
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use diabetes_model::config::PipelineConfig;
use diabetes_model::logging::init_logging;
use diabetes_model::pipeline::TrainingPipeline;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "train_model", version, about = "Train and persist the diabetes model")]
struct Args {
    /// Training table (.csv or .parquet, optionally .gz; local or s3://)
    #[arg(env = "TRAIN_DATA_PATH")]
    data_path: String,

    /// Destination of the model bundle
    #[arg(env = "MODEL_DEST_PATH")]
    model_path: String,
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig::from_env();
    let report = TrainingPipeline::new(config)
        .run(&args.data_path, &args.model_path)
        .with_context(|| format!("Training on {} failed", args.data_path))?;

    info!(
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        features = report.feature_names.len(),
        intercept = report.intercept,
        training_rmse = report.training_rmse,
        bytes = report.bytes_written,
        "Model saved to {}",
        args.model_path
    );
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging();

    if let Err(err) = run(args) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
