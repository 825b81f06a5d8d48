//! Validate a trained model, log the run and register it when it is good
//! enough.
//!
//! ```bash
//! validate_model data/holdout.csv models/model.pickle          # score only
//! validate_model data/holdout.csv models/model.pickle true     # also register
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use diabetes_model::config::PipelineConfig;
use diabetes_model::logging::init_logging;
use diabetes_model::pipeline::ValidationPipeline;
use diabetes_model::tracking::MlflowTracker;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "validate_model",
    version,
    about = "Score a trained model on held-out data and register it"
)]
struct Args {
    /// Held-out table (.csv or .parquet, optionally .gz; local or s3://)
    #[arg(env = "DATA_PATH")]
    data_path: String,

    /// Model bundle produced by train_model
    #[arg(env = "MODEL_PATH")]
    model_path: String,

    /// Register the model when its rmse passes the threshold
    #[arg(default_value_t = false, action = ArgAction::Set)]
    register: bool,
}

fn run(args: Args) -> Result<()> {
    let config = PipelineConfig::from_env();
    let tracker = MlflowTracker::connect(&config.tracking)
        .with_context(|| format!("Cannot use tracking server {}", config.tracking.uri))?;

    let mut pipeline = ValidationPipeline::new(config, tracker);
    let report = pipeline
        .run(&args.data_path, &args.model_path, args.register)
        .with_context(|| format!("Validation of {} failed", args.model_path))?;

    info!(
        run_id = %report.run_id,
        rows = report.rows_evaluated,
        rmse = report.rmse,
        predictions = %report.prediction_path,
        "Validation finished"
    );
    if let Some(version) = report.registered {
        info!("Registered {} version {}", version.name, version.version);
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_is_opt_in() {
        let args = Args::try_parse_from(["validate_model", "holdout.csv", "model.pickle"]).unwrap();
        assert!(!args.register);

        let args =
            Args::try_parse_from(["validate_model", "holdout.csv", "model.pickle", "true"]).unwrap();
        assert!(args.register);
    }

    #[test]
    fn test_register_rejects_non_boolean() {
        let result = Args::try_parse_from(["validate_model", "holdout.csv", "model.pickle", "yes"]);
        assert!(result.is_err());
    }
}
