use super::load_encoded;
use crate::config::PipelineConfig;
use crate::data::{DataStore, WriteOutcome};
use crate::error::{PipelineError, Result};
use crate::metrics::Metrics;
use crate::model::{InferenceModel, ModelBundle};
use crate::serialization::Artifact;
use crate::trainer::Trainer;
use tracing::{info, info_span};

/// Summary of a finished training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    /// In-sample rmse, for information only.
    pub training_rmse: f64,
    pub bytes_written: usize,
}

/// Read → Prepare → Encode → Train → Persist.
#[derive(Clone, Debug)]
pub struct TrainingPipeline {
    config: PipelineConfig,
    store: DataStore,
    trainer: Trainer,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let store = DataStore::new(config.storage.clone());
        Self::with_store(config, store)
    }

    pub fn with_store(config: PipelineConfig, store: DataStore) -> Self {
        Self {
            config,
            store,
            trainer: Trainer::new(),
        }
    }

    pub fn trainer(mut self, trainer: Trainer) -> Self {
        self.trainer = trainer;
        self
    }

    /// Train on the table at `data_path` and save the model bundle to
    /// `model_path`.
    pub fn run(&self, data_path: &str, model_path: &str) -> Result<TrainingReport> {
        info!(data_path, model_path, "Starting training");
        let data = load_encoded(&self.store, &self.config, data_path)?;

        let model = info_span!("train")
            .in_scope(|| self.trainer.fit(&data.features, &data.target))?;
        let fitted = model.predict_batch(&data.features.to_f64())?;
        let training_rmse = Metrics::rmse(&data.target, &fitted.to_vec());
        info!(
            intercept = model.intercept(),
            training_rmse,
            "Trained linear model"
        );

        let feature_names = data.features.feature_names().to_vec();
        let bundle = ModelBundle::new(&model, feature_names.clone(), data.encoders);
        let outcome = info_span!("persist", path = model_path)
            .in_scope(|| self.store.save(&Artifact::ModelBundle(bundle), model_path))?;
        let bytes_written = match outcome {
            WriteOutcome::Written { bytes } => bytes,
            WriteOutcome::Skipped => {
                return Err(PipelineError::WriteSkipped {
                    path: model_path.to_string(),
                })
            }
        };

        Ok(TrainingReport {
            rows_read: data.rows_read,
            rows_kept: data.table.n_rows(),
            feature_names,
            intercept: model.intercept(),
            training_rmse,
            bytes_written,
        })
    }
}
