use super::load_encoded;
use crate::config::PipelineConfig;
use crate::data::{DataStore, WriteOutcome};
use crate::error::{PipelineError, Result};
use crate::metrics::Metrics;
use crate::model::ModelBundle;
use crate::serialization::{Artifact, ArtifactKind};
use crate::storage::Location;
use crate::table::{PredictionTable, RecordTable, TableError, Value};
use crate::tracking::{ExperimentTracker, ModelVersion, RunStatus};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Summary of a finished validation run.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    pub run_id: String,
    pub rows_evaluated: usize,
    pub rmse: f64,
    pub intercept: f64,
    pub prediction_path: String,
    /// Set when the model passed the gate and was registered.
    pub registered: Option<ModelVersion>,
}

/// Scores a persisted model on held-out data inside a tracked run.
pub struct ValidationPipeline<T: ExperimentTracker> {
    config: PipelineConfig,
    store: DataStore,
    tracker: T,
}

impl<T: ExperimentTracker> ValidationPipeline<T> {
    pub fn new(config: PipelineConfig, tracker: T) -> Self {
        let store = DataStore::new(config.storage.clone());
        Self::with_store(config, store, tracker)
    }

    pub fn with_store(config: PipelineConfig, store: DataStore, tracker: T) -> Self {
        Self {
            config,
            store,
            tracker,
        }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn into_tracker(self) -> T {
        self.tracker
    }

    /// Validate the model at `model_path` against the table at `data_path`.
    ///
    /// When `register` is set, a model whose rmse is below the configured
    /// threshold is registered; otherwise the run fails with
    /// [`PipelineError::MetricGate`]. The run always ends, as `FAILED` when
    /// any step errors.
    pub fn run(
        &mut self,
        data_path: &str,
        model_path: &str,
        register: bool,
    ) -> Result<ValidationReport> {
        let run_id = self.tracker.start_run()?;
        info!(run_id = %run_id, data_path, model_path, register, "Starting validation");

        match self.run_tracked(&run_id, data_path, model_path, register) {
            Ok(report) => {
                self.tracker.end_run(RunStatus::Finished)?;
                Ok(report)
            }
            Err(err) => {
                error!(run_id = %run_id, "Validation failed: {}", err);
                if let Err(end_err) = self.tracker.end_run(RunStatus::Failed) {
                    warn!("Could not mark run as failed: {}", end_err);
                }
                Err(err)
            }
        }
    }

    fn run_tracked(
        &mut self,
        run_id: &str,
        data_path: &str,
        model_path: &str,
        register: bool,
    ) -> Result<ValidationReport> {
        let data = load_encoded(&self.store, &self.config, data_path)?;
        let bundle = info_span!("load_model", path = model_path)
            .in_scope(|| load_bundle(&self.store, model_path))?;

        let predictions = info_span!("predict").in_scope(|| bundle.predict(&data.features))?;
        let predictions = predictions.to_vec();
        let ids = row_ids(&data.table, &self.config.id_column)?;

        let prediction_path = self.prediction_path();
        let table = PredictionTable::new(ids, predictions.clone());
        let outcome = info_span!("persist", path = %prediction_path).in_scope(|| {
            self.store
                .save(&Artifact::PredictionTable(table), &prediction_path)
        })?;
        if outcome == WriteOutcome::Skipped {
            return Err(PipelineError::WriteSkipped {
                path: prediction_path,
            });
        }

        let rmse = Metrics::rmse(&data.target, &predictions);
        info!(rmse, rows = predictions.len(), "Scored model");

        let local_model = self.local_model_path(model_path, &bundle)?;
        let artifact_path = &self.config.tracking.artifact_path;
        let tracker = &mut self.tracker;
        info_span!("track").in_scope(|| -> Result<()> {
            tracker.log_metric("rmse", rmse)?;
            tracker.log_metric("intercept", bundle.intercept())?;
            tracker.log_artifact(&local_model, artifact_path)?;
            Ok(())
        })?;

        let registered = if register {
            Some(self.register(rmse)?)
        } else {
            None
        };

        Ok(ValidationReport {
            run_id: run_id.to_string(),
            rows_evaluated: predictions.len(),
            rmse,
            intercept: bundle.intercept(),
            prediction_path,
            registered,
        })
    }

    fn register(&mut self, rmse: f64) -> Result<ModelVersion> {
        let tracking = &self.config.tracking;
        // NaN never passes.
        if !(rmse < tracking.rmse_threshold) {
            return Err(PipelineError::MetricGate {
                rmse,
                threshold: tracking.rmse_threshold,
            });
        }
        let version = self.tracker.register_model(
            &tracking.model_name,
            &tracking.artifact_path,
            &tracking.model_tags,
        )?;
        info!(name = %version.name, version = %version.version, "Model registered");
        Ok(version)
    }

    /// `<prediction_dir>/prediction-<yyMMdd-HHmmss>`
    fn prediction_path(&self) -> String {
        let name = format!("prediction-{}", Local::now().format("%y%m%d-%H%M%S"));
        self.config.prediction_dir.join(name).to_string_lossy().into_owned()
    }

    /// Local file holding the model bundle, staging remote models first.
    fn local_model_path(&self, model_path: &str, bundle: &ModelBundle) -> Result<PathBuf> {
        match Location::parse(model_path)? {
            Location::Local(path) => Ok(path),
            Location::Remote(_) => {
                let staged = self
                    .config
                    .artifact_staging_dir
                    .join(format!("model-{}", Uuid::new_v4()));
                stage(&self.store, &staged, bundle)?;
                Ok(staged)
            }
        }
    }
}

fn stage(store: &DataStore, path: &Path, bundle: &ModelBundle) -> Result<()> {
    let path = path.to_string_lossy();
    match store.save(&Artifact::ModelBundle(bundle.clone()), &path)? {
        WriteOutcome::Written { .. } => Ok(()),
        WriteOutcome::Skipped => Err(PipelineError::WriteSkipped {
            path: path.into_owned(),
        }),
    }
}

fn load_bundle(store: &DataStore, model_path: &str) -> Result<ModelBundle> {
    let artifact = store
        .read_artifact(model_path)?
        .ok_or_else(|| PipelineError::MissingArtifact {
            path: model_path.to_string(),
        })?;
    let found = artifact.kind();
    artifact
        .into_model_bundle()
        .ok_or_else(|| PipelineError::UnexpectedArtifact {
            path: model_path.to_string(),
            expected: ArtifactKind::ModelBundle,
            found,
        })
}

fn row_ids(table: &RecordTable, id_column: &str) -> Result<Vec<Uuid>> {
    table
        .require_column(id_column)?
        .values()
        .iter()
        .map(|value| match value {
            Value::Id(id) => Ok(*id),
            other => Err(TableError::UnsupportedType {
                column: id_column.to_string(),
                data_type: format!("non-identifier value '{}'", other),
            }
            .into()),
        })
        .collect()
}
