//! Experiment tracking and model registration.
//!
//! The validation pipeline talks to the tracking service only through the
//! [`ExperimentTracker`] trait. [`MlflowTracker`] speaks the MLflow REST API;
//! [`RecordingTracker`] keeps every call in memory for tests and dry runs.

pub mod mlflow;

pub use self::mlflow::MlflowTracker;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Tracking service at {uri} is unreachable: {source}")]
    Unreachable {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tracking API call {endpoint} failed with status {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("No active run")]
    NoActiveRun,

    #[error("Cannot read artifact '{path}': {source}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Terminal state of a tracked run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// A registered model version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelVersion {
    pub name: String,
    pub version: String,
    pub source: String,
}

/// Run-scoped experiment tracking.
///
/// `start_run` opens a run that every later call is attached to until
/// `end_run`.
pub trait ExperimentTracker {
    /// Open a run and return its id.
    fn start_run(&mut self) -> Result<String, TrackingError>;

    fn log_metric(&mut self, key: &str, value: f64) -> Result<(), TrackingError>;

    /// Upload the file at `local_path` under the run-relative `artifact_path`.
    fn log_artifact(&mut self, local_path: &Path, artifact_path: &str)
        -> Result<(), TrackingError>;

    /// Register the artifact logged at `artifact_path` of the active run as a
    /// new version of `name`.
    fn register_model(
        &mut self,
        name: &str,
        artifact_path: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<ModelVersion, TrackingError>;

    fn end_run(&mut self, status: RunStatus) -> Result<(), TrackingError>;
}

/// Source URI of a model logged inside a run.
pub fn run_artifact_uri(run_id: &str, artifact_path: &str) -> String {
    format!("runs:/{}/{}", run_id, artifact_path)
}

/// One call observed by a [`RecordingTracker`].
#[derive(Clone, Debug, PartialEq)]
pub enum TrackingEvent {
    RunStarted {
        run_id: String,
    },
    Metric {
        key: String,
        value: f64,
    },
    Artifact {
        local_path: PathBuf,
        artifact_path: String,
        bytes: usize,
    },
    ModelRegistered {
        name: String,
        source: String,
        tags: BTreeMap<String, String>,
    },
    RunEnded {
        status: RunStatus,
    },
}

/// In-memory tracker that records every call.
#[derive(Clone, Debug, Default)]
pub struct RecordingTracker {
    events: Vec<TrackingEvent>,
    active_run: Option<String>,
    versions: BTreeMap<String, u32>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TrackingEvent] {
        &self.events
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.events.iter().rev().find_map(|event| match event {
            TrackingEvent::Metric { key: k, value } if k == key => Some(*value),
            _ => None,
        })
    }

    pub fn registered_models(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TrackingEvent::ModelRegistered { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn final_status(&self) -> Option<RunStatus> {
        self.events.iter().rev().find_map(|event| match event {
            TrackingEvent::RunEnded { status } => Some(*status),
            _ => None,
        })
    }

    fn run_id(&self) -> Result<&str, TrackingError> {
        self.active_run.as_deref().ok_or(TrackingError::NoActiveRun)
    }
}

impl ExperimentTracker for RecordingTracker {
    fn start_run(&mut self) -> Result<String, TrackingError> {
        let run_id = Uuid::new_v4().simple().to_string();
        self.active_run = Some(run_id.clone());
        self.events.push(TrackingEvent::RunStarted {
            run_id: run_id.clone(),
        });
        Ok(run_id)
    }

    fn log_metric(&mut self, key: &str, value: f64) -> Result<(), TrackingError> {
        self.run_id()?;
        self.events.push(TrackingEvent::Metric {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn log_artifact(
        &mut self,
        local_path: &Path,
        artifact_path: &str,
    ) -> Result<(), TrackingError> {
        self.run_id()?;
        let bytes = std::fs::metadata(local_path)
            .map_err(|source| TrackingError::Artifact {
                path: local_path.display().to_string(),
                source,
            })?
            .len() as usize;
        self.events.push(TrackingEvent::Artifact {
            local_path: local_path.to_path_buf(),
            artifact_path: artifact_path.to_string(),
            bytes,
        });
        Ok(())
    }

    fn register_model(
        &mut self,
        name: &str,
        artifact_path: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<ModelVersion, TrackingError> {
        let source = run_artifact_uri(self.run_id()?, artifact_path);
        let version = self.versions.entry(name.to_string()).or_insert(0);
        *version += 1;
        let version = version.to_string();
        self.events.push(TrackingEvent::ModelRegistered {
            name: name.to_string(),
            source: source.clone(),
            tags: tags.clone(),
        });
        Ok(ModelVersion {
            name: name.to_string(),
            version,
            source,
        })
    }

    fn end_run(&mut self, status: RunStatus) -> Result<(), TrackingError> {
        self.run_id()?;
        self.active_run = None;
        self.events.push(TrackingEvent::RunEnded { status });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calls_outside_a_run_fail() {
        let mut tracker = RecordingTracker::new();
        assert!(matches!(
            tracker.log_metric("rmse", 0.5),
            Err(TrackingError::NoActiveRun)
        ));
        assert!(tracker.end_run(RunStatus::Finished).is_err());
    }

    #[test]
    fn test_records_run_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("model.pickle");
        std::fs::write(&artifact, [1u8, 2, 3]).unwrap();

        let mut tracker = RecordingTracker::new();
        let run_id = tracker.start_run().unwrap();
        tracker.log_metric("rmse", 0.5).unwrap();
        tracker.log_artifact(&artifact, "models").unwrap();
        let tags = BTreeMap::from([("type".to_string(), "linear-regression".to_string())]);
        let version = tracker.register_model("Diabetes model", "models", &tags).unwrap();
        tracker.end_run(RunStatus::Finished).unwrap();

        assert_eq!(run_id.len(), 32);
        assert_eq!(version.version, "1");
        assert_eq!(version.source, format!("runs:/{}/models", run_id));
        assert_eq!(tracker.metric("rmse"), Some(0.5));
        assert_eq!(tracker.registered_models(), vec!["Diabetes model"]);
        assert_eq!(tracker.final_status(), Some(RunStatus::Finished));
        assert!(tracker.events().contains(&TrackingEvent::Artifact {
            local_path: artifact,
            artifact_path: "models".to_string(),
            bytes: 3,
        }));
    }

    #[test]
    fn test_versions_increment_per_model() {
        let mut tracker = RecordingTracker::new();
        tracker.start_run().unwrap();
        let tags = BTreeMap::new();
        tracker.register_model("a", "models", &tags).unwrap();
        let second = tracker.register_model("a", "models", &tags).unwrap();
        let other = tracker.register_model("b", "models", &tags).unwrap();
        assert_eq!(second.version, "2");
        assert_eq!(other.version, "1");
    }

    #[test]
    fn test_run_status_wire_names() {
        assert_eq!(serde_json::to_string(&RunStatus::Failed).unwrap(), "\"FAILED\"");
        assert_eq!(RunStatus::Finished.as_str(), "FINISHED");
    }
}
