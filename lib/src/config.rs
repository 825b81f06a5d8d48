//! Pipeline configuration.
//!
//! All process-wide settings are gathered once at startup into a
//! [`PipelineConfig`] and passed explicitly to each pipeline.
//!
//! ## Environment
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `AWS_ENDPOINT_URL` / `AWS_ENDPOINT_URL_S3` | `storage.endpoint_url` | none |
//! | `AWS_REGION` / `AWS_DEFAULT_REGION` | `storage.region` | none |
//! | `MLFLOW_TRACKING_URI` | `tracking.uri` | `http://127.0.0.1:5000` |
//! | `MLFLOW_EXPERIMENT` | `tracking.experiment` | `diabetes-prediction` |
//! | `PREDICTION_DIR` | `prediction_dir` | `output` |
//! | `ARTIFACT_STAGING_DIR` | `artifact_staging_dir` | `mlruns` |
//! | `SKIP_ID_COLUMN` | `skip_id_column` | `false` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Column the model predicts.
    #[serde(default = "default_target_column")]
    pub target_column: String,

    /// Ordinal category column used for outlier filtering.
    #[serde(default = "default_outlier_column")]
    pub outlier_column: String,

    /// Lowest kept category (inclusive).
    #[serde(default = "default_outlier_min")]
    pub outlier_min: f64,

    /// Highest kept category (inclusive).
    #[serde(default = "default_outlier_max")]
    pub outlier_max: f64,

    /// Column that receives the row identifiers.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Leave the identifier column out of the encoded predictors. Off by
    /// default: every column but the target is encoded.
    #[serde(default)]
    pub skip_id_column: bool,

    /// Directory for prediction tables written by validation.
    #[serde(default = "default_prediction_dir")]
    pub prediction_dir: PathBuf,

    /// Local directory where remote model bundles are staged before upload
    /// to the tracking service.
    #[serde(default = "default_staging_dir")]
    pub artifact_staging_dir: PathBuf,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Object-store access options. Only applied to `s3://` paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint (MinIO, localstack).
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// Experiment-tracking service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracking_uri")]
    pub uri: String,

    #[serde(default = "default_experiment")]
    pub experiment: String,

    /// Registered model name.
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Tags attached to registered model versions.
    #[serde(default = "default_model_tags")]
    pub model_tags: BTreeMap<String, String>,

    /// Run-relative path the model artifact is logged under.
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// Models are registered only when rmse is strictly below this value.
    #[serde(default = "default_rmse_threshold")]
    pub rmse_threshold: f64,
}

fn default_target_column() -> String {
    "Diabetes_012".to_string()
}

fn default_outlier_column() -> String {
    "Age".to_string()
}

fn default_outlier_min() -> f64 {
    1.0
}

// Level 13 (80 or older) is out of scope for the model.
fn default_outlier_max() -> f64 {
    12.0
}

fn default_id_column() -> String {
    "uuid".to_string()
}

fn default_prediction_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("mlruns")
}

fn default_tracking_uri() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_experiment() -> String {
    "diabetes-prediction".to_string()
}

fn default_model_name() -> String {
    "Diabetes model".to_string()
}

fn default_model_tags() -> BTreeMap<String, String> {
    BTreeMap::from([("type".to_string(), "linear-regression".to_string())])
}

fn default_artifact_path() -> String {
    "models".to_string()
}

fn default_rmse_threshold() -> f64 {
    1.0
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: default_target_column(),
            outlier_column: default_outlier_column(),
            outlier_min: default_outlier_min(),
            outlier_max: default_outlier_max(),
            id_column: default_id_column(),
            skip_id_column: false,
            prediction_dir: default_prediction_dir(),
            artifact_staging_dir: default_staging_dir(),
            storage: StorageConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            uri: default_tracking_uri(),
            experiment: default_experiment(),
            model_name: default_model_name(),
            model_tags: default_model_tags(),
            artifact_path: default_artifact_path(),
            rmse_threshold: default_rmse_threshold(),
        }
    }
}

impl PipelineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
        };

        let mut config = Self::default();
        config.storage.endpoint_url = first(&["AWS_ENDPOINT_URL", "AWS_ENDPOINT_URL_S3"]);
        config.storage.region = first(&["AWS_REGION", "AWS_DEFAULT_REGION"]);
        if let Some(uri) = first(&["MLFLOW_TRACKING_URI"]) {
            config.tracking.uri = uri;
        }
        if let Some(experiment) = first(&["MLFLOW_EXPERIMENT"]) {
            config.tracking.experiment = experiment;
        }
        if let Some(dir) = first(&["PREDICTION_DIR"]) {
            config.prediction_dir = PathBuf::from(dir);
        }
        if let Some(dir) = first(&["ARTIFACT_STAGING_DIR"]) {
            config.artifact_staging_dir = PathBuf::from(dir);
        }
        if let Some(skip) = first(&["SKIP_ID_COLUMN"]).and_then(|v| v.parse().ok()) {
            config.skip_id_column = skip;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup(|_| None);
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.target_column, "Diabetes_012");
        assert_eq!(config.tracking.uri, "http://127.0.0.1:5000");
        assert_eq!(config.tracking.experiment, "diabetes-prediction");
        assert_eq!(config.tracking.rmse_threshold, 1.0);
        assert_eq!((config.outlier_min, config.outlier_max), (1.0, 12.0));
        assert!(!config.skip_id_column);
    }

    #[test]
    fn test_skip_id_column_override() {
        let config = PipelineConfig::from_lookup(lookup(&[("SKIP_ID_COLUMN", "true")]));
        assert!(config.skip_id_column);

        let config = PipelineConfig::from_lookup(lookup(&[("SKIP_ID_COLUMN", "maybe")]));
        assert!(!config.skip_id_column);
    }

    #[test]
    fn test_endpoint_fallback_order() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("AWS_ENDPOINT_URL_S3", "http://s3-specific:9000"),
        ]));
        assert_eq!(
            config.storage.endpoint_url.as_deref(),
            Some("http://s3-specific:9000")
        );

        let config = PipelineConfig::from_lookup(lookup(&[
            ("AWS_ENDPOINT_URL", "http://generic:9000"),
            ("AWS_ENDPOINT_URL_S3", "http://s3-specific:9000"),
        ]));
        assert_eq!(
            config.storage.endpoint_url.as_deref(),
            Some("http://generic:9000")
        );
    }

    #[test]
    fn test_tracking_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("MLFLOW_TRACKING_URI", "http://mlflow:5000"),
            ("MLFLOW_EXPERIMENT", "nightly"),
            ("PREDICTION_DIR", "/tmp/preds"),
        ]));
        assert_eq!(config.tracking.uri, "http://mlflow:5000");
        assert_eq!(config.tracking.experiment, "nightly");
        assert_eq!(config.prediction_dir, PathBuf::from("/tmp/preds"));
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let config = PipelineConfig::from_lookup(lookup(&[("MLFLOW_EXPERIMENT", "")]));
        assert_eq!(config.tracking.experiment, "diabetes-prediction");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"target_column": "HeartDisease", "tracking": {"rmse_threshold": 0.5}}"#)
                .unwrap();
        assert_eq!(config.target_column, "HeartDisease");
        assert_eq!(config.id_column, "uuid");
        assert_eq!(config.tracking.rmse_threshold, 0.5);
        assert_eq!(config.tracking.artifact_path, "models");
    }
}
