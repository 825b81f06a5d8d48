//! MLflow REST API 2.0 client.
//!
//! Every call builds its own HTTP client and drives it on a fresh
//! current-thread runtime, so the tracker can be used from plain synchronous
//! code.

use super::{run_artifact_uri, ExperimentTracker, ModelVersion, RunStatus, TrackingError};
use crate::config::TrackingConfig;
use crate::runtime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const API_PREFIX: &str = "api/2.0/mlflow";
const ARTIFACTS_PREFIX: &str = "api/2.0/mlflow-artifacts/artifacts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const RESOURCE_DOES_NOT_EXIST: &str = "RESOURCE_DOES_NOT_EXIST";
const RESOURCE_ALREADY_EXISTS: &str = "RESOURCE_ALREADY_EXISTS";

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Experiment {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: Experiment,
}

#[derive(Debug, Serialize)]
struct CreateExperimentRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    experiment_id: &'a str,
    start_time: i64,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: Run,
}

#[derive(Debug, Serialize)]
struct LogMetricRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: i64,
}

#[derive(Debug, Serialize)]
struct UpdateRunRequest<'a> {
    run_id: &'a str,
    status: RunStatus,
    end_time: i64,
}

#[derive(Debug, Serialize)]
struct CreateRegisteredModelRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Tag<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateModelVersionRequest<'a> {
    name: &'a str,
    source: &'a str,
    run_id: &'a str,
    tags: Vec<Tag<'a>>,
}

#[derive(Debug, Deserialize)]
struct ModelVersionInfo {
    version: String,
}

#[derive(Debug, Deserialize)]
struct CreateModelVersionResponse {
    model_version: ModelVersionInfo,
}

/// Tracker backed by an MLflow tracking server.
#[derive(Debug)]
pub struct MlflowTracker {
    base_url: String,
    experiment_id: String,
    active_run: Option<String>,
}

impl MlflowTracker {
    /// Resolve (or create) the configured experiment.
    ///
    /// Fails with [`TrackingError::Unreachable`] when the server cannot be
    /// contacted.
    pub fn connect(config: &TrackingConfig) -> Result<Self, TrackingError> {
        let base_url = config.uri.trim_end_matches('/').to_string();
        let experiment_id = runtime::block_on(resolve_experiment(&base_url, &config.experiment))
            .map_err(TrackingError::Runtime)??;
        info!(
            uri = %base_url,
            experiment = %config.experiment,
            experiment_id = %experiment_id,
            "Connected to tracking server"
        );
        Ok(Self {
            base_url,
            experiment_id,
            active_run: None,
        })
    }

    pub fn experiment_id(&self) -> &str {
        &self.experiment_id
    }

    fn run_id(&self) -> Result<&str, TrackingError> {
        self.active_run.as_deref().ok_or(TrackingError::NoActiveRun)
    }

    fn api_url(&self, endpoint: &str) -> String {
        api_url(&self.base_url, endpoint)
    }

    fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R, TrackingError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api_url(endpoint);
        runtime::block_on(async {
            let response = http_client()?.post(&url).json(body).send().await?;
            decode(endpoint, response).await
        })
        .map_err(TrackingError::Runtime)?
    }
}

impl ExperimentTracker for MlflowTracker {
    fn start_run(&mut self) -> Result<String, TrackingError> {
        let response: CreateRunResponse = self.post(
            "runs/create",
            &CreateRunRequest {
                experiment_id: &self.experiment_id,
                start_time: now_millis(),
            },
        )?;
        let run_id = response.run.info.run_id;
        info!(run_id = %run_id, "Started run");
        self.active_run = Some(run_id.clone());
        Ok(run_id)
    }

    fn log_metric(&mut self, key: &str, value: f64) -> Result<(), TrackingError> {
        let run_id = self.run_id()?;
        let _: serde_json::Value = self.post(
            "runs/log-metric",
            &LogMetricRequest {
                run_id,
                key,
                value,
                timestamp: now_millis(),
                step: 0,
            },
        )?;
        debug!(key, value, "Logged metric");
        Ok(())
    }

    fn log_artifact(
        &mut self,
        local_path: &Path,
        artifact_path: &str,
    ) -> Result<(), TrackingError> {
        let run_id = self.run_id()?;
        let payload = std::fs::read(local_path).map_err(|source| TrackingError::Artifact {
            path: local_path.display().to_string(),
            source,
        })?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let url = artifact_url(
            &self.base_url,
            &self.experiment_id,
            run_id,
            artifact_path,
            &file_name,
        );
        let bytes = payload.len();

        runtime::block_on(async {
            let response = http_client()?.put(&url).body(payload).send().await?;
            decode::<serde_json::Value>("mlflow-artifacts", response).await
        })
        .map_err(TrackingError::Runtime)??;

        info!(artifact_path, file = %file_name, bytes, "Logged artifact");
        Ok(())
    }

    fn register_model(
        &mut self,
        name: &str,
        artifact_path: &str,
        tags: &BTreeMap<String, String>,
    ) -> Result<ModelVersion, TrackingError> {
        let run_id = self.run_id()?;
        let source = run_artifact_uri(run_id, artifact_path);

        match self.post::<_, serde_json::Value>(
            "registered-models/create",
            &CreateRegisteredModelRequest { name },
        ) {
            Ok(_) => info!(name, "Created registered model"),
            Err(TrackingError::Api { message, .. }) if message.contains(RESOURCE_ALREADY_EXISTS) => {
                debug!(name, "Registered model already exists")
            }
            Err(err) => return Err(err),
        }

        let response: CreateModelVersionResponse = self.post(
            "model-versions/create",
            &CreateModelVersionRequest {
                name,
                source: &source,
                run_id,
                tags: tags
                    .iter()
                    .map(|(key, value)| Tag { key, value })
                    .collect(),
            },
        )?;

        let version = response.model_version.version;
        info!(name, version = %version, source = %source, "Registered model version");
        Ok(ModelVersion {
            name: name.to_string(),
            version,
            source,
        })
    }

    fn end_run(&mut self, status: RunStatus) -> Result<(), TrackingError> {
        let run_id = self.run_id()?;
        let _: serde_json::Value = self.post(
            "runs/update",
            &UpdateRunRequest {
                run_id,
                status,
                end_time: now_millis(),
            },
        )?;
        info!(run_id, status = status.as_str(), "Ended run");
        self.active_run = None;
        Ok(())
    }
}

async fn resolve_experiment(base_url: &str, name: &str) -> Result<String, TrackingError> {
    let client = http_client()?;
    let url = api_url(base_url, "experiments/get-by-name");
    let response = client
        .get(&url)
        .query(&[("experiment_name", name)])
        .send()
        .await
        .map_err(|source| TrackingError::Unreachable {
            uri: base_url.to_string(),
            source,
        })?;

    match decode::<GetExperimentResponse>("experiments/get-by-name", response).await {
        Ok(found) => return Ok(found.experiment.experiment_id),
        Err(TrackingError::Api { message, .. }) if message.contains(RESOURCE_DOES_NOT_EXIST) => {}
        Err(err) => return Err(err),
    }

    info!(experiment = name, "Creating experiment");
    let response = client
        .post(api_url(base_url, "experiments/create"))
        .json(&CreateExperimentRequest { name })
        .send()
        .await?;
    let created: CreateExperimentResponse = decode("experiments/create", response).await?;
    Ok(created.experiment_id)
}

fn http_client() -> Result<reqwest::Client, TrackingError> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Decode a successful JSON body, or turn an error status into
/// [`TrackingError::Api`] carrying the MLflow error code.
async fn decode<R: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<R, TrackingError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiError>(&body) {
            Ok(api) if !api.error_code.is_empty() => format!("{}: {}", api.error_code, api.message),
            _ => body,
        };
        return Err(TrackingError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

fn api_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}/{}", base_url, API_PREFIX, endpoint)
}

fn artifact_url(
    base_url: &str,
    experiment_id: &str,
    run_id: &str,
    artifact_path: &str,
    file_name: &str,
) -> String {
    let artifact_path = artifact_path.trim_matches('/');
    if artifact_path.is_empty() {
        format!(
            "{}/{}/{}/{}/artifacts/{}",
            base_url, ARTIFACTS_PREFIX, experiment_id, run_id, file_name
        )
    } else {
        format!(
            "{}/{}/{}/{}/artifacts/{}/{}",
            base_url, ARTIFACTS_PREFIX, experiment_id, run_id, artifact_path, file_name
        )
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
