//! # diabetes-model
//!
//! A batch pipeline that trains a linear regression predicting the
//! `Diabetes_012` indicator from health-survey answers, and validates the
//! trained model against held-out data before registering it.
//!
//! ## Core Design Principles
//!
//! - **Storage agnostic**: every path is resolved once into a local file or an
//!   `s3://bucket/key` object, and its format is taken from the extension
//!   (`.csv`, `.parquet`, `.pickle`, each optionally `.gz`).
//! - **Stateful type safety**: models carry their training state in the type
//!   system (`Unfitted` vs `Fitted`); only fitted models predict.
//! - **Typed artifacts**: everything persisted is a tagged [`Artifact`], so a
//!   reader knows what it loaded before using it.
//! - **Explicit configuration**: settings are read once into a
//!   [`PipelineConfig`] and passed to each pipeline.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diabetes_model::config::PipelineConfig;
//! use diabetes_model::pipeline::{TrainingPipeline, ValidationPipeline};
//! use diabetes_model::tracking::RecordingTracker;
//!
//! let config = PipelineConfig::default();
//! TrainingPipeline::new(config.clone())
//!     .run("data/train.csv", "models/model.pickle")
//!     .unwrap();
//!
//! let mut validation = ValidationPipeline::new(config, RecordingTracker::new());
//! let report = validation
//!     .run("data/holdout.csv", "models/model.pickle", true)
//!     .unwrap();
//! println!("rmse = {}", report.rmse);
//! ```
//!
//! ## Module Structure
//!
//! - `table`: in-memory record tables and their CSV/Parquet codecs
//! - `storage`: path resolution and local/object-store backends
//! - `data`: reading and writing tables and artifacts at any path
//! - `preprocessing`: outlier filtering, row identifiers, label encoding
//! - `model`: linear model and the persisted model bundle
//! - `trainer`: closed-form least-squares fitting
//! - `tracking`: experiment tracking and model registration
//! - `pipeline`: the training and validation jobs

/// Pipeline settings and their environment overrides.
pub mod config;

/// Reading and writing pipeline data.
pub mod data;

/// Top-level error type.
pub mod error;

/// Log subscriber setup for the binaries.
pub mod logging;

/// Regression metrics.
pub mod metrics;

/// Machine learning models with compile-time state safety.
pub mod model;

/// Training and validation jobs.
pub mod pipeline;

/// Data preprocessing for the survey table.
pub mod preprocessing;

mod runtime;

/// Artifact persistence formats.
pub mod serialization;

/// Storage and format resolution.
pub mod storage;

/// In-memory tabular data.
pub mod table;

/// Experiment tracking collaborators.
pub mod tracking;

/// Model fitting.
pub mod trainer;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use serialization::Artifact;
