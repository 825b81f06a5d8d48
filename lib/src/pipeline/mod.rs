//! End-to-end batch jobs.
//!
//! - [`TrainingPipeline`]: read → prepare → encode → train → persist.
//! - [`ValidationPipeline`]: read → prepare → encode → load model → predict →
//!   score → track → (optionally) register.
//!
//! Stages run sequentially inside their own `tracing` span; the first error
//! stops the run.

mod training;
mod validation;

pub use training::{TrainingPipeline, TrainingReport};
pub use validation::{ValidationPipeline, ValidationReport};

use crate::config::PipelineConfig;
use crate::data::DataStore;
use crate::error::Result;
use crate::preprocessing::{ColumnEncoders, FeatureMatrix, FeaturePreparer, LabelEncoding};
use crate::table::RecordTable;
use tracing::{info, info_span};

/// Prepared and encoded input of a pipeline run.
#[derive(Debug)]
pub(crate) struct EncodedData {
    pub table: RecordTable,
    pub rows_read: usize,
    pub features: FeatureMatrix,
    pub encoders: ColumnEncoders,
    pub target: Vec<f64>,
}

/// Predictors are every column except the target. The row identifier is left
/// out only when `skip_id_column` is set.
pub(crate) fn label_encoding(config: &PipelineConfig) -> LabelEncoding {
    let encoding = LabelEncoding::new(config.target_column.clone());
    if config.skip_id_column {
        encoding.skip(config.id_column.clone())
    } else {
        encoding
    }
}

/// Shared front half of both pipelines: read, prepare, encode.
pub(crate) fn load_encoded(
    store: &DataStore,
    config: &PipelineConfig,
    data_path: &str,
) -> Result<EncodedData> {
    let mut table = info_span!("read", path = data_path).in_scope(|| store.read_table(data_path))?;
    let rows_read = table.n_rows();

    let rows_kept = info_span!("prepare").in_scope(|| {
        FeaturePreparer::from_config(config).prepare(&mut table)
    })?;
    info!(rows_read, rows_kept, "Prepared features");

    let encoding = label_encoding(config);
    let (features, encoders, target) = info_span!("encode").in_scope(|| -> Result<_> {
        let (features, encoders) = encoding.fit_transform(&table)?;
        let target = encoding.target_vector(&table)?;
        Ok((features, encoders, target))
    })?;
    info!(
        rows = features.n_rows(),
        features = features.n_features(),
        "Encoded features"
    );

    Ok(EncodedData {
        table,
        rows_read,
        features,
        encoders,
        target,
    })
}
