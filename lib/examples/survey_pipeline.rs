//! Diabetes Survey Pipeline
//!
//! Trains the indicator model on a small generated survey, validates it on a
//! second sample and registers it with an in-process tracker:
//! - CSV input with an outlier filter on `Age`
//! - Per-column label encoding
//! - Closed-form least squares
//! - Gated registration
//!
//! Run with: cargo run --example survey_pipeline

use diabetes_model::config::PipelineConfig;
use diabetes_model::pipeline::{TrainingPipeline, ValidationPipeline};
use diabetes_model::tracking::{RecordingTracker, TrackingEvent};
use std::error::Error;
use std::fs;

fn survey(rows: usize, offset: usize) -> String {
    let mut out = String::from("Diabetes_012,HighBP,HighChol,BMI,Smoker,Age,Sex\n");
    for i in offset..offset + rows {
        let high_bp = i % 2;
        let high_chol = (i / 2) % 2;
        let bmi = 18 + (i * 7) % 22;
        let smoker = (i / 3) % 2;
        let age = i % 15;
        let sex = if i % 3 == 0 { "f" } else { "m" };
        let target = (high_bp + high_chol + usize::from(bmi > 30)).min(2);
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            target, high_bp, high_chol, bmi, smoker, age, sex
        ));
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let train = dir.path().join("train.csv");
    let holdout = dir.path().join("holdout.csv.gz");
    let model = dir.path().join("model.pickle");
    fs::write(&train, survey(600, 0))?;

    let config = PipelineConfig {
        prediction_dir: dir.path().join("output"),
        artifact_staging_dir: dir.path().join("mlruns"),
        ..PipelineConfig::default()
    };

    // Training
    let report = TrainingPipeline::new(config.clone()).run(
        &train.to_string_lossy(),
        &model.to_string_lossy(),
    )?;
    println!("=== Training ===");
    println!("Rows read: {}, kept: {}", report.rows_read, report.rows_kept);
    println!("Features: {:?}", report.feature_names);
    println!("Intercept: {:.4}", report.intercept);
    println!("Training RMSE: {:.4}", report.training_rmse);

    // Held-out sample, gzipped to show transparent decompression
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    std::io::Write::write_all(&mut encoder, survey(300, 1_000).as_bytes())?;
    fs::write(&holdout, encoder.finish()?)?;

    // Validation
    let mut validation = ValidationPipeline::new(config, RecordingTracker::new());
    let report = validation.run(
        &holdout.to_string_lossy(),
        &model.to_string_lossy(),
        true,
    )?;
    println!("\n=== Validation ===");
    println!("Run: {}", report.run_id);
    println!("Rows evaluated: {}", report.rows_evaluated);
    println!("RMSE: {:.4}", report.rmse);
    println!("Predictions: {}", report.prediction_path);
    if let Some(version) = &report.registered {
        println!("Registered {} v{} from {}", version.name, version.version, version.source);
    }

    println!("\n=== Tracking events ===");
    for event in validation.tracker().events() {
        match event {
            TrackingEvent::Metric { key, value, .. } => println!("metric {key} = {value:.4}"),
            other => println!("{other:?}"),
        }
    }
    Ok(())
}
