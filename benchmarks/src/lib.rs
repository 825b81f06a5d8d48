//! Benchmark fixtures for the diabetes-model pipeline.
//!
//! Provides a deterministic synthetic survey so encoding, fitting and
//! prediction can be timed without shipping a dataset.

pub mod data;

pub use data::SyntheticSurvey;
