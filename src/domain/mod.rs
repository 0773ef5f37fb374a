//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fitted column schema (`Column`, `SCHEMA_VERSION`)
//! - raw and complete input records (`PartialRecord`, `FeatureRecord`)
//! - prediction outputs (`PredictionResult`, `IncomeClass`)

pub mod types;

pub use types::*;
