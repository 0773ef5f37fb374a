//! Shared inference pipeline used by every front-end (flags, JSON, CSV batch, prompt).
//!
//! record -> schema assembly -> categorical encoding -> classification
//! -> label decoding -> confidence -> presentation category
//!
//! Artifacts are injected at construction and checked against the fitted
//! column layout once, so a mismatched encoder fails before any request is served.

use rayon::prelude::*;

use crate::domain::{
    Column, FeatureRecord, FieldValue, IncomeClass, PartialRecord, Placeholders, PredictionResult, RunConfig,
    SCHEMA_VERSION, UnknownPolicy,
};
use crate::error::PipelineError;
use crate::io::artifacts::{ArtifactSet, load_artifacts};
use crate::io::ingest::{IngestedRecords, RowError};
use crate::models::{Classifier, LabelDecoder, OrdinalEncoder};

/// Tolerance for probabilities slightly outside `[0, 1]` from float rounding.
const PROBA_EPSILON: f64 = 1e-9;

pub struct InferencePipeline {
    encoder: OrdinalEncoder,
    decoder: LabelDecoder,
    classifier: Box<dyn Classifier>,
    unknown_policy: UnknownPolicy,
}

impl InferencePipeline {
    /// Build a pipeline from already-loaded artifacts.
    pub fn new(
        encoder: OrdinalEncoder,
        decoder: LabelDecoder,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, PipelineError> {
        validate_schema(&encoder, &decoder, classifier.as_ref())?;
        Ok(Self {
            encoder,
            decoder,
            classifier,
            unknown_policy: UnknownPolicy::Reject,
        })
    }

    pub fn from_artifacts(set: ArtifactSet) -> Result<Self, PipelineError> {
        Self::new(set.encoder, set.decoder, set.classifier)
    }

    pub fn with_unknown_policy(mut self, policy: UnknownPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }

    pub fn encoder(&self) -> &OrdinalEncoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &LabelDecoder {
        &self.decoder
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn unknown_policy(&self) -> UnknownPolicy {
        self.unknown_policy
    }

    /// Encode a record into the numeric row the classifier expects.
    pub fn encode(&self, record: &FeatureRecord) -> Result<Vec<f64>, PipelineError> {
        record.validate()?;
        let mut row = Vec::with_capacity(Column::ALL.len());
        for column in Column::ALL {
            let value = match record.value(column) {
                FieldValue::Int(v) => v as f64,
                FieldValue::Text(s) => self.encoder.encode(column.name(), s, self.unknown_policy)?,
            };
            row.push(value);
        }
        log::debug!("encoded row: {row:?}");
        Ok(row)
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<PredictionResult, PipelineError> {
        let row = self.encode(record)?;

        let class_index = self.classifier.predict(&row);
        let probabilities = self
            .classifier
            .predict_proba(&row)
            .map(|p| checked_probabilities(p, self.decoder.len()))
            .transpose()?;

        let label = self.decoder.inverse_transform(class_index)?.to_string();
        let confidence = probabilities.as_deref().map(max_probability);
        let is_high_income = IncomeClass::from_label(&label) == IncomeClass::High;

        Ok(PredictionResult {
            label,
            is_high_income,
            confidence,
            class_index,
            probabilities,
        })
    }

    /// Assemble a partial record with `placeholders`, then predict.
    ///
    /// The assembled record is returned with the result so front-ends can echo it.
    pub fn predict_partial(
        &self,
        partial: &PartialRecord,
        placeholders: &Placeholders,
    ) -> Result<(FeatureRecord, PredictionResult), PipelineError> {
        let record = assemble(partial, placeholders)?;
        let result = self.predict(&record)?;
        Ok((record, result))
    }

    /// Predict many records in parallel. Results keep input order.
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Vec<Result<PredictionResult, PipelineError>> {
        records.par_iter().map(|r| self.predict(r)).collect()
    }
}

/// One successfully predicted batch row.
#[derive(Debug, Clone)]
pub struct BatchRow {
    /// 1-based line in the input CSV.
    pub line: usize,
    pub record: FeatureRecord,
    pub result: PredictionResult,
}

/// All outputs of a single `income batch` run.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub rows_read: usize,
    pub rows: Vec<BatchRow>,
    /// Ingest errors and prediction errors, ordered by line.
    pub row_errors: Vec<RowError>,
}

/// Assemble and predict every ingested record; failures become row errors.
///
/// Fails up front if the input lacks a column that has no placeholder, since
/// every row would fail the same way.
pub fn run_batch(
    pipeline: &InferencePipeline,
    ingest: IngestedRecords,
    placeholders: &Placeholders,
) -> Result<BatchOutput, PipelineError> {
    let uncovered: Vec<String> = ingest
        .missing_columns
        .iter()
        .filter(|c| placeholders.get(**c).is_none())
        .map(|c| c.name().to_string())
        .collect();
    if !uncovered.is_empty() {
        return Err(PipelineError::schema(format!(
            "input is missing required columns with no placeholder: {}",
            uncovered.join(", ")
        )));
    }

    let mut row_errors = ingest.row_errors;
    let mut lines = Vec::with_capacity(ingest.records.len());
    let mut records = Vec::with_capacity(ingest.records.len());
    for (line, partial) in &ingest.records {
        match assemble(partial, placeholders) {
            Ok(record) => {
                lines.push(*line);
                records.push(record);
            }
            Err(err) => row_errors.push(RowError {
                line: *line,
                message: err.to_string(),
            }),
        }
    }

    let results = pipeline.predict_batch(&records);

    let mut rows = Vec::with_capacity(results.len());
    for ((line, record), result) in lines.into_iter().zip(records).zip(results) {
        match result {
            Ok(result) => rows.push(BatchRow { line, record, result }),
            Err(err) => row_errors.push(RowError {
                line,
                message: err.to_string(),
            }),
        }
    }
    row_errors.sort_by_key(|e| e.line);

    log::info!(
        "batch: {} rows read, {} predicted, {} errors",
        ingest.rows_read,
        rows.len(),
        row_errors.len()
    );

    Ok(BatchOutput {
        rows_read: ingest.rows_read,
        rows,
        row_errors,
    })
}

/// Load artifacts from the configured directory and build a pipeline.
pub fn load_pipeline(config: &RunConfig) -> Result<InferencePipeline, PipelineError> {
    let set = load_artifacts(&config.artifacts_dir)?;
    Ok(InferencePipeline::from_artifacts(set)?.with_unknown_policy(config.unknown_policy))
}

/// Fill the fitted schema from a partial record.
///
/// Absent fields take the caller's placeholder; an absent field without one is a
/// schema error. Placeholder use is logged because it silently changes the input.
pub fn assemble(partial: &PartialRecord, placeholders: &Placeholders) -> Result<FeatureRecord, PipelineError> {
    FeatureRecord::try_from_cells(|column| {
        if let Some(value) = partial.get(column) {
            return Ok(value);
        }
        match placeholders.get(column) {
            Some(value) => {
                log::warn!("`{column}` not collected, using placeholder '{value}'");
                Ok(value.clone())
            }
            None => Err(PipelineError::schema(format!(
                "missing required field `{column}` and no placeholder was configured"
            ))),
        }
    })
}

/// Check the artifacts against the fitted column layout.
pub fn validate_schema(
    encoder: &OrdinalEncoder,
    decoder: &LabelDecoder,
    classifier: &dyn Classifier,
) -> Result<(), PipelineError> {
    let expected: Vec<&str> = Column::CATEGORICAL.iter().map(|c| c.name()).collect();
    let actual: Vec<&str> = encoder.columns().iter().map(String::as_str).collect();
    if actual != expected {
        return Err(PipelineError::schema(format!(
            "encoder columns {actual:?} do not match schema v{SCHEMA_VERSION} categorical columns {expected:?}"
        )));
    }

    if classifier.n_features() != Column::ALL.len() {
        return Err(PipelineError::schema(format!(
            "classifier expects {} features but schema v{SCHEMA_VERSION} has {}",
            classifier.n_features(),
            Column::ALL.len()
        )));
    }

    if classifier.n_classes() != decoder.len() {
        return Err(PipelineError::schema(format!(
            "classifier has {} classes but the label encoder has {} labels",
            classifier.n_classes(),
            decoder.len()
        )));
    }

    Ok(())
}

fn checked_probabilities(proba: Vec<f64>, n_classes: usize) -> Result<Vec<f64>, PipelineError> {
    if proba.len() != n_classes {
        return Err(PipelineError::schema(format!(
            "classifier returned {} probabilities for {n_classes} classes",
            proba.len()
        )));
    }
    let in_range = |p: &f64| p.is_finite() && (-PROBA_EPSILON..=1.0 + PROBA_EPSILON).contains(p);
    if !proba.iter().all(in_range) {
        return Err(PipelineError::schema(format!(
            "classifier returned probabilities outside [0, 1]: {proba:?}"
        )));
    }
    Ok(proba.into_iter().map(|p| p.clamp(0.0, 1.0)).collect())
}

fn max_probability(proba: &[f64]) -> f64 {
    proba.iter().copied().fold(0.0, f64::max)
}
