//! Export batch predictions to CSV or JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts;
//! the JSON carries the full record next to each prediction.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::{BatchOutput, BatchRow};
use crate::domain::{FeatureRecord, PredictionResult, SCHEMA_VERSION};
use crate::error::AppError;
use crate::io::ingest::RowError;
use crate::report::PresentationConfig;

/// Write one CSV row per successful prediction.
pub fn write_predictions_csv(path: &Path, output: &BatchOutput, config: &PresentationConfig) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["line", "label", "display_label", "is_high_income", "confidence"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for row in &output.rows {
        let r = &row.result;
        let line = row.line.to_string();
        let confidence = r.confidence.map(|v| format!("{v:.6}")).unwrap_or_default();
        writer
            .write_record([
                line.as_str(),
                r.label.as_str(),
                config.display_label(r),
                if r.is_high_income { "true" } else { "false" },
                confidence.as_str(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;

    Ok(())
}

#[derive(Debug, Serialize)]
struct PredictionsFile<'a> {
    tool: &'static str,
    schema_version: u32,
    generated: DateTime<Utc>,
    rows_read: usize,
    predictions: Vec<ExportRow<'a>>,
    row_errors: Vec<ExportError<'a>>,
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    line: usize,
    display_label: &'a str,
    #[serde(flatten)]
    result: &'a PredictionResult,
    record: &'a FeatureRecord,
}

#[derive(Debug, Serialize)]
struct ExportError<'a> {
    line: usize,
    message: &'a str,
}

/// Write all predictions and row errors as one JSON document.
pub fn write_predictions_json(path: &Path, output: &BatchOutput, config: &PresentationConfig) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let doc = PredictionsFile {
        tool: "income",
        schema_version: SCHEMA_VERSION,
        generated: Utc::now(),
        rows_read: output.rows_read,
        predictions: output.rows.iter().map(|row| export_row(row, config)).collect(),
        row_errors: output.row_errors.iter().map(export_error).collect(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

fn export_row<'a>(row: &'a BatchRow, config: &'a PresentationConfig) -> ExportRow<'a> {
    ExportRow {
        line: row.line,
        display_label: config.display_label(&row.result),
        result: &row.result,
        record: &row.record,
    }
}

fn export_error(err: &RowError) -> ExportError<'_> {
    ExportError {
        line: err.line,
        message: &err.message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Preset;
    use crate::testing::{high_income_record, sample_record};

    fn output() -> BatchOutput {
        BatchOutput {
            rows_read: 3,
            rows: vec![
                BatchRow {
                    line: 2,
                    record: sample_record(),
                    result: PredictionResult {
                        label: "<=50K".to_string(),
                        is_high_income: false,
                        confidence: Some(0.87),
                        class_index: 0,
                        probabilities: Some(vec![0.87, 0.13]),
                    },
                },
                BatchRow {
                    line: 4,
                    record: high_income_record(),
                    result: PredictionResult {
                        label: ">50K".to_string(),
                        is_high_income: true,
                        confidence: None,
                        class_index: 1,
                        probabilities: None,
                    },
                },
            ],
            row_errors: vec![RowError {
                line: 3,
                message: "Missing required value: `age`".to_string(),
            }],
        }
    }

    #[test]
    fn csv_export_has_one_row_per_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_predictions_csv(&path, &output(), &Preset::Kaya.config()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2,<=50K,Gak Kaya,false,0.870000");
        assert_eq!(lines[2], "4,>50K,Kaya,true,");
    }

    #[test]
    fn json_export_carries_records_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_predictions_json(&path, &output(), &Preset::Standard.config()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["predictions"].as_array().unwrap().len(), 2);
        assert_eq!(value["predictions"][0]["label"], "<=50K");
        assert_eq!(value["predictions"][1]["record"]["education"], "Masters");
        assert_eq!(value["row_errors"][0]["line"], 3);
        assert!(value["generated"].is_string());
    }

    #[test]
    fn csv_export_quotes_labels_with_separators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut config = Preset::Standard.config();
        config.low_label = Some("Gak Kaya,\r\nbiasa".to_string());
        write_predictions_csv(&path, &output(), &config).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "Gak Kaya,\r\nbiasa");
        assert_eq!(&rows[1][1], ">50K");
    }
}
