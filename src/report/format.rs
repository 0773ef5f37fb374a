//! Formatted terminal output.

use serde::Serialize;

use crate::app::pipeline::{BatchOutput, InferencePipeline};
use crate::domain::{Column, FeatureRecord, IncomeClass, PredictionResult, SCHEMA_VERSION};
use crate::report::PresentationConfig;

/// JSON shape of a single prediction (`income predict --json`).
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport<'a> {
    pub label: &'a str,
    pub display_label: &'a str,
    pub income_class: IncomeClass,
    pub is_high_income: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<&'a [f64]>,
    pub record: &'a FeatureRecord,
}

impl<'a> PredictionReport<'a> {
    pub fn new(record: &'a FeatureRecord, result: &'a PredictionResult, config: &'a PresentationConfig) -> Self {
        Self {
            label: &result.label,
            display_label: config.display_label(result),
            income_class: result.income_class(),
            is_high_income: result.is_high_income,
            confidence: result.confidence.filter(|_| config.show_confidence),
            probabilities: result.probabilities.as_deref().filter(|_| config.show_confidence),
            record,
        }
    }
}

/// Format one prediction with its echoed inputs.
pub fn format_prediction(record: &FeatureRecord, result: &PredictionResult, config: &PresentationConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} ===\n", config.title));

    if !config.echo_fields.is_empty() {
        let width = config
            .echo_fields
            .iter()
            .map(|c| c.display_name().len())
            .max()
            .unwrap_or(0);
        for column in &config.echo_fields {
            out.push_str(&format!(
                "{:<width$} : {}\n",
                column.display_name(),
                record.value(*column)
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}: {}\n", config.result_prefix, config.display_label(result)));
    if config.show_confidence {
        if let Some(pct) = result.confidence_percent() {
            out.push_str(&format!("{}: {pct:.2}%\n", config.confidence_prefix));
        }
    }

    out
}

/// Format batch predictions as a table plus a class summary.
pub fn format_batch(output: &BatchOutput, config: &PresentationConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} (batch) ===\n", config.title));
    out.push_str(&format!(
        "Rows: read={} | predicted={} | errors={}\n\n",
        output.rows_read,
        output.rows.len(),
        output.row_errors.len()
    ));

    if config.show_confidence {
        out.push_str(&format!("{:>6} {:<16} {:>10}\n", "line", "prediction", "confidence"));
        out.push_str(&format!("{:-<6} {:-<16} {:-<10}\n", "", "", ""));
    } else {
        out.push_str(&format!("{:>6} {:<16}\n", "line", "prediction"));
        out.push_str(&format!("{:-<6} {:-<16}\n", "", ""));
    }

    for row in &output.rows {
        let label = truncate(config.display_label(&row.result), 16);
        let line = if config.show_confidence {
            let conf = row
                .result
                .confidence_percent()
                .map(|p| format!("{p:.2}%"))
                .unwrap_or_else(|| "-".to_string());
            format!("{:>6} {:<16} {:>10}", row.line, label, conf)
        } else {
            format!("{:>6} {:<16}", row.line, label)
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }

    let high = output
        .rows
        .iter()
        .filter(|r| r.result.income_class() == IncomeClass::High)
        .count();
    let low = output.rows.len() - high;
    out.push_str(&format!(
        "\nSummary: {}={high} | {}={low}\n",
        config.high_label.as_deref().unwrap_or(">50K"),
        config.low_label.as_deref().unwrap_or("<=50K"),
    ));

    if !output.row_errors.is_empty() {
        out.push_str("\nRow errors:\n");
        for err in &output.row_errors {
            out.push_str(&format!("  line {}: {}\n", err.line, err.message));
        }
    }

    out
}

/// Summarize the loaded artifacts (`income inspect`).
pub fn format_artifact_summary(pipeline: &InferencePipeline) -> String {
    let mut out = String::new();
    let classifier = pipeline.classifier();

    out.push_str(&format!("Schema: v{SCHEMA_VERSION} ({} columns)\n", Column::ALL.len()));
    out.push_str(&format!(
        "Classifier: {} | features={} | classes={}\n",
        classifier.kind(),
        classifier.n_features(),
        classifier.n_classes()
    ));
    if let Some(n) = classifier.n_trees() {
        out.push_str(&format!("Trees: {n}\n"));
    }
    out.push_str(&format!("Labels: {}\n", pipeline.decoder().classes().join(", ")));
    out.push_str(&format!("Unknown policy: {:?}\n", pipeline.unknown_policy()));
    out.push_str("\nEncoder vocabulary:\n");

    let encoder = pipeline.encoder();
    for name in encoder.columns() {
        let n = encoder.categories(name).map_or(0, <[String]>::len);
        out.push_str(&format!("  {name:<16} {n:>3} categories\n"));
    }
    if let Some(code) = encoder.unknown_value() {
        out.push_str(&format!("  (unseen values encode to {code} under the sentinel policy)\n"));
    }

    out
}

/// List category vocabularies per column.
pub fn format_categories(vocabulary: &[(Column, Vec<String>)]) -> String {
    let mut out = String::new();
    for (column, values) in vocabulary {
        out.push_str(&format!("{} ({}):\n", column.display_name(), column.name()));
        for value in values {
            out.push_str(&format!("  - {value}\n"));
        }
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::BatchRow;
    use crate::io::ingest::RowError;
    use crate::report::Preset;
    use crate::testing::sample_record;

    fn low_result() -> PredictionResult {
        PredictionResult {
            label: "<=50K".to_string(),
            is_high_income: false,
            confidence: Some(0.871234),
            class_index: 0,
            probabilities: Some(vec![0.871234, 0.128766]),
        }
    }

    #[test]
    fn prediction_line_matches_form_output() {
        let text = format_prediction(&sample_record(), &low_result(), &Preset::Standard.config());
        assert!(text.contains("Prediksi Pendapatan: <=50K\n"));
        assert!(!text.contains("Probabilitas"));
    }

    #[test]
    fn confidence_is_percentage_with_two_decimals() {
        let text = format_prediction(&sample_record(), &low_result(), &Preset::Confidence.config());
        assert!(text.contains("Probabilitas: 87.12%"));
        assert!(text.contains("Native country"));
        assert!(text.contains("United-States"));
    }

    #[test]
    fn kaya_preset_relabels_output() {
        let text = format_prediction(&sample_record(), &low_result(), &Preset::Kaya.config());
        assert!(text.contains("Hasil: Gak Kaya"));
    }

    #[test]
    fn json_report_hides_confidence_when_disabled() {
        let record = sample_record();
        let result = low_result();
        let config = Preset::Standard.config();
        let value = serde_json::to_value(PredictionReport::new(&record, &result, &config)).unwrap();
        assert_eq!(value["label"], "<=50K");
        assert_eq!(value["income_class"], "low");
        assert!(value.get("confidence").is_none());
        assert_eq!(value["record"]["native.country"], "United-States");
    }

    #[test]
    fn batch_table_lists_rows_and_errors() {
        let output = BatchOutput {
            rows_read: 2,
            rows: vec![BatchRow {
                line: 2,
                record: sample_record(),
                result: low_result(),
            }],
            row_errors: vec![RowError {
                line: 3,
                message: "unknown category 'Atlantis' for column `native.country`".to_string(),
            }],
        };
        let text = format_batch(&output, &Preset::Confidence.config());
        assert!(text.contains("Rows: read=2 | predicted=1 | errors=1"));
        assert!(text.contains("87.12%"));
        assert!(text.contains("line 3: unknown category"));
        assert!(text.contains(">50K=0 | <=50K=1"));
    }

    #[test]
    fn artifact_summary_lists_model_shape() {
        use crate::testing::{fixture_classifier, fixture_decoder, fixture_encoder};

        let pipeline = InferencePipeline::new(fixture_encoder(), fixture_decoder(), fixture_classifier()).unwrap();
        let text = format_artifact_summary(&pipeline);
        assert!(text.contains("Classifier: gradient_boosting | features=14 | classes=2"));
        assert!(text.contains("Trees: 3"));
        assert!(text.contains("Labels: <=50K, >50K"));
        assert!(text.contains("native.country"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Married-civ-spouse", 8), "Married.");
        assert_eq!(truncate("Male", 8), "Male");
    }
}
