//! Presentation of prediction results.
//!
//! One `PresentationConfig` replaces the per-variant front-ends: it controls which
//! input fields are echoed, whether confidence is shown and how the two income
//! classes are labeled.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{Column, IncomeClass, PredictionResult};

pub mod format;

pub use format::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub title: String,
    pub result_prefix: String,
    pub confidence_prefix: String,
    pub show_confidence: bool,
    /// Input fields printed above the result.
    pub echo_fields: Vec<Column>,
    /// Replaces the decoded label for high-income results.
    pub high_label: Option<String>,
    /// Replaces the decoded label for low-income results.
    pub low_label: Option<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            title: "Census Income Prediction".to_string(),
            result_prefix: "Prediksi Pendapatan".to_string(),
            confidence_prefix: "Probabilitas".to_string(),
            show_confidence: false,
            echo_fields: Vec::new(),
            high_label: None,
            low_label: None,
        }
    }
}

impl PresentationConfig {
    /// Label shown to the user, after relabeling.
    pub fn display_label<'a>(&'a self, result: &'a PredictionResult) -> &'a str {
        let relabel = match result.income_class() {
            IncomeClass::High => self.high_label.as_deref(),
            IncomeClass::Low => self.low_label.as_deref(),
        };
        relabel.unwrap_or(&result.label)
    }
}

/// Built-in presentation presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Decoded label only.
    Standard,
    /// Decoded label plus confidence and the collected fields.
    Confidence,
    /// `Kaya` / `Gak Kaya` relabeling with confidence.
    Kaya,
}

impl Preset {
    pub fn config(self) -> PresentationConfig {
        match self {
            Preset::Standard => PresentationConfig::default(),
            Preset::Confidence => PresentationConfig {
                show_confidence: true,
                echo_fields: Column::ALL.to_vec(),
                ..PresentationConfig::default()
            },
            Preset::Kaya => PresentationConfig {
                title: "Prediksi Kaya atau Gak Kaya".to_string(),
                result_prefix: "Hasil".to_string(),
                show_confidence: true,
                high_label: Some("Kaya".to_string()),
                low_label: Some("Gak Kaya".to_string()),
                ..PresentationConfig::default()
            },
        }
    }
}
