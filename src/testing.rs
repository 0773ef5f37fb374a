//! Shared test fixtures: census records and a small artifact set.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Column, FeatureRecord};
use crate::io::artifacts::{
    ENCODER_FILE, EncoderFile, LABEL_ENCODER_FILE, LabelEncoderFile, MODEL_FILE, ModelFile, NodeFile, TreeFile,
};
use crate::models::{Classifier, LabelDecoder, OrdinalEncoder};

/// First row of the census dataset.
pub fn sample_record() -> FeatureRecord {
    FeatureRecord {
        age: 39,
        workclass: "State-gov".to_string(),
        fnlwgt: 77516,
        education: "Bachelors".to_string(),
        education_num: 13,
        marital_status: "Never-married".to_string(),
        occupation: "Adm-clerical".to_string(),
        relationship: "Not-in-family".to_string(),
        race: "White".to_string(),
        sex: "Male".to_string(),
        capital_gain: 2174,
        capital_loss: 0,
        hours_per_week: 40,
        native_country: "United-States".to_string(),
    }
}

/// A record the fixture model classifies as high income.
pub fn high_income_record() -> FeatureRecord {
    FeatureRecord {
        age: 52,
        workclass: "Self-emp-inc".to_string(),
        fnlwgt: 287927,
        education: "Masters".to_string(),
        education_num: 14,
        marital_status: "Married-civ-spouse".to_string(),
        occupation: "Exec-managerial".to_string(),
        relationship: "Husband".to_string(),
        race: "White".to_string(),
        sex: "Male".to_string(),
        capital_gain: 15024,
        capital_loss: 0,
        hours_per_week: 50,
        native_country: "United-States".to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub fn fixture_encoder_file() -> EncoderFile {
    EncoderFile {
        columns: Column::CATEGORICAL.iter().map(|c| c.name().to_string()).collect(),
        categories: vec![
            strings(&[
                "Federal-gov",
                "Local-gov",
                "Never-worked",
                "Private",
                "Self-emp-inc",
                "Self-emp-not-inc",
                "State-gov",
                "Without-pay",
                "unknown",
            ]),
            strings(&[
                "10th",
                "11th",
                "12th",
                "1st-4th",
                "5th-6th",
                "7th-8th",
                "9th",
                "Assoc-acdm",
                "Assoc-voc",
                "Bachelors",
                "Doctorate",
                "HS-grad",
                "Masters",
                "Preschool",
                "Prof-school",
                "Some-college",
            ]),
            strings(&[
                "Divorced",
                "Married-AF-spouse",
                "Married-civ-spouse",
                "Married-spouse-absent",
                "Never-married",
                "Separated",
                "Widowed",
            ]),
            strings(&[
                "Adm-clerical",
                "Armed-Forces",
                "Craft-repair",
                "Exec-managerial",
                "Farming-fishing",
                "Handlers-cleaners",
                "Machine-op-inspct",
                "Other-service",
                "Priv-house-serv",
                "Prof-specialty",
                "Protective-serv",
                "Sales",
                "Tech-support",
                "Transport-moving",
                "unknown",
            ]),
            strings(&[
                "Husband",
                "Not-in-family",
                "Other-relative",
                "Own-child",
                "Unmarried",
                "Wife",
            ]),
            strings(&["Amer-Indian-Eskimo", "Asian-Pac-Islander", "Black", "Other", "White"]),
            strings(&["Female", "Male"]),
            strings(&[
                "Canada",
                "China",
                "Germany",
                "India",
                "Mexico",
                "Philippines",
                "United-States",
                "unknown",
            ]),
        ],
        unknown_value: None,
    }
}

fn split(feature: Column, threshold: f64, left: usize, right: usize) -> NodeFile {
    NodeFile::Split {
        feature: feature.index(),
        threshold,
        left,
        right,
    }
}

fn leaf(value: f64) -> NodeFile {
    NodeFile::Leaf { leaf: value }
}

/// Three-tree ensemble keyed on capital gain, marital status and education years.
pub fn fixture_model_file() -> ModelFile {
    ModelFile::GradientBoosting {
        n_features: Column::ALL.len(),
        init_score: -1.2,
        learning_rate: 1.0,
        trees: vec![
            TreeFile {
                nodes: vec![split(Column::CapitalGain, 5000.0, 1, 2), leaf(-0.5), leaf(3.0)],
            },
            TreeFile {
                nodes: vec![
                    split(Column::MaritalStatus, 1.5, 1, 2),
                    leaf(-0.2),
                    split(Column::MaritalStatus, 2.5, 3, 4),
                    leaf(1.0),
                    leaf(-0.8),
                ],
            },
            TreeFile {
                nodes: vec![split(Column::EducationNum, 12.5, 1, 2), leaf(-0.3), leaf(0.6)],
            },
        ],
    }
}

pub fn fixture_label_file() -> LabelEncoderFile {
    LabelEncoderFile {
        classes: strings(&["<=50K", ">50K"]),
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) {
    serde_json::to_writer_pretty(File::create(path).unwrap(), value).unwrap();
}

pub fn write_fixture_artifacts(dir: &Path) {
    write_json(&dir.join(ENCODER_FILE), &fixture_encoder_file());
    write_json(&dir.join(MODEL_FILE), &fixture_model_file());
    write_json(&dir.join(LABEL_ENCODER_FILE), &fixture_label_file());
}

pub fn fixture_encoder() -> OrdinalEncoder {
    let file = fixture_encoder_file();
    OrdinalEncoder::new(file.columns, file.categories, file.unknown_value).unwrap()
}

pub fn fixture_decoder() -> LabelDecoder {
    LabelDecoder::new(fixture_label_file().classes).unwrap()
}

pub fn fixture_classifier() -> Box<dyn Classifier> {
    fixture_model_file().into_classifier().unwrap()
}

/// Classifier returning a fixed answer, for pipeline tests.
pub struct FixedClassifier {
    pub n_features: usize,
    pub class: usize,
    pub proba: Option<Vec<f64>>,
}

impl Classifier for FixedClassifier {
    fn kind(&self) -> &'static str {
        "fixed"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.proba.as_ref().map_or(2, Vec::len)
    }

    fn predict(&self, _row: &[f64]) -> usize {
        self.class
    }

    fn predict_proba(&self, _row: &[f64]) -> Option<Vec<f64>> {
        self.proba.clone()
    }
}
