//! Read/write the three inference artifacts.
//!
//! An artifact directory holds:
//! - `model_income.json`: the classifier (`kind` selects the model family)
//! - `encoder.json`: fitted categorical columns and their ordered categories
//! - `label_encoder.json`: ordered class labels
//!
//! A missing file is an `ArtifactNotFound` error; any other read or parse failure
//! is `ArtifactCorrupt`. Neither is retried.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::{Classifier, LabelDecoder, LogisticModel, Node, OrdinalEncoder, SplitCondition, Tree, TreeEnsemble};

pub const MODEL_FILE: &str = "model_income.json";
pub const ENCODER_FILE: &str = "encoder.json";
pub const LABEL_ENCODER_FILE: &str = "label_encoder.json";

/// On-disk classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelFile {
    GradientBoosting {
        n_features: usize,
        init_score: f64,
        learning_rate: f64,
        trees: Vec<TreeFile>,
    },
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeFile {
    pub nodes: Vec<NodeFile>,
}

/// A tree node: either `{"feature", "threshold", "left", "right"}` or `{"leaf"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeFile {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: f64,
    },
}

/// On-disk ordinal encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderFile {
    pub columns: Vec<String>,
    pub categories: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_value: Option<i64>,
}

/// On-disk label encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderFile {
    pub classes: Vec<String>,
}

/// The three loaded artifacts, ready to be injected into a pipeline.
pub struct ArtifactSet {
    pub encoder: OrdinalEncoder,
    pub decoder: LabelDecoder,
    pub classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ArtifactSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactSet")
            .field("encoder_columns", &self.encoder.columns())
            .field("classes", &self.decoder.classes())
            .field("classifier", &self.classifier.kind())
            .finish()
    }
}

/// Load all three artifacts from `dir`.
pub fn load_artifacts(dir: &Path) -> Result<ArtifactSet, PipelineError> {
    let encoder = load_encoder(&dir.join(ENCODER_FILE))?;
    let decoder = load_label_decoder(&dir.join(LABEL_ENCODER_FILE))?;
    let classifier = load_classifier(&dir.join(MODEL_FILE))?;
    log::info!(
        "loaded artifacts from '{}' ({} encoder columns, {} classes, {} classifier)",
        dir.display(),
        encoder.columns().len(),
        decoder.len(),
        classifier.kind()
    );
    Ok(ArtifactSet {
        encoder,
        decoder,
        classifier,
    })
}

pub fn load_encoder(path: &Path) -> Result<OrdinalEncoder, PipelineError> {
    let file: EncoderFile = read_json(path)?;
    OrdinalEncoder::new(file.columns, file.categories, file.unknown_value).map_err(|message| corrupt(path, message))
}

pub fn load_label_decoder(path: &Path) -> Result<LabelDecoder, PipelineError> {
    let file: LabelEncoderFile = read_json(path)?;
    LabelDecoder::new(file.classes).map_err(|message| corrupt(path, message))
}

pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, PipelineError> {
    let file: ModelFile = read_json(path)?;
    file.into_classifier().map_err(|message| corrupt(path, message))
}

impl ModelFile {
    /// Convert into a validated in-memory classifier.
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, String> {
        match self {
            ModelFile::GradientBoosting {
                n_features,
                init_score,
                learning_rate,
                trees,
            } => {
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(idx, tree)| tree.into_tree(n_features).map_err(|e| format!("tree {idx}: {e}")))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Box::new(TreeEnsemble::new(n_features, init_score, learning_rate, trees)?))
            }
            ModelFile::LogisticRegression {
                coefficients,
                intercept,
            } => Ok(Box::new(LogisticModel::new(coefficients, intercept)?)),
        }
    }
}

impl TreeFile {
    fn into_tree(self, n_features: usize) -> Result<Tree, String> {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| match node {
                NodeFile::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => Node::Split {
                    condition: SplitCondition {
                        feature_index: feature,
                        threshold,
                    },
                    left,
                    right,
                },
                NodeFile::Leaf { leaf } => Node::Leaf(leaf),
            })
            .collect();
        Tree::new(nodes, n_features)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::ArtifactNotFound(path.to_path_buf())
        } else {
            corrupt(path, format!("failed to open: {e}"))
        }
    })?;
    log::debug!("reading artifact '{}'", path.display());
    serde_json::from_reader(BufReader::new(file)).map_err(|e| corrupt(path, format!("invalid JSON: {e}")))
}

fn corrupt(path: &Path, message: impl Into<String>) -> PipelineError {
    PipelineError::ArtifactCorrupt {
        path: PathBuf::from(path),
        message: message.into(),
    }
}
