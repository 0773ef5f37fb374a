use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the inference pipeline and artifact loaders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("artifact '{}' could not be loaded: {message}", path.display())]
    ArtifactCorrupt { path: PathBuf, message: String },

    #[error("unknown category '{value}' for column `{column}`")]
    UnknownCategory { column: String, value: String },

    #[error("schema error: {0}")]
    Schema(String),
}

impl PipelineError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    /// True for errors that leave the pipeline unusable until the artifacts are fixed.
    pub fn is_artifact_error(&self) -> bool {
        matches!(self, Self::ArtifactNotFound(_) | Self::ArtifactCorrupt { .. })
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ArtifactNotFound(_) | Self::ArtifactCorrupt { .. } => 2,
            Self::UnknownCategory { .. } => 3,
            Self::Schema(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let message = match &err {
            PipelineError::ArtifactNotFound(path) => format!(
                "Artifact '{}' not found. Point --artifacts (or INCOME_ARTIFACTS) at the directory holding model_income.json, encoder.json and label_encoder.json.",
                path.display()
            ),
            PipelineError::UnknownCategory { column, value } => format!(
                "Value '{value}' is not a known `{column}` category. Run `income categories` to list accepted values, or pass --unknown-policy sentinel."
            ),
            other => other.to_string(),
        };
        Self::new(err.exit_code(), message)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
