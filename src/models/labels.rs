//! Class index to label mapping.

use crate::error::PipelineError;

/// Ordered class labels, index `i` is the label of class `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDecoder {
    classes: Vec<String>,
}

impl LabelDecoder {
    pub fn new(classes: Vec<String>) -> Result<Self, String> {
        if classes.is_empty() {
            return Err("label encoder has no classes".to_string());
        }
        for (i, label) in classes.iter().enumerate() {
            if classes[..i].contains(label) {
                return Err(format!("label encoder repeats class '{label}'"));
            }
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn inverse_transform(&self, class_index: usize) -> Result<&str, PipelineError> {
        self.classes
            .get(class_index)
            .map(String::as_str)
            .ok_or_else(|| {
                PipelineError::schema(format!(
                    "class index {class_index} outside label set of size {}",
                    self.classes.len()
                ))
            })
    }
}
