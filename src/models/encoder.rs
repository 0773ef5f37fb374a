//! Ordinal encoder for categorical columns.
//!
//! Each fitted column carries an ordered category list; a value's ordinal is its
//! position in that list (the same layout as sklearn's `OrdinalEncoder.categories_`).

use std::collections::HashMap;

use crate::domain::{UNKNOWN_SENTINEL, UnknownPolicy};
use crate::error::PipelineError;

#[derive(Debug, Clone)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    unknown_value: Option<i64>,
    column_index: HashMap<String, usize>,
    lookup: Vec<HashMap<String, usize>>,
}

impl OrdinalEncoder {
    /// Build an encoder from fitted columns and their category lists.
    ///
    /// Fails if the lists are misaligned or a column repeats a category.
    pub fn new(
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
        unknown_value: Option<i64>,
    ) -> Result<Self, String> {
        if columns.len() != categories.len() {
            return Err(format!(
                "encoder has {} columns but {} category lists",
                columns.len(),
                categories.len()
            ));
        }

        let mut column_index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            if column_index.insert(name.clone(), idx).is_some() {
                return Err(format!("encoder column `{name}` appears twice"));
            }
        }

        let mut lookup = Vec::with_capacity(categories.len());
        for (name, cats) in columns.iter().zip(&categories) {
            if cats.is_empty() {
                return Err(format!("encoder column `{name}` has no categories"));
            }
            let mut map = HashMap::with_capacity(cats.len());
            for (ordinal, cat) in cats.iter().enumerate() {
                if map.insert(cat.clone(), ordinal).is_some() {
                    return Err(format!("encoder column `{name}` repeats category '{cat}'"));
                }
            }
            lookup.push(map);
        }

        Ok(Self {
            columns,
            categories,
            unknown_value,
            column_index,
            lookup,
        })
    }

    /// Fitted column names, in fitted order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.column_index
            .get(column)
            .map(|&idx| self.categories[idx].as_slice())
    }

    pub fn unknown_value(&self) -> Option<i64> {
        self.unknown_value
    }

    /// Encode one categorical value.
    ///
    /// Under [`UnknownPolicy::Sentinel`] an unseen value falls back to the column's
    /// `unknown` category, then to the fitted `unknown_value`; under
    /// [`UnknownPolicy::Reject`] it is always an error.
    pub fn encode(&self, column: &str, value: &str, policy: UnknownPolicy) -> Result<f64, PipelineError> {
        let idx = *self.column_index.get(column).ok_or_else(|| {
            PipelineError::schema(format!("encoder was not fitted on column `{column}`"))
        })?;
        let map = &self.lookup[idx];

        if let Some(&ordinal) = map.get(value) {
            return Ok(ordinal as f64);
        }

        let unknown = || PipelineError::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        };

        match policy {
            UnknownPolicy::Reject => Err(unknown()),
            UnknownPolicy::Sentinel => {
                if let Some(&ordinal) = map.get(UNKNOWN_SENTINEL) {
                    log::warn!("`{column}`: '{value}' not in vocabulary, using '{UNKNOWN_SENTINEL}'");
                    return Ok(ordinal as f64);
                }
                if let Some(code) = self.unknown_value {
                    log::warn!("`{column}`: '{value}' not in vocabulary, using encoded value {code}");
                    return Ok(code as f64);
                }
                Err(unknown())
            }
        }
    }
}
