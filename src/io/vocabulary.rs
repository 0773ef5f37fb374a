//! Category vocabularies for front-end choices.
//!
//! Choices come either from the loaded encoder (what the model accepts) or from a
//! raw census dataset (what was observed). The dataset is never used for encoding.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::{Column, UNKNOWN_SENTINEL};
use crate::error::AppError;
use crate::io::ingest::MISSING_MARKER;
use crate::models::OrdinalEncoder;

/// Per-column category lists, in `Column::CATEGORICAL` order.
pub type Vocabulary = Vec<(Column, Vec<String>)>;

/// Categories the encoder was fitted on.
pub fn encoder_vocabulary(encoder: &OrdinalEncoder) -> Vocabulary {
    Column::CATEGORICAL
        .into_iter()
        .filter_map(|c| encoder.categories(c.name()).map(|cats| (c, cats.to_vec())))
        .collect()
}

pub fn load_dataset_vocabulary(path: &Path) -> Result<Vocabulary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dataset '{}': {e}", path.display())))?;
    read_dataset_vocabulary(file)
}

/// Distinct values of each categorical column in first-seen order, with `?` read
/// as `unknown`.
pub fn read_dataset_vocabulary<R: Read>(input: R) -> Result<Vocabulary, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read dataset headers: {e}")))?
        .clone();

    let mut columns: Vec<(Column, usize)> = Vec::new();
    for (idx, name) in headers.iter().enumerate() {
        if let Some(column) = Column::from_name(name).filter(|c| c.is_categorical()) {
            if !columns.iter().any(|(c, _)| *c == column) {
                columns.push((column, idx));
            }
        }
    }
    if columns.is_empty() {
        return Err(AppError::new(2, "Dataset has none of the categorical columns."));
    }
    columns.sort_by_key(|(c, _)| c.index());

    let mut seen: Vec<HashSet<String>> = vec![HashSet::new(); columns.len()];
    let mut values: Vec<Vec<String>> = vec![Vec::new(); columns.len()];

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("skipping unreadable dataset row: {e}");
                continue;
            }
        };
        for (slot, (_, idx)) in columns.iter().enumerate() {
            let Some(raw) = record.get(*idx).filter(|s| !s.is_empty()) else {
                continue;
            };
            let value = if raw == MISSING_MARKER { UNKNOWN_SENTINEL } else { raw };
            if seen[slot].insert(value.to_string()) {
                values[slot].push(value.to_string());
            }
        }
    }

    Ok(columns
        .into_iter()
        .map(|(c, _)| c)
        .zip(values)
        .collect())
}
