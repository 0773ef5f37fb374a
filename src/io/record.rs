//! JSON inputs: a single record, and a presentation configuration.

use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::PartialRecord;
use crate::error::AppError;
use crate::report::PresentationConfig;

/// Read a (possibly partial) record from a JSON object.
pub fn read_record_json(path: &Path) -> Result<PartialRecord, AppError> {
    read_json(path, "record")
}

pub fn read_presentation_json(path: &Path) -> Result<PresentationConfig, AppError> {
    read_json(path, "presentation config")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open {what} JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid {what} JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_partial_record_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.json");
        std::fs::write(&path, r#"{"age": 28, "sex": "Female", "hours.per.week": 38}"#).unwrap();

        let partial = read_record_json(&path).unwrap();
        assert_eq!(partial.age, Some(28));
        assert_eq!(partial.hours_per_week, Some(38));
        assert_eq!(partial.education, None);
    }

    #[test]
    fn bad_json_is_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("person.json");
        std::fs::write(&path, r#"{"age": "old""#).unwrap();
        assert_eq!(read_record_json(&path).unwrap_err().exit_code(), 2);
        assert_eq!(read_presentation_json(&dir.path().join("missing.json")).unwrap_err().exit_code(), 2);
    }
}
