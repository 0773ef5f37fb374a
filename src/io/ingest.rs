//! CSV ingest for batch prediction.
//!
//! Turns a census-style CSV (the dataset's own dotted headers, or underscored
//! variants) into partial records ready for schema assembly.
//!
//! - Unknown columns such as `income` are ignored
//! - Bad rows are skipped and reported with their line number
//! - A `?` cell in a categorical column means "missing" in the census data and
//!   is read as the `unknown` category

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Column, PartialRecord, UNKNOWN_SENTINEL};
use crate::error::AppError;

/// Census marker for a missing categorical value.
pub const MISSING_MARKER: &str = "?";

/// A row-level error encountered during ingest or prediction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed rows (with their line numbers) + row errors.
#[derive(Debug, Clone)]
pub struct IngestedRecords {
    pub records: Vec<(usize, PartialRecord)>,
    pub row_errors: Vec<RowError>,
    /// Schema columns with no header in the input.
    pub missing_columns: Vec<Column>,
    pub rows_read: usize,
}

/// Load partial records from a CSV file.
pub fn load_records(path: &Path) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_records(file)
}

pub fn read_records<R: Read>(input: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let missing_columns: Vec<Column> = Column::ALL
        .into_iter()
        .filter(|c| !header_map.contains_key(c))
        .collect();
    if !missing_columns.is_empty() {
        log::warn!(
            "CSV lacks columns: {}",
            missing_columns.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
        );
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records start at line 2.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(partial) => records.push((line, partial)),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if rows_read == 0 {
        return Err(AppError::new(2, "CSV contains no data rows."));
    }

    Ok(IngestedRecords {
        records,
        row_errors,
        missing_columns,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<Column, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        match Column::from_name(name) {
            // First occurrence wins on duplicate headers.
            Some(column) => {
                map.entry(column).or_insert(idx);
            }
            None => log::debug!("ignoring CSV column '{name}'"),
        }
    }
    map
}

fn parse_row(record: &StringRecord, header_map: &HashMap<Column, usize>) -> Result<PartialRecord, String> {
    let mut partial = PartialRecord::default();
    // Fitted order, so a row with several bad cells always reports the same one.
    for column in Column::ALL {
        let Some(idx) = header_map.get(&column) else {
            continue;
        };
        let Some(raw) = record.get(*idx).map(str::trim).filter(|s| !s.is_empty()) else {
            return Err(format!("Missing required value: `{column}`"));
        };
        let raw = if column.is_categorical() && raw == MISSING_MARKER {
            UNKNOWN_SENTINEL
        } else {
            raw
        };
        partial.set_raw(column, raw)?;
    }
    Ok(partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "age,workclass,fnlwgt,education,education.num,marital.status,occupation,relationship,race,sex,capital.gain,capital.loss,hours.per.week,native.country,income";

    #[test]
    fn reads_census_rows_and_ignores_income() {
        let csv = format!(
            "{HEADER}\n90,?,77053,HS-grad,9,Widowed,?,Not-in-family,White,Female,0,4356,40,United-States,<=50K\n"
        );
        let ingest = read_records(csv.as_bytes()).unwrap();
        assert_eq!(ingest.rows_read, 1);
        assert!(ingest.missing_columns.is_empty());
        assert!(ingest.row_errors.is_empty());

        let (line, partial) = &ingest.records[0];
        assert_eq!(*line, 2);
        assert_eq!(partial.age, Some(90));
        assert_eq!(partial.workclass.as_deref(), Some("unknown"));
        assert_eq!(partial.occupation.as_deref(), Some("unknown"));
        assert_eq!(partial.capital_loss, Some(4356));
        assert!(partial.missing_columns().is_empty());
    }

    #[test]
    fn row_errors_carry_line_numbers() {
        let csv = format!(
            "{HEADER}\n\
             39,State-gov,77516,Bachelors,13,Never-married,Adm-clerical,Not-in-family,White,Male,2174,0,40,United-States,<=50K\n\
             forty,Private,1,Bachelors,13,Divorced,Sales,Unmarried,White,Male,0,0,40,Mexico,<=50K\n\
             50,Private,1,Bachelors,13,Divorced,Sales,Unmarried,White,Male,0,0,,Mexico,<=50K\n"
        );
        let ingest = read_records(csv.as_bytes()).unwrap();
        assert_eq!(ingest.rows_read, 3);
        assert_eq!(ingest.records.len(), 1);
        assert_eq!(ingest.row_errors.len(), 2);
        assert_eq!(ingest.row_errors[0].line, 3);
        assert!(ingest.row_errors[0].message.contains("forty"));
        assert_eq!(ingest.row_errors[1].line, 4);
        assert!(ingest.row_errors[1].message.contains("hours.per.week"));
    }

    #[test]
    fn underscored_headers_and_missing_columns() {
        let csv = "Age,hours_per_week,Native_Country\n30,45,Canada\n";
        let ingest = read_records(csv.as_bytes()).unwrap();
        let partial = &ingest.records[0].1;
        assert_eq!(partial.hours_per_week, Some(45));
        assert_eq!(partial.native_country.as_deref(), Some("Canada"));
        assert_eq!(ingest.missing_columns.len(), 11);
        assert!(ingest.missing_columns.contains(&Column::Education));
    }

    #[test]
    fn empty_csv_is_an_error() {
        let err = read_records(HEADER.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn first_bad_cell_in_column_order_is_reported() {
        let csv = format!(
            "{HEADER}\n\
             forty,Private,x,Bachelors,y,Divorced,Sales,Unmarried,White,Male,z,w,v,Mexico,<=50K\n"
        );
        for _ in 0..50 {
            let ingest = read_records(csv.as_bytes()).unwrap();
            assert_eq!(ingest.row_errors.len(), 1);
            assert_eq!(ingest.row_errors[0].message, "Invalid integer 'forty' for `age`.");
        }
    }
}
