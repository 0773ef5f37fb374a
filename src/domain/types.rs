//! Shared domain types.
//!
//! The column order below is the order the encoder and classifier artifacts were
//! fitted on. It is validated against the loaded encoder before any prediction is
//! served (see `app::pipeline`).

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Version of the fitted column layout. Bump when `Column::ALL` changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Category value that unrecognized inputs may be mapped to.
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// Substring of a decoded label that marks the high-income class.
pub const HIGH_INCOME_MARKER: &str = ">50K";

/// One column of the fitted census schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Column {
    #[serde(rename = "age")]
    #[value(name = "age")]
    Age,
    #[serde(rename = "workclass")]
    #[value(name = "workclass")]
    Workclass,
    #[serde(rename = "fnlwgt")]
    #[value(name = "fnlwgt")]
    Fnlwgt,
    #[serde(rename = "education")]
    #[value(name = "education")]
    Education,
    #[serde(rename = "education.num")]
    #[value(name = "education.num")]
    EducationNum,
    #[serde(rename = "marital.status")]
    #[value(name = "marital.status")]
    MaritalStatus,
    #[serde(rename = "occupation")]
    #[value(name = "occupation")]
    Occupation,
    #[serde(rename = "relationship")]
    #[value(name = "relationship")]
    Relationship,
    #[serde(rename = "race")]
    #[value(name = "race")]
    Race,
    #[serde(rename = "sex")]
    #[value(name = "sex")]
    Sex,
    #[serde(rename = "capital.gain")]
    #[value(name = "capital.gain")]
    CapitalGain,
    #[serde(rename = "capital.loss")]
    #[value(name = "capital.loss")]
    CapitalLoss,
    #[serde(rename = "hours.per.week")]
    #[value(name = "hours.per.week")]
    HoursPerWeek,
    #[serde(rename = "native.country")]
    #[value(name = "native.country")]
    NativeCountry,
}

impl Column {
    /// All columns, in fitted order.
    pub const ALL: [Column; 14] = [
        Column::Age,
        Column::Workclass,
        Column::Fnlwgt,
        Column::Education,
        Column::EducationNum,
        Column::MaritalStatus,
        Column::Occupation,
        Column::Relationship,
        Column::Race,
        Column::Sex,
        Column::CapitalGain,
        Column::CapitalLoss,
        Column::HoursPerWeek,
        Column::NativeCountry,
    ];

    /// Categorical columns, in fitted order. This is the encoder's column set.
    pub const CATEGORICAL: [Column; 8] = [
        Column::Workclass,
        Column::Education,
        Column::MaritalStatus,
        Column::Occupation,
        Column::Relationship,
        Column::Race,
        Column::Sex,
        Column::NativeCountry,
    ];

    /// Column name as it appears in the census dataset and artifacts.
    pub fn name(self) -> &'static str {
        match self {
            Column::Age => "age",
            Column::Workclass => "workclass",
            Column::Fnlwgt => "fnlwgt",
            Column::Education => "education",
            Column::EducationNum => "education.num",
            Column::MaritalStatus => "marital.status",
            Column::Occupation => "occupation",
            Column::Relationship => "relationship",
            Column::Race => "race",
            Column::Sex => "sex",
            Column::CapitalGain => "capital.gain",
            Column::CapitalLoss => "capital.loss",
            Column::HoursPerWeek => "hours.per.week",
            Column::NativeCountry => "native.country",
        }
    }

    /// Human-readable label for prompts and reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Column::Age => "Age",
            Column::Workclass => "Work class",
            Column::Fnlwgt => "Final weight (fnlwgt)",
            Column::Education => "Education",
            Column::EducationNum => "Education years",
            Column::MaritalStatus => "Marital status",
            Column::Occupation => "Occupation",
            Column::Relationship => "Relationship",
            Column::Race => "Race",
            Column::Sex => "Sex",
            Column::CapitalGain => "Capital gain",
            Column::CapitalLoss => "Capital loss",
            Column::HoursPerWeek => "Hours per week",
            Column::NativeCountry => "Native country",
        }
    }

    pub fn is_categorical(self) -> bool {
        Column::CATEGORICAL.contains(&self)
    }

    /// Position in the fitted row.
    pub fn index(self) -> usize {
        Column::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Inclusive bounds for integer columns.
    pub fn bounds(self) -> Option<(i64, i64)> {
        match self {
            Column::Age => Some((17, 90)),
            Column::EducationNum => Some((1, 16)),
            Column::HoursPerWeek => Some((1, 99)),
            Column::Fnlwgt | Column::CapitalGain | Column::CapitalLoss => Some((0, i64::MAX)),
            _ => None,
        }
    }

    /// Resolve a header or key to a column.
    ///
    /// Matching is case-insensitive and treats `.`, `_`, `-` and spaces as the same
    /// separator, so `hours_per_week`, `Hours-Per-Week` and `hours.per.week` all match.
    pub fn from_name(name: &str) -> Option<Column> {
        let normalized = normalize_column_name(name);
        Column::ALL.into_iter().find(|c| c.name() == normalized)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize_column_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .map(|ch| match ch {
            '_' | '-' | ' ' => '.',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// An owned cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl CellValue {
    /// Parse a raw string for the given column (integers for numeric columns).
    pub fn parse(column: Column, raw: &str) -> Result<CellValue, String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(format!("Missing value for `{column}`."));
        }
        if column.is_categorical() {
            return Ok(CellValue::Text(raw.to_string()));
        }
        raw.parse::<i64>()
            .map(CellValue::Int)
            .map_err(|_| format!("Invalid integer '{raw}' for `{column}`."))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// A borrowed view of one field of a `FeatureRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Int(i64),
    Text(&'a str),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// A complete census record with all 14 fitted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: i64,
    pub workclass: String,
    pub fnlwgt: i64,
    pub education: String,
    #[serde(rename = "education.num", alias = "education_num")]
    pub education_num: i64,
    #[serde(rename = "marital.status", alias = "marital_status")]
    pub marital_status: String,
    pub occupation: String,
    pub relationship: String,
    pub race: String,
    pub sex: String,
    #[serde(rename = "capital.gain", alias = "capital_gain")]
    pub capital_gain: i64,
    #[serde(rename = "capital.loss", alias = "capital_loss")]
    pub capital_loss: i64,
    #[serde(rename = "hours.per.week", alias = "hours_per_week")]
    pub hours_per_week: i64,
    #[serde(rename = "native.country", alias = "native_country")]
    pub native_country: String,
}

impl FeatureRecord {
    /// Build a record by asking `cell` for each column in fitted order.
    ///
    /// Fails with a schema error if a cell has the wrong type for its column.
    pub fn try_from_cells(
        mut cell: impl FnMut(Column) -> Result<CellValue, PipelineError>,
    ) -> Result<FeatureRecord, PipelineError> {
        let mut int = |col: Column| -> Result<i64, PipelineError> {
            match cell(col)? {
                CellValue::Int(v) => Ok(v),
                CellValue::Text(s) => Err(PipelineError::schema(format!(
                    "column `{col}` expects an integer, got '{s}'"
                ))),
            }
        };
        let age = int(Column::Age)?;
        let fnlwgt = int(Column::Fnlwgt)?;
        let education_num = int(Column::EducationNum)?;
        let capital_gain = int(Column::CapitalGain)?;
        let capital_loss = int(Column::CapitalLoss)?;
        let hours_per_week = int(Column::HoursPerWeek)?;
        drop(int);

        let mut text = |col: Column| -> Result<String, PipelineError> {
            match cell(col)? {
                CellValue::Text(s) => Ok(s),
                CellValue::Int(v) => Err(PipelineError::schema(format!(
                    "column `{col}` expects a category, got {v}"
                ))),
            }
        };

        Ok(FeatureRecord {
            age,
            workclass: text(Column::Workclass)?,
            fnlwgt,
            education: text(Column::Education)?,
            education_num,
            marital_status: text(Column::MaritalStatus)?,
            occupation: text(Column::Occupation)?,
            relationship: text(Column::Relationship)?,
            race: text(Column::Race)?,
            sex: text(Column::Sex)?,
            capital_gain,
            capital_loss,
            hours_per_week,
            native_country: text(Column::NativeCountry)?,
        })
    }

    pub fn value(&self, column: Column) -> FieldValue<'_> {
        match column {
            Column::Age => FieldValue::Int(self.age),
            Column::Workclass => FieldValue::Text(&self.workclass),
            Column::Fnlwgt => FieldValue::Int(self.fnlwgt),
            Column::Education => FieldValue::Text(&self.education),
            Column::EducationNum => FieldValue::Int(self.education_num),
            Column::MaritalStatus => FieldValue::Text(&self.marital_status),
            Column::Occupation => FieldValue::Text(&self.occupation),
            Column::Relationship => FieldValue::Text(&self.relationship),
            Column::Race => FieldValue::Text(&self.race),
            Column::Sex => FieldValue::Text(&self.sex),
            Column::CapitalGain => FieldValue::Int(self.capital_gain),
            Column::CapitalLoss => FieldValue::Int(self.capital_loss),
            Column::HoursPerWeek => FieldValue::Int(self.hours_per_week),
            Column::NativeCountry => FieldValue::Text(&self.native_country),
        }
    }

    /// Check integer ranges and that no category is blank.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for column in Column::ALL {
            match self.value(column) {
                FieldValue::Int(v) => {
                    let Some((lo, hi)) = column.bounds() else {
                        continue;
                    };
                    if !(lo..=hi).contains(&v) {
                        return Err(PipelineError::schema(if hi == i64::MAX {
                            format!("`{column}` must be >= {lo}, got {v}")
                        } else {
                            format!("`{column}` must be within {lo}..={hi}, got {v}")
                        }));
                    }
                }
                FieldValue::Text(s) => {
                    if s.trim().is_empty() {
                        return Err(PipelineError::schema(format!("`{column}` is empty")));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A record as collected by a front-end: any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialRecord {
    pub age: Option<i64>,
    pub workclass: Option<String>,
    pub fnlwgt: Option<i64>,
    pub education: Option<String>,
    #[serde(rename = "education.num", alias = "education_num")]
    pub education_num: Option<i64>,
    #[serde(rename = "marital.status", alias = "marital_status")]
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub relationship: Option<String>,
    pub race: Option<String>,
    pub sex: Option<String>,
    #[serde(rename = "capital.gain", alias = "capital_gain")]
    pub capital_gain: Option<i64>,
    #[serde(rename = "capital.loss", alias = "capital_loss")]
    pub capital_loss: Option<i64>,
    #[serde(rename = "hours.per.week", alias = "hours_per_week")]
    pub hours_per_week: Option<i64>,
    #[serde(rename = "native.country", alias = "native_country")]
    pub native_country: Option<String>,
}

impl PartialRecord {
    pub fn get(&self, column: Column) -> Option<CellValue> {
        match column {
            Column::Age => self.age.map(CellValue::Int),
            Column::Workclass => self.workclass.clone().map(CellValue::Text),
            Column::Fnlwgt => self.fnlwgt.map(CellValue::Int),
            Column::Education => self.education.clone().map(CellValue::Text),
            Column::EducationNum => self.education_num.map(CellValue::Int),
            Column::MaritalStatus => self.marital_status.clone().map(CellValue::Text),
            Column::Occupation => self.occupation.clone().map(CellValue::Text),
            Column::Relationship => self.relationship.clone().map(CellValue::Text),
            Column::Race => self.race.clone().map(CellValue::Text),
            Column::Sex => self.sex.clone().map(CellValue::Text),
            Column::CapitalGain => self.capital_gain.map(CellValue::Int),
            Column::CapitalLoss => self.capital_loss.map(CellValue::Int),
            Column::HoursPerWeek => self.hours_per_week.map(CellValue::Int),
            Column::NativeCountry => self.native_country.clone().map(CellValue::Text),
        }
    }

    /// Set a field from a raw string, parsing integers for numeric columns.
    pub fn set_raw(&mut self, column: Column, raw: &str) -> Result<(), String> {
        match CellValue::parse(column, raw)? {
            CellValue::Int(v) => self.set_int(column, v),
            CellValue::Text(s) => self.set_text(column, s),
        }
        Ok(())
    }

    fn set_int(&mut self, column: Column, v: i64) {
        let slot = match column {
            Column::Age => &mut self.age,
            Column::Fnlwgt => &mut self.fnlwgt,
            Column::EducationNum => &mut self.education_num,
            Column::CapitalGain => &mut self.capital_gain,
            Column::CapitalLoss => &mut self.capital_loss,
            Column::HoursPerWeek => &mut self.hours_per_week,
            _ => return,
        };
        *slot = Some(v);
    }

    fn set_text(&mut self, column: Column, s: String) {
        let slot = match column {
            Column::Workclass => &mut self.workclass,
            Column::Education => &mut self.education,
            Column::MaritalStatus => &mut self.marital_status,
            Column::Occupation => &mut self.occupation,
            Column::Relationship => &mut self.relationship,
            Column::Race => &mut self.race,
            Column::Sex => &mut self.sex,
            Column::NativeCountry => &mut self.native_country,
            _ => return,
        };
        *slot = Some(s);
    }

    /// Columns with no collected value.
    pub fn missing_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.get(*c).is_none())
            .collect()
    }
}

impl From<FeatureRecord> for PartialRecord {
    fn from(r: FeatureRecord) -> Self {
        PartialRecord {
            age: Some(r.age),
            workclass: Some(r.workclass),
            fnlwgt: Some(r.fnlwgt),
            education: Some(r.education),
            education_num: Some(r.education_num),
            marital_status: Some(r.marital_status),
            occupation: Some(r.occupation),
            relationship: Some(r.relationship),
            race: Some(r.race),
            sex: Some(r.sex),
            capital_gain: Some(r.capital_gain),
            capital_loss: Some(r.capital_loss),
            hours_per_week: Some(r.hours_per_week),
            native_country: Some(r.native_country),
        }
    }
}

/// Caller-chosen constants for fields a front-end does not collect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<Column, CellValue>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, value: CellValue) -> Self {
        self.values.insert(column, value);
        self
    }

    pub fn get(&self, column: Column) -> Option<&CellValue> {
        self.values.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse `column=value` specs (as given to `--placeholder`).
    pub fn parse_specs<S: AsRef<str>>(specs: &[S]) -> Result<Placeholders, String> {
        let mut out = Placeholders::new();
        for spec in specs {
            let spec = spec.as_ref();
            let (name, raw) = spec
                .split_once('=')
                .ok_or_else(|| format!("Invalid placeholder '{spec}'. Expected column=value."))?;
            let column = Column::from_name(name)
                .ok_or_else(|| format!("Unknown column '{}' in placeholder.", name.trim()))?;
            let value = CellValue::parse(column, raw)?;
            out.values.insert(column, value);
        }
        Ok(out)
    }
}

/// How the encoder treats categories outside its fitted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnknownPolicy {
    /// Fail with an unknown-category error.
    #[default]
    Reject,
    /// Map to the `unknown` sentinel when the column's vocabulary has one.
    Sentinel,
}

/// Presentation category derived from the decoded label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeClass {
    High,
    Low,
}

impl IncomeClass {
    /// Any label containing `>50K` is high income; everything else is low income.
    pub fn from_label(label: &str) -> IncomeClass {
        if label.contains(HIGH_INCOME_MARKER) {
            IncomeClass::High
        } else {
            IncomeClass::Low
        }
    }
}

/// Output of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub is_high_income: bool,
    /// Maximum class probability, in `[0, 1]`, when the classifier is probabilistic.
    pub confidence: Option<f64>,
    pub class_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
}

impl PredictionResult {
    pub fn income_class(&self) -> IncomeClass {
        if self.is_high_income {
            IncomeClass::High
        } else {
            IncomeClass::Low
        }
    }

    /// Confidence as a percentage (e.g. `87.12`).
    pub fn confidence_percent(&self) -> Option<f64> {
        self.confidence.map(|c| c * 100.0)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub artifacts_dir: PathBuf,
    pub unknown_policy: UnknownPolicy,
    pub placeholders: Placeholders,
}
