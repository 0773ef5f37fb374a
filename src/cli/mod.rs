//! Command-line parsing for the census income predictor.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline; `app` turns these structs into a `RunConfig` and a presentation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Column, PartialRecord, UnknownPolicy};
use crate::report::Preset;

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "income", version, about = "Census income (>50K / <=50K) predictor")]
pub struct Cli {
    /// Directory holding model_income.json, encoder.json and label_encoder.json.
    #[arg(long, global = true, env = "INCOME_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict one record given as flags and/or a JSON file.
    Predict(PredictArgs),
    /// Predict every row of a census-style CSV.
    Batch(BatchArgs),
    /// Collect a record interactively and predict it.
    Prompt(PromptArgs),
    /// List the category values accepted per column.
    Categories(CategoriesArgs),
    /// Summarize the loaded artifacts.
    Inspect,
}

/// Options shared by every predicting command.
#[derive(Debug, Args, Clone)]
pub struct PredictOptions {
    /// Constant for a field that is not supplied, e.g. `fnlwgt=0`. Repeatable.
    #[arg(long = "placeholder", value_name = "COLUMN=VALUE")]
    pub placeholders: Vec<String>,

    /// How categories outside the fitted vocabulary are treated.
    #[arg(long, value_enum, default_value_t = UnknownPolicy::Reject)]
    pub unknown_policy: UnknownPolicy,

    /// Built-in presentation preset.
    #[arg(long, value_enum, default_value_t = Preset::Standard)]
    pub preset: Preset,

    /// Presentation config JSON (overrides --preset).
    #[arg(long)]
    pub presentation: Option<PathBuf>,

    /// Show the confidence percentage.
    #[arg(long)]
    pub show_confidence: bool,

    /// Echo these input fields above the result.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub echo: Vec<Column>,

    /// Label shown for high-income results.
    #[arg(long)]
    pub high_label: Option<String>,

    /// Label shown for low-income results.
    #[arg(long)]
    pub low_label: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Record JSON; flags below override its fields.
    #[arg(long)]
    pub record: Option<PathBuf>,

    #[command(flatten)]
    pub fields: FieldArgs,

    #[command(flatten)]
    pub options: PredictOptions,

    /// Print the prediction as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One flag per schema column.
#[derive(Debug, Args, Clone, Default)]
pub struct FieldArgs {
    #[arg(long)]
    pub age: Option<i64>,
    #[arg(long)]
    pub workclass: Option<String>,
    #[arg(long)]
    pub fnlwgt: Option<i64>,
    #[arg(long)]
    pub education: Option<String>,
    #[arg(long)]
    pub education_num: Option<i64>,
    #[arg(long)]
    pub marital_status: Option<String>,
    #[arg(long)]
    pub occupation: Option<String>,
    #[arg(long)]
    pub relationship: Option<String>,
    #[arg(long)]
    pub race: Option<String>,
    #[arg(long)]
    pub sex: Option<String>,
    #[arg(long)]
    pub capital_gain: Option<i64>,
    #[arg(long)]
    pub capital_loss: Option<i64>,
    #[arg(long)]
    pub hours_per_week: Option<i64>,
    #[arg(long)]
    pub native_country: Option<String>,
}

impl FieldArgs {
    /// Overlay the flags that were given onto `base`.
    pub fn apply(&self, base: PartialRecord) -> PartialRecord {
        PartialRecord {
            age: self.age.or(base.age),
            workclass: self.workclass.clone().or(base.workclass),
            fnlwgt: self.fnlwgt.or(base.fnlwgt),
            education: self.education.clone().or(base.education),
            education_num: self.education_num.or(base.education_num),
            marital_status: self.marital_status.clone().or(base.marital_status),
            occupation: self.occupation.clone().or(base.occupation),
            relationship: self.relationship.clone().or(base.relationship),
            race: self.race.clone().or(base.race),
            sex: self.sex.clone().or(base.sex),
            capital_gain: self.capital_gain.or(base.capital_gain),
            capital_loss: self.capital_loss.or(base.capital_loss),
            hours_per_week: self.hours_per_week.or(base.hours_per_week),
            native_country: self.native_country.clone().or(base.native_country),
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Input CSV with census headers.
    #[arg(short = 'f', long)]
    pub file: PathBuf,

    /// Write predictions to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write predictions (with records) to JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,

    #[command(flatten)]
    pub options: PredictOptions,
}

#[derive(Debug, Args, Clone)]
pub struct PromptArgs {
    /// Offer choices observed in this census CSV instead of the encoder's vocabulary.
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Columns to ask for (default: all). Others need a --placeholder.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub fields: Vec<Column>,

    #[command(flatten)]
    pub options: PredictOptions,
}

#[derive(Debug, Args, Clone)]
pub struct CategoriesArgs {
    /// List values observed in this census CSV instead of the encoder's vocabulary.
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Only list this column.
    #[arg(long, value_enum)]
    pub column: Option<Column>,
}
