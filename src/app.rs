//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - loads the artifacts into an inference pipeline
//! - collects records (flags, JSON, CSV or the interactive form)
//! - prints results and writes optional exports

use std::io;
use std::path::Path;

use clap::Parser;

use crate::cli::{BatchArgs, CategoriesArgs, Command, PredictArgs, PredictOptions, PromptArgs};
use crate::domain::{Column, PartialRecord, Placeholders, RunConfig};
use crate::error::AppError;
use crate::io::vocabulary::{self, Vocabulary};
use crate::report::PresentationConfig;

pub mod pipeline;

/// Entry point for the `income` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    let artifacts = cli.artifacts.as_path();
    match cli.command {
        Command::Predict(args) => handle_predict(artifacts, args),
        Command::Batch(args) => handle_batch(artifacts, args),
        Command::Prompt(args) => handle_prompt(artifacts, args),
        Command::Categories(args) => handle_categories(artifacts, args),
        Command::Inspect => handle_inspect(artifacts),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::default()
        .parse_env(env_logger::Env::default().filter_or("RUST_LOG", default))
        .format_timestamp(None)
        .init();
}

fn handle_predict(artifacts: &Path, args: PredictArgs) -> Result<(), AppError> {
    let config = run_config_from_options(artifacts, &args.options)?;
    let presentation = presentation_from_options(&args.options)?;

    let base = match &args.record {
        Some(path) => crate::io::record::read_record_json(path)?,
        None => PartialRecord::default(),
    };
    let partial = args.fields.apply(base);

    let pipeline = pipeline::load_pipeline(&config)?;
    let (record, result) = pipeline.predict_partial(&partial, &config.placeholders)?;

    if args.json {
        let report = crate::report::PredictionReport::new(&record, &result, &presentation);
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::new(2, format!("Failed to serialize prediction: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", crate::report::format_prediction(&record, &result, &presentation));
    }

    Ok(())
}

fn handle_batch(artifacts: &Path, args: BatchArgs) -> Result<(), AppError> {
    let config = run_config_from_options(artifacts, &args.options)?;
    let presentation = presentation_from_options(&args.options)?;

    let pipeline = pipeline::load_pipeline(&config)?;
    let ingest = crate::io::ingest::load_records(&args.file)?;
    let output = pipeline::run_batch(&pipeline, ingest, &config.placeholders)?;

    print!("{}", crate::report::format_batch(&output, &presentation));

    if let Some(path) = &args.export {
        crate::io::export::write_predictions_csv(path, &output, &presentation)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_predictions_json(path, &output, &presentation)?;
    }

    Ok(())
}

fn handle_prompt(artifacts: &Path, args: PromptArgs) -> Result<(), AppError> {
    let config = run_config_from_options(artifacts, &args.options)?;
    let presentation = presentation_from_options(&args.options)?;

    let pipeline = pipeline::load_pipeline(&config)?;
    let choices = match &args.dataset {
        Some(path) => vocabulary::load_dataset_vocabulary(path)?,
        None => vocabulary::encoder_vocabulary(pipeline.encoder()),
    };
    let fields = prompt_fields(&args.fields, &config.placeholders)?;

    let partial = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        crate::cli::prompt::prompt_record(&mut input, &mut output, &fields, &choices)?
    };

    let (record, result) = pipeline.predict_partial(&partial, &config.placeholders)?;

    println!();
    print!("{}", crate::report::format_prediction(&record, &result, &presentation));
    Ok(())
}

fn handle_categories(artifacts: &Path, args: CategoriesArgs) -> Result<(), AppError> {
    let mut vocab: Vocabulary = match &args.dataset {
        Some(path) => vocabulary::load_dataset_vocabulary(path)?,
        None => {
            let path = artifacts.join(crate::io::artifacts::ENCODER_FILE);
            let encoder = crate::io::artifacts::load_encoder(&path)?;
            vocabulary::encoder_vocabulary(&encoder)
        }
    };

    if let Some(column) = args.column {
        if !column.is_categorical() {
            return Err(AppError::new(2, format!("`{column}` is numeric and has no categories.")));
        }
        vocab.retain(|(c, _)| *c == column);
    }

    print!("{}", crate::report::format_categories(&vocab));
    Ok(())
}

fn handle_inspect(artifacts: &Path) -> Result<(), AppError> {
    let config = RunConfig {
        artifacts_dir: artifacts.to_path_buf(),
        unknown_policy: Default::default(),
        placeholders: Placeholders::new(),
    };
    let pipeline = pipeline::load_pipeline(&config)?;
    print!("{}", crate::report::format_artifact_summary(&pipeline));
    Ok(())
}

pub fn run_config_from_options(artifacts: &Path, options: &PredictOptions) -> Result<RunConfig, AppError> {
    let placeholders = Placeholders::parse_specs(&options.placeholders).map_err(|e| AppError::new(2, e))?;
    Ok(RunConfig {
        artifacts_dir: artifacts.to_path_buf(),
        unknown_policy: options.unknown_policy,
        placeholders,
    })
}

/// Start from `--presentation` (or the preset) and overlay the individual flags.
pub fn presentation_from_options(options: &PredictOptions) -> Result<PresentationConfig, AppError> {
    let mut config = match &options.presentation {
        Some(path) => crate::io::record::read_presentation_json(path)?,
        None => options.preset.config(),
    };

    if options.show_confidence {
        config.show_confidence = true;
    }
    if !options.echo.is_empty() {
        config.echo_fields = options.echo.clone();
    }
    if let Some(label) = &options.high_label {
        config.high_label = Some(label.clone());
    }
    if let Some(label) = &options.low_label {
        config.low_label = Some(label.clone());
    }

    Ok(config)
}

/// Columns the form asks for; the rest must have placeholders.
fn prompt_fields(requested: &[Column], placeholders: &Placeholders) -> Result<Vec<Column>, AppError> {
    if requested.is_empty() {
        return Ok(Column::ALL.to_vec());
    }

    let uncovered: Vec<&str> = Column::ALL
        .iter()
        .filter(|c| !requested.contains(c) && placeholders.get(**c).is_none())
        .map(|c| c.name())
        .collect();
    if !uncovered.is_empty() {
        return Err(AppError::new(
            4,
            format!("Fields not asked for need a --placeholder: {}", uncovered.join(", ")),
        ));
    }

    Ok(Column::ALL
        .into_iter()
        .filter(|c| requested.contains(c))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::CellValue;

    fn predict_options(extra: &[&str]) -> PredictOptions {
        let mut argv = vec!["income", "batch", "-f", "in.csv"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Batch(args) => args.options,
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn flags_overlay_the_preset() {
        let options = predict_options(&["--preset", "kaya", "--low-label", "Biasa", "--echo", "age"]);
        let config = presentation_from_options(&options).unwrap();
        assert_eq!(config.title, "Prediksi Kaya atau Gak Kaya");
        assert_eq!(config.low_label.as_deref(), Some("Biasa"));
        assert_eq!(config.high_label.as_deref(), Some("Kaya"));
        assert_eq!(config.echo_fields, vec![Column::Age]);
    }

    #[test]
    fn presentation_file_replaces_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui.json");
        std::fs::write(&path, r#"{"title": "Demo", "show_confidence": true}"#).unwrap();

        let options = predict_options(&["--presentation", path.to_str().unwrap()]);
        let config = presentation_from_options(&options).unwrap();
        assert_eq!(config.title, "Demo");
        assert!(config.show_confidence);
        assert_eq!(config.result_prefix, "Prediksi Pendapatan");
    }

    #[test]
    fn bad_placeholder_is_usage_error() {
        let options = predict_options(&["--placeholder", "fnlwgt"]);
        let err = run_config_from_options(Path::new("artifacts"), &options).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn prompt_fields_need_placeholders_for_the_rest() {
        assert_eq!(prompt_fields(&[], &Placeholders::new()).unwrap().len(), 14);
        assert_eq!(
            prompt_fields(&[Column::Age], &Placeholders::new()).unwrap_err().exit_code(),
            4
        );

        let mut placeholders = Placeholders::new();
        for column in Column::ALL.into_iter().filter(|c| *c != Column::Age && *c != Column::Sex) {
            let value = if column.is_categorical() {
                CellValue::Text("unknown".to_string())
            } else {
                CellValue::Int(0)
            };
            placeholders = placeholders.with(column, value);
        }
        let fields = prompt_fields(&[Column::Sex, Column::Age], &placeholders).unwrap();
        assert_eq!(fields, vec![Column::Age, Column::Sex]);
    }
}
