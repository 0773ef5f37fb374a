//! Interactive record form.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the form provides the "run `income prompt` and answer questions" UX
//!
//! Categorical fields list their choices; integer fields are range-checked.

use std::io::{BufRead, Write};

use crate::domain::{Column, PartialRecord};
use crate::error::AppError;

/// Ask for each of `fields` in turn.
///
/// Behavior:
/// - categorical fields accept a number (from the list) or the value itself
/// - integer fields must fall inside the column's bounds
/// - `q` cancels
pub fn prompt_record<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    fields: &[Column],
    vocabulary: &[(Column, Vec<String>)],
) -> Result<PartialRecord, AppError> {
    let mut record = PartialRecord::default();

    for &column in fields {
        let choices = vocabulary
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[]);

        let value = if column.is_categorical() {
            ask_category(input, output, column, choices)?
        } else {
            ask_integer(input, output, column)?.to_string()
        };

        record
            .set_raw(column, &value)
            .map_err(|e| AppError::new(2, e))?;
    }

    Ok(record)
}

fn ask_category<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    column: Column,
    choices: &[String],
) -> Result<String, AppError> {
    if !choices.is_empty() {
        write_out(output, &format!("{}:\n", column.display_name()))?;
        for (idx, choice) in choices.iter().enumerate() {
            write_out(output, &format!("{:>3}) {choice}\n", idx + 1))?;
        }
    }

    loop {
        let prompt = if choices.is_empty() {
            format!("{} (q to quit): ", column.display_name())
        } else {
            format!("Select {} (1-{}) or type a value (q to quit): ", column.display_name(), choices.len())
        };
        let answer = read_answer(input, output, &prompt)?;

        if answer.is_empty() {
            write_out(output, "A value is required.\n")?;
            continue;
        }
        if choices.is_empty() {
            return Ok(answer);
        }

        if let Ok(choice) = answer.parse::<usize>() {
            if (1..=choices.len()).contains(&choice) {
                return Ok(choices[choice - 1].clone());
            }
            write_out(
                output,
                &format!("Invalid choice: {choice}. Enter a number between 1 and {}.\n", choices.len()),
            )?;
            continue;
        }

        match choices.iter().find(|c| c.eq_ignore_ascii_case(&answer)) {
            Some(found) => return Ok(found.clone()),
            None => write_out(output, &format!("'{answer}' is not one of the listed values.\n"))?,
        }
    }
}

fn ask_integer<R: BufRead, W: Write>(input: &mut R, output: &mut W, column: Column) -> Result<i64, AppError> {
    let (min, max) = column.bounds().unwrap_or((i64::MIN, i64::MAX));
    let prompt = if max == i64::MAX {
        format!("{} (>= {min}, q to quit): ", column.display_name())
    } else {
        format!("{} ({min}-{max}, q to quit): ", column.display_name())
    };

    loop {
        let answer = read_answer(input, output, &prompt)?;
        match answer.parse::<i64>() {
            Ok(v) if (min..=max).contains(&v) => return Ok(v),
            Ok(v) => write_out(output, &format!("{v} is out of range.\n"))?,
            Err(_) => write_out(output, &format!("Expected a whole number, got '{answer}'.\n"))?,
        }
    }
}

/// Print `prompt`, read one line, and handle EOF / `q`.
fn read_answer<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String, AppError> {
    write_out(output, prompt)?;
    output
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    let bytes = input
        .read_line(&mut line)
        .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

    if bytes == 0 {
        return Err(AppError::new(
            2,
            "No input received. Provide the record with `income predict` instead.",
        ));
    }

    let answer = line.trim();
    if answer.eq_ignore_ascii_case("q") {
        return Err(AppError::new(2, "Canceled."));
    }
    Ok(answer.to_string())
}

fn write_out<W: Write>(output: &mut W, text: &str) -> Result<(), AppError> {
    output
        .write_all(text.as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn vocab() -> Vec<(Column, Vec<String>)> {
        vec![(Column::Sex, vec!["Female".to_string(), "Male".to_string()])]
    }

    #[test]
    fn accepts_numbers_and_values() {
        let mut input = Cursor::new("2\n");
        let mut output = Vec::new();
        let record = prompt_record(&mut input, &mut output, &[Column::Sex], &vocab()).unwrap();
        assert_eq!(record.sex.as_deref(), Some("Male"));

        let mut input = Cursor::new("female\n");
        let record = prompt_record(&mut input, &mut Vec::new(), &[Column::Sex], &vocab()).unwrap();
        assert_eq!(record.sex.as_deref(), Some("Female"));

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("  1) Female"));
    }

    #[test]
    fn reprompts_until_valid() {
        let mut input = Cursor::new("7\nTrans\n1\nabc\n12\n39\n");
        let mut output = Vec::new();
        let record = prompt_record(&mut input, &mut output, &[Column::Sex, Column::Age], &vocab()).unwrap();
        assert_eq!(record.sex.as_deref(), Some("Female"));
        assert_eq!(record.age, Some(39));

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Invalid choice: 7"));
        assert!(text.contains("'Trans' is not one of the listed values."));
        assert!(text.contains("Expected a whole number, got 'abc'."));
        assert!(text.contains("12 is out of range."));
    }

    #[test]
    fn free_text_without_choices() {
        let mut input = Cursor::new("Holand-Netherlands\n");
        let record = prompt_record(&mut input, &mut Vec::new(), &[Column::NativeCountry], &[]).unwrap();
        assert_eq!(record.native_country.as_deref(), Some("Holand-Netherlands"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let err = prompt_record(&mut Cursor::new("q\n"), &mut Vec::new(), &[Column::Age], &[]).unwrap_err();
        assert_eq!(err.message(), "Canceled.");
        assert!(prompt_record(&mut Cursor::new(""), &mut Vec::new(), &[Column::Age], &[]).is_err());
    }
}
