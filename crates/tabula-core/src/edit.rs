// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use tracing::debug;

use crate::{CellValue, ColumnDefinition, ColumnType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    InvalidNumber,
    InvalidMoney,
    NegativeMoney,
    InvalidDate,
    InvalidDateTime,
    InvalidTime,
    InvalidBool,
    OutOfRange { min: i64, max: i64 },
    NotEditable,
    Rejected(String),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber => f.write_str("invalid number"),
            Self::InvalidMoney => f.write_str("invalid money value (e.g. 1,250.00)"),
            Self::NegativeMoney => f.write_str("money values cannot be negative"),
            Self::InvalidDate => f.write_str("invalid date (use YYYY-MM-DD)"),
            Self::InvalidDateTime => {
                f.write_str("invalid date-time (use RFC 3339, e.g. 2026-03-01T09:30:00Z)")
            }
            Self::InvalidTime => f.write_str("invalid time (use HH:MM)"),
            Self::InvalidBool => f.write_str("expected yes or no"),
            Self::OutOfRange { min, max } => write!(f, "value must be between {min} and {max}"),
            Self::NotEditable => f.write_str("column is not editable"),
            Self::Rejected(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for EditError {}

pub type EditResult<T> = std::result::Result<T, EditError>;

/// Parses raw editor text for a column type. Blank input clears the cell.
pub fn parse_cell_input(column_type: ColumnType, raw: &str) -> EditResult<CellValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(CellValue::Null);
    }
    match column_type {
        ColumnType::Text
        | ColumnType::Badge
        | ColumnType::Email
        | ColumnType::Url
        | ColumnType::Phone
        | ColumnType::Image
        | ColumnType::Select => Ok(CellValue::text(trimmed)),
        ColumnType::Number => parse_number(trimmed).map(CellValue::Number),
        ColumnType::Currency => parse_cents(trimmed).map(CellValue::Cents),
        ColumnType::Percentage => {
            let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            parse_number(number).map(CellValue::Number)
        }
        ColumnType::Progress => parse_bounded(trimmed, 0, 100).map(CellValue::Number),
        ColumnType::Rating => parse_bounded(trimmed, 0, 5).map(CellValue::Number),
        ColumnType::Date => Date::parse(trimmed, &format_description!("[year]-[month]-[day]"))
            .map(CellValue::Date)
            .map_err(|_| EditError::InvalidDate),
        ColumnType::DateTime => OffsetDateTime::parse(trimmed, &Rfc3339)
            .map(CellValue::DateTime)
            .map_err(|_| EditError::InvalidDateTime),
        ColumnType::Time => parse_time(trimmed).map(CellValue::Time),
        ColumnType::Boolean => parse_bool(trimmed).map(CellValue::Bool),
    }
}

/// Gate in front of the host's edit callback: parse, then run the column's
/// validator. A rejection carries the validator's message.
pub fn commit_edit(definition: &ColumnDefinition, raw: &str) -> EditResult<CellValue> {
    if !definition.editable {
        return Err(EditError::NotEditable);
    }
    let value = parse_cell_input(definition.column_type, raw)?;
    if let Some(validator) = &definition.validator {
        validator(&value).map_err(|message| {
            debug!(column = %definition.id, %message, "cell edit rejected");
            EditError::Rejected(message)
        })?;
    }
    Ok(value)
}

fn parse_number(input: &str) -> EditResult<f64> {
    let value = input
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| EditError::InvalidNumber)?;
    if !value.is_finite() {
        return Err(EditError::InvalidNumber);
    }
    Ok(value)
}

fn parse_bounded(input: &str, min: i64, max: i64) -> EditResult<f64> {
    let value = parse_number(input.strip_suffix('%').unwrap_or(input).trim_end())?;
    if value < min as f64 || value > max as f64 {
        return Err(EditError::OutOfRange { min, max });
    }
    Ok(value)
}

fn parse_cents(input: &str) -> EditResult<i64> {
    let clean = input.replace(',', "");
    if clean.starts_with('-') {
        return Err(EditError::NegativeMoney);
    }

    let clean = clean.strip_prefix('$').unwrap_or(&clean);
    if clean.is_empty() {
        return Err(EditError::InvalidMoney);
    }

    let (whole, frac) = match clean.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (clean, None),
    };
    let whole = parse_digits(whole, true)?;
    if whole > i64::MAX / 100 {
        return Err(EditError::InvalidMoney);
    }

    let frac = match frac {
        None => 0,
        Some(digits) if digits.len() > 2 => return Err(EditError::InvalidMoney),
        Some(digits) => {
            let value = parse_digits(digits, false)?;
            if digits.len() == 1 { value * 10 } else { value }
        }
    };

    whole
        .checked_mul(100)
        .and_then(|value| value.checked_add(frac))
        .ok_or(EditError::InvalidMoney)
}

fn parse_digits(input: &str, allow_empty: bool) -> EditResult<i64> {
    if input.is_empty() {
        return if allow_empty {
            Ok(0)
        } else {
            Err(EditError::InvalidMoney)
        };
    }
    if !input.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(EditError::InvalidMoney);
    }
    input.parse::<i64>().map_err(|_| EditError::InvalidMoney)
}

fn parse_time(input: &str) -> EditResult<Time> {
    Time::parse(input, &format_description!("[hour]:[minute]:[second]"))
        .or_else(|_| Time::parse(input, &format_description!("[hour]:[minute]")))
        .map_err(|_| EditError::InvalidTime)
}

fn parse_bool(input: &str) -> EditResult<bool> {
    match input.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "on" => Ok(true),
        "no" | "n" | "false" | "0" | "off" => Ok(false),
        _ => Err(EditError::InvalidBool),
    }
}

#[cfg(test)]
mod tests {
    use super::{EditError, commit_edit, parse_cell_input};
    use crate::{CellValue, ColumnDefinition, ColumnType};
    use time::macros::{date, datetime, time};

    #[test]
    fn money_accepts_symbols_and_commas() {
        assert_eq!(
            parse_cell_input(ColumnType::Currency, "$1,234.5"),
            Ok(CellValue::Cents(123_450))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Currency, ".75"),
            Ok(CellValue::Cents(75))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Currency, "-5"),
            Err(EditError::NegativeMoney)
        );
        assert_eq!(
            parse_cell_input(ColumnType::Currency, "1.234"),
            Err(EditError::InvalidMoney)
        );
        assert_eq!(
            parse_cell_input(ColumnType::Currency, "1.2.3"),
            Err(EditError::InvalidMoney)
        );
    }

    #[test]
    fn money_overflow_is_rejected() {
        assert_eq!(
            parse_cell_input(ColumnType::Currency, "99999999999999999999"),
            Err(EditError::InvalidMoney)
        );
    }

    #[test]
    fn temporal_inputs_parse() {
        assert_eq!(
            parse_cell_input(ColumnType::Date, "2026-03-14"),
            Ok(CellValue::Date(date!(2026 - 03 - 14)))
        );
        assert_eq!(
            parse_cell_input(ColumnType::DateTime, "2026-03-14T09:30:00Z"),
            Ok(CellValue::DateTime(datetime!(2026-03-14 09:30 UTC)))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Time, "17:45"),
            Ok(CellValue::Time(time!(17:45)))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Date, "14/03/2026"),
            Err(EditError::InvalidDate)
        );
    }

    #[test]
    fn bounded_types_enforce_range() {
        assert_eq!(
            parse_cell_input(ColumnType::Progress, "40%"),
            Ok(CellValue::Number(40.0))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Rating, "6"),
            Err(EditError::OutOfRange { min: 0, max: 5 })
        );
        assert_eq!(
            parse_cell_input(ColumnType::Percentage, "12.5 %"),
            Ok(CellValue::Number(12.5))
        );
    }

    #[test]
    fn blank_input_clears_and_text_is_trimmed() {
        assert_eq!(parse_cell_input(ColumnType::Number, "   "), Ok(CellValue::Null));
        assert_eq!(
            parse_cell_input(ColumnType::Email, " ops@example.com "),
            Ok(CellValue::text("ops@example.com"))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Boolean, "Yes"),
            Ok(CellValue::Bool(true))
        );
        assert_eq!(
            parse_cell_input(ColumnType::Boolean, "maybe"),
            Err(EditError::InvalidBool)
        );
    }

    #[test]
    fn commit_runs_validator_after_parse() {
        let amount = ColumnDefinition::new("amount", "Amount", ColumnType::Currency)
            .with_editable(true)
            .with_validator(|value| match value {
                CellValue::Cents(cents) if *cents > 100_000_000 => {
                    Err("deals above $1,000,000 need approval".to_owned())
                }
                _ => Ok(()),
            });
        assert_eq!(commit_edit(&amount, "500"), Ok(CellValue::Cents(50_000)));
        let rejected = commit_edit(&amount, "2,000,000").expect_err("validator rejects");
        assert_eq!(
            rejected.to_string(),
            "deals above $1,000,000 need approval"
        );
        assert_eq!(commit_edit(&amount, "abc"), Err(EditError::InvalidMoney));
    }

    #[test]
    fn read_only_column_refuses_edit() {
        let name = ColumnDefinition::new("name", "Name", ColumnType::Text);
        assert_eq!(commit_edit(&name, "Acme"), Err(EditError::NotEditable));
    }
}
