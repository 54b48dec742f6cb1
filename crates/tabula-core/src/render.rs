// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CellValue, ColumnType};
use time::macros::format_description;

const PROGRESS_BAR_CELLS: usize = 10;
const RATING_MAX: usize = 5;

/// Turns a cell value into display text. One built-in per [`ColumnType`];
/// hosts can supply their own through `ColumnDefinition::render`.
pub trait CellRenderer: Send + Sync {
    fn render(&self, value: &CellValue) -> String;
}

macro_rules! builtin_renderer {
    ($name:ident, |$value:ident| $body:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl CellRenderer for $name {
            fn render(&self, $value: &CellValue) -> String {
                if $value.is_null() {
                    return String::new();
                }
                $body
            }
        }
    };
}

builtin_renderer!(TextRenderer, |value| value.plain_text());

builtin_renderer!(NumberRenderer, |value| match value.as_f64() {
    Some(number) => format_number(number),
    None => value.plain_text(),
});

builtin_renderer!(CurrencyRenderer, |value| match value {
    CellValue::Cents(cents) => format_cents(*cents),
    CellValue::Number(amount) => format_cents((amount * 100.0).round() as i64),
    other => other.plain_text(),
});

builtin_renderer!(PercentageRenderer, |value| match value.as_f64() {
    Some(percent) => format!("{percent:.1}%"),
    None => value.plain_text(),
});

builtin_renderer!(DateRenderer, |value| match value {
    CellValue::Date(date) => date
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string()),
    CellValue::DateTime(instant) => instant
        .date()
        .format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| instant.to_string()),
    other => other.plain_text(),
});

builtin_renderer!(DateTimeRenderer, |value| match value {
    CellValue::DateTime(instant) => instant
        .format(&format_description!(
            "[year]-[month]-[day] [hour]:[minute]"
        ))
        .unwrap_or_else(|_| instant.to_string()),
    other => DateRenderer.render(other),
});

builtin_renderer!(TimeRenderer, |value| match value {
    CellValue::Time(time) => time
        .format(&format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| time.to_string()),
    CellValue::DateTime(instant) => instant
        .time()
        .format(&format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| instant.to_string()),
    other => other.plain_text(),
});

builtin_renderer!(BooleanRenderer, |value| match value {
    CellValue::Bool(true) => "yes".to_owned(),
    CellValue::Bool(false) => "no".to_owned(),
    other => other.plain_text(),
});

builtin_renderer!(BadgeRenderer, |value| {
    let label = value.plain_text();
    if label.is_empty() {
        label
    } else {
        format!("[{label}]")
    }
});

builtin_renderer!(EmailRenderer, |value| value.plain_text().trim().to_lowercase());

builtin_renderer!(UrlRenderer, |value| {
    let raw = value.plain_text();
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_owned()
});

builtin_renderer!(PhoneRenderer, |value| value.plain_text());

builtin_renderer!(ImageRenderer, |value| {
    if value.plain_text().trim().is_empty() {
        String::new()
    } else {
        "[image]".to_owned()
    }
});

builtin_renderer!(ProgressRenderer, |value| match value.as_f64() {
    Some(percent) => {
        let percent = percent.clamp(0.0, 100.0);
        let filled = ((percent / 100.0) * PROGRESS_BAR_CELLS as f64).round() as usize;
        format!(
            "{}{} {percent:.0}%",
            "█".repeat(filled),
            "░".repeat(PROGRESS_BAR_CELLS - filled)
        )
    }
    None => value.plain_text(),
});

builtin_renderer!(RatingRenderer, |value| match value.as_f64() {
    Some(rating) => {
        let stars = rating.round().clamp(0.0, RATING_MAX as f64) as usize;
        format!("{}{}", "★".repeat(stars), "☆".repeat(RATING_MAX - stars))
    }
    None => value.plain_text(),
});

builtin_renderer!(SelectRenderer, |value| value.plain_text());

pub fn builtin_renderer(column_type: ColumnType) -> &'static dyn CellRenderer {
    match column_type {
        ColumnType::Text => &TextRenderer,
        ColumnType::Number => &NumberRenderer,
        ColumnType::Currency => &CurrencyRenderer,
        ColumnType::Percentage => &PercentageRenderer,
        ColumnType::Date => &DateRenderer,
        ColumnType::DateTime => &DateTimeRenderer,
        ColumnType::Time => &TimeRenderer,
        ColumnType::Boolean => &BooleanRenderer,
        ColumnType::Badge => &BadgeRenderer,
        ColumnType::Email => &EmailRenderer,
        ColumnType::Url => &UrlRenderer,
        ColumnType::Phone => &PhoneRenderer,
        ColumnType::Image => &ImageRenderer,
        ColumnType::Progress => &ProgressRenderer,
        ColumnType::Rating => &RatingRenderer,
        ColumnType::Select => &SelectRenderer,
    }
}

pub fn format_cents(cents: i64) -> String {
    let (sign, cents) = normalize_sign(cents);
    let dollars = cents / 100;
    let remainder = cents % 100;
    format!("{sign}${}.{:02}", comma_format(dollars), remainder)
}

pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let whole = value as i64;
        let (sign, magnitude) = normalize_sign(whole);
        return format!("{sign}{}", comma_format(magnitude));
    }
    format!("{value:.2}")
}

fn comma_format(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let mut chars = digits.chars().collect::<Vec<_>>();
    let mut count = 0usize;
    while let Some(ch) = chars.pop() {
        if count == 3 {
            out.push(',');
            count = 0;
        }
        out.push(ch);
        count += 1;
    }
    out.chars().rev().collect()
}

fn normalize_sign(value: i64) -> (&'static str, i64) {
    if value >= 0 {
        return ("", value);
    }
    if value == i64::MIN {
        ("-", i64::MAX)
    } else {
        ("-", -value)
    }
}
