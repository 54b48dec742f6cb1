// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::{Date, OffsetDateTime, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Number,
    Currency,
    Percentage,
    Date,
    DateTime,
    Time,
    Boolean,
    Badge,
    Email,
    Url,
    Phone,
    Image,
    Progress,
    Rating,
    Select,
}

impl ColumnType {
    pub const ALL: [Self; 16] = [
        Self::Text,
        Self::Number,
        Self::Currency,
        Self::Percentage,
        Self::Date,
        Self::DateTime,
        Self::Time,
        Self::Boolean,
        Self::Badge,
        Self::Email,
        Self::Url,
        Self::Phone,
        Self::Image,
        Self::Progress,
        Self::Rating,
        Self::Select,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Percentage => "percentage",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Boolean => "boolean",
            Self::Badge => "badge",
            Self::Email => "email",
            Self::Url => "url",
            Self::Phone => "phone",
            Self::Image => "image",
            Self::Progress => "progress",
            Self::Rating => "rating",
            Self::Select => "select",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column_type| column_type.as_str() == value)
    }

    /// Ordering semantics used when this column participates in a sort.
    pub const fn comparison(self) -> Comparison {
        match self {
            Self::Number
            | Self::Currency
            | Self::Percentage
            | Self::Progress
            | Self::Rating => Comparison::Numeric,
            Self::Date | Self::DateTime | Self::Time => Comparison::Chronological,
            Self::Boolean => Comparison::Boolean,
            Self::Text
            | Self::Badge
            | Self::Email
            | Self::Url
            | Self::Phone
            | Self::Image
            | Self::Select => Comparison::Text,
        }
    }

    pub const fn default_editor(self) -> EditorKind {
        match self {
            Self::Number
            | Self::Currency
            | Self::Percentage
            | Self::Progress
            | Self::Rating => EditorKind::NumberInput,
            Self::Date => EditorKind::DatePicker,
            Self::DateTime => EditorKind::DateTimePicker,
            Self::Time => EditorKind::TimePicker,
            Self::Boolean => EditorKind::Checkbox,
            Self::Badge | Self::Select => EditorKind::Select,
            Self::Text | Self::Email | Self::Url | Self::Phone | Self::Image => {
                EditorKind::TextInput
            }
        }
    }

    pub const fn default_align(self) -> Align {
        match self {
            Self::Number | Self::Currency | Self::Percentage | Self::Rating => Align::Right,
            Self::Boolean | Self::Badge | Self::Image | Self::Progress => Align::Center,
            _ => Align::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Numeric,
    Chronological,
    Text,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    TextInput,
    NumberInput,
    DatePicker,
    DateTimePicker,
    TimePicker,
    Checkbox,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Cents(i64),
    Bool(bool),
    Date(Date),
    DateTime(OffsetDateTime),
    Time(Time),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Cents(cents) => Some(*cents as f64 / 100.0),
            Self::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
            Self::Text(value) => value.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Unformatted text form, used for text comparison and as a render fallback.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(value) => value.clone(),
            Self::Number(value) => value.to_string(),
            Self::Cents(cents) => {
                let sign = if *cents < 0 { "-" } else { "" };
                let abs = cents.unsigned_abs();
                format!("{sign}{}.{:02}", abs / 100, abs % 100)
            }
            Self::Bool(value) => value.to_string(),
            Self::Date(value) => value.to_string(),
            Self::DateTime(value) => value.to_string(),
            Self::Time(value) => value.to_string(),
        }
    }

    fn instant(&self) -> Option<OffsetDateTime> {
        match self {
            Self::Date(value) => Some(value.midnight().assume_utc()),
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

/// Compares two non-null cells under `comparison`. Values that fit the
/// comparison sort before values that do not; the latter fall back to
/// case-insensitive text order among themselves.
pub fn compare_cells(comparison: Comparison, left: &CellValue, right: &CellValue) -> Ordering {
    let (left_rank, right_rank) = (fit_rank(comparison, left), fit_rank(comparison, right));
    if left_rank != right_rank {
        return left_rank.cmp(&right_rank);
    }

    let typed = match comparison {
        Comparison::Numeric => match (left, right) {
            (CellValue::Cents(left), CellValue::Cents(right)) => Some(left.cmp(right)),
            _ => match (left.as_f64(), right.as_f64()) {
                (Some(left), Some(right)) => Some(left.total_cmp(&right)),
                _ => None,
            },
        },
        Comparison::Chronological => match (left, right) {
            (CellValue::Time(left), CellValue::Time(right)) => Some(left.cmp(right)),
            _ => match (left.instant(), right.instant()) {
                (Some(left), Some(right)) => Some(left.cmp(&right)),
                _ => None,
            },
        },
        Comparison::Boolean => match (left, right) {
            (CellValue::Bool(left), CellValue::Bool(right)) => Some(left.cmp(right)),
            _ => None,
        },
        Comparison::Text => None,
    };

    typed.unwrap_or_else(|| {
        left.plain_text()
            .to_lowercase()
            .cmp(&right.plain_text().to_lowercase())
    })
}

/// Groups values by how they compare; lower ranks sort first.
fn fit_rank(comparison: Comparison, value: &CellValue) -> u8 {
    match comparison {
        Comparison::Numeric => u8::from(value.as_f64().is_none()),
        Comparison::Chronological => match value {
            CellValue::Date(_) | CellValue::DateTime(_) => 0,
            CellValue::Time(_) => 1,
            _ => 2,
        },
        Comparison::Boolean => u8::from(!matches!(value, CellValue::Bool(_))),
        Comparison::Text => 0,
    }
}
