use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Field Kinds
//==============================================================================

/// Supported Rust field types, as seen by the workbook mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Signed or unsigned integers, written as numbers
    Integer,
    /// `f64`, written as numbers
    Float,
    /// Written as Excel booleans
    Boolean,
    /// `rust_decimal::Decimal`, written as numbers
    Decimal,
    /// Plain strings
    Text,
    /// Wall-clock date-time without an offset, written as formatted text
    DateTime,
    /// Calendar date, written as formatted text
    Date,
    /// UTC instant, formatted in the column's time zone
    Timestamp,
}

impl FieldKind {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "Integer",
            FieldKind::Float => "Float",
            FieldKind::Boolean => "Boolean",
            FieldKind::Decimal => "Decimal",
            FieldKind::Text => "Text",
            FieldKind::DateTime => "DateTime",
            FieldKind::Date => "Date",
            FieldKind::Timestamp => "Timestamp",
        }
    }

    /// Kinds whose cells go through the column's date pattern
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldKind::DateTime | FieldKind::Date | FieldKind::Timestamp
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

//==============================================================================
// Cell Values
//==============================================================================

/// A single cell, independent of the spreadsheet engine that produced it.
///
/// The exporter writes these, and the importer converts engine cells into
/// them before field coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank or missing cell
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Native spreadsheet date-time cell
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Short description used in conversion errors
    pub fn describe(&self) -> String {
        match self {
            CellValue::Empty => "empty cell".to_string(),
            CellValue::Bool(b) => format!("boolean {}", b),
            CellValue::Int(i) => format!("number {}", i),
            CellValue::Float(f) => format!("number {}", f),
            CellValue::Text(s) => format!("text '{}'", s),
            CellValue::DateTime(dt) => format!("date {}", dt),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}
