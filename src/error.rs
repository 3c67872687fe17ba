use crate::types::FieldKind;
use thiserror::Error;

pub type SheetMapResult<T> = Result<T, SheetMapError>;

#[derive(Error, Debug)]
pub enum SheetMapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Excel read error: {0}")]
    Calamine(#[from] calamine::Error),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid date format '{pattern}': {reason}")]
    DateFormat { pattern: String, reason: String },

    #[error("Invalid timezone '{0}' (expected an IANA zone such as Asia/Shanghai, UTC or an offset like +08:00)")]
    Timezone(String),

    #[error("Record type {record} has no field '{field}'")]
    UnknownField { record: &'static str, field: String },

    #[error("Cannot convert {found} to {expected}")]
    Conversion { expected: FieldKind, found: String },

    #[error("Sheet '{sheet}': header cell {column}1 must be text")]
    HeaderNotText { sheet: String, column: String },

    #[error("Sheet '{sheet}', row {row}, column '{column}': {source}")]
    Cell {
        sheet: String,
        row: usize,
        column: String,
        #[source]
        source: Box<SheetMapError>,
    },

    #[error("No records to export")]
    NoRecords,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl SheetMapError {
    /// Shorthand for a failed coercion into `expected`.
    pub fn conversion(expected: FieldKind, found: impl Into<String>) -> Self {
        SheetMapError::Conversion {
            expected,
            found: found.into(),
        }
    }
}
