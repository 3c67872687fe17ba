//! Export options, loadable from YAML

use crate::error::{SheetMapError, SheetMapResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum data rows per worksheet unless configured otherwise
pub const DEFAULT_MAX_ROWS_PER_SHEET: usize = 5000;

/// Excel's row limit minus the header row
pub const MAX_DATA_ROWS: usize = 1_048_575;

/// Excel's column limit
pub const MAX_COLUMNS: usize = 16_384;

/// Characters Excel rejects in worksheet names
const SHEET_NAME_FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Workbook layout settings for the exporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportOptions {
    /// Records per worksheet; longer lists spill into further sheets
    pub max_rows_per_sheet: usize,
    /// Header row height in points
    pub header_row_height: f64,
    /// Width of every mapped column, in characters
    pub column_width: f64,
    /// Header font size in points
    pub header_font_size: f64,
    /// Sheets are named `{prefix}1`, `{prefix}2`, ... when set
    pub sheet_name_prefix: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_rows_per_sheet: DEFAULT_MAX_ROWS_PER_SHEET,
            header_row_height: 30.0,
            column_width: 20.0,
            header_font_size: 10.0,
            sheet_name_prefix: None,
        }
    }
}

impl ExportOptions {
    pub fn from_yaml_str(yaml: &str) -> SheetMapResult<Self> {
        let options: Self = serde_yaml::from_str(yaml)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_yaml_file(path: &Path) -> SheetMapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> SheetMapResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn with_max_rows_per_sheet(mut self, rows: usize) -> Self {
        self.max_rows_per_sheet = rows;
        self
    }

    pub fn with_sheet_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sheet_name_prefix = Some(prefix.into());
        self
    }

    /// Check limits the workbook format imposes
    pub fn validate(&self) -> SheetMapResult<()> {
        if self.max_rows_per_sheet == 0 || self.max_rows_per_sheet > MAX_DATA_ROWS {
            return Err(SheetMapError::Validation(format!(
                "max_rows_per_sheet must be between 1 and {} (got {})",
                MAX_DATA_ROWS, self.max_rows_per_sheet
            )));
        }

        for (name, value) in [
            ("header_row_height", self.header_row_height),
            ("column_width", self.column_width),
            ("header_font_size", self.header_font_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SheetMapError::Validation(format!(
                    "{} must be a positive number (got {})",
                    name, value
                )));
            }
        }

        if let Some(prefix) = &self.sheet_name_prefix {
            if prefix.trim().is_empty() {
                return Err(SheetMapError::Validation(
                    "sheet_name_prefix must not be blank".to_string(),
                ));
            }
            if let Some(bad) = prefix.chars().find(|c| SHEET_NAME_FORBIDDEN.contains(c)) {
                return Err(SheetMapError::Validation(format!(
                    "sheet_name_prefix must not contain '{}'",
                    bad
                )));
            }
            // Room for the sheet number within Excel's 31 character limit
            if prefix.chars().count() > 24 {
                return Err(SheetMapError::Validation(
                    "sheet_name_prefix must be at most 24 characters".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Name for the 1-based sheet `index`, if a prefix is configured
    pub fn sheet_name(&self, index: usize) -> Option<String> {
        self.sheet_name_prefix
            .as_ref()
            .map(|prefix| format!("{}{}", prefix, index))
    }
}
