//! Sheetmap - annotated Rust records ↔ Excel workbooks
//!
//! Declare how each field maps to a column (header text, ordering, date
//! pattern, time zone), then write a list of records into a workbook or read
//! a workbook's rows back into typed records.
//!
//! # Features
//!
//! - `sheet_record!` declares a struct together with its column annotations
//! - Column ordering by sort key, duplicate header detection
//! - Integers, floats, booleans, decimals, text, dates and timestamps
//! - Long lists spill over into further worksheets (5000 rows each by default)
//! - Import from .xlsx, .xlsb, .xls and .ods, matching columns by header
//!
//! # Example
//!
//! ```no_run
//! use royalbit_sheetmap::{sheet_record, SheetExporter, SheetImporter};
//! use chrono::NaiveDateTime;
//! use std::path::Path;
//!
//! sheet_record! {
//!     #[derive(Debug, Default, Clone)]
//!     pub struct Employee {
//!         #[column(name = "Name", sort = 1)]
//!         pub name: String,
//!         #[column(name = "Hired", sort = 2, format = "yyyy-MM-dd HH:mm")]
//!         pub hired: Option<NaiveDateTime>,
//!     }
//! }
//!
//! let staff = vec![Employee { name: "Ada".to_string(), hired: None }];
//! SheetExporter::new().export(&staff, Path::new("staff.xlsx"))?;
//!
//! let back: Vec<Employee> = SheetImporter::open("staff.xlsx")?.import()?;
//! println!("Imported {} employees", back.len());
//! # Ok::<(), royalbit_sheetmap::error::SheetMapError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod format;
pub mod record;
pub mod schema;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use config::ExportOptions;
pub use error::{SheetMapError, SheetMapResult};
pub use excel::{SheetExporter, SheetImporter, SheetSummary};
pub use record::{ColumnSpec, SheetRecord};
pub use schema::{Column, Schema};
pub use types::{CellValue, FieldKind};
pub use value::SheetValue;
