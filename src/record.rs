//! Column annotations and the record trait
//!
//! A record type lists its fields as [`ColumnSpec`]s and exposes field access
//! by name. Most types get both from the [`sheet_record!`](crate::sheet_record)
//! macro:
//!
//! ```
//! use royalbit_sheetmap::sheet_record;
//! use chrono::NaiveDateTime;
//!
//! sheet_record! {
//!     #[derive(Debug, Default, Clone, PartialEq)]
//!     pub struct Order {
//!         #[column(name = "Order No", sort = 1)]
//!         pub id: i64,
//!         #[column(name = "Placed", sort = 2, format = "yyyy-MM-dd HH:mm")]
//!         pub placed: Option<NaiveDateTime>,
//!         pub note: String,
//!     }
//! }
//! ```

use crate::error::SheetMapResult;
use crate::format::{DEFAULT_DATE_FORMAT, DEFAULT_TIMEZONE};
use crate::schema::Column;
use crate::types::{CellValue, FieldKind};

/// Annotation of one record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
    /// Header text of the target column
    pub name: String,
    /// Ordering key, ascending; ties keep declaration order
    pub sort: i32,
    /// Date pattern for temporal fields
    pub format: String,
    /// Time zone for timestamp fields: IANA name or fixed offset
    pub timezone: String,
}

impl ColumnSpec {
    /// Unannotated column: header is the field name, sort 0, default pattern
    pub fn new(field: &'static str, kind: FieldKind, nullable: bool) -> Self {
        Self {
            field,
            kind,
            nullable,
            name: field.to_string(),
            sort: 0,
            format: DEFAULT_DATE_FORMAT.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn sort(mut self, sort: i32) -> Self {
        self.sort = sort;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

/// A type that can be written to and read from worksheet rows
pub trait SheetRecord: Default {
    /// Column annotations, in field declaration order
    fn columns() -> Vec<ColumnSpec>;

    /// Read the field behind `column` as a cell
    fn read_field(&self, column: &Column) -> SheetMapResult<CellValue>;

    /// Store `cell` into the field behind `column`
    fn write_field(&mut self, column: &Column, cell: &CellValue) -> SheetMapResult<()>;
}

/// Declare a struct and implement [`SheetRecord`] for it.
///
/// Each field may carry one `#[column(...)]` attribute with any of
/// `name`, `sort`, `format` and `timezone`. Field types must implement
/// [`SheetValue`](crate::value::SheetValue).
#[macro_export]
macro_rules! sheet_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[column( $($key:ident = $value:expr),* $(,)? )])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $fvis $field : $ty ),*
        }

        impl $crate::record::SheetRecord for $name {
            fn columns() -> ::std::vec::Vec<$crate::record::ColumnSpec> {
                ::std::vec![
                    $(
                        $crate::record::ColumnSpec::new(
                            ::std::stringify!($field),
                            <$ty as $crate::value::SheetValue>::KIND,
                            <$ty as $crate::value::SheetValue>::NULLABLE,
                        )
                        $( $( .$key($value) )* )?
                    ),*
                ]
            }

            fn read_field(
                &self,
                column: &$crate::schema::Column,
            ) -> $crate::error::SheetMapResult<$crate::types::CellValue> {
                match column.field() {
                    $(
                        ::std::stringify!($field) => {
                            $crate::value::SheetValue::to_cell(&self.$field, column)
                        }
                    )*
                    other => ::std::result::Result::Err(
                        $crate::error::SheetMapError::UnknownField {
                            record: ::std::stringify!($name),
                            field: other.to_string(),
                        },
                    ),
                }
            }

            fn write_field(
                &mut self,
                column: &$crate::schema::Column,
                cell: &$crate::types::CellValue,
            ) -> $crate::error::SheetMapResult<()> {
                match column.field() {
                    $(
                        ::std::stringify!($field) => {
                            self.$field = $crate::value::SheetValue::from_cell(cell, column)?;
                            ::std::result::Result::Ok(())
                        }
                    )*
                    other => ::std::result::Result::Err(
                        $crate::error::SheetMapError::UnknownField {
                            record: ::std::stringify!($name),
                            field: other.to_string(),
                        },
                    ),
                }
            }
        }
    };
}
