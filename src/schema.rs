//! Resolution of column annotations into an ordered, validated schema

use crate::error::{SheetMapError, SheetMapResult};
use crate::format::{parse_timezone, ColumnZone, DatePattern};
use crate::record::{ColumnSpec, SheetRecord};
use crate::types::FieldKind;
use std::collections::{HashMap, HashSet};

/// A column annotation with its date pattern and time zone compiled
#[derive(Debug, Clone)]
pub struct Column {
    spec: ColumnSpec,
    pattern: DatePattern,
    zone: ColumnZone,
}

impl Column {
    /// Compile a single annotation
    pub fn resolve(spec: ColumnSpec) -> SheetMapResult<Self> {
        let pattern = DatePattern::compile(&spec.format)?;
        let zone = parse_timezone(&spec.timezone)?;
        Ok(Self {
            spec,
            pattern,
            zone,
        })
    }

    pub fn field(&self) -> &'static str {
        self.spec.field
    }

    /// Header text of the column
    pub fn header(&self) -> &str {
        &self.spec.name
    }

    pub fn kind(&self) -> FieldKind {
        self.spec.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.spec.nullable
    }

    pub fn sort(&self) -> i32 {
        self.spec.sort
    }

    pub fn pattern(&self) -> &DatePattern {
        &self.pattern
    }

    /// Time zone used by timestamp fields
    pub fn zone(&self) -> ColumnZone {
        self.zone
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }
}

/// Ordered columns of one record type
#[derive(Debug, Clone)]
pub struct Schema {
    record: &'static str,
    columns: Vec<Column>,
    by_header: HashMap<String, usize>,
}

impl Schema {
    /// Resolve the columns of `T`
    pub fn of<T: SheetRecord>() -> SheetMapResult<Self> {
        let record = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("record");
        Self::from_specs(record, T::columns())
    }

    /// Validate and order a list of annotations.
    ///
    /// Sort keys must be non-negative and column names unique. Columns are
    /// ordered by sort key; equal keys keep declaration order.
    pub fn from_specs(record: &'static str, specs: Vec<ColumnSpec>) -> SheetMapResult<Self> {
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            if spec.sort < 0 {
                return Err(SheetMapError::Schema(format!(
                    "{}.{}: sort index must not be negative (got {})",
                    record, spec.field, spec.sort
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(SheetMapError::Schema(format!(
                    "{}: duplicate column name '{}'",
                    record, spec.name
                )));
            }
        }

        let mut columns = specs
            .into_iter()
            .map(Column::resolve)
            .collect::<SheetMapResult<Vec<_>>>()?;
        columns.sort_by_key(Column::sort);

        let by_header = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.header().to_string(), idx))
            .collect();

        Ok(Self {
            record,
            columns,
            by_header,
        })
    }

    /// Short name of the record type
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Header texts in output order
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(Column::header).collect()
    }

    pub fn column_for_header(&self, header: &str) -> Option<&Column> {
        self.by_header.get(header).map(|&idx| &self.columns[idx])
    }
}
