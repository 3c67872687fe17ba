//! Excel exporter implementation - records → .xlsx

use crate::config::{ExportOptions, MAX_COLUMNS};
use crate::error::{SheetMapError, SheetMapResult};
use crate::record::SheetRecord;
use crate::schema::{Column, Schema};
use crate::types::CellValue;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;
use tracing::debug;

/// Writes record lists as workbooks, one worksheet per chunk of rows
#[derive(Debug, Clone, Default)]
pub struct SheetExporter {
    options: ExportOptions,
}

impl SheetExporter {
    /// Create an exporter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter with validated options
    pub fn with_options(options: ExportOptions) -> SheetMapResult<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Build a workbook for `records`.
    ///
    /// Returns `None` when there is nothing to write: no records, or a record
    /// type without columns.
    pub fn build_workbook<T: SheetRecord>(&self, records: &[T]) -> SheetMapResult<Option<Workbook>> {
        let schema = Schema::of::<T>()?;
        if records.is_empty() || schema.is_empty() {
            debug!(
                record = schema.record(),
                rows = records.len(),
                columns = schema.len(),
                "nothing to export"
            );
            return Ok(None);
        }
        if schema.len() > MAX_COLUMNS {
            return Err(SheetMapError::Validation(format!(
                "{} has {} columns, a worksheet holds at most {}",
                schema.record(),
                schema.len(),
                MAX_COLUMNS
            )));
        }

        let header_format = self.header_format();
        let mut workbook = Workbook::new();

        for (chunk_idx, chunk) in records.chunks(self.options.max_rows_per_sheet).enumerate() {
            let worksheet = workbook.add_worksheet();
            if let Some(name) = self.options.sheet_name(chunk_idx + 1) {
                worksheet.set_name(&name)?;
            }

            debug!(
                record = schema.record(),
                sheet = chunk_idx + 1,
                first_row = chunk_idx * self.options.max_rows_per_sheet,
                rows = chunk.len(),
                "writing sheet"
            );

            self.write_header(worksheet, &schema, &header_format)?;
            for (row_idx, record) in chunk.iter().enumerate() {
                // +1 for the header row
                Self::write_row(worksheet, (row_idx + 1) as u32, &schema, record)?;
            }
        }

        Ok(Some(workbook))
    }

    /// Export `records` to an .xlsx file
    pub fn export<T: SheetRecord>(&self, records: &[T], output_path: &Path) -> SheetMapResult<()> {
        let mut workbook = self.build_workbook(records)?.ok_or(SheetMapError::NoRecords)?;
        workbook.save(output_path)?;
        debug!(path = %output_path.display(), rows = records.len(), "workbook saved");
        Ok(())
    }

    /// Export `records` to an in-memory .xlsx file
    pub fn export_to_buffer<T: SheetRecord>(&self, records: &[T]) -> SheetMapResult<Vec<u8>> {
        let mut workbook = self.build_workbook(records)?.ok_or(SheetMapError::NoRecords)?;
        Ok(workbook.save_to_buffer()?)
    }

    /// Bold, centered header text
    fn header_format(&self) -> Format {
        Format::new()
            .set_bold()
            .set_font_size(self.options.header_font_size)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
    }

    /// Write header row 0 and size the mapped columns
    fn write_header(
        &self,
        worksheet: &mut Worksheet,
        schema: &Schema,
        format: &Format,
    ) -> SheetMapResult<()> {
        worksheet.set_row_height(0, self.options.header_row_height)?;
        for (col_idx, column) in schema.columns().iter().enumerate() {
            let col = col_idx as u16;
            worksheet.set_column_width(col, self.options.column_width)?;
            worksheet.write_string_with_format(0, col, column.header(), format)?;
        }
        Ok(())
    }

    /// Write one record's cells
    fn write_row<T: SheetRecord>(
        worksheet: &mut Worksheet,
        row: u32,
        schema: &Schema,
        record: &T,
    ) -> SheetMapResult<()> {
        for (col_idx, column) in schema.columns().iter().enumerate() {
            let cell = record
                .read_field(column)
                .map_err(|e| Self::cell_error(worksheet, row, column, e))?;
            Self::write_cell(worksheet, row, col_idx as u16, &cell, column)
                .map_err(|e| Self::cell_error(worksheet, row, column, e))?;
        }
        Ok(())
    }

    /// Write a single cell based on its value type
    fn write_cell(
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &CellValue,
        column: &Column,
    ) -> SheetMapResult<()> {
        match cell {
            CellValue::Empty => {}
            CellValue::Bool(value) => {
                worksheet.write_boolean(row, col, *value)?;
            }
            CellValue::Int(value) => {
                worksheet.write_number(row, col, *value as f64)?;
            }
            CellValue::Float(value) => {
                worksheet.write_number(row, col, *value)?;
            }
            CellValue::Text(value) => {
                worksheet.write_string(row, col, value)?;
            }
            CellValue::DateTime(value) => {
                let text = column.pattern().format(value)?;
                worksheet.write_string(row, col, &text)?;
            }
        }
        Ok(())
    }

    fn cell_error(worksheet: &Worksheet, row: u32, column: &Column, source: SheetMapError) -> SheetMapError {
        SheetMapError::Cell {
            sheet: worksheet.name(),
            row: row as usize + 1,
            column: column.header().to_string(),
            source: Box::new(source),
        }
    }
}
