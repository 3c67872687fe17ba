//! Excel importer implementation - workbook → records

use crate::error::{SheetMapError, SheetMapResult};
use crate::record::SheetRecord;
use crate::schema::{Column, Schema};
use crate::types::CellValue;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, SheetType, Sheets};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::{debug, warn};

/// Per-sheet overview of a workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub name: String,
    /// Zero-based index of the first used column
    pub first_column: usize,
    /// Row 0 cells from `first_column` on, rendered as text
    pub headers: Vec<String>,
    /// Non-blank rows below the header
    pub data_rows: usize,
}

/// Reads workbook rows back into records
pub struct SheetImporter<RS> {
    workbook: Sheets<RS>,
}

impl SheetImporter<BufReader<File>> {
    /// Open a workbook file; the format is detected from its extension
    pub fn open<P: AsRef<Path>>(path: P) -> SheetMapResult<Self> {
        let workbook = open_workbook_auto(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "workbook opened");
        Ok(Self { workbook })
    }
}

impl SheetImporter<Cursor<Vec<u8>>> {
    /// Read a workbook held in memory; the format is detected from its content
    pub fn from_bytes(bytes: Vec<u8>) -> SheetMapResult<Self> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> SheetImporter<RS> {
    /// Wrap an already opened calamine workbook
    pub fn from_sheets(workbook: Sheets<RS>) -> Self {
        Self { workbook }
    }

    /// Names of the worksheets, in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook
            .sheets_metadata()
            .iter()
            .filter(|sheet| matches!(sheet.typ, SheetType::WorkSheet))
            .map(|sheet| sheet.name.clone())
            .collect()
    }

    /// Parse every worksheet into records of type `T`, sheet by sheet
    pub fn import<T: SheetRecord>(&mut self) -> SheetMapResult<Vec<T>> {
        let schema = Schema::of::<T>()?;
        if schema.is_empty() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for sheet_name in self.sheet_names() {
            let range = self.workbook.worksheet_range(&sheet_name)?;
            let before = records.len();
            Self::import_sheet(&sheet_name, &range, &schema, &mut records)?;
            debug!(
                sheet = %sheet_name,
                record = schema.record(),
                rows = records.len() - before,
                "sheet imported"
            );
        }

        Ok(records)
    }

    /// Header texts and data row counts for each worksheet
    pub fn summarize(&mut self) -> SheetMapResult<Vec<SheetSummary>> {
        let mut summaries = Vec::new();
        for name in self.sheet_names() {
            let range = self.workbook.worksheet_range(&name)?;
            let first_column = first_used_column(&range);
            let mut rows = header_anchored_rows(&range);
            let headers = rows
                .as_mut()
                .and_then(Iterator::next)
                .map(|header| header.iter().map(|cell| cell.to_string()).collect())
                .unwrap_or_default();
            let data_rows = rows
                .map(|rows| rows.filter(|row| !is_blank_row(row)).count())
                .unwrap_or(0);
            summaries.push(SheetSummary {
                name,
                first_column,
                headers,
                data_rows,
            });
        }
        Ok(summaries)
    }

    /// Process a single worksheet
    fn import_sheet<T: SheetRecord>(
        sheet_name: &str,
        range: &Range<Data>,
        schema: &Schema,
        records: &mut Vec<T>,
    ) -> SheetMapResult<()> {
        let Some(mut rows) = header_anchored_rows(range) else {
            debug!(sheet = %sheet_name, "no header in the first row, skipping");
            return Ok(());
        };
        let Some(header) = rows.next() else {
            return Ok(());
        };

        let mapping = map_header(sheet_name, header, first_used_column(range), schema)?;
        if mapping.iter().all(Option::is_none) {
            warn!(
                sheet = %sheet_name,
                record = schema.record(),
                "no header matches a column, skipping"
            );
            return Ok(());
        }

        // Header is sheet row 1; data starts at row 2
        for (offset, row) in rows.enumerate() {
            if is_blank_row(row) {
                continue;
            }
            let row_number = offset + 2;
            let mut record = T::default();
            for (cell, column) in row.iter().zip(&mapping) {
                let Some(column) = column else {
                    continue;
                };
                let value = to_cell_value(cell);
                record
                    .write_field(column, &value)
                    .map_err(|e| SheetMapError::Cell {
                        sheet: sheet_name.to_string(),
                        row: row_number,
                        column: column.header().to_string(),
                        source: Box::new(e),
                    })?;
            }
            records.push(record);
        }

        Ok(())
    }
}

/// Rows of `range`, provided the range starts at the first sheet row
fn header_anchored_rows(range: &Range<Data>) -> Option<calamine::Rows<'_, Data>> {
    match range.start() {
        Some((0, _)) if !range.is_empty() => Some(range.rows()),
        _ => None,
    }
}

fn first_used_column(range: &Range<Data>) -> usize {
    range.start().map(|(_, col)| col as usize).unwrap_or(0)
}

/// Map each header cell to the schema column it names.
///
/// Blank header cells are ignored; any other non-text cell is an error.
fn map_header<'s>(
    sheet_name: &str,
    header: &[Data],
    first_col: usize,
    schema: &'s Schema,
) -> SheetMapResult<Vec<Option<&'s Column>>> {
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::String(text) => Ok(schema.column_for_header(text.trim())),
            Data::Empty => Ok(None),
            _ => Err(SheetMapError::HeaderNotText {
                sheet: sheet_name.to_string(),
                column: column_letter(first_col + idx),
            }),
        })
        .collect()
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Convert a calamine cell into an engine-independent value
pub fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// Convert column index to Excel column letter (0→A, 1→B, 25→Z, 26→AA, etc.)
pub fn column_letter(n: usize) -> String {
    let mut result = String::new();
    let mut num = n;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ColumnSpec;
    use crate::types::FieldKind;
    use pretty_assertions::assert_eq;

    fn schema() -> Schema {
        Schema::from_specs(
            "Row",
            vec![
                ColumnSpec::new("name", FieldKind::Text, false).name("Name"),
                ColumnSpec::new("age", FieldKind::Integer, false).name("Age"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_letter() {
        // Single letters
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(1), "B");
        assert_eq!(column_letter(25), "Z");

        // Double letters
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");

        // Triple letters
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_map_header_matches_trimmed_names() {
        let schema = schema();
        let header = vec![
            Data::String(" Age ".to_string()),
            Data::Empty,
            Data::String("Unknown".to_string()),
            Data::String("Name".to_string()),
        ];
        let mapping = map_header("S", &header, 0, &schema).unwrap();
        let fields: Vec<Option<&str>> = mapping.iter().map(|c| c.map(Column::field)).collect();
        assert_eq!(fields, vec![Some("age"), None, None, Some("name")]);
    }

    #[test]
    fn test_map_header_rejects_non_text() {
        let schema = schema();
        let header = vec![Data::String("Name".to_string()), Data::Float(1.0)];
        let err = map_header("People", &header, 2, &schema).unwrap_err();
        match err {
            SheetMapError::HeaderNotText { sheet, column } => {
                assert_eq!(sheet, "People");
                assert_eq!(column, "D");
            }
            other => panic!("Expected HeaderNotText, got {:?}", other),
        }
    }

    #[test]
    fn test_is_blank_row() {
        assert!(is_blank_row(&[Data::Empty, Data::String("  ".to_string())]));
        assert!(is_blank_row(&[]));
        assert!(!is_blank_row(&[Data::Empty, Data::Bool(false)]));
    }

    #[test]
    fn test_to_cell_value() {
        assert_eq!(to_cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(to_cell_value(&Data::Int(3)), CellValue::Int(3));
        assert_eq!(to_cell_value(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(to_cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            to_cell_value(&Data::String("x".to_string())),
            CellValue::from("x")
        );
        assert_eq!(
            to_cell_value(&Data::DurationIso("PT1H".to_string())),
            CellValue::from("PT1H")
        );
        assert_eq!(
            to_cell_value(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Empty
        );
    }

    #[test]
    fn test_iso_datetime_cells() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        assert_eq!(
            to_cell_value(&Data::DateTimeIso("2024-05-06T07:08:09".to_string())),
            CellValue::DateTime(expected)
        );
        assert_eq!(
            to_cell_value(&Data::DateTimeIso("2024-05-06".to_string())),
            CellValue::DateTime(expected.date().and_time(NaiveTime::MIN))
        );
        assert_eq!(
            to_cell_value(&Data::DateTimeIso("not a date".to_string())),
            CellValue::from("not a date")
        );
    }

    #[test]
    fn test_header_anchored_rows() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Name".to_string()));
        assert!(header_anchored_rows(&range).is_some());

        let mut offset: Range<Data> = Range::new((2, 0), (3, 1));
        offset.set_value((2, 0), Data::String("Name".to_string()));
        assert!(header_anchored_rows(&offset).is_none());

        let empty: Range<Data> = Range::empty();
        assert!(header_anchored_rows(&empty).is_none());
    }
}
