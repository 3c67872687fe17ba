//! Per-type coercion between record fields and cells

use crate::error::{SheetMapError, SheetMapResult};
use crate::schema::Column;
use crate::types::{CellValue, FieldKind};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A field type the workbook mapping understands
pub trait SheetValue: Sized {
    const KIND: FieldKind;
    const NULLABLE: bool = false;

    /// Convert the field into a cell for export
    fn to_cell(&self, column: &Column) -> SheetMapResult<CellValue>;

    /// Convert an imported cell into the field type
    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self>;
}

fn mismatch(kind: FieldKind, cell: &CellValue) -> SheetMapError {
    SheetMapError::conversion(kind, cell.describe())
}

/// Render a number the way a spreadsheet user expects to read it back
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Convert an Excel serial date (1900 date system) to a date-time.
///
/// Serials below 60 precede Excel's phantom 1900-02-29 and are shifted by a
/// day, the same way calamine reads native date cells.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let serial = if serial < 60.0 { serial + 1.0 } else { serial };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round();
    if millis > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Interpret a cell as a wall-clock date-time using the column pattern
fn cell_to_datetime(kind: FieldKind, cell: &CellValue, column: &Column) -> SheetMapResult<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Ok(*dt),
        CellValue::Text(s) => column.pattern().parse(s),
        CellValue::Float(f) => serial_to_datetime(*f).ok_or_else(|| mismatch(kind, cell)),
        CellValue::Int(i) => serial_to_datetime(*i as f64).ok_or_else(|| mismatch(kind, cell)),
        CellValue::Empty | CellValue::Bool(_) => Err(mismatch(kind, cell)),
    }
}

fn cell_to_f64(kind: FieldKind, cell: &CellValue) -> SheetMapResult<f64> {
    match cell {
        CellValue::Int(i) => Ok(*i as f64),
        CellValue::Float(f) => Ok(*f),
        CellValue::Text(s) => s.trim().parse::<f64>().map_err(|_| mismatch(kind, cell)),
        CellValue::Empty | CellValue::Bool(_) | CellValue::DateTime(_) => Err(mismatch(kind, cell)),
    }
}

/// Integers accept whole or fractional numbers; fractions truncate toward zero
fn cell_to_i64(cell: &CellValue) -> SheetMapResult<i64> {
    if let CellValue::Int(i) = cell {
        return Ok(*i);
    }
    let n = cell_to_f64(FieldKind::Integer, cell)?.trunc();
    if !n.is_finite() || n < i64::MIN as f64 || n >= i64::MAX as f64 {
        return Err(SheetMapError::conversion(
            FieldKind::Integer,
            format!("{} (out of range)", cell.describe()),
        ));
    }
    Ok(n as i64)
}

//==============================================================================
// Numbers and booleans
//==============================================================================

impl SheetValue for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Int(*self))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        cell_to_i64(cell)
    }
}

impl SheetValue for i32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Int(i64::from(*self)))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        let n = cell_to_i64(cell)?;
        i32::try_from(n).map_err(|_| {
            SheetMapError::conversion(FieldKind::Integer, format!("{} (out of range)", n))
        })
    }
}

impl SheetValue for u32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Int(i64::from(*self)))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        let n = cell_to_i64(cell)?;
        u32::try_from(n).map_err(|_| {
            SheetMapError::conversion(FieldKind::Integer, format!("{} (out of range)", n))
        })
    }
}

impl SheetValue for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Float(*self))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        cell_to_f64(FieldKind::Float, cell)
    }
}

impl SheetValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Bool(*self))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        match cell {
            CellValue::Bool(b) => Ok(*b),
            CellValue::Text(s) => Ok(s.trim().eq_ignore_ascii_case("true")),
            CellValue::Int(i) => Ok(*i != 0),
            CellValue::Float(f) => Ok(*f != 0.0),
            CellValue::Empty | CellValue::DateTime(_) => Err(mismatch(FieldKind::Boolean, cell)),
        }
    }
}

impl SheetValue for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        self.to_f64()
            .map(CellValue::Float)
            .ok_or_else(|| SheetMapError::conversion(FieldKind::Float, self.to_string()))
    }

    fn from_cell(cell: &CellValue, _column: &Column) -> SheetMapResult<Self> {
        match cell {
            CellValue::Int(i) => Ok(Decimal::from(*i)),
            CellValue::Float(f) => {
                Decimal::from_f64(*f).ok_or_else(|| mismatch(FieldKind::Decimal, cell))
            }
            CellValue::Text(s) => {
                let s = s.trim();
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .map_err(|_| mismatch(FieldKind::Decimal, cell))
            }
            CellValue::Empty | CellValue::Bool(_) | CellValue::DateTime(_) => {
                Err(mismatch(FieldKind::Decimal, cell))
            }
        }
    }
}

//==============================================================================
// Text
//==============================================================================

impl SheetValue for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_cell(&self, _column: &Column) -> SheetMapResult<CellValue> {
        Ok(CellValue::Text(self.clone()))
    }

    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self> {
        match cell {
            CellValue::Empty => Ok(String::new()),
            CellValue::Text(s) => Ok(s.clone()),
            CellValue::Int(i) => Ok(i.to_string()),
            CellValue::Float(f) => Ok(format_number(*f)),
            CellValue::Bool(b) => Ok(b.to_string()),
            CellValue::DateTime(dt) => column.pattern().format(dt),
        }
    }
}

//==============================================================================
// Dates and times
//==============================================================================

impl SheetValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn to_cell(&self, column: &Column) -> SheetMapResult<CellValue> {
        column.pattern().format(self).map(CellValue::Text)
    }

    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self> {
        cell_to_datetime(FieldKind::DateTime, cell, column)
    }
}

impl SheetValue for NaiveDate {
    const KIND: FieldKind = FieldKind::Date;

    fn to_cell(&self, column: &Column) -> SheetMapResult<CellValue> {
        column
            .pattern()
            .format(&self.and_time(chrono::NaiveTime::MIN))
            .map(CellValue::Text)
    }

    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self> {
        cell_to_datetime(FieldKind::Date, cell, column).map(|dt| dt.date())
    }
}

impl SheetValue for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;

    fn to_cell(&self, column: &Column) -> SheetMapResult<CellValue> {
        let local = column.zone().to_local(self);
        column.pattern().format(&local).map(CellValue::Text)
    }

    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self> {
        let local = cell_to_datetime(FieldKind::Timestamp, cell, column)?;
        column
            .zone()
            .from_local(&local)
            .ok_or_else(|| mismatch(FieldKind::Timestamp, cell))
    }
}

//==============================================================================
// Optional fields
//==============================================================================

impl<T: SheetValue> SheetValue for Option<T> {
    const KIND: FieldKind = T::KIND;
    const NULLABLE: bool = true;

    fn to_cell(&self, column: &Column) -> SheetMapResult<CellValue> {
        match self {
            Some(value) => value.to_cell(column),
            None => Ok(CellValue::Empty),
        }
    }

    fn from_cell(cell: &CellValue, column: &Column) -> SheetMapResult<Self> {
        if cell.is_empty() {
            return Ok(None);
        }
        T::from_cell(cell, column).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ColumnSpec;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn column(kind: FieldKind) -> Column {
        Column::resolve(ColumnSpec::new("f", kind, false)).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_integer_from_cells() {
        let col = column(FieldKind::Integer);
        assert_eq!(i64::from_cell(&CellValue::Int(5), &col).unwrap(), 5);
        assert_eq!(i64::from_cell(&CellValue::Float(7.9), &col).unwrap(), 7);
        assert_eq!(i64::from_cell(&CellValue::Float(-7.9), &col).unwrap(), -7);
        assert_eq!(i64::from_cell(&CellValue::from(" 12.0 "), &col).unwrap(), 12);
        assert!(i64::from_cell(&CellValue::from("twelve"), &col).is_err());
        assert!(i64::from_cell(&CellValue::Empty, &col).is_err());
        assert!(i64::from_cell(&CellValue::Bool(true), &col).is_err());
        assert!(i64::from_cell(&CellValue::Float(1e300), &col).is_err());
    }

    #[test]
    fn test_narrow_integers_range_checked() {
        let col = column(FieldKind::Integer);
        assert_eq!(i32::from_cell(&CellValue::Int(-3), &col).unwrap(), -3);
        assert!(i32::from_cell(&CellValue::Int(i64::from(i32::MAX) + 1), &col).is_err());
        assert!(u32::from_cell(&CellValue::Int(-1), &col).is_err());
        assert_eq!(u32::from_cell(&CellValue::Float(3.0), &col).unwrap(), 3);
    }

    #[test]
    fn test_float_from_cells() {
        let col = column(FieldKind::Float);
        assert_eq!(f64::from_cell(&CellValue::Int(2), &col).unwrap(), 2.0);
        assert_eq!(f64::from_cell(&CellValue::from("2.5"), &col).unwrap(), 2.5);
        assert!(f64::from_cell(&CellValue::Empty, &col).is_err());
    }

    #[test]
    fn test_bool_from_cells() {
        let col = column(FieldKind::Boolean);
        assert!(bool::from_cell(&CellValue::Bool(true), &col).unwrap());
        assert!(bool::from_cell(&CellValue::from("TRUE"), &col).unwrap());
        assert!(!bool::from_cell(&CellValue::from("yes"), &col).unwrap());
        assert!(bool::from_cell(&CellValue::Float(1.0), &col).unwrap());
        assert!(!bool::from_cell(&CellValue::Int(0), &col).unwrap());
        assert!(bool::from_cell(&CellValue::Empty, &col).is_err());
    }

    #[test]
    fn test_decimal_conversions() {
        let col = column(FieldKind::Decimal);
        let price = Decimal::from_str("19.99").unwrap();
        assert_eq!(price.to_cell(&col).unwrap(), CellValue::Float(19.99));
        assert_eq!(
            Decimal::from_cell(&CellValue::from("19.99"), &col).unwrap(),
            price
        );
        assert_eq!(
            Decimal::from_cell(&CellValue::Int(4), &col).unwrap(),
            Decimal::from(4)
        );
        assert_eq!(
            Decimal::from_cell(&CellValue::from("1.5e2"), &col).unwrap(),
            Decimal::from(150)
        );
        assert!(Decimal::from_cell(&CellValue::Bool(false), &col).is_err());
    }

    #[test]
    fn test_string_from_cells() {
        let col = column(FieldKind::Text);
        assert_eq!(String::from_cell(&CellValue::Empty, &col).unwrap(), "");
        assert_eq!(String::from_cell(&CellValue::Float(3.0), &col).unwrap(), "3");
        assert_eq!(String::from_cell(&CellValue::Float(3.25), &col).unwrap(), "3.25");
        assert_eq!(String::from_cell(&CellValue::Int(-8), &col).unwrap(), "-8");
        assert_eq!(String::from_cell(&CellValue::Bool(false), &col).unwrap(), "false");
        assert_eq!(
            String::from_cell(&CellValue::DateTime(dt(2024, 1, 2, 3, 4, 5)), &col).unwrap(),
            "2024-01-02 03:04:05"
        );
    }

    #[test]
    fn test_datetime_round_trip_through_text() {
        let col = column(FieldKind::DateTime);
        let value = dt(2024, 6, 30, 23, 59, 1);
        let cell = value.to_cell(&col).unwrap();
        assert_eq!(cell, CellValue::from("2024-06-30 23:59:01"));
        assert_eq!(NaiveDateTime::from_cell(&cell, &col).unwrap(), value);
    }

    #[test]
    fn test_datetime_from_native_and_serial_cells() {
        let col = column(FieldKind::DateTime);
        let value = dt(2024, 1, 1, 12, 0, 0);
        assert_eq!(
            NaiveDateTime::from_cell(&CellValue::DateTime(value), &col).unwrap(),
            value
        );
        // 45292.5 is 2024-01-01 12:00 in the 1900 date system
        assert_eq!(
            NaiveDateTime::from_cell(&CellValue::Float(45292.5), &col).unwrap(),
            value
        );
        assert!(NaiveDateTime::from_cell(&CellValue::Bool(true), &col).is_err());
    }

    #[test]
    fn test_date_uses_midnight_and_custom_pattern() {
        let col = Column::resolve(
            ColumnSpec::new("d", FieldKind::Date, false).format("dd/MM/yyyy"),
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2021, 7, 4).unwrap();
        assert_eq!(date.to_cell(&col).unwrap(), CellValue::from("04/07/2021"));
        assert_eq!(
            NaiveDate::from_cell(&CellValue::from("04/07/2021"), &col).unwrap(),
            date
        );
    }

    #[test]
    fn test_timestamp_uses_column_zone() {
        let col = column(FieldKind::Timestamp); // default Asia/Shanghai
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        assert_eq!(
            instant.to_cell(&col).unwrap(),
            CellValue::from("2024-01-01 08:30:00")
        );
        assert_eq!(
            DateTime::<Utc>::from_cell(&CellValue::from("2024-01-01 08:30:00"), &col).unwrap(),
            instant
        );

        let utc = Column::resolve(
            ColumnSpec::new("t", FieldKind::Timestamp, false).timezone("UTC"),
        )
        .unwrap();
        assert_eq!(
            instant.to_cell(&utc).unwrap(),
            CellValue::from("2024-01-01 00:30:00")
        );
    }

    #[test]
    fn test_timestamp_in_named_zone_tracks_daylight_saving() {
        let col = Column::resolve(
            ColumnSpec::new("t", FieldKind::Timestamp, false).timezone("Europe/Berlin"),
        )
        .unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 8, 1, 9, 0, 0).unwrap();

        assert_eq!(winter.to_cell(&col).unwrap(), CellValue::from("2024-02-01 10:00:00"));
        assert_eq!(summer.to_cell(&col).unwrap(), CellValue::from("2024-08-01 11:00:00"));
        assert_eq!(
            DateTime::<Utc>::from_cell(&CellValue::from("2024-08-01 11:00:00"), &col).unwrap(),
            summer
        );
    }

    #[test]
    fn test_option_maps_empty_to_none() {
        let col = column(FieldKind::Integer);
        assert_eq!(Option::<i64>::from_cell(&CellValue::Empty, &col).unwrap(), None);
        assert_eq!(
            Option::<i64>::from_cell(&CellValue::Int(9), &col).unwrap(),
            Some(9)
        );
        assert_eq!(None::<i64>.to_cell(&col).unwrap(), CellValue::Empty);
        assert!(Option::<i64>::from_cell(&CellValue::from("x"), &col).is_err());
        assert!(<Option<i64> as SheetValue>::NULLABLE);
        assert_eq!(<Option<String> as SheetValue>::KIND, FieldKind::Text);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }

    #[test]
    fn test_serial_to_datetime() {
        assert_eq!(serial_to_datetime(1.0), Some(dt(1900, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(1.5), Some(dt(1900, 1, 1, 12, 0, 0)));
        assert_eq!(serial_to_datetime(59.0), Some(dt(1900, 2, 28, 0, 0, 0)));
        assert_eq!(serial_to_datetime(61.0), Some(dt(1900, 3, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(45292.0), Some(dt(2024, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(-1.0), None);
        assert_eq!(serial_to_datetime(f64::NAN), None);
    }
}
