//! Date pattern and time zone handling
//!
//! Column annotations carry date patterns in the familiar `yyyy-MM-dd HH:mm:ss`
//! letter style. They are compiled once into chrono strftime form; a pattern
//! that already contains `%` is taken as strftime as-is.
//!
//! Time zones are IANA names (`Asia/Shanghai`, `America/New_York`) or fixed
//! offsets (`+08:00`, `UTC`).

use crate::error::{SheetMapError, SheetMapResult};
use chrono::format::{Item, StrftimeItems};
use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;

/// Default column date pattern
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Default column time zone for timestamp fields
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'[^']*'|y+|M+|d+|H+|h+|m+|s+|S+|a+|E+|[A-Za-z]+")
        .expect("date token pattern is a valid regex")
});

/// A validated date pattern in both its declared and strftime forms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern {
    source: String,
    strftime: String,
}

impl DatePattern {
    /// Compile a pattern, translating letter-style tokens to strftime
    ///
    /// Example:
    /// - Input: `yyyy-MM-dd HH:mm`
    /// - Output: `%Y-%m-%d %H:%M`
    pub fn compile(pattern: &str) -> SheetMapResult<Self> {
        if pattern.trim().is_empty() {
            return Err(date_format_error(pattern, "pattern is empty"));
        }

        let strftime = if pattern.contains('%') {
            pattern.to_string()
        } else {
            translate_letter_pattern(pattern)?
        };

        if StrftimeItems::new(&strftime).any(|item| matches!(item, Item::Error)) {
            return Err(date_format_error(pattern, "invalid strftime specifier"));
        }

        Ok(Self {
            source: pattern.to_string(),
            strftime,
        })
    }

    /// The pattern as declared on the column
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The chrono strftime form
    pub fn strftime(&self) -> &str {
        &self.strftime
    }

    /// Render a date-time with this pattern
    pub fn format(&self, value: &NaiveDateTime) -> SheetMapResult<String> {
        let mut out = String::new();
        write!(out, "{}", value.format(&self.strftime)).map_err(|_| {
            date_format_error(&self.source, "pattern needs fields a local date-time lacks")
        })?;
        Ok(out)
    }

    /// Parse text with this pattern.
    ///
    /// Date-only patterns yield midnight.
    pub fn parse(&self, text: &str) -> SheetMapResult<NaiveDateTime> {
        let text = text.trim();
        match NaiveDateTime::parse_from_str(text, &self.strftime) {
            Ok(value) => Ok(value),
            Err(first) => NaiveDate::parse_from_str(text, &self.strftime)
                .map(|date| date.and_time(NaiveTime::MIN))
                .map_err(|_| {
                    date_format_error(
                        &self.source,
                        &format!("cannot parse '{}': {}", text, first),
                    )
                }),
        }
    }
}

fn date_format_error(pattern: &str, reason: &str) -> SheetMapError {
    SheetMapError::DateFormat {
        pattern: pattern.to_string(),
        reason: reason.to_string(),
    }
}

/// Translate `yyyy-MM-dd`-style letters into strftime specifiers
fn translate_letter_pattern(pattern: &str) -> SheetMapResult<String> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut last = 0;

    for token in TOKEN_PATTERN.find_iter(pattern) {
        out.push_str(&pattern[last..token.start()]);
        last = token.end();

        let text = token.as_str();
        if let Some(quoted) = text.strip_prefix('\'') {
            let literal = quoted.strip_suffix('\'').unwrap_or(quoted);
            if literal.is_empty() {
                out.push('\'');
            } else {
                out.push_str(literal);
            }
            continue;
        }

        let len = text.len();
        let spec = match (text.as_bytes()[0], len) {
            (b'y', 2) => "%y",
            (b'y', _) => "%Y",
            (b'M', 1) => "%-m",
            (b'M', 2) => "%m",
            (b'M', 3) => "%b",
            (b'M', _) => "%B",
            (b'd', 1) => "%-d",
            (b'd', _) => "%d",
            (b'H', 1) => "%-H",
            (b'H', _) => "%H",
            (b'h', 1) => "%-I",
            (b'h', _) => "%I",
            (b'm', 1) => "%-M",
            (b'm', _) => "%M",
            (b's', 1) => "%-S",
            (b's', _) => "%S",
            (b'S', 3) => "%3f",
            (b'S', 6) => "%6f",
            (b'S', 9) => "%9f",
            (b'a', _) => "%p",
            (b'E', 1..=3) => "%a",
            (b'E', _) => "%A",
            _ => {
                return Err(date_format_error(
                    pattern,
                    &format!("unsupported pattern letters '{}'", text),
                ))
            }
        };
        out.push_str(spec);
    }
    out.push_str(&pattern[last..]);

    Ok(out)
}

/// Parse a fixed UTC offset such as `+08:00`, `-0530`, `UTC` or `GMT+8`
pub fn parse_offset(text: &str) -> SheetMapResult<FixedOffset> {
    let invalid = || SheetMapError::Timezone(text.to_string());
    let trimmed = text.trim();
    if !trimmed.is_ascii() {
        return Err(invalid());
    }

    let upper = trimmed.to_ascii_uppercase();
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    if rest.is_empty() || rest == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, digits) = match rest.as_bytes()[0] {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() > 2 => digits.split_at(digits.len() - 2),
        None => (digits, "0"),
    };

    if hours.is_empty()
        || !hours.chars().all(|c| c.is_ascii_digit())
        || !minutes.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 18 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Time zone of a timestamp column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnZone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl ColumnZone {
    /// Wall-clock time of `instant` in this zone
    pub fn to_local(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            ColumnZone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            ColumnZone::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Instant shown as `local` in this zone.
    ///
    /// Repeated wall-clock times take the earlier instant. Times skipped by a
    /// forward transition are moved forward by the length of the gap.
    pub fn from_local(&self, local: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            ColumnZone::Fixed(offset) => offset
                .from_local_datetime(local)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            ColumnZone::Named(tz) => match tz.from_local_datetime(local).earliest() {
                Some(dt) => Some(dt.with_timezone(&Utc)),
                None => {
                    // Offset in force a day earlier, before the transition
                    let day_before = local.checked_sub_signed(Duration::days(1))?;
                    let before = tz.offset_from_utc_datetime(&day_before).fix();
                    local
                        .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))
                        .map(|utc| Utc.from_utc_datetime(&utc))
                }
            },
        }
    }
}

/// Parse a column time zone: a fixed offset or an IANA zone name
pub fn parse_timezone(text: &str) -> SheetMapResult<ColumnZone> {
    if let Ok(offset) = parse_offset(text) {
        return Ok(ColumnZone::Fixed(offset));
    }
    text.trim()
        .parse::<Tz>()
        .map(ColumnZone::Named)
        .map_err(|_| SheetMapError::Timezone(text.to_string()))
}
