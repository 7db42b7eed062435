//! Strict ISO-8601 recognition for date inference.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use dc_core::Cell;
use regex::Regex;
use std::sync::OnceLock;

static ISO_RE: OnceLock<Regex> = OnceLock::new();

fn iso_re() -> &'static Regex {
    ISO_RE.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?\s*(Z|[+-]\d{2}(?::?\d{2})?)?)?$",
        )
        .expect("valid regex")
    })
}

/// Parse an ISO-8601 date or datetime.
///
/// Returns `Cell::Date` for a bare date and `Cell::DateTime` otherwise.
/// Values with a UTC offset are shifted to UTC and returned without one,
/// so mixed-offset columns compare on the same clock. A value whose last
/// ten characters are all digits is never a date.
pub fn parse_iso(value: &str) -> Option<Cell> {
    let value = value.trim();
    if value.chars().rev().take(10).filter(char::is_ascii_digit).count() == 10 {
        return None;
    }
    let caps = iso_re().captures(value)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?;
    let Some(hour) = num(4) else {
        return Some(Cell::Date(date));
    };

    let nanos = match caps.get(7) {
        Some(m) => {
            let digits = m.as_str();
            digits.parse::<u32>().ok()? * 10u32.pow(9 - digits.len() as u32)
        }
        None => 0,
    };
    let time = NaiveTime::from_hms_nano_opt(hour, num(5)?, num(6).unwrap_or(0), nanos)?;
    let mut dt = NaiveDateTime::new(date, time);

    if let Some(tz) = caps.get(8) {
        dt -= Duration::seconds(offset_seconds(tz.as_str())?);
    }
    Some(Cell::DateTime(dt))
}

fn offset_seconds(tz: &str) -> Option<i64> {
    if tz == "Z" {
        return Some(0);
    }
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let digits: String = tz[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i64 = digits.get(0..2)?.parse().ok()?;
    let minutes: i64 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    Some(sign * (hours * 3600 + minutes * 60))
}

/// Convert every value of a column to a date, or `None` if any value fails.
///
/// Missing values stay missing. A column mixing bare dates and datetimes
/// comes back as datetimes.
pub fn parse_date_column(values: &[Option<&str>]) -> Option<Vec<Cell>> {
    let mut parsed = Vec::with_capacity(values.len());
    let mut any_datetime = false;
    let mut any_value = false;
    for value in values {
        match value {
            None => parsed.push(Cell::Na),
            Some(v) if v.is_empty() => parsed.push(Cell::Na),
            Some(v) => {
                let cell = parse_iso(v)?;
                any_datetime |= matches!(cell, Cell::DateTime(_));
                any_value = true;
                parsed.push(cell);
            }
        }
    }
    if !any_value {
        return None;
    }
    if any_datetime {
        for cell in &mut parsed {
            if let Cell::Date(d) = cell {
                *cell = Cell::DateTime(d.and_time(NaiveTime::MIN));
            }
        }
    }
    Some(parsed)
}
