//! Cell values and column types shared by the database and frame layers.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column type.
///
/// `Null` is the type of a column that holds no value at all; it is
/// compatible with every other type when comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Date,
    DateTime,
}

impl DType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Int | DType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DType::Date | DType::DateTime)
    }

    /// SQL type used when a table is created from a frame
    pub fn sql_type(&self) -> &'static str {
        match self {
            DType::Bool => "BOOLEAN",
            DType::Int => "BIGINT",
            DType::Float => "DOUBLE",
            DType::Date => "DATE",
            DType::DateTime => "TIMESTAMP",
            DType::Null | DType::Str => "VARCHAR",
        }
    }

    /// Widest common type of two columns, if they can hold each other's values
    pub fn unify(self, other: DType) -> Option<DType> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (DType::Null, b) => Some(b),
            (a, DType::Null) => Some(a),
            (DType::Int, DType::Float) | (DType::Float, DType::Int) => Some(DType::Float),
            (DType::Date, DType::DateTime) | (DType::DateTime, DType::Date) => {
                Some(DType::DateTime)
            }
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Null => "null",
            DType::Bool => "bool",
            DType::Int => "int64",
            DType::Float => "float64",
            DType::Str => "object",
            DType::Date => "date",
            DType::DateTime => "datetime64",
        };
        f.write_str(name)
    }
}

/// A single value in a result set or tabular file.
///
/// `Na` is the missing-value sentinel. It is distinct from `Str("")` in
/// memory; the two only collapse when written to CSV.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Na,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn is_na(&self) -> bool {
        match self {
            Cell::Na => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Type of this value, `None` for `Na`
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Cell::Na => None,
            Cell::Float(f) if f.is_nan() => None,
            Cell::Bool(_) => Some(DType::Bool),
            Cell::Int(_) => Some(DType::Int),
            Cell::Float(_) => Some(DType::Float),
            Cell::Str(_) => Some(DType::Str),
            Cell::Date(_) => Some(DType::Date),
            Cell::DateTime(_) => Some(DType::DateTime),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value, parsing strings when possible
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if !f.is_nan() => Some(*f),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Text form used in CSV output and string coercion; `Na` renders empty
    pub fn render(&self) -> String {
        match self {
            Cell::Na => String::new(),
            Cell::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.is_nan() => String::new(),
            Cell::Float(f) => format_float(*f),
            Cell::Str(s) => s.clone(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::DateTime(dt) => format_datetime(dt),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Na => f.write_str("NaN"),
            other => f.write_str(&other.render()),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unify() {
        assert_eq!(DType::Int.unify(DType::Float), Some(DType::Float));
        assert_eq!(DType::Null.unify(DType::Str), Some(DType::Str));
        assert_eq!(DType::Date.unify(DType::DateTime), Some(DType::DateTime));
        assert_eq!(DType::Int.unify(DType::Str), None);
        assert_eq!(DType::Bool.unify(DType::Int), None);
    }

    #[test]
    fn test_na_is_not_empty_string() {
        assert!(Cell::Na.is_na());
        assert!(!Cell::Str(String::new()).is_na());
        assert_ne!(Cell::Na, Cell::Str(String::new()));
        // Both collapse to the same CSV text
        assert_eq!(Cell::Na.render(), Cell::Str(String::new()).render());
    }

    #[test]
    fn test_render_values() {
        assert_eq!(Cell::Int(7).render(), "7");
        assert_eq!(Cell::Float(1.0).render(), "1.0");
        assert_eq!(Cell::Float(1.25).render(), "1.25");
        assert_eq!(Cell::Bool(true).render(), "True");
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Cell::Date(d).render(), "2024-02-29");
        let dt = d.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(Cell::DateTime(dt).render(), "2024-02-29 13:05:00");
    }

    #[test]
    fn test_nan_float_is_na() {
        assert!(Cell::Float(f64::NAN).is_na());
        assert_eq!(Cell::Float(f64::NAN).dtype(), None);
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Cell::Str(" 2.5 ".to_string()).to_f64(), Some(2.5));
        assert_eq!(Cell::Str("x".to_string()).to_f64(), None);
        assert_eq!(Cell::Int(3).to_f64(), Some(3.0));
    }
}
