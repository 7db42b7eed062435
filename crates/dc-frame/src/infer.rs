//! Typing of text columns read from CSV and spreadsheet files.

use crate::dates::parse_date_column;
use crate::frame::Column;
use dc_core::{Cell, DType};
use std::collections::BTreeSet;

/// How a column's text is turned into values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnHint {
    /// Pick the narrowest type every value parses as
    #[default]
    Infer,
    /// Keep the raw text
    Text,
    /// Parse as dates; left as text if any value fails
    Date,
}

/// Column pins applied when reading an expectation or load file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub string_columns: BTreeSet<String>,
    pub date_columns: BTreeSet<String>,
}

impl ReadOptions {
    pub fn new(string_columns: BTreeSet<String>, date_columns: BTreeSet<String>) -> Self {
        Self {
            string_columns,
            date_columns,
        }
    }

    pub fn hint_for(&self, column: &str) -> ColumnHint {
        if self.string_columns.contains(column) {
            ColumnHint::Text
        } else if self.date_columns.contains(column) {
            ColumnHint::Date
        } else {
            ColumnHint::Infer
        }
    }
}

/// Build a typed column from raw text values, `None` meaning an empty field
pub fn text_column(name: &str, raw: Vec<Option<String>>, hint: ColumnHint) -> Column {
    let values = match hint {
        ColumnHint::Text => raw
            .into_iter()
            .map(|v| v.map(Cell::Str).unwrap_or(Cell::Na))
            .collect(),
        ColumnHint::Date => {
            let refs: Vec<Option<&str>> = raw.iter().map(|v| v.as_deref()).collect();
            match parse_date_column(&refs) {
                Some(dates) => dates,
                None => {
                    log::debug!("Column '{}' is pinned as a date but holds non-dates", name);
                    as_strings(raw)
                }
            }
        }
        ColumnHint::Infer => infer_values(raw),
    };
    Column::new(name, values)
}

fn as_strings(raw: Vec<Option<String>>) -> Vec<Cell> {
    raw.into_iter()
        .map(|v| v.map(Cell::Str).unwrap_or(Cell::Na))
        .collect()
}

fn infer_values(raw: Vec<Option<String>>) -> Vec<Cell> {
    let present: Vec<&str> = raw.iter().flatten().map(String::as_str).collect();
    if present.is_empty() {
        return raw.iter().map(|_| Cell::Na).collect();
    }

    if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        return map_present(&raw, |v| v.parse::<i64>().ok().map(Cell::Int));
    }
    if present.iter().all(|v| looks_like_float(v)) {
        return map_present(&raw, |v| v.parse::<f64>().ok().map(Cell::Float));
    }
    if present.iter().all(|v| parse_bool(v).is_some()) {
        return map_present(&raw, |v| parse_bool(v).map(Cell::Bool));
    }
    let refs: Vec<Option<&str>> = raw.iter().map(|v| v.as_deref()).collect();
    if let Some(dates) = parse_date_column(&refs) {
        return dates;
    }
    as_strings(raw)
}

fn map_present(raw: &[Option<String>], f: impl Fn(&str) -> Option<Cell>) -> Vec<Cell> {
    raw.iter()
        .map(|v| v.as_deref().and_then(&f).unwrap_or(Cell::Na))
        .collect()
}

/// Decimal or exponent notation; `nan` and `inf` spellings stay text
fn looks_like_float(v: &str) -> bool {
    v.bytes().any(|b| b.is_ascii_digit()) && v.parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Convert string cells of a query result column to dates when all of them parse.
///
/// Returns the new values and `DType::Date`/`DType::DateTime`, or `None`
/// if the column is not a string column of dates.
pub fn dates_from_strings(values: &[Cell]) -> Option<(Vec<Cell>, DType)> {
    if values.iter().any(|c| !c.is_na() && c.as_str().is_none()) {
        return None;
    }
    let refs: Vec<Option<&str>> = values.iter().map(Cell::as_str).collect();
    let parsed = parse_date_column(&refs)?;
    let dtype = Column::infer_dtype(&parsed);
    Some((parsed, dtype))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn test_infer_ints_and_floats() {
        let c = text_column("a", raw(&["1", "", "007"]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Int);
        assert_eq!(c.values, vec![Cell::Int(1), Cell::Na, Cell::Int(7)]);

        let c = text_column("a", raw(&["1", "2.5", "1e3"]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Float);
        assert_eq!(c.values[2], Cell::Float(1000.0));
    }

    #[test]
    fn test_nan_spelling_is_text() {
        let c = text_column("a", raw(&["nan", "1.0"]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Str);
        let c = text_column("a", raw(&["NA", "null"]), ColumnHint::Infer);
        assert_eq!(c.values[0], Cell::Str("NA".to_string()));
    }

    #[test]
    fn test_text_hint_keeps_leading_zeros() {
        let c = text_column("code", raw(&["007", "010"]), ColumnHint::Text);
        assert_eq!(c.dtype, DType::Str);
        assert_eq!(c.values[0], Cell::Str("007".to_string()));
    }

    #[test]
    fn test_infer_dates() {
        let c = text_column("d", raw(&["2024-01-01", "", "2024-01-03"]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Date);
        assert_eq!(
            c.values[0],
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );

        let c = text_column("d", raw(&["2024-01-01", "soon"]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Str);
    }

    #[test]
    fn test_date_hint_falls_back_to_text() {
        let c = text_column("d", raw(&["2024-01-01", "bad"]), ColumnHint::Date);
        assert_eq!(c.dtype, DType::Str);
    }

    #[test]
    fn test_bools() {
        let c = text_column("b", raw(&["True", "false"]), ColumnHint::Infer);
        assert_eq!(c.values, vec![Cell::Bool(true), Cell::Bool(false)]);
    }

    #[test]
    fn test_all_empty_is_null() {
        let c = text_column("e", raw(&["", ""]), ColumnHint::Infer);
        assert_eq!(c.dtype, DType::Null);
    }

    #[test]
    fn test_dates_from_strings() {
        let values = vec![Cell::Str("2024-05-01".into()), Cell::Na];
        let (parsed, dtype) = dates_from_strings(&values).unwrap();
        assert_eq!(dtype, DType::Date);
        assert_eq!(parsed[1], Cell::Na);
        assert!(dates_from_strings(&[Cell::Int(1)]).is_none());
        assert!(dates_from_strings(&[Cell::Str("x".into())]).is_none());
    }

    #[test]
    fn test_read_options_hint() {
        let opts = ReadOptions::new(
            ["s".to_string()].into_iter().collect(),
            ["d".to_string()].into_iter().collect(),
        );
        assert_eq!(opts.hint_for("s"), ColumnHint::Text);
        assert_eq!(opts.hint_for("d"), ColumnHint::Date);
        assert_eq!(opts.hint_for("x"), ColumnHint::Infer);
    }
}
