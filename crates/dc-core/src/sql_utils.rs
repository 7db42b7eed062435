//! Identifier and literal helpers for generated SQL
//!
//! Every statement data-check generates itself (loader DDL, synthesized
//! table-check queries, catalog lookups) goes through these helpers.

use crate::value::Cell;

/// Wrap an identifier in double quotes, doubling embedded quotes.
///
/// # Examples
/// ```
/// use dc_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("amount"), r#""amount""#);
/// assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote and comma-join a list of column names
pub fn quote_column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a single-quoted SQL string literal
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a cell as a SQL literal for generated predicates
pub fn cell_literal(cell: &Cell) -> String {
    match cell {
        Cell::Na => "NULL".to_string(),
        Cell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Cell::Int(i) => i.to_string(),
        Cell::Float(f) if f.is_nan() => "NULL".to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Str(s) => string_literal(s),
        Cell::Date(_) => format!("DATE {}", string_literal(&cell.render())),
        Cell::DateTime(_) => format!("TIMESTAMP {}", string_literal(&cell.render())),
    }
}

/// Build `select <columns> from <table>` for a table check.
///
/// Column names come from an expectation header and are emitted as written so
/// that case-insensitive databases resolve them the usual way.
pub fn select_columns_from(columns: &[String], table: &str) -> String {
    format!("select {} from {}", columns.join(", "), table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("users"), r#""users""#);
    }

    #[test]
    fn test_quote_ident_embedded_quote() {
        assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
    }

    #[test]
    fn test_quote_column_list() {
        assert_eq!(quote_column_list(&["a", "b"]), r#""a", "b""#);
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn test_cell_literal() {
        assert_eq!(cell_literal(&Cell::Na), "NULL");
        assert_eq!(cell_literal(&Cell::Int(4)), "4");
        assert_eq!(cell_literal(&Cell::Str("it's".into())), "'it''s'");
        let d = chrono::NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        assert_eq!(cell_literal(&Cell::Date(d)), "DATE '2021-03-01'");
    }

    #[test]
    fn test_select_columns_from() {
        let cols = vec!["id".to_string(), "name".to_string()];
        assert_eq!(
            select_columns_from(&cols, "main.users"),
            "select id, name from main.users"
        );
    }
}
