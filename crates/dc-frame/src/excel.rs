//! First-sheet spreadsheet reader

use crate::error::{FrameError, FrameResult};
use crate::frame::{Column, Frame};
use crate::infer::{text_column, ColumnHint, ReadOptions};
use calamine::{open_workbook_auto, Data, Reader};
use dc_core::Cell;
use std::path::Path;

/// Read the first worksheet of an `.xlsx` file.
///
/// The first row is the header. Non-breaking spaces in text cells are
/// replaced with regular spaces. Typed cells keep their spreadsheet type;
/// pinned string columns are rendered as text and pinned date columns are
/// parsed from text.
pub fn read_excel(path: &Path, options: &ReadOptions) -> FrameResult<Frame> {
    let excel_err = |message: String| FrameError::Excel {
        path: path.display().to_string(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| excel_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| excel_err("workbook has no sheets".to_string()))?
        .map_err(|e| excel_err(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Frame::default());
    };
    let names: Vec<String> = header.iter().map(|c| normalize_text(&c.to_string())).collect();

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (i, column) in cells.iter_mut().enumerate() {
            column.push(row.get(i).map(data_to_cell).unwrap_or(Cell::Na));
        }
    }

    let columns = names
        .iter()
        .zip(cells)
        .map(|(name, values)| match options.hint_for(name) {
            ColumnHint::Infer => Column::new(name.clone(), values),
            hint => text_column(name, values.iter().map(cell_text).collect(), hint),
        })
        .collect();
    Frame::from_columns(columns)
}

fn normalize_text(s: &str) -> String {
    s.replace('\u{a0}', " ")
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Na,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) if s.is_empty() => Cell::Na,
        Data::String(s) => Cell::Str(normalize_text(s)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(v) if v.time() == chrono::NaiveTime::MIN => Cell::Date(v.date()),
            Some(v) => Cell::DateTime(v),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Str(s.clone()),
        Data::Error(e) => Cell::Str(format!("#{:?}", e)),
    }
}

/// Spreadsheets store every number as a float; whole numbers print without `.0`
fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        c if c.is_na() => None,
        Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        c => Some(c.render()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_typed_cells() {
        assert_eq!(data_to_cell(&Data::Empty), Cell::Na);
        assert_eq!(data_to_cell(&Data::Float(1.5)), Cell::Float(1.5));
        assert_eq!(
            data_to_cell(&Data::String("a\u{a0}b".to_string())),
            Cell::Str("a b".to_string())
        );
        assert_eq!(data_to_cell(&Data::String(String::new())), Cell::Na);
    }

    #[test]
    fn test_cell_text_for_pinned_columns() {
        assert_eq!(cell_text(&Cell::Na), None);
        assert_eq!(cell_text(&Cell::Int(7)), Some("7".to_string()));
        assert_eq!(cell_text(&Cell::Float(7.0)), Some("7".to_string()));
        assert_eq!(cell_text(&Cell::Float(7.5)), Some("7.5".to_string()));
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(cell_text(&Cell::Date(d)), Some("2024-03-01".to_string()));
    }

    fn fixture() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/people.xlsx")
    }

    #[test]
    fn test_reads_first_sheet() {
        let frame = read_excel(&fixture(), &ReadOptions::default()).unwrap();
        assert_eq!(frame.column_names(), vec!["code", "name", "n", "joined"]);
        assert_eq!(frame.nrows(), 2);
        assert_eq!(
            frame.column("name").unwrap().values,
            vec![Cell::Str("Ann Lee".into()), Cell::Str("Bob".into())]
        );
        assert_eq!(frame.column("n").unwrap().values[1], Cell::Float(2.0));
        assert_eq!(
            frame.column("joined").unwrap().values[0],
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_pinned_string_column_from_numbers() {
        let options = ReadOptions::new(["code".to_string()].into_iter().collect(), Default::default());
        let frame = read_excel(&fixture(), &options).unwrap();
        assert_eq!(
            frame.column("code").unwrap().values,
            vec![Cell::Str("007".into()), Cell::Str("10".into())]
        );
    }

    #[test]
    fn test_missing_workbook() {
        let err = read_excel(Path::new("/no/such/book.xlsx"), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, FrameError::Excel { .. }));
    }
}
