//! Text rendering of frames for failure output

use crate::csv_io::to_csv_string;
use crate::error::FrameResult;
use crate::frame::Frame;
use dc_core::{Cell, PrintFormat};
use serde_json::{Map, Number, Value};

/// Render a frame in the configured print format
pub fn render_frame(frame: &Frame, format: PrintFormat) -> FrameResult<String> {
    match format {
        PrintFormat::Pandas => Ok(render_table(frame)),
        PrintFormat::Csv => to_csv_string(frame),
        PrintFormat::Json => render_json(frame),
    }
}

/// Right-aligned table with a row index, missing values shown as `NaN`
fn render_table(frame: &Frame) -> String {
    let nrows = frame.nrows();
    let index: Vec<String> = (0..nrows).map(|i| i.to_string()).collect();
    let index_width = index.iter().map(String::len).max().unwrap_or(0);

    let cells: Vec<Vec<String>> = frame
        .columns()
        .iter()
        .map(|c| c.values.iter().map(Cell::to_string).collect())
        .collect();
    let widths: Vec<usize> = frame
        .columns()
        .iter()
        .zip(&cells)
        .map(|(c, vals)| {
            vals.iter()
                .map(|v| v.chars().count())
                .chain(std::iter::once(c.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(index_width));
    for (column, width) in frame.columns().iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", column.name, width = *width));
    }
    for (i, idx) in index.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{:<width$}", idx, width = index_width));
        for (vals, width) in cells.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", vals[i], width = *width));
        }
    }
    out
}

fn cell_json(cell: &Cell) -> Value {
    match cell {
        c if c.is_na() => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(i) => Value::Number((*i).into()),
        Cell::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => Value::String(other.render()),
    }
}

/// Array of records keyed by column name
fn render_json(frame: &Frame) -> FrameResult<String> {
    let records: Vec<Value> = (0..frame.nrows())
        .map(|i| {
            let mut record = Map::new();
            for column in frame.columns() {
                record.insert(column.name.clone(), cell_json(&column.values[i]));
            }
            Value::Object(record)
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}
