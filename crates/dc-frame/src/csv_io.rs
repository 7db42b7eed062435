//! CSV expectation files: reading with comment/escape handling, stable writing.

use crate::error::{FrameError, FrameResult};
use crate::frame::{Column, Frame};
use crate::infer::{text_column, ReadOptions};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Read a CSV file into a frame.
///
/// Empty fields become the missing-value sentinel; no other spelling
/// (`NA`, `null`, ...) is treated as missing. Lines starting with `#` are
/// comments and `\` escapes the next character inside a quoted field.
pub fn read_csv(path: &Path, options: &ReadOptions) -> FrameResult<Frame> {
    let file = File::open(path).map_err(|source| FrameError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_csv_from(file, options)
}

/// Read CSV from any reader
pub fn read_csv_from<R: Read>(reader: R, options: &ReadOptions) -> FrameResult<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .escape(Some(b'\\'))
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, field) in raw.iter_mut().zip(record.iter()) {
            column.push((!field.is_empty()).then(|| field.to_string()));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(raw)
        .map(|(name, values)| text_column(name, values, options.hint_for(name)))
        .collect();
    Frame::from_columns(columns)
}

/// Write a frame as CSV to a file, creating parent directories
pub fn write_csv(frame: &Frame, path: &Path) -> FrameResult<()> {
    let io_err = |source| FrameError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let file = File::create(path).map_err(io_err)?;
    write_csv_to(frame, file)
}

/// Write CSV with `\n` line endings.
///
/// Fields starting with `#` are quoted so reading the file back does not
/// take them for comments. Missing values are written as empty fields.
pub fn write_csv_to<W: Write>(frame: &Frame, writer: W) -> FrameResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .comment(Some(b'#'))
        .from_writer(writer);

    if frame.ncols() > 0 {
        writer.write_record(frame.column_names())?;
    }
    for i in 0..frame.nrows() {
        let record: Vec<String> = frame.columns().iter().map(|c| c.values[i].render()).collect();
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| FrameError::Io {
        path: "<csv writer>".to_string(),
        source,
    })?;
    Ok(())
}

/// Render a frame as a CSV string
pub fn to_csv_string(frame: &Frame) -> FrameResult<String> {
    let mut buf = Vec::new();
    write_csv_to(frame, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
#[path = "csv_io_test.rs"]
mod tests;
