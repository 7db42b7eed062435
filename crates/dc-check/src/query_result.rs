//! Query results with the date/string column split used to read expectations

use crate::error::ExecResult;
use dc_core::{Cell, DType};
use dc_db::QueryRows;
use dc_frame::infer::dates_from_strings;
use dc_frame::{Column, Frame, ReadOptions};
use std::collections::BTreeSet;

/// Rows of a SELECT plus the column sets derived from them.
///
/// Every column is in exactly one of `date_columns`, `string_columns`, or
/// [`QueryResult::other_columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub frame: Frame,
    /// Temporal columns, including string columns whose values all parse as ISO dates
    pub date_columns: BTreeSet<String>,
    /// Remaining text columns
    pub string_columns: BTreeSet<String>,
}

impl QueryResult {
    /// Classify columns and convert string dates. `date_hints` force a
    /// column to be a date column when its values allow it.
    pub fn from_rows(rows: QueryRows, date_hints: &BTreeSet<String>) -> ExecResult<Self> {
        let frame = Frame::from_rows(rows.columns, rows.rows)?;
        let mut columns = Vec::with_capacity(frame.ncols());
        let mut date_columns = BTreeSet::new();
        let mut string_columns = BTreeSet::new();

        for column in frame.columns() {
            let column = match column.dtype {
                t if t.is_temporal() => {
                    date_columns.insert(column.name.clone());
                    column.clone()
                }
                DType::Str => match dates_from_strings(&column.values) {
                    Some((values, dtype)) => {
                        date_columns.insert(column.name.clone());
                        Column {
                            name: column.name.clone(),
                            dtype,
                            values,
                        }
                    }
                    None => {
                        string_columns.insert(column.name.clone());
                        column.clone()
                    }
                },
                _ => column.clone(),
            };
            columns.push(column);
        }

        for hinted in date_hints.iter().filter(|h| frame.has_column(h)) {
            if string_columns.contains(hinted) {
                log::debug!("Date hint for '{}' ignored: values are not dates", hinted);
            } else {
                date_columns.insert(hinted.clone());
            }
        }

        Ok(Self {
            frame: Frame::from_columns(columns)?,
            date_columns,
            string_columns,
        })
    }

    pub fn other_columns(&self) -> BTreeSet<String> {
        self.frame
            .column_names()
            .into_iter()
            .filter(|c| !self.date_columns.contains(c) && !self.string_columns.contains(c))
            .collect()
    }

    /// Pins for reading the matching expectation file
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::new(self.string_columns.clone(), self.date_columns.clone())
    }

    pub fn len(&self) -> usize {
        self.frame.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.frame.rows()
    }
}
