//! Outer merge of two frames with provenance tagging.
//!
//! Rows are matched on the values of every shared column, with multiset
//! semantics: `n` equal rows on the left and `m` on the right produce
//! `n * m` rows tagged `both`. Missing values match each other.

use crate::error::{FrameError, FrameResult};
use crate::frame::{Column, Frame};
use chrono::{NaiveDateTime, NaiveTime};
use dc_core::{Cell, DType};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name of the provenance column in a merged frame
pub const MERGE_COLUMN: &str = "_merge";

/// Which side(s) a merged row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    LeftOnly,
    RightOnly,
    Both,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::LeftOnly => "left_only",
            Provenance::RightOnly => "right_only",
            Provenance::Both => "both",
        }
    }

    fn from_cell(cell: &Cell) -> Option<Self> {
        match cell.as_str()? {
            "left_only" => Some(Provenance::LeftOnly),
            "right_only" => Some(Provenance::RightOnly),
            "both" => Some(Provenance::Both),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hashable form of a cell used for row matching.
///
/// Whole floats match integers and dates match midnight datetimes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Na,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Time(NaiveDateTime),
}

fn key_of(cell: &Cell) -> Key {
    match cell {
        c if c.is_na() => Key::Na,
        Cell::Bool(b) => Key::Bool(*b),
        Cell::Int(i) => Key::Int(*i),
        Cell::Float(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                Key::Int(*f as i64)
            } else {
                Key::Float(f.to_bits())
            }
        }
        Cell::Str(s) => Key::Str(s.clone()),
        Cell::Date(d) => Key::Time(d.and_time(NaiveTime::MIN)),
        Cell::DateTime(dt) => Key::Time(*dt),
        Cell::Na => Key::Na,
    }
}

fn row_key(frame: &Frame, columns: &[usize], row: usize) -> Vec<Key> {
    columns
        .iter()
        .map(|&c| key_of(&frame.columns()[c].values[row]))
        .collect()
}

fn index_of(frame: &Frame, name: &str) -> usize {
    frame
        .columns()
        .iter()
        .position(|c| c.name == name)
        .unwrap_or_default()
}

/// Outer merge on all shared columns.
///
/// The result holds the shared columns in left order, then columns only
/// on the left, then columns only on the right, then [`MERGE_COLUMN`].
/// When a shared column has incompatible types on the two sides the
/// columns are coerced once (numeric if either side is a float, text
/// otherwise) and the merge is retried; a second failure is returned.
pub fn merge(left: &Frame, right: &Frame) -> FrameResult<Frame> {
    let common: Vec<String> = left
        .column_names()
        .into_iter()
        .filter(|n| right.has_column(n))
        .collect();
    if common.is_empty() {
        return Err(FrameError::NoCommonColumns {
            left: left.column_names().join(", "),
            right: right.column_names().join(", "),
        });
    }

    match merge_on(left, right, &common) {
        Err(FrameError::IncompatibleColumn { column, left: lt, right: rt }) => {
            log::debug!(
                "Column '{}' differs in type ({} vs {}); coercing before merge",
                column,
                lt,
                rt
            );
            let (left, right) = coerce_for_merge(left, right, &common);
            merge_on(&left, &right, &common)
        }
        other => other,
    }
}

fn check_compatible(left: &Frame, right: &Frame, common: &[String]) -> FrameResult<()> {
    for name in common {
        let (Some(l), Some(r)) = (left.column(name), right.column(name)) else {
            return Err(FrameError::ColumnNotFound(name.clone()));
        };
        if l.dtype.unify(r.dtype).is_none() {
            return Err(FrameError::IncompatibleColumn {
                column: name.clone(),
                left: l.dtype.to_string(),
                right: r.dtype.to_string(),
            });
        }
    }
    Ok(())
}

fn merge_on(left: &Frame, right: &Frame, common: &[String]) -> FrameResult<Frame> {
    check_compatible(left, right, common)?;

    let left_keys: Vec<usize> = common.iter().map(|n| index_of(left, n)).collect();
    let right_keys: Vec<usize> = common.iter().map(|n| index_of(right, n)).collect();

    let mut right_groups: HashMap<Vec<Key>, Vec<usize>> = HashMap::new();
    for r in 0..right.nrows() {
        right_groups
            .entry(row_key(right, &right_keys, r))
            .or_default()
            .push(r);
    }

    let mut pairs: Vec<(Option<usize>, Option<usize>, Provenance)> = Vec::new();
    let mut left_seen: HashSet<Vec<Key>> = HashSet::new();
    for l in 0..left.nrows() {
        let key = row_key(left, &left_keys, l);
        match right_groups.get(&key) {
            Some(rs) => pairs.extend(rs.iter().map(|&r| (Some(l), Some(r), Provenance::Both))),
            None => pairs.push((Some(l), None, Provenance::LeftOnly)),
        }
        left_seen.insert(key);
    }
    for r in 0..right.nrows() {
        if !left_seen.contains(&row_key(right, &right_keys, r)) {
            pairs.push((None, Some(r), Provenance::RightOnly));
        }
    }

    let pick = |col: Option<&Column>, idx: Option<usize>| -> Cell {
        match (col, idx) {
            (Some(c), Some(i)) => c.values[i].clone(),
            _ => Cell::Na,
        }
    };

    let mut columns = Vec::new();
    for name in common {
        let (lc, rc) = (left.column(name), right.column(name));
        let values = pairs
            .iter()
            .map(|(l, r, _)| match l {
                Some(_) => pick(lc, *l),
                None => pick(rc, *r),
            })
            .collect();
        columns.push(Column::new(name.clone(), values));
    }
    for column in left.columns().iter().filter(|c| !common.contains(&c.name)) {
        let values = pairs.iter().map(|(l, _, _)| pick(Some(column), *l)).collect();
        columns.push(Column::new(column.name.clone(), values));
    }
    for column in right.columns().iter().filter(|c| !common.contains(&c.name)) {
        let values = pairs.iter().map(|(_, r, _)| pick(Some(column), *r)).collect();
        columns.push(Column::new(column.name.clone(), values));
    }
    columns.push(Column {
        name: MERGE_COLUMN.to_string(),
        dtype: DType::Str,
        values: pairs
            .iter()
            .map(|(_, _, p)| Cell::Str(p.as_str().to_string()))
            .collect(),
    });

    Frame::from_columns(columns)
}

fn coerce_for_merge(left: &Frame, right: &Frame, common: &[String]) -> (Frame, Frame) {
    let mut left = left.clone();
    let mut right = right.clone();
    for name in common {
        let (Some(lc), Some(rc)) = (left.column_mut(name), right.column_mut(name)) else {
            continue;
        };
        if lc.dtype.unify(rc.dtype).is_some() {
            continue;
        }
        if lc.dtype == DType::Float || rc.dtype == DType::Float {
            if let (Some(l), Some(r)) = (to_numeric(&lc.values), to_numeric(&rc.values)) {
                *lc = Column::new(name.clone(), l);
                *rc = Column::new(name.clone(), r);
                continue;
            }
        }
        *lc = Column::new(name.clone(), to_text(&lc.values));
        *rc = Column::new(name.clone(), to_text(&rc.values));
    }
    (left, right)
}

fn to_numeric(values: &[Cell]) -> Option<Vec<Cell>> {
    values
        .iter()
        .map(|c| {
            if c.is_na() {
                Some(Cell::Na)
            } else {
                c.to_f64().map(Cell::Float)
            }
        })
        .collect()
}

fn to_text(values: &[Cell]) -> Vec<Cell> {
    values
        .iter()
        .map(|c| if c.is_na() { Cell::Na } else { Cell::Str(c.render()) })
        .collect()
}

/// Result of comparing a query result (left) with an expectation (right)
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Every merged row with its provenance
    pub merged: Frame,
    pub left_rows: usize,
    pub right_rows: usize,
}

impl Comparison {
    fn provenance(&self, row: usize) -> Option<Provenance> {
        self.merged
            .column(MERGE_COLUMN)
            .and_then(|c| Provenance::from_cell(&c.values[row]))
    }

    /// Rows that are not on both sides, sorted so matching pairs sit together
    pub fn diff(&self) -> Frame {
        let mut rows: Vec<usize> = (0..self.merged.nrows())
            .filter(|&i| self.provenance(i) != Some(Provenance::Both))
            .collect();
        let columns = self.merged.columns();
        rows.sort_by(|&a, &b| {
            columns
                .iter()
                .filter(|c| c.name != MERGE_COLUMN)
                .map(|c| cell_order(&c.values[a], &c.values[b]))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or_else(|| self.provenance(a).cmp(&self.provenance(b)))
        });
        self.merged.take(&rows)
    }

    pub fn has_diff(&self) -> bool {
        (0..self.merged.nrows()).any(|i| self.provenance(i) != Some(Provenance::Both))
    }

    pub fn same_length(&self) -> bool {
        self.left_rows == self.right_rows
    }
}

/// Missing values sort last; numbers compare numerically
fn cell_order(a: &Cell, b: &Cell) -> Ordering {
    match (a.is_na(), b.is_na()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        _ => {}
    }
    match (a, b) {
        (Cell::Str(x), Cell::Str(y)) => x.cmp(y),
        _ => match (a.dtype(), b.dtype()) {
            (Some(ta), Some(tb)) if ta.is_numeric() && tb.is_numeric() => a
                .to_f64()
                .partial_cmp(&b.to_f64())
                .unwrap_or(Ordering::Equal),
            _ => a.render().cmp(&b.render()),
        },
    }
}

/// Normalise both sides and merge them.
///
/// Empty strings count as missing on both sides before matching.
pub fn compare(left: &Frame, right: &Frame) -> FrameResult<Comparison> {
    let mut left = left.clone();
    let mut right = right.clone();
    left.empty_strings_to_na();
    right.empty_strings_to_na();
    let merged = merge(&left, &right)?;
    Ok(Comparison {
        merged,
        left_rows: left.nrows(),
        right_rows: right.nrows(),
    })
}

#[cfg(test)]
#[path = "compare_test.rs"]
mod tests;
