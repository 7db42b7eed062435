//! Deterministic test data for the `fake` step

use crate::error::{ExecError, ExecResult};
use dc_core::{Cell, LoadMode};
use dc_frame::{Column, Frame};
use serde::Deserialize;
use std::path::Path;

/// One `fake` config file: a table and how to fill each column
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FakeConfig {
    pub table: String,
    pub rows: usize,
    #[serde(default)]
    pub mode: Option<LoadMode>,
    /// Kept in file order
    pub columns: serde_yaml::Mapping,
}

/// Exactly one generator per column
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FakeColumn {
    /// Cycled over the rows
    values: Option<Vec<serde_yaml::Value>>,
    /// Counts up from the start value
    sequence: Option<i64>,
}

fn yaml_cell(value: &serde_yaml::Value) -> Cell {
    match value {
        serde_yaml::Value::Null => Cell::Na,
        serde_yaml::Value::Bool(b) => Cell::Bool(*b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Na),
        },
        serde_yaml::Value::String(s) => Cell::Str(s.clone()),
        other => Cell::Str(serde_yaml::to_string(other).unwrap_or_default().trim().to_string()),
    }
}

impl FakeConfig {
    pub fn load(path: &Path) -> ExecResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ExecError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| ExecError::InvalidStep {
            kind: "fake".to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Build the rows described by this config
    pub fn frame(&self) -> ExecResult<Frame> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, spec) in &self.columns {
            let name = name.as_str().ok_or_else(|| ExecError::InvalidStep {
                kind: "fake".to_string(),
                message: format!("column names must be strings in config for {}", self.table),
            })?;
            let spec: FakeColumn =
                serde_yaml::from_value(spec.clone()).map_err(|e| ExecError::InvalidStep {
                    kind: "fake".to_string(),
                    message: format!("column {}: {}", name, e),
                })?;
            let values = match (spec.values, spec.sequence) {
                (Some(values), None) if values.is_empty() => vec![Cell::Na; self.rows],
                (Some(values), None) => (0..self.rows)
                    .map(|i| yaml_cell(&values[i % values.len()]))
                    .collect(),
                (None, Some(start)) => (0..self.rows)
                    .map(|i| Cell::Int(start + i as i64))
                    .collect(),
                _ => {
                    return Err(ExecError::InvalidStep {
                        kind: "fake".to_string(),
                        message: format!("column {}: give exactly one of 'values' or 'sequence'", name),
                    })
                }
            };
            columns.push(Column::new(name, values));
        }
        Ok(Frame::from_columns(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_cycle_and_sequences_count() {
        let config: FakeConfig = serde_yaml::from_str(
            "table: s.people\nrows: 5\ncolumns:\n  id: {sequence: 10}\n  kind: {values: [a, b]}\n  score: {values: [1.5, null]}\n",
        )
        .unwrap();
        let frame = config.frame().unwrap();

        assert_eq!(frame.column_names(), vec!["id", "kind", "score"]);
        assert_eq!(frame.nrows(), 5);
        assert_eq!(frame.row(0), vec![Cell::Int(10), Cell::Str("a".into()), Cell::Float(1.5)]);
        assert_eq!(frame.row(3), vec![Cell::Int(13), Cell::Str("b".into()), Cell::Na]);
        assert_eq!(frame.row(4)[1], Cell::Str("a".into()));
    }

    #[test]
    fn test_mode_parsed() {
        let config: FakeConfig =
            serde_yaml::from_str("table: t\nrows: 1\nmode: append\ncolumns: {a: {sequence: 1}}\n")
                .unwrap();
        assert_eq!(config.mode, Some(LoadMode::Append));
    }

    #[test]
    fn test_unknown_column_generator() {
        let config: FakeConfig =
            serde_yaml::from_str("table: t\nrows: 1\ncolumns: {a: {random: 1}}\n").unwrap();
        assert!(config.frame().is_err());
    }

    #[test]
    fn test_column_needs_exactly_one_generator() {
        for columns in ["{a: {}}", "{a: {sequence: 1, values: [x]}}"] {
            let config: FakeConfig =
                serde_yaml::from_str(&format!("table: t\nrows: 1\ncolumns: {}\n", columns)).unwrap();
            let err = config.frame().unwrap_err();
            assert!(matches!(err, ExecError::InvalidStep { .. }), "{columns}");
        }
    }
}
