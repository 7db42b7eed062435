//! Column-oriented in-memory table

use crate::error::{FrameError, FrameResult};
use dc_core::{Cell, DType};

/// One named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<Cell>,
}

impl Column {
    /// Build a column, inferring its type from the values
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        let dtype = Self::infer_dtype(&values);
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Common type of all non-missing values.
    ///
    /// A column without values is `Null`; values with no common type make
    /// the column `Str`, the catch-all object type.
    pub fn infer_dtype(values: &[Cell]) -> DType {
        let mut dtype = DType::Null;
        for cell in values {
            if let Some(t) = cell.dtype() {
                match dtype.unify(t) {
                    Some(u) => dtype = u,
                    None => return DType::Str,
                }
            }
        }
        dtype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A table of equally long named columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<Column>,
}

impl Frame {
    /// Build from equally long columns
    pub fn from_columns(columns: Vec<Column>) -> FrameResult<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            for column in &columns {
                if column.len() != expected {
                    return Err(FrameError::RowShape {
                        row: 0,
                        found: column.len(),
                        expected,
                    });
                }
            }
        }
        Ok(Self { columns })
    }

    /// Build from row-major values, inferring column types
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Cell>>) -> FrameResult<Self> {
        let width = names.len();
        let mut values: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(FrameError::RowShape {
                    row: i,
                    found: row.len(),
                    expected: width,
                });
            }
            for (col, cell) in values.iter_mut().zip(row) {
                col.push(cell);
            }
        }
        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, vals)| Column::new(name, vals))
            .collect();
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    /// Values of row `i`, in column order
    pub fn row(&self, i: usize) -> Vec<Cell> {
        self.columns.iter().map(|c| c.values[i].clone()).collect()
    }

    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.nrows()).map(|i| self.row(i)).collect()
    }

    /// Append a column of the same length
    pub fn push_column(&mut self, column: Column) -> FrameResult<()> {
        if !self.columns.is_empty() && column.len() != self.nrows() {
            return Err(FrameError::RowShape {
                row: 0,
                found: column.len(),
                expected: self.nrows(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Keep only the named columns, in the given order
    pub fn select(&self, names: &[String]) -> FrameResult<Frame> {
        let columns = names
            .iter()
            .map(|n| {
                self.column(n)
                    .cloned()
                    .ok_or_else(|| FrameError::ColumnNotFound(n.clone()))
            })
            .collect::<FrameResult<Vec<_>>>()?;
        Ok(Frame { columns })
    }

    /// Rows at the given indices, in that order
    pub fn take(&self, indices: &[usize]) -> Frame {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Frame { columns }
    }

    /// Re-derive every column type from its current values
    pub fn refresh_dtypes(&mut self) {
        for column in &mut self.columns {
            column.dtype = Column::infer_dtype(&column.values);
        }
    }

    /// Replace empty strings with the missing-value sentinel
    pub fn empty_strings_to_na(&mut self) {
        for column in &mut self.columns {
            for cell in &mut column.values {
                if matches!(cell, Cell::Str(s) if s.is_empty()) {
                    *cell = Cell::Na;
                }
            }
            column.dtype = Column::infer_dtype(&column.values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Cell {
        Cell::Str(v.to_string())
    }

    #[test]
    fn test_from_rows_infers_types() {
        let f = Frame::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![Cell::Int(1), s("x"), Cell::Na],
                vec![Cell::Float(2.5), Cell::Na, Cell::Na],
            ],
        )
        .unwrap();
        assert_eq!(f.nrows(), 2);
        assert_eq!(f.column("a").unwrap().dtype, DType::Float);
        assert_eq!(f.column("b").unwrap().dtype, DType::Str);
        assert_eq!(f.column("c").unwrap().dtype, DType::Null);
    }

    #[test]
    fn test_mixed_values_are_object() {
        assert_eq!(Column::infer_dtype(&[Cell::Int(1), s("a")]), DType::Str);
        assert_eq!(Column::infer_dtype(&[Cell::Bool(true), Cell::Int(1)]), DType::Str);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Frame::from_rows(vec!["a".into()], vec![vec![Cell::Int(1), Cell::Int(2)]])
            .unwrap_err();
        assert!(matches!(err, FrameError::RowShape { row: 0, found: 2, expected: 1 }));
    }

    #[test]
    fn test_select_and_take() {
        let f = Frame::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Int(1), s("x")], vec![Cell::Int(2), s("y")]],
        )
        .unwrap();
        let picked = f.select(&["b".to_string()]).unwrap().take(&[1]);
        assert_eq!(picked.rows(), vec![vec![s("y")]]);
        assert!(matches!(
            f.select(&["zz".to_string()]),
            Err(FrameError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_empty_strings_to_na() {
        let mut f = Frame::from_rows(vec!["a".into()], vec![vec![s("")], vec![s("v")]]).unwrap();
        f.empty_strings_to_na();
        assert_eq!(f.rows(), vec![vec![Cell::Na], vec![s("v")]]);
    }
}
