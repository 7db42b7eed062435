//! Table metadata gathered by introspection.

use dc_core::TableRef;
use std::collections::BTreeSet;

/// One column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    /// Catalog type name, e.g. `VARCHAR`, `DECIMAL(18,3)`, `TIMESTAMP WITH TIME ZONE`
    pub data_type: String,
    /// Column value is generated by the database (MSSQL identity)
    pub is_identity: bool,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_identity: false,
        }
    }

    fn base_type(&self) -> String {
        self.data_type
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase()
    }

    pub fn is_date(&self) -> bool {
        let base = self.base_type();
        base == "DATE" || base.starts_with("TIMESTAMP") || base == "DATETIME" || base == "DATETIME2"
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self.base_type().as_str(),
            "VARCHAR"
                | "CHAR"
                | "BPCHAR"
                | "TEXT"
                | "STRING"
                | "NVARCHAR"
                | "NCHAR"
                | "VARCHAR2"
                | "NVARCHAR2"
                | "CLOB"
                | "CHARACTER VARYING"
                | "CHARACTER"
                | "UUID"
        )
    }
}

/// Column names of a table split by how their values are coerced before writing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    pub date_columns: BTreeSet<String>,
    pub string_columns: BTreeSet<String>,
    pub other_columns: BTreeSet<String>,
}

/// Everything the loader needs to know about a target table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub table: TableRef,
    pub exists: bool,
    pub columns: Vec<ColumnMeta>,
    pub primary_keys: Vec<String>,
}

impl TableInfo {
    /// Metadata for a table that is not in the catalog
    pub fn missing(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            exists: false,
            columns: Vec::new(),
            primary_keys: Vec::new(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_info(&self) -> ColumnInfo {
        let mut info = ColumnInfo::default();
        for column in &self.columns {
            let bucket = if column.is_date() {
                &mut info.date_columns
            } else if column.is_string() {
                &mut info.string_columns
            } else {
                &mut info.other_columns
            };
            bucket.insert(column.name.clone());
        }
        info
    }

    /// True when a primary-key column is an identity column
    pub fn has_identity_key(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.is_identity && self.primary_keys.contains(&c.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TableInfo {
        TableInfo {
            table: TableRef::parse("s.t").unwrap(),
            exists: true,
            columns: vec![
                ColumnMeta::new("id", "INTEGER"),
                ColumnMeta::new("code", "VARCHAR"),
                ColumnMeta::new("created", "TIMESTAMP WITH TIME ZONE"),
                ColumnMeta::new("day", "DATE"),
                ColumnMeta::new("amount", "DECIMAL(18,3)"),
                ColumnMeta::new("label", "character varying(20)"),
            ],
            primary_keys: vec!["id".to_string()],
        }
    }

    #[test]
    fn test_column_info_buckets_are_disjoint() {
        let ci = info().column_info();
        assert_eq!(
            ci.date_columns.iter().cloned().collect::<Vec<_>>(),
            vec!["created", "day"]
        );
        assert_eq!(
            ci.string_columns.iter().cloned().collect::<Vec<_>>(),
            vec!["code", "label"]
        );
        assert_eq!(
            ci.other_columns.iter().cloned().collect::<Vec<_>>(),
            vec!["amount", "id"]
        );
    }

    #[test]
    fn test_identity_key() {
        let mut t = info();
        assert!(!t.has_identity_key());
        t.columns[0].is_identity = true;
        assert!(t.has_identity_key());
    }

    #[test]
    fn test_missing() {
        let t = TableInfo::missing(&TableRef::parse("x").unwrap());
        assert!(!t.exists);
        assert!(t.column_info().date_columns.is_empty());
    }
}
