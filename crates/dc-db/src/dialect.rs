//! SQL dialects and the capability record consulted instead of per-dialect subclasses.

use dc_core::TableRef;
use std::fmt;

/// Database dialect, detected from the connection string scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    DuckDb,
    Sqlite,
    Postgres,
    Mssql,
    Oracle,
    Databricks,
    Other,
}

impl Dialect {
    /// Detect the dialect from a URL-style connection string such as
    /// `postgresql+psycopg2://...` or `duckdb:///file.db`.
    pub fn from_connection_string(connection: &str) -> Self {
        let scheme = connection
            .split("://")
            .next()
            .unwrap_or_default()
            .split('+')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match scheme.as_str() {
            "duckdb" => Dialect::DuckDb,
            "sqlite" => Dialect::Sqlite,
            "postgresql" | "postgres" => Dialect::Postgres,
            "mssql" => Dialect::Mssql,
            "oracle" => Dialect::Oracle,
            "databricks" => Dialect::Databricks,
            _ => Dialect::Other,
        }
    }

    /// Capability record for this dialect
    pub fn capabilities(&self) -> Capabilities {
        let base = Capabilities {
            dialect: *self,
            truncate_table: true,
            native_upsert: false,
            identity_insert: false,
            bind_clob: true,
            named_parameters: true,
            default_schema: None,
        };
        match self {
            Dialect::DuckDb => Capabilities {
                native_upsert: true,
                default_schema: Some("main"),
                ..base
            },
            Dialect::Sqlite => Capabilities {
                truncate_table: false,
                native_upsert: true,
                default_schema: Some("main"),
                ..base
            },
            Dialect::Postgres => Capabilities {
                native_upsert: true,
                default_schema: Some("public"),
                ..base
            },
            Dialect::Mssql => Capabilities {
                identity_insert: true,
                default_schema: Some("dbo"),
                ..base
            },
            Dialect::Oracle => Capabilities {
                bind_clob: false,
                ..base
            },
            Dialect::Databricks => Capabilities {
                named_parameters: false,
                ..base
            },
            Dialect::Other => base,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::DuckDb => "duckdb",
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgresql",
            Dialect::Mssql => "mssql",
            Dialect::Oracle => "oracle",
            Dialect::Databricks => "databricks",
            Dialect::Other => "other",
        };
        f.write_str(name)
    }
}

/// What a dialect supports, consulted by the loader and SQL layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub dialect: Dialect,

    /// `TRUNCATE TABLE` is available; otherwise rows are removed with `DELETE FROM`
    pub truncate_table: bool,

    /// A single-statement upsert exists; otherwise delete-then-insert is used
    pub native_upsert: bool,

    /// Identity columns require `SET IDENTITY_INSERT` around explicit inserts
    pub identity_insert: bool,

    /// Long strings may be bound as CLOB parameters
    pub bind_clob: bool,

    /// The driver accepts named bind parameters
    pub named_parameters: bool,

    /// Schema used when a table reference has none
    pub default_schema: Option<&'static str>,
}

impl Capabilities {
    /// Statement that removes every row while keeping the table
    pub fn truncate_sql(&self, table: &TableRef) -> String {
        if self.truncate_table {
            format!("TRUNCATE TABLE {}", table.quoted())
        } else {
            format!("DELETE FROM {}", table.quoted())
        }
    }

    /// Statements wrapping an explicit insert into an identity column
    pub fn identity_insert_sql(&self, table: &TableRef) -> Option<(String, String)> {
        self.identity_insert.then(|| {
            (
                format!("SET IDENTITY_INSERT {} ON", table.quoted()),
                format!("SET IDENTITY_INSERT {} OFF", table.quoted()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_dialects() {
        assert_eq!(
            Dialect::from_connection_string("duckdb:///x.db"),
            Dialect::DuckDb
        );
        assert_eq!(
            Dialect::from_connection_string("postgresql+psycopg2://u@h/db"),
            Dialect::Postgres
        );
        assert_eq!(
            Dialect::from_connection_string("mssql+pyodbc://u@dsn"),
            Dialect::Mssql
        );
        assert_eq!(
            Dialect::from_connection_string("sqlite+pysqlite:///a.db"),
            Dialect::Sqlite
        );
        assert_eq!(Dialect::from_connection_string("nonsense"), Dialect::Other);
    }

    #[test]
    fn test_sqlite_uses_delete() {
        let t = TableRef::parse("t").unwrap();
        assert_eq!(
            Dialect::Sqlite.capabilities().truncate_sql(&t),
            r#"DELETE FROM "t""#
        );
        assert_eq!(
            Dialect::DuckDb.capabilities().truncate_sql(&t),
            r#"TRUNCATE TABLE "t""#
        );
    }

    #[test]
    fn test_identity_insert_only_for_mssql() {
        let t = TableRef::parse("dbo.t").unwrap();
        let (on, off) = Dialect::Mssql
            .capabilities()
            .identity_insert_sql(&t)
            .unwrap();
        assert_eq!(on, r#"SET IDENTITY_INSERT "dbo"."t" ON"#);
        assert_eq!(off, r#"SET IDENTITY_INSERT "dbo"."t" OFF"#);
        assert!(Dialect::DuckDb
            .capabilities()
            .identity_insert_sql(&t)
            .is_none());
    }

    #[test]
    fn test_oracle_and_databricks_binding_flags() {
        assert!(!Dialect::Oracle.capabilities().bind_clob);
        assert!(!Dialect::Databricks.capabilities().named_parameters);
    }
}
