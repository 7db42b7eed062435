//! DuckDB database backend implementation

use crate::dialect::{Capabilities, Dialect};
use crate::error::{DbError, DbResult};
use crate::table_info::{ColumnMeta, TableInfo};
use crate::traits::{Database, QueryRows};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use dc_core::sql_utils::{quote_column_list, quote_ident};
use dc_core::{Cell, TableRef};
use duckdb::types::{TimeUnit, Value};
use duckdb::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    capabilities: Capabilities,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path.is_empty() || path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            capabilities: Dialect::DuckDb.capabilities(),
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn default_schema(&self) -> &'static str {
        self.capabilities.default_schema.unwrap_or("main")
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    /// Run a query and convert every value to a `Cell`.
    ///
    /// DuckDB panics on `stmt.column_count()` before execution, so rows are
    /// collected first and column metadata read afterwards.
    fn query_sync(&self, sql: &str) -> DbResult<QueryRows> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;

        let rows: Vec<Vec<Cell>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, Value>(i).map(value_to_cell))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let columns = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map_or("?".to_string(), |v| v.to_string())
            })
            .collect();

        Ok(QueryRows { columns, rows })
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, table: &TableRef) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            params![table.schema_or(self.default_schema()), table.name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// `information_schema` table type, e.g. `BASE TABLE` or `VIEW`
    fn relation_type_sync(&self, table: &TableRef) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT table_type FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
        )?;
        let mut types = stmt.query_map(params![table.schema_or(self.default_schema()), table.name], |row| {
            row.get::<_, String>(0)
        })?;
        Ok(types.next().transpose()?)
    }

    fn table_info_sync(&self, table: &TableRef) -> DbResult<TableInfo> {
        let schema = table.schema_or(self.default_schema()).to_string();
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT column_name, data_type FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? \
             ORDER BY ordinal_position",
        )?;
        let columns: Vec<ColumnMeta> = stmt
            .query_map(params![schema, table.name], |row| {
                Ok(ColumnMeta::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Ok(TableInfo::missing(table));
        }

        let mut stmt = conn.prepare(
            "SELECT kcu.column_name \
             FROM information_schema.table_constraints tc \
             JOIN information_schema.key_column_usage kcu \
               ON tc.constraint_name = kcu.constraint_name \
              AND tc.table_schema = kcu.table_schema \
              AND tc.table_name = kcu.table_name \
             WHERE tc.constraint_type = 'PRIMARY KEY' \
               AND tc.table_schema = ? AND tc.table_name = ? \
             ORDER BY kcu.ordinal_position",
        )?;
        let primary_keys: Vec<String> = stmt
            .query_map(params![schema, table.name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableInfo {
            table: table.clone(),
            exists: true,
            columns,
            primary_keys,
        })
    }

    /// Insert rows inside one transaction, optionally resolving key conflicts
    fn write_rows_sync(
        &self,
        table: &TableRef,
        columns: &[String],
        rows: &[Vec<Cell>],
        conflict_keys: Option<&[String]>,
    ) -> DbResult<usize> {
        if let Some((row, values)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(DbError::RowShape {
                row,
                found: values.len(),
                expected: columns.len(),
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = insert_sql(table, columns, conflict_keys);
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx
                .prepare(&sql)
                .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter().map(cell_to_value)))?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }
}

/// Build the parameterised INSERT (with ON CONFLICT clause for upserts)
fn insert_sql(table: &TableRef, columns: &[String], conflict_keys: Option<&[String]>) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.quoted(),
        quote_column_list(columns),
        placeholders
    );
    if let Some(keys) = conflict_keys {
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !keys.contains(c))
            .map(|c| format!("{0} = EXCLUDED.{0}", quote_ident(c)))
            .collect();
        let action = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };
        sql.push_str(&format!(
            " ON CONFLICT ({}) {}",
            quote_column_list(keys),
            action
        ));
    }
    sql
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn micros_to_cell(micros: i64) -> Cell {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => Cell::DateTime(dt.naive_utc()),
        None => Cell::Str(micros.to_string()),
    }
}

fn unit_to_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Convert a DuckDB value into the shared cell representation
pub(crate) fn value_to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Na,
        Value::Boolean(b) => Cell::Bool(b),
        Value::TinyInt(i) => Cell::Int(i64::from(i)),
        Value::SmallInt(i) => Cell::Int(i64::from(i)),
        Value::Int(i) => Cell::Int(i64::from(i)),
        Value::BigInt(i) => Cell::Int(i),
        Value::UTinyInt(i) => Cell::Int(i64::from(i)),
        Value::USmallInt(i) => Cell::Int(i64::from(i)),
        Value::UInt(i) => Cell::Int(i64::from(i)),
        Value::UBigInt(i) => i64::try_from(i)
            .map(Cell::Int)
            .unwrap_or(Cell::Float(i as f64)),
        Value::HugeInt(i) => i64::try_from(i)
            .map(Cell::Int)
            .unwrap_or(Cell::Float(i as f64)),
        Value::Float(f) => Cell::Float(f64::from(f)),
        Value::Double(f) => Cell::Float(f),
        Value::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(Cell::Float).unwrap_or(Cell::Str(text))
        }
        Value::Text(s) => Cell::Str(s),
        Value::Enum(s) => Cell::Str(s),
        Value::Blob(b) => Cell::Str(String::from_utf8_lossy(&b).into_owned()),
        Value::Date32(days) => epoch()
            .checked_add_signed(chrono::Duration::days(i64::from(days)))
            .map(Cell::Date)
            .unwrap_or(Cell::Na),
        Value::Timestamp(unit, v) => micros_to_cell(unit_to_micros(unit, v)),
        Value::Time64(unit, v) => {
            let micros = unit_to_micros(unit, v);
            let secs = micros.div_euclid(1_000_000) as u32;
            let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
                .map(|t| Cell::Str(t.format("%H:%M:%S").to_string()))
                .unwrap_or(Cell::Na)
        }
        other => Cell::Str(format!("{:?}", other)),
    }
}

/// Convert a cell into a bindable DuckDB value
pub(crate) fn cell_to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Na => Value::Null,
        Cell::Bool(b) => Value::Boolean(*b),
        Cell::Int(i) => Value::BigInt(*i),
        Cell::Float(f) if f.is_nan() => Value::Null,
        Cell::Float(f) => Value::Double(*f),
        Cell::Str(s) => Value::Text(s.clone()),
        Cell::Date(d) => Value::Date32(d.signed_duration_since(epoch()).num_days() as i32),
        Cell::DateTime(dt) => {
            Value::Timestamp(TimeUnit::Microsecond, dt.and_utc().timestamp_micros())
        }
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query(&self, sql: &str) -> DbResult<QueryRows> {
        self.query_sync(sql)
    }

    async fn test_connection(&self) -> DbResult<()> {
        self.query_sync("SELECT 1").map(|_| ())
    }

    async fn relation_exists(&self, table: &TableRef) -> DbResult<bool> {
        self.relation_exists_sync(table)
    }

    async fn table_info(&self, table: &TableRef) -> DbResult<TableInfo> {
        self.table_info_sync(table)
    }

    async fn insert_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        rows: &[Vec<Cell>],
    ) -> DbResult<usize> {
        self.write_rows_sync(table, columns, rows, None)
    }

    async fn upsert_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        keys: &[String],
        rows: &[Vec<Cell>],
    ) -> DbResult<usize> {
        self.write_rows_sync(table, columns, rows, Some(keys))
    }

    async fn drop_if_exists(&self, table: &TableRef) -> DbResult<()> {
        // Dropping a view with DROP TABLE (or the reverse) is an error
        let kind = match self.relation_type_sync(table)?.as_deref() {
            None => return Ok(()),
            Some("VIEW") => "VIEW",
            Some(_) => "TABLE",
        };
        self.execute_sync(&format!("DROP {} IF EXISTS {}", kind, table.quoted()))?;
        Ok(())
    }

    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()> {
        self.execute_sync(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema)))?;
        Ok(())
    }

    fn worker_connection(&self) -> DbResult<Arc<dyn Database>> {
        let conn = self.lock()?;
        let cloned = conn
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Arc::new(Self::from_connection(cloned)))
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
