//! Database trait definition

use crate::dialect::Capabilities;
use crate::error::DbResult;
use crate::table_info::TableInfo;
use async_trait::async_trait;
use dc_core::{Cell, TableRef};
use std::sync::Arc;

/// Column names and typed rows returned by a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl QueryRows {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Database abstraction used by checks, the loader, and pipelines.
///
/// Implementations must be Send + Sync; one instance is one connection.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a single statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a script of one or more statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and collect every row
    async fn query(&self, sql: &str) -> DbResult<QueryRows>;

    /// Round-trip a trivial statement to verify the connection works
    async fn test_connection(&self) -> DbResult<()>;

    /// Check if a table or view exists
    async fn relation_exists(&self, table: &TableRef) -> DbResult<bool>;

    /// Column and key metadata for a table; `exists` is false when missing
    async fn table_info(&self, table: &TableRef) -> DbResult<TableInfo>;

    /// Insert rows in one transaction, returns inserted row count
    async fn insert_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        rows: &[Vec<Cell>],
    ) -> DbResult<usize>;

    /// Insert rows, overwriting rows whose `keys` already exist, in one transaction
    async fn upsert_rows(
        &self,
        table: &TableRef,
        columns: &[String],
        keys: &[String],
        rows: &[Vec<Cell>],
    ) -> DbResult<usize>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, table: &TableRef) -> DbResult<()>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// A separate connection to the same database for a parallel worker
    fn worker_connection(&self) -> DbResult<Arc<dyn Database>>;

    /// Dialect capabilities consulted by the loader and SQL layer
    fn capabilities(&self) -> &Capabilities;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
