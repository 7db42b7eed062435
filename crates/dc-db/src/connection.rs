//! Turning a connection string into a live `Database`.

use crate::dialect::Dialect;
use crate::duckdb::DuckDbBackend;
use crate::error::{DbError, DbResult};
use crate::traits::Database;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a DuckDB connection string points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuckDbTarget {
    InMemory,
    File(PathBuf),
}

/// Parse `duckdb:///relative.db`, `duckdb:////abs/file.db`, `duckdb:///:memory:`
/// or bare `duckdb://`. Relative paths resolve against `root`.
pub fn parse_duckdb_target(connection: &str, root: &Path) -> DbResult<DuckDbTarget> {
    let rest = connection
        .strip_prefix("duckdb://")
        .ok_or_else(|| DbError::InvalidConnectionString(connection.to_string()))?;
    let path = rest.strip_prefix('/').unwrap_or(rest);
    let path = path.split('?').next().unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return Ok(DuckDbTarget::InMemory);
    }
    let path = Path::new(path);
    if path.is_absolute() {
        Ok(DuckDbTarget::File(path.to_path_buf()))
    } else {
        Ok(DuckDbTarget::File(root.join(path)))
    }
}

/// Open a connection for the given (already env-expanded) connection string
pub fn connect(connection: &str, root: &Path) -> DbResult<Arc<dyn Database>> {
    let dialect = Dialect::from_connection_string(connection);
    log::debug!("Connecting with dialect {}", dialect);
    match dialect {
        Dialect::DuckDb => {
            let backend = match parse_duckdb_target(connection, root)? {
                DuckDbTarget::InMemory => DuckDbBackend::in_memory()?,
                DuckDbTarget::File(path) => DuckDbBackend::from_path(&path)?,
            };
            Ok(Arc::new(backend))
        }
        other => Err(DbError::NotImplemented {
            backend: other.to_string(),
            feature: "connections (only duckdb is bundled)".to_string(),
        }),
    }
}
