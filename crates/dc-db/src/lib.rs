//! dc-db - Database abstraction layer for data-check
//!
//! This crate provides the `Database` trait, per-dialect `Capabilities`,
//! connection-string handling, table introspection types, and the DuckDB
//! backend.

pub mod connection;
pub mod dialect;
pub mod duckdb;
pub mod error;
pub mod table_info;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use connection::connect;
pub use dialect::{Capabilities, Dialect};
pub use error::{DbError, DbResult};
pub use table_info::{ColumnInfo, ColumnMeta, TableInfo};
pub use traits::{Database, QueryRows};
