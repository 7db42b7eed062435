//! dc-core - Core library for data-check
//!
//! This crate provides the types shared by every other data-check crate:
//! project configuration (`data_check.yml`), qualified table references,
//! load modes, cell values, and SQL quoting helpers.

pub mod config;
pub mod env;
pub mod error;
pub mod load_mode;
pub mod project;
pub mod sql_utils;
pub mod table_ref;
pub mod value;

pub use config::{Config, PrintFormat, CONFIG_FILE_NAME};
pub use error::{CoreError, CoreResult};
pub use load_mode::LoadMode;
pub use project::Project;
pub use table_ref::TableRef;
pub use value::{Cell, DType};
