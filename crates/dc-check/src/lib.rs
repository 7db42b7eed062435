//! dc-check - Check execution engine for data-check
//!
//! Paths are turned into [`Check`]s by the [`dispatcher`], scheduled by the
//! [`Runner`], and each check produces a [`CheckResult`] that the
//! [`Output`] layer formats. Pipelines sequence loads, SQL, commands and
//! nested checks with always-run teardown.

pub mod checks;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod query_result;
pub mod result;
pub mod runner;
pub mod sql;

pub use checks::Check;
pub use context::{CheckContext, RunSettings};
pub use dispatcher::{collect_checks, get_check, CheckKind, PIPELINE_FILE_NAME};
pub use error::{ExecError, ExecResult};
pub use output::Output;
pub use query_result::QueryResult;
pub use result::{CheckResult, ExceptionInfo, ResultType, Summary};
pub use runner::{CancelHandle, Runner};
