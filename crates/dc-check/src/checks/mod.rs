//! Check kinds.
//!
//! Every check is bound to one path and turns any error it meets into a
//! [`CheckResult`]; nothing escapes `run_test`.

mod compare;
mod empty_set;
mod generator;
mod path_not_exists;
mod pipeline;
mod table;

pub use compare::{CsvCheck, ExcelCheck, ExpectationFormat};
pub use empty_set::EmptySetCheck;
pub use generator::GeneratorCheck;
pub use path_not_exists::PathNotExistsCheck;
pub use pipeline::PipelineCheck;
pub use table::TableCheck;

use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::result::CheckResult;
use async_trait::async_trait;
use std::path::Path;

/// A unit of data-quality verification bound to a path
#[async_trait]
pub trait Check: Send + Sync {
    /// Path the check was created for; reported as the result source
    fn source(&self) -> &Path;

    fn kind(&self) -> CheckKind;

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult;
}

/// Sibling file with the same stem and another extension
pub(crate) fn sibling(path: &Path, extension: &str) -> std::path::PathBuf {
    path.with_extension(extension)
}
