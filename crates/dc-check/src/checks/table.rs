use super::compare::{compare_with_expectation, ExpectationFormat, SqlText};
use super::Check;
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::error::{ExecError, ExecResult};
use crate::result::CheckResult;
use async_trait::async_trait;
use dc_core::sql_utils::select_columns_from;
use dc_core::TableRef;
use dc_frame::ReadOptions;
use std::path::{Path, PathBuf};

/// An expectation file without SQL: compares the whole table named by the
/// file stem, e.g. `schema.table.csv`, on the columns of its header.
pub struct TableCheck {
    file: PathBuf,
}

impl TableCheck {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::Table)
    }

    fn format(&self) -> ExecResult<ExpectationFormat> {
        ExpectationFormat::from_path(&self.file).ok_or_else(|| ExecError::UnsupportedFile {
            path: self.file.display().to_string(),
        })
    }

    /// `select <header columns> from <stem>`
    pub fn query(&self) -> ExecResult<String> {
        let format = self.format()?;
        let header = format.read(&self.file, &ReadOptions::default())?;
        let stem = self
            .file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let table = TableRef::parse(stem)?;
        Ok(select_columns_from(&header.column_names(), &table.qualified()))
    }
}

#[async_trait]
impl Check for TableCheck {
    fn source(&self) -> &Path {
        &self.file
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Table
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        if ctx.settings.generate {
            return CheckResult::passed_with_message(&self.file, "SKIPPED (table check)");
        }
        let (query, format) = match self.query().and_then(|q| Ok((q, self.format()?))) {
            Ok(v) => v,
            Err(e) => return CheckResult::exception(&self.file, &e),
        };
        compare_with_expectation(ctx, &self.file, &SqlText::Inline(query), &self.file, format).await
    }
}
