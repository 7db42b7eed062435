use super::{sibling, Check};
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::error::ExecResult;
use crate::result::CheckResult;
use crate::sql::{prepare_sql_file, run_query};
use async_trait::async_trait;
use dc_frame::write_csv;
use std::path::{Path, PathBuf};

/// Writes `<stem>.csv` from the result of `<stem>.sql`.
///
/// An existing expectation is left alone unless generation is forced.
/// The database is only read.
pub struct GeneratorCheck {
    sql_file: PathBuf,
}

impl GeneratorCheck {
    pub fn new(sql_file: impl Into<PathBuf>) -> Self {
        Self {
            sql_file: sql_file.into(),
        }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::Generator)
    }

    pub fn expectation(&self) -> PathBuf {
        sibling(&self.sql_file, "csv")
    }

    async fn generate(&self, ctx: &CheckContext) -> ExecResult<CheckResult> {
        let target = self.expectation();
        if target.exists() && !ctx.settings.force {
            log::info!("{} exists; skipping", target.display());
            return Ok(CheckResult::passed_with_message(&self.sql_file, "SKIPPED"));
        }
        let prepared = prepare_sql_file(ctx, &self.sql_file)?;
        let result = run_query(ctx, &prepared).await?;
        write_csv(&result.frame, &target)?;
        log::info!("Wrote {} rows to {}", result.len(), target.display());
        Ok(CheckResult::passed_with_message(&self.sql_file, "WRITTEN"))
    }
}

#[async_trait]
impl Check for GeneratorCheck {
    fn source(&self) -> &Path {
        &self.sql_file
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Generator
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        self.generate(ctx)
            .await
            .unwrap_or_else(|e| CheckResult::exception(&self.sql_file, &e))
    }
}
