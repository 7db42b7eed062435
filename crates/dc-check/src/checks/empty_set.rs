use super::Check;
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::error::ExecResult;
use crate::result::CheckResult;
use crate::sql::{prepare_sql_file, run_query};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// `<stem>.sql` next to a `<stem>.empty` marker: the query must return no rows
pub struct EmptySetCheck {
    sql_file: PathBuf,
}

impl EmptySetCheck {
    pub fn new(sql_file: impl Into<PathBuf>) -> Self {
        Self {
            sql_file: sql_file.into(),
        }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::EmptySet)
    }

    async fn try_run(&self, ctx: &CheckContext) -> ExecResult<CheckResult> {
        let prepared = prepare_sql_file(ctx, &self.sql_file)?;
        let result = run_query(ctx, &prepared).await?;
        if result.is_empty() {
            return Ok(CheckResult::passed(&self.sql_file));
        }
        Ok(CheckResult::different_length(
            &self.sql_file,
            format!("expected no rows, got {}", result.len()),
            Some(result.frame),
        ))
    }
}

#[async_trait]
impl Check for EmptySetCheck {
    fn source(&self) -> &Path {
        &self.sql_file
    }

    fn kind(&self) -> CheckKind {
        CheckKind::EmptySet
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        if ctx.settings.generate {
            return CheckResult::passed_with_message(&self.sql_file, "SKIPPED (empty set check)");
        }
        self.try_run(ctx)
            .await
            .unwrap_or_else(|e| CheckResult::exception(&self.sql_file, &e))
    }
}
