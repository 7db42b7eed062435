//! Shared utilities for CLI commands

use anyhow::Result;
use dc_check::{collect_checks, CheckContext, CheckResult, Runner};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Error type representing a non-zero process exit code.
///
/// Return `Err(ExitCode(N).into())` instead of calling `std::process::exit`
/// so destructors run before `main` exits.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the failure was already reported.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Fail with exit code 1 unless `ok`
pub(crate) fn exit_unless(ok: bool) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

/// Run the checks found under `paths`, print each result and a summary
pub(crate) async fn run_and_report(ctx: &CheckContext, paths: &[PathBuf]) -> Result<Vec<CheckResult>> {
    let checks = collect_checks(paths, ctx.settings.generate);
    log::debug!("Running {} checks with {} workers", checks.len(), ctx.settings.workers);

    let runner = Runner::from_settings(&ctx.settings);
    let output = Arc::clone(&ctx.output);
    let results = runner
        .run_checks(checks, ctx, |result| output.print_result(result))
        .await;
    ctx.output.print_summary(&results);

    if runner.was_cancelled() {
        ctx.output.print("Interrupted");
        return Err(ExitCode(130).into());
    }
    Ok(results)
}
