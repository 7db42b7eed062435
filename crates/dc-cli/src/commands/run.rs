//! Run command implementation

use anyhow::Result;

use super::common::{exit_unless, run_and_report};
use crate::cli::{GlobalArgs, RunArgs};
use crate::context::RuntimeContext;

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let rt = RuntimeContext::new(global).await?;
    let paths = rt.paths_or_checks(&args.paths);

    let results = run_and_report(&rt.ctx, &paths).await?;
    exit_unless(results.iter().all(|r| r.passed))
}
