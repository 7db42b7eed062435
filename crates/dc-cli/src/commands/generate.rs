//! Gen command implementation: write expectation files from query results

use anyhow::Result;

use super::common::{exit_unless, run_and_report};
use crate::cli::{GenArgs, GlobalArgs};
use crate::context::RuntimeContext;

/// Execute the gen command
pub async fn execute(args: &GenArgs, global: &GlobalArgs) -> Result<()> {
    let rt = RuntimeContext::new(global).await?;
    let mut settings = rt.ctx.settings.clone();
    settings.generate = true;
    settings.force = args.force;
    let ctx = rt.ctx.clone().with_settings(settings);

    let results = run_and_report(&ctx, &rt.paths_or_checks(&args.paths)).await?;
    exit_unless(results.iter().all(|r| r.passed))
}
