//! Ping command implementation

use anyhow::Result;
use dc_check::sql::ping;

use super::common::exit_unless;
use crate::cli::{GlobalArgs, PingArgs};
use crate::context::RuntimeContext;

/// Execute the ping command
pub async fn execute(args: &PingArgs, global: &GlobalArgs) -> Result<()> {
    let rt = RuntimeContext::new(global).await?;
    let ok = ping(&rt.ctx, args.wait, args.timeout, args.retry).await;
    if ok {
        rt.ctx.output.print("connected");
    }
    exit_unless(ok)
}
