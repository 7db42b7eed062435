//! Load command implementation

use anyhow::{Context, Result};
use dc_check::loader::load_tables_from_files;

use super::common::exit_unless;
use crate::cli::{GlobalArgs, LoadArgs};
use crate::context::RuntimeContext;

/// Execute the load command
pub async fn execute(args: &LoadArgs, global: &GlobalArgs) -> Result<()> {
    let rt = RuntimeContext::new(global).await?;
    let mode = args.mode.unwrap_or(rt.ctx.settings.default_load_mode);

    let ok = load_tables_from_files(&rt.ctx, &args.paths, args.table.as_deref(), mode)
        .await
        .context("Failed to load files")?;
    exit_unless(ok)
}
