//! Sql command implementation

use anyhow::{Context, Result};
use dc_check::sql::{run_sql, run_sql_file};

use crate::cli::{GlobalArgs, SqlArgs};
use crate::context::RuntimeContext;

/// Execute the sql command
pub async fn execute(args: &SqlArgs, global: &GlobalArgs) -> Result<()> {
    let rt = RuntimeContext::new(global).await?;

    if let Some(query) = &args.query {
        return run_sql(&rt.ctx, query, args.output.as_deref(), args.write_check.as_deref())
            .await
            .context("Failed to run query");
    }
    for file in &args.files {
        run_sql_file(&rt.ctx, file)
            .await
            .with_context(|| format!("Failed to run {}", file.display()))?;
    }
    Ok(())
}
