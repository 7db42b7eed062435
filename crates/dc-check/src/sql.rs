//! SQL file reading, templating and execution helpers

use crate::context::CheckContext;
use crate::error::{ExecError, ExecResult};
use crate::query_result::QueryResult;
use dc_frame::{render_frame, write_csv};
use dc_jinja::TemplateEnvironment;
use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

static DATE_HINT_RE: OnceLock<Regex> = OnceLock::new();

/// A templated SQL text with its date hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSql {
    pub sql: String,
    pub date_hints: BTreeSet<String>,
}

/// Columns named by `-- date: a, b` directives in the leading comment block
pub fn parse_date_hints(sql: &str) -> BTreeSet<String> {
    let re = DATE_HINT_RE
        .get_or_init(|| Regex::new(r"(?i)^--\s*date\s*:\s*(.*)$").expect("valid regex"));
    let mut hints = BTreeSet::new();
    for line in sql.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if !line.starts_with("--") {
            break;
        }
        if let Some(caps) = re.captures(line) {
            hints.extend(
                caps[1]
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            );
        }
    }
    hints
}

pub fn read_sql_file(path: &Path) -> ExecResult<String> {
    std::fs::read_to_string(path).map_err(|e| ExecError::io(path, e))
}

/// Render SQL against the project's template data
pub fn render_sql(ctx: &CheckContext, sql: &str) -> ExecResult<String> {
    let env = TemplateEnvironment::new(&ctx.template_data);
    Ok(env.render(sql)?)
}

/// Read hints from the raw text, then template it
pub fn prepare_sql(ctx: &CheckContext, raw: &str) -> ExecResult<PreparedSql> {
    Ok(PreparedSql {
        date_hints: parse_date_hints(raw),
        sql: render_sql(ctx, raw)?,
    })
}

pub fn prepare_sql_file(ctx: &CheckContext, path: &Path) -> ExecResult<PreparedSql> {
    prepare_sql(ctx, &read_sql_file(path)?)
}

/// True when the last statement produces a result set.
///
/// Text that does not parse falls back to a leading-keyword test.
pub fn returns_rows(sql: &str) -> bool {
    match Parser::parse_sql(&GenericDialect {}, sql) {
        Ok(statements) => statements.last().is_some_and(|s| {
            matches!(
                s,
                Statement::Query(_)
                    | Statement::ShowTables { .. }
                    | Statement::ShowColumns { .. }
                    | Statement::ExplainTable { .. }
                    | Statement::Explain { .. }
            )
        }),
        Err(e) => {
            log::debug!("SQL did not parse ({}); classifying by keyword", e);
            let first = sql
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty() && !l.starts_with("--"))
                .and_then(|l| l.split_whitespace().next())
                .unwrap_or_default()
                .to_ascii_lowercase();
            matches!(
                first.as_str(),
                "select" | "with" | "values" | "from" | "show" | "describe" | "pragma" | "table" | "("
            )
        }
    }
}

/// Run a query and build its [`QueryResult`]
pub async fn run_query(ctx: &CheckContext, prepared: &PreparedSql) -> ExecResult<QueryResult> {
    log::debug!("Running query: {}", prepared.sql.trim());
    let rows = ctx.db.query(&prepared.sql).await?;
    QueryResult::from_rows(rows, &prepared.date_hints)
}

/// Execute a statement script
pub async fn execute_script(ctx: &CheckContext, sql: &str) -> ExecResult<()> {
    log::debug!("Executing statements: {}", sql.trim());
    ctx.db.execute_batch(sql).await?;
    Ok(())
}

fn create_parent(path: &Path) -> ExecResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| ExecError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Run ad-hoc SQL.
///
/// A statement is executed. A query's result is written to `output` as
/// CSV, or saved with the query as a new check pair at `write_check`, or
/// printed when neither is given.
pub async fn run_sql(
    ctx: &CheckContext,
    query: &str,
    output: Option<&Path>,
    write_check: Option<&Path>,
) -> ExecResult<()> {
    let prepared = prepare_sql(ctx, query)?;
    if !returns_rows(&prepared.sql) {
        if let Some(target) = output.or(write_check) {
            return Err(ExecError::NoResultSet {
                target: target.display().to_string(),
            });
        }
        return execute_script(ctx, &prepared.sql).await;
    }

    let result = run_query(ctx, &prepared).await?;
    if let Some(path) = output {
        create_parent(path)?;
        write_csv(&result.frame, path)?;
        log::info!("Wrote {} rows to {}", result.len(), path.display());
    }
    if let Some(sql_path) = write_check {
        create_parent(sql_path)?;
        std::fs::write(sql_path, query).map_err(|e| ExecError::io(sql_path, e))?;
        write_csv(&result.frame, &sql_path.with_extension("csv"))?;
        log::info!("Wrote check {} with {} rows", sql_path.display(), result.len());
    }
    if output.is_none() && write_check.is_none() {
        ctx.output
            .print(&render_frame(&result.frame, ctx.output.print_format())?);
    }
    Ok(())
}

/// Run a SQL file, printing its result if it has one
pub async fn run_sql_file(ctx: &CheckContext, path: &Path) -> ExecResult<()> {
    let prepared = prepare_sql_file(ctx, path)?;
    if returns_rows(&prepared.sql) {
        let result = run_query(ctx, &prepared).await?;
        ctx.output
            .print(&render_frame(&result.frame, ctx.output.print_format())?);
        Ok(())
    } else {
        execute_script(ctx, &prepared.sql).await
    }
}

/// Seconds as a `Duration`; `None` when negative, not finite or too large
pub fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

/// Test the connection; when `wait`, retry every `retry` seconds until `timeout`
pub async fn ping(ctx: &CheckContext, wait: bool, timeout: f64, retry: f64) -> bool {
    let (Some(timeout), Some(retry)) = (seconds(timeout), seconds(retry)) else {
        ctx.output
            .print("ping failed: timeout and retry must be finite, non-negative seconds");
        return false;
    };
    // No deadline when the timeout does not fit on the clock
    let deadline = tokio::time::Instant::now().checked_add(timeout);
    loop {
        match ctx.db.test_connection().await {
            Ok(()) => {
                log::info!("Connection {} is up", ctx.connection_name);
                return true;
            }
            Err(e) if wait && deadline.map_or(true, |d| tokio::time::Instant::now() < d) => {
                log::debug!("Ping failed, retrying: {}", e);
                tokio::time::sleep(retry).await;
            }
            Err(e) => {
                ctx.output.print(&format!("ping failed: {}", e));
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_hints() {
        let sql = "-- date: created, updated\n-- Date:due\n\nselect 1\n-- date: ignored";
        let hints = parse_date_hints(sql);
        let expected: BTreeSet<String> = ["created", "updated", "due"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(hints, expected);
    }

    #[test]
    fn test_no_hints() {
        assert!(parse_date_hints("select 1 -- date: x").is_empty());
    }

    #[test]
    fn test_returns_rows() {
        assert!(returns_rows("select 1"));
        assert!(returns_rows("with a as (select 1) select * from a"));
        assert!(returns_rows("create table t (a int); select * from t"));
        assert!(!returns_rows("insert into t values (1)"));
        assert!(!returns_rows("create table t (a int)"));
        assert!(!returns_rows("drop table if exists t"));
    }

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(1.5), Some(Duration::from_millis(1500)));
        assert_eq!(seconds(0.0), Some(Duration::ZERO));
        for bad in [-1.0, f64::INFINITY, f64::NAN, 1e30] {
            assert_eq!(seconds(bad), None, "{bad}");
        }
    }

    #[tokio::test]
    async fn test_ping_rejects_infinite_timeout() {
        use crate::output::Output;
        use dc_core::PrintFormat;
        use std::sync::Arc;

        let db = Arc::new(dc_db::DuckDbBackend::in_memory().unwrap());
        let output = Arc::new(Output::capturing(PrintFormat::Pandas));
        let ctx = CheckContext::new(db, std::env::temp_dir(), Arc::clone(&output));

        assert!(!ping(&ctx, true, f64::INFINITY, 1.0).await);
        assert!(output.captured()[0].starts_with("ping failed"));
        assert!(ping(&ctx, true, 1.0, 0.1).await);
    }

    #[test]
    fn test_returns_rows_keyword_fallback() {
        assert!(returns_rows("select 1 from t qualify row_number() over () = 1 ]]"));
        assert!(!returns_rows("-- c\nvacuum something odd ]]"));
    }
}
