//! Step execution. Each step returns `Ok(false)` on failure and `Err` when it raises.

use super::fake::FakeConfig;
use super::{Pipeline, SqlStep, Step};
use crate::context::CheckContext;
use crate::dispatcher::collect_checks;
use crate::error::{ExecError, ExecResult};
use crate::loader;
use crate::output::Output;
use crate::runner::Runner;
use crate::sql::{execute_script, ping, prepare_sql_file, run_sql};
use dc_core::{LoadMode, TableRef};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

type StepFuture<'a> = Pin<Box<dyn Future<Output = ExecResult<bool>> + Send + 'a>>;

impl Pipeline {
    /// Boxed so `always_run` can nest steps
    pub(super) fn run_step<'a>(&'a self, ctx: &'a CheckContext, step: &'a Step, index: usize) -> StepFuture<'a> {
        Box::pin(async move {
            match step {
                Step::Load { files, table, mode } => {
                    let mode = mode.unwrap_or(ctx.settings.default_load_mode);
                    self.load_files(ctx, files, table.as_deref(), mode).await
                }
                Step::Check { paths } => self.check(ctx, paths).await,
                Step::Sql(sql) => self.sql(ctx, sql).await,
                Step::SqlFiles { files } => self.sql_files(ctx, files).await,
                Step::Cmd { commands, print } => self.cmd(ctx, commands, *print).await,
                Step::Ping {
                    wait,
                    timeout,
                    retry,
                } => Ok(ping(ctx, *wait, *timeout, *retry).await),
                Step::AlwaysRun { steps } => {
                    for nested in steps {
                        if !self.run_step(ctx, nested, index).await? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Step::Breakpoint => {
                    self.breakpoint(ctx, index);
                    Ok(true)
                }
                Step::Fake { configs } => self.fake(ctx, configs).await,
            }
        })
    }

    async fn load_files(&self, ctx: &CheckContext, files: &[String], table: Option<&str>, mode: LoadMode) -> ExecResult<bool> {
        let files = self.resolve_all(files);
        loader::load_tables_from_files(ctx, &files, table, mode).await
    }

    /// Nested checks share the run's worker settings
    async fn check(&self, ctx: &CheckContext, paths: &[String]) -> ExecResult<bool> {
        let checks = collect_checks(&self.resolve_all(paths), ctx.settings.generate);
        let runner = Runner::from_settings(&ctx.settings);
        let output = Arc::clone(&ctx.output);
        let results = runner
            .run_checks(checks, ctx, |result| output.print_result(result))
            .await;
        Ok(!runner.was_cancelled() && results.iter().all(|r| r.passed))
    }

    async fn sql(&self, ctx: &CheckContext, sql: &SqlStep) -> ExecResult<bool> {
        match sql {
            SqlStep::Ambiguous(arg) if self.resolve(arg).is_file() => {
                self.sql_files(ctx, std::slice::from_ref(arg)).await
            }
            SqlStep::Ambiguous(query) => {
                run_sql(ctx, query, None, None).await?;
                Ok(true)
            }
            SqlStep::Query {
                query,
                output,
                write_check,
            } => {
                let output = output.as_deref().map(|p| self.resolve(p));
                let write_check = write_check.as_deref().map(|p| self.resolve(p));
                run_sql(ctx, query, output.as_deref(), write_check.as_deref()).await?;
                Ok(true)
            }
            SqlStep::Files(files) => self.sql_files(ctx, files).await,
        }
    }

    async fn sql_files(&self, ctx: &CheckContext, files: &[String]) -> ExecResult<bool> {
        for file in self.resolve_all(files) {
            let prepared = prepare_sql_file(ctx, &file)?;
            execute_script(ctx, &prepared.sql).await?;
            log::debug!("Executed {}", file.display());
        }
        Ok(true)
    }

    async fn cmd(&self, ctx: &CheckContext, commands: &[String], print: bool) -> ExecResult<bool> {
        for command in commands {
            let code = run_command(command, &self.base_path, print.then_some(ctx.output.as_ref())).await?;
            if code != Some(0) {
                ctx.output.print(&format!(
                    "{}: command '{}' exited with {}",
                    self.name,
                    command,
                    code.map_or_else(|| "a signal".to_string(), |c| format!("code {}", c))
                ));
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn breakpoint(&self, ctx: &CheckContext, index: usize) {
        let remaining: Vec<&str> = self.steps.iter().skip(index + 1).map(Step::kind).collect();
        let variables: Vec<&String> = ctx.template_data.keys().collect();
        log::info!(
            "Breakpoint in pipeline {} at {}: remaining steps {:?}, template variables {:?}",
            self.name,
            self.base_path.display(),
            remaining,
            variables
        );
    }

    async fn fake(&self, ctx: &CheckContext, configs: &[String]) -> ExecResult<bool> {
        for path in self.resolve_all(configs) {
            let config = FakeConfig::load(&path)?;
            let frame = config.frame()?;
            let table = TableRef::parse(&config.table)?;
            let mode = config.mode.unwrap_or(ctx.settings.default_load_mode);
            let written = loader::load_frame(ctx.db.as_ref(), &table, &frame, mode).await?;
            log::info!("Faked {} rows into {} from {}", written, table, path.display());
        }
        Ok(true)
    }
}

async fn forward_lines<R: AsyncRead + Unpin>(reader: Option<R>, output: Option<&Output>) {
    let Some(reader) = reader else {
        return;
    };
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(output) = output {
                    output.print(&line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to read command output: {}", e);
                break;
            }
        }
    }
}

/// Run through the platform shell in `dir`; returns the exit code
async fn run_command(command: &str, dir: &Path, output: Option<&Output>) -> ExecResult<Option<i32>> {
    let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
    log::debug!("Running '{}' in {}", command, dir.display());
    let mut child = Command::new(shell)
        .arg(flag)
        .arg(command)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecError::Command {
            command: command.to_string(),
            source,
        })?;

    tokio::join!(
        forward_lines(child.stdout.take(), output),
        forward_lines(child.stderr.take(), output)
    );
    let status = child.wait().await.map_err(|source| ExecError::Command {
        command: command.to_string(),
        source,
    })?;
    Ok(status.code())
}
