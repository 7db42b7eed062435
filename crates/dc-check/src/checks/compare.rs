//! Query-versus-expectation checks for CSV and spreadsheet files

use super::{sibling, Check};
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::error::ExecResult;
use crate::query_result::QueryResult;
use crate::result::CheckResult;
use crate::sql::{prepare_sql, prepare_sql_file, run_query, PreparedSql};
use async_trait::async_trait;
use dc_frame::{compare, read_csv, read_excel, Frame, ReadOptions};
use std::path::{Path, PathBuf};

/// File format of an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectationFormat {
    Csv,
    Excel,
}

impl ExpectationFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExpectationFormat::Csv => "csv",
            ExpectationFormat::Excel => "xlsx",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "csv" => Some(ExpectationFormat::Csv),
            "xlsx" => Some(ExpectationFormat::Excel),
            _ => None,
        }
    }

    pub fn read(&self, path: &Path, options: &ReadOptions) -> ExecResult<Frame> {
        Ok(match self {
            ExpectationFormat::Csv => read_csv(path, options)?,
            ExpectationFormat::Excel => read_excel(path, options)?,
        })
    }
}

/// Where the SQL of a comparison comes from
#[derive(Debug, Clone)]
pub(crate) enum SqlText {
    File(PathBuf),
    Inline(String),
}

/// Run the query, read the expectation with the query's column pins, and
/// classify the merge outcome.
pub(crate) async fn compare_with_expectation(
    ctx: &CheckContext,
    source: &Path,
    sql: &SqlText,
    expectation: &Path,
    format: ExpectationFormat,
) -> CheckResult {
    match try_compare(ctx, source, sql, expectation, format).await {
        Ok(result) => result,
        Err(e) => CheckResult::exception(source, &e),
    }
}

async fn try_compare(
    ctx: &CheckContext,
    source: &Path,
    sql: &SqlText,
    expectation: &Path,
    format: ExpectationFormat,
) -> ExecResult<CheckResult> {
    let prepared: PreparedSql = match sql {
        SqlText::File(path) => prepare_sql_file(ctx, path)?,
        SqlText::Inline(text) => prepare_sql(ctx, text)?,
    };
    let query: QueryResult = run_query(ctx, &prepared).await?;
    let expected = format.read(expectation, &query.read_options())?;

    let comparison = compare(&query.frame, &expected)?;
    if comparison.has_diff() {
        return Ok(CheckResult::failed(source, comparison.diff(), comparison.merged));
    }
    if !comparison.same_length() {
        return Ok(CheckResult::different_length(
            source,
            format!(
                "query returned {} rows, expected {}",
                comparison.left_rows, comparison.right_rows
            ),
            None,
        ));
    }
    Ok(CheckResult::passed(source))
}

/// `<stem>.sql` compared with `<stem>.csv`
pub struct CsvCheck {
    sql_file: PathBuf,
}

impl CsvCheck {
    pub fn new(sql_file: impl Into<PathBuf>) -> Self {
        Self {
            sql_file: sql_file.into(),
        }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::Csv)
    }

    pub fn expectation(&self) -> PathBuf {
        sibling(&self.sql_file, ExpectationFormat::Csv.extension())
    }
}

#[async_trait]
impl Check for CsvCheck {
    fn source(&self) -> &Path {
        &self.sql_file
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Csv
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        let expectation = self.expectation();
        if !expectation.is_file() {
            return CheckResult::no_expected_results(&self.sql_file);
        }
        compare_with_expectation(
            ctx,
            &self.sql_file,
            &SqlText::File(self.sql_file.clone()),
            &expectation,
            ExpectationFormat::Csv,
        )
        .await
    }
}

/// `<stem>.sql` compared with the first sheet of `<stem>.xlsx`
pub struct ExcelCheck {
    sql_file: PathBuf,
}

impl ExcelCheck {
    pub fn new(sql_file: impl Into<PathBuf>) -> Self {
        Self {
            sql_file: sql_file.into(),
        }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::Excel)
    }
}

#[async_trait]
impl Check for ExcelCheck {
    fn source(&self) -> &Path {
        &self.sql_file
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Excel
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        if ctx.settings.generate {
            return CheckResult::passed_with_message(&self.sql_file, "SKIPPED (spreadsheet expectation)");
        }
        let expectation = sibling(&self.sql_file, ExpectationFormat::Excel.extension());
        compare_with_expectation(
            ctx,
            &self.sql_file,
            &SqlText::File(self.sql_file.clone()),
            &expectation,
            ExpectationFormat::Excel,
        )
        .await
    }
}
