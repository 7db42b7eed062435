//! Console and log-file formatting of results

use crate::error::{ExecError, ExecResult};
use crate::result::{CheckResult, ResultType, Summary};
use dc_core::PrintFormat;
use dc_frame::render_frame;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Formats results and writes them to stdout and, optionally, a log file.
///
/// Lines are written whole under a mutex so parallel workers never
/// interleave within a line.
pub struct Output {
    print_format: PrintFormat,
    traceback: bool,
    quiet: bool,
    log_file: Option<Mutex<File>>,
    captured: Option<Mutex<Vec<String>>>,
}

impl Output {
    pub fn new(print_format: PrintFormat, traceback: bool) -> Self {
        Self {
            print_format,
            traceback,
            quiet: false,
            log_file: None,
            captured: None,
        }
    }

    /// Output that records lines in memory instead of printing them
    pub fn capturing(print_format: PrintFormat) -> Self {
        Self {
            captured: Some(Mutex::new(Vec::new())),
            quiet: true,
            ..Self::new(print_format, false)
        }
    }

    /// Append formatted lines to `path`, creating it if needed
    pub fn with_log_file(mut self, path: &Path) -> ExecResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ExecError::io(parent, e))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| ExecError::io(path, e))?;
        self.log_file = Some(Mutex::new(file));
        Ok(self)
    }

    pub fn print_format(&self) -> PrintFormat {
        self.print_format
    }

    /// Lines recorded by a capturing output
    pub fn captured(&self) -> Vec<String> {
        self.captured
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|p| p.into_inner()).clone())
            .unwrap_or_default()
    }

    /// Print a line to the console and the log file
    pub fn print(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
        if let Some(captured) = &self.captured {
            captured
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(line.to_string());
        }
        self.log(line);
    }

    /// Write a line to the log file only
    pub fn log(&self, line: &str) {
        let Some(file) = &self.log_file else {
            return;
        };
        let mut file = file.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            log::warn!("Failed to write to log file: {}", e);
        }
    }

    /// Print the console message and log the expanded message
    pub fn print_result(&self, result: &CheckResult) {
        let console = self.console_message(result);
        if !self.quiet {
            println!("{}", console);
        }
        if let Some(captured) = &self.captured {
            captured
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push(console);
        }
        self.log(&self.log_message(result));
    }

    pub fn print_summary(&self, results: &[CheckResult]) {
        self.print("");
        self.print(&Summary::from_results(results).to_string());
    }

    /// Short status line, followed by the diff or error for failures
    pub fn console_message(&self, result: &CheckResult) -> String {
        let mut message = status_line(result);
        if let Some(details) = self.details(result, self.traceback) {
            message.push('\n');
            message.push_str(&details);
        }
        message
    }

    /// Status line with diff and the full error chain
    pub fn log_message(&self, result: &CheckResult) -> String {
        let mut message = status_line(result);
        if let Some(details) = self.details(result, true) {
            message.push('\n');
            message.push_str(&details);
        }
        message
    }

    fn details(&self, result: &CheckResult, traceback: bool) -> Option<String> {
        if result.passed {
            return None;
        }
        let mut parts = Vec::new();
        if let Some(diff) = &result.diff {
            match render_frame(diff, self.print_format) {
                Ok(text) => parts.push(text.trim_end().to_string()),
                Err(e) => parts.push(format!("(diff could not be rendered: {})", e)),
            }
        }
        if let Some(exception) = &result.exception {
            parts.push(exception.message.clone());
            if traceback {
                parts.extend(exception.chain.iter().map(|c| format!("  caused by: {}", c)));
            }
        }
        (!parts.is_empty()).then(|| parts.join("\n"))
    }
}

fn status_line(result: &CheckResult) -> String {
    let source = result.source.display();
    match (result.result_type, &result.message) {
        (ResultType::Passed, Some(message)) => format!("{}: {}", source, message),
        (ResultType::Passed, None) => format!("{}: PASSED", source),
        (ResultType::Failed, Some(reason)) | (ResultType::FailedDifferentLength, Some(reason)) => {
            format!("{}: FAILED ({})", source, reason)
        }
        (ResultType::Failed, None) => format!("{}: FAILED", source),
        (ResultType::FailedDifferentLength, None) => {
            format!("{}: FAILED (different length)", source)
        }
        (ResultType::FailedWithException, Some(reason)) => {
            format!("{}: FAILED (with exception: {})", source, reason)
        }
        (ResultType::FailedWithException, None) => format!("{}: FAILED (with exception)", source),
        (ResultType::NoExpectedResultsFile, _) => format!("{}: NO EXPECTED RESULTS FILE", source),
        (ResultType::FailedPathNotExists, _) => format!("{}: PATH DOESN'T EXIST", source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dc_core::Cell;
    use dc_frame::Frame;

    fn diff() -> Frame {
        Frame::from_rows(
            vec!["id".into(), "_merge".into()],
            vec![
                vec![Cell::Int(1), Cell::Str("left_only".into())],
                vec![Cell::Int(2), Cell::Str("right_only".into())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_status_lines() {
        let out = Output::capturing(PrintFormat::Csv);
        let p = Path::new("checks/a.sql");
        assert_eq!(out.console_message(&CheckResult::passed(p)), "checks/a.sql: PASSED");
        assert_eq!(
            out.console_message(&CheckResult::passed_with_message(p, "SKIPPED")),
            "checks/a.sql: SKIPPED"
        );
        assert_eq!(
            out.console_message(&CheckResult::no_expected_results(p)),
            "checks/a.sql: NO EXPECTED RESULTS FILE"
        );
        assert_eq!(
            out.console_message(&CheckResult::path_not_exists(p)),
            "checks/a.sql: PATH DOESN'T EXIST"
        );
    }

    #[test]
    fn test_failed_includes_diff_in_format() {
        let out = Output::capturing(PrintFormat::Csv);
        let r = CheckResult::failed(Path::new("a.sql"), diff(), diff());
        assert_eq!(
            out.console_message(&r),
            "a.sql: FAILED\nid,_merge\n1,left_only\n2,right_only"
        );
    }

    #[test]
    fn test_traceback_only_in_log_by_default() {
        let out = Output::capturing(PrintFormat::Pandas);
        let mut r = CheckResult::exception_message(Path::new("a.sql"), "boom");
        if let Some(e) = r.exception.as_mut() {
            e.chain.push("root cause".into());
        }
        assert_eq!(out.console_message(&r), "a.sql: FAILED (with exception)\nboom");
        assert!(out.log_message(&r).contains("caused by: root cause"));
    }

    #[test]
    fn test_exception_reason_in_status_line() {
        let out = Output::capturing(PrintFormat::Pandas);
        let mut r = CheckResult::exception_message(Path::new("pipe"), "no such table: t");
        r.message = Some("step 3 raised an error".into());
        assert_eq!(
            out.console_message(&r),
            "pipe: FAILED (with exception: step 3 raised an error)\nno such table: t"
        );
    }

    #[test]
    fn test_log_file_and_capture() {
        let tmp = tempfile::TempDir::new().unwrap();
        let log_path = tmp.path().join("logs").join("run.log");
        let out = Output::capturing(PrintFormat::Pandas)
            .with_log_file(&log_path)
            .unwrap();
        out.print_result(&CheckResult::passed(Path::new("x.sql")));
        out.print_summary(&[CheckResult::passed(Path::new("x.sql"))]);
        assert_eq!(
            out.captured(),
            vec!["x.sql: PASSED", "", "1 checks: 1 passed, 0 failed, 0 warnings"]
        );
        let logged = std::fs::read_to_string(&log_path).unwrap();
        assert!(logged.starts_with("x.sql: PASSED\n"));
    }
}
