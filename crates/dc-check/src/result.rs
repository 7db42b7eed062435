//! Per-check results and batch summaries

use dc_frame::Frame;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome category of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultType {
    Passed,
    Failed,
    FailedWithException,
    FailedDifferentLength,
    NoExpectedResultsFile,
    FailedPathNotExists,
}

impl ResultType {
    /// Not passed, but counted as a warning rather than a failure
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ResultType::NoExpectedResultsFile | ResultType::FailedPathNotExists
        )
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultType::Passed => "PASSED",
            ResultType::Failed => "FAILED",
            ResultType::FailedWithException => "FAILED_WITH_EXCEPTION",
            ResultType::FailedDifferentLength => "FAILED_DIFFERENT_LENGTH",
            ResultType::NoExpectedResultsFile => "NO_EXPECTED_RESULTS_FILE",
            ResultType::FailedPathNotExists => "FAILED_PATH_NOT_EXISTS",
        };
        f.write_str(name)
    }
}

/// A captured error: its message and the messages of its sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub message: String,
    pub chain: Vec<String>,
}

impl ExceptionInfo {
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }
        Self {
            message: err.to_string(),
            chain,
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            chain: Vec::new(),
        }
    }
}

/// Result of running one check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub result_type: ResultType,

    /// File or directory the check ran for
    pub source: PathBuf,

    /// Rows that differ, with a `_merge` provenance column
    pub diff: Option<Frame>,

    /// Every merged row, kept for the expanded log message
    pub full_merge: Option<Frame>,

    pub exception: Option<ExceptionInfo>,

    /// Replaces the default status text, e.g. `SKIPPED`
    pub message: Option<String>,
}

impl CheckResult {
    fn new(source: &Path, result_type: ResultType) -> Self {
        Self {
            passed: result_type == ResultType::Passed,
            result_type,
            source: source.to_path_buf(),
            diff: None,
            full_merge: None,
            exception: None,
            message: None,
        }
    }

    pub fn passed(source: &Path) -> Self {
        Self::new(source, ResultType::Passed)
    }

    pub fn passed_with_message(source: &Path, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(source, ResultType::Passed)
        }
    }

    /// Rows differ between query and expectation
    pub fn failed(source: &Path, diff: Frame, full_merge: Frame) -> Self {
        Self {
            diff: Some(diff),
            full_merge: Some(full_merge),
            ..Self::new(source, ResultType::Failed)
        }
    }

    /// Failed for a reason other than a row diff, e.g. a pipeline step
    pub fn failed_with_message(source: &Path, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(source, ResultType::Failed)
        }
    }

    pub fn different_length(source: &Path, message: impl Into<String>, rows: Option<Frame>) -> Self {
        Self {
            message: Some(message.into()),
            diff: rows,
            ..Self::new(source, ResultType::FailedDifferentLength)
        }
    }

    pub fn exception(source: &Path, err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            exception: Some(ExceptionInfo::from_error(err)),
            ..Self::new(source, ResultType::FailedWithException)
        }
    }

    pub fn exception_message(source: &Path, message: impl Into<String>) -> Self {
        Self {
            exception: Some(ExceptionInfo::from_message(message)),
            ..Self::new(source, ResultType::FailedWithException)
        }
    }

    pub fn no_expected_results(source: &Path) -> Self {
        Self::new(source, ResultType::NoExpectedResultsFile)
    }

    pub fn path_not_exists(source: &Path) -> Self {
        Self::new(source, ResultType::FailedPathNotExists)
    }
}

/// Counts across a batch of results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let warnings = results
            .iter()
            .filter(|r| !r.passed && r.result_type.is_warning())
            .count();
        Self {
            total,
            passed,
            failed: total - passed - warnings,
            warnings,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checks: {} passed, {} failed, {} warnings",
            self.total, self.passed, self.failed, self.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_has_no_diff() {
        let r = CheckResult::passed(Path::new("a.sql"));
        assert!(r.passed);
        assert!(r.diff.is_none());
        assert_eq!(r.result_type.to_string(), "PASSED");
    }

    #[test]
    fn test_exception_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = crate::error::ExecError::io(Path::new("x.csv"), io);
        let r = CheckResult::exception(Path::new("x.sql"), &err);
        let info = r.exception.unwrap();
        assert!(info.message.contains("x.csv"));
        assert_eq!(info.chain, vec!["gone"]);
        assert!(!r.passed);
    }

    #[test]
    fn test_summary_buckets() {
        let p = Path::new("p");
        let results = vec![
            CheckResult::passed(p),
            CheckResult::failed_with_message(p, "x"),
            CheckResult::no_expected_results(p),
            CheckResult::path_not_exists(p),
            CheckResult::exception_message(p, "boom"),
        ];
        let s = Summary::from_results(&results);
        assert_eq!(
            s,
            Summary {
                total: 5,
                passed: 1,
                failed: 2,
                warnings: 2
            }
        );
        assert_eq!(s.to_string(), "5 checks: 1 passed, 2 failed, 2 warnings");
        assert!(!s.all_passed());
    }
}
