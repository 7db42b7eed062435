//! Maps paths to checks

use crate::checks::{
    Check, CsvCheck, EmptySetCheck, ExcelCheck, GeneratorCheck, PathNotExistsCheck, PipelineCheck,
    TableCheck,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File that turns a directory into a pipeline
pub const PIPELINE_FILE_NAME: &str = "data_check_pipeline.yml";

/// Kind of check responsible for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    PathNotExists,
    Pipeline,
    EmptySet,
    Excel,
    Csv,
    Generator,
    Table,
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ext)
}

pub fn is_pipeline_dir(path: &Path) -> bool {
    path.is_dir() && path.join(PIPELINE_FILE_NAME).is_file()
}

impl CheckKind {
    /// Apply the identification rules in order; the first match wins.
    ///
    /// In generate mode a SQL file without another expectation becomes a
    /// generator. In run mode it is a CSV check that will report the
    /// missing expectation file. A `.csv`/`.xlsx` with a sibling `.sql`
    /// belongs to that SQL file and is not a check on its own.
    pub fn identify(path: &Path, generate: bool) -> Option<CheckKind> {
        if !path.exists() {
            return Some(CheckKind::PathNotExists);
        }
        if is_pipeline_dir(path) {
            return Some(CheckKind::Pipeline);
        }
        if !path.is_file() {
            return None;
        }
        if has_extension(path, "sql") {
            if path.with_extension("empty").exists() {
                return Some(CheckKind::EmptySet);
            }
            if path.with_extension("xlsx").exists() {
                return Some(CheckKind::Excel);
            }
            return Some(if generate {
                CheckKind::Generator
            } else {
                CheckKind::Csv
            });
        }
        if (has_extension(path, "csv") || has_extension(path, "xlsx"))
            && !path.with_extension("sql").exists()
        {
            return Some(CheckKind::Table);
        }
        None
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::PathNotExists => "path_not_exists",
            CheckKind::Pipeline => "pipeline",
            CheckKind::EmptySet => "empty_set",
            CheckKind::Excel => "excel",
            CheckKind::Csv => "csv",
            CheckKind::Generator => "generator",
            CheckKind::Table => "table",
        };
        f.write_str(name)
    }
}

/// Check for a single path, `None` when no kind claims it
pub fn get_check(path: &Path, generate: bool) -> Option<Arc<dyn Check>> {
    let check: Arc<dyn Check> = match CheckKind::identify(path, generate)? {
        CheckKind::PathNotExists => Arc::new(PathNotExistsCheck::new(path)),
        CheckKind::Pipeline => Arc::new(PipelineCheck::new(path)),
        CheckKind::EmptySet => Arc::new(EmptySetCheck::new(path)),
        CheckKind::Excel => Arc::new(ExcelCheck::new(path)),
        CheckKind::Csv => Arc::new(CsvCheck::new(path)),
        CheckKind::Generator => Arc::new(GeneratorCheck::new(path)),
        CheckKind::Table => Arc::new(TableCheck::new(path)),
    };
    Some(check)
}

/// True when a directory between `path` and `root` (inclusive) holds a
/// pipeline file
fn inside_pipeline(path: &Path, root: &Path) -> bool {
    for dir in path.ancestors().skip(1) {
        if dir.join(PIPELINE_FILE_NAME).is_file() {
            return true;
        }
        if dir == root {
            break;
        }
    }
    false
}

fn is_candidate(path: &Path) -> bool {
    has_extension(path, "sql")
        || ((has_extension(path, "csv") || has_extension(path, "xlsx"))
            && !path.with_extension("sql").exists())
}

fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok().map(|e| e.path())).collect(),
        Err(e) => {
            log::warn!("Cannot read {}: {}", dir.display(), e);
            return;
        }
    };
    entries.sort();
    for entry in entries {
        if is_pipeline_dir(&entry) {
            out.push(entry);
        } else if entry.is_dir() {
            walk(&entry, root, out);
        } else if is_candidate(&entry) && !inside_pipeline(&entry, root) {
            out.push(entry);
        }
    }
}

/// Expand directories recursively into check paths.
///
/// Pipeline directories are kept whole; files inside them are not
/// discovered individually. Other paths pass through unchanged.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() && !is_pipeline_dir(path) {
            walk(path, path, &mut out);
        } else {
            out.push(path.clone());
        }
    }
    out
}

/// Expand `paths` and build a check for each; unclaimed paths are skipped
pub fn collect_checks(paths: &[PathBuf], generate: bool) -> Vec<Arc<dyn Check>> {
    expand_paths(paths)
        .iter()
        .filter_map(|p| {
            let check = get_check(p, generate);
            if check.is_none() {
                log::warn!("{}: no check applies; skipping", p.display());
            }
            check
        })
        .collect()
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
