use super::Check;
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::result::CheckResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Placeholder for a requested path that is not on disk
pub struct PathNotExistsCheck {
    path: PathBuf,
}

impl PathNotExistsCheck {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn identify(path: &Path) -> bool {
        !path.exists()
    }
}

#[async_trait]
impl Check for PathNotExistsCheck {
    fn source(&self) -> &Path {
        &self.path
    }

    fn kind(&self) -> CheckKind {
        CheckKind::PathNotExists
    }

    async fn run_test(&self, _ctx: &CheckContext) -> CheckResult {
        CheckResult::path_not_exists(&self.path)
    }
}
