use super::Check;
use crate::context::CheckContext;
use crate::dispatcher::CheckKind;
use crate::pipeline::{Pipeline, PipelineOutcome};
use crate::result::CheckResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A directory holding `data_check_pipeline.yml`, run as one check
pub struct PipelineCheck {
    dir: PathBuf,
}

impl PipelineCheck {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn identify(path: &Path, generate: bool) -> bool {
        CheckKind::identify(path, generate) == Some(CheckKind::Pipeline)
    }
}

#[async_trait]
impl Check for PipelineCheck {
    fn source(&self) -> &Path {
        &self.dir
    }

    fn kind(&self) -> CheckKind {
        CheckKind::Pipeline
    }

    async fn run_test(&self, ctx: &CheckContext) -> CheckResult {
        let pipeline = match Pipeline::load(ctx, &self.dir) {
            Ok(p) => p,
            Err(e) => return CheckResult::exception(&self.dir, &e),
        };
        match pipeline.run(ctx).await {
            PipelineOutcome::Passed => CheckResult::passed(&self.dir),
            PipelineOutcome::Failed { step } => {
                CheckResult::failed_with_message(&self.dir, format!("step {} failed", step))
            }
            PipelineOutcome::Error { step, error } => {
                let mut result = CheckResult::exception(&self.dir, &error);
                result.message = Some(format!("step {} raised an error", step));
                result
            }
        }
    }
}
