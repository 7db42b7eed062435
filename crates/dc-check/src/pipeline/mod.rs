//! Pipelines: a directory whose `data_check_pipeline.yml` lists steps run
//! in order as one composite check.
//!
//! A failing or erroring step skips the rest of the sequence, except that
//! `always_run` steps that have not run yet are executed before the
//! pipeline reports its outcome.

mod exec;
pub mod fake;
pub mod step;

pub use step::{SqlStep, Step};

use crate::context::CheckContext;
use crate::dispatcher::PIPELINE_FILE_NAME;
use crate::error::{ExecError, ExecResult};
use dc_jinja::TemplateEnvironment;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct PipelineFile {
    #[serde(default)]
    steps: Vec<serde_yaml::Value>,
}

/// How a pipeline run ended; `step` is the 1-based index of the trigger
#[derive(Debug)]
pub enum PipelineOutcome {
    Passed,
    Failed { step: usize },
    Error { step: usize, error: ExecError },
}

impl PipelineOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, PipelineOutcome::Passed)
    }
}

/// A parsed pipeline anchored at its directory
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub name: String,
    /// Relative step paths resolve against this directory
    pub base_path: PathBuf,
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Template and parse `dir/data_check_pipeline.yml`.
    ///
    /// The first unknown or malformed step aborts loading.
    pub fn load(ctx: &CheckContext, dir: &Path) -> ExecResult<Self> {
        let file = dir.join(PIPELINE_FILE_NAME);
        let raw = std::fs::read_to_string(&file).map_err(|e| ExecError::io(&file, e))?;
        let base_path = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let name = base_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let env = TemplateEnvironment::new(&ctx.template_data)
            .with_var("CONNECTION", &ctx.connection_name)
            .with_var("CONNECTION_STRING", &ctx.connection_string)
            .with_var("PIPELINE_PATH", base_path.display().to_string())
            .with_var("PIPELINE_NAME", &name)
            .with_var("PROJECT_PATH", ctx.project_root.display().to_string());
        let rendered = env.render(&raw)?;

        Self::parse(&rendered, name, base_path).map_err(|e| match e {
            ExecError::InvalidPipeline { message, .. } => ExecError::InvalidPipeline {
                path: file.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse already templated pipeline YAML
    pub fn parse(yaml: &str, name: String, base_path: PathBuf) -> ExecResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self {
                name,
                base_path,
                steps: Vec::new(),
            });
        }
        let file: Option<PipelineFile> =
            serde_yaml::from_str(yaml).map_err(|e| ExecError::InvalidPipeline {
                path: name.clone(),
                message: e.to_string(),
            })?;
        let steps = file
            .map(|f| f.steps)
            .unwrap_or_default()
            .iter()
            .map(Step::parse)
            .collect::<ExecResult<Vec<_>>>()?;
        Ok(Self {
            name,
            base_path,
            steps,
        })
    }

    /// Run the steps in order with always-run teardown on failure
    pub async fn run(&self, ctx: &CheckContext) -> PipelineOutcome {
        log::info!("Running pipeline {} ({} steps)", self.name, self.steps.len());
        let mut has_run = vec![false; self.steps.len()];

        let mut outcome = PipelineOutcome::Passed;
        for (i, step) in self.steps.iter().enumerate() {
            has_run[i] = true;
            log::debug!("Pipeline {}: step {} ({})", self.name, i + 1, step.kind());
            match self.run_step(ctx, step, i).await {
                Ok(true) => {}
                Ok(false) => {
                    outcome = PipelineOutcome::Failed { step: i + 1 };
                    break;
                }
                Err(error) => {
                    outcome = PipelineOutcome::Error { step: i + 1, error };
                    break;
                }
            }
        }
        if outcome.passed() {
            return outcome;
        }

        for (i, step) in self.steps.iter().enumerate() {
            if has_run[i] || !step.is_always_run() {
                continue;
            }
            has_run[i] = true;
            log::debug!("Pipeline {}: always_run step {}", self.name, i + 1);
            match self.run_step(ctx, step, i).await {
                Ok(true) => {}
                Ok(false) => log::warn!("Pipeline {}: always_run step {} failed", self.name, i + 1),
                Err(e) => log::warn!("Pipeline {}: always_run step {} raised: {}", self.name, i + 1, e),
            }
        }
        outcome
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn resolve_all(&self, paths: &[String]) -> Vec<PathBuf> {
        paths.iter().map(|p| self.resolve(p)).collect()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
