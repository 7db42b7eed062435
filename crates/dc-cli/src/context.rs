//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dc_check::{CheckContext, Output, RunSettings};
use dc_core::{Config, Project};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded project, open connection and the check context built from them
pub struct RuntimeContext {
    pub project: Project,
    pub ctx: CheckContext,
}

fn load_project(args: &GlobalArgs) -> Result<Project> {
    match &args.config {
        Some(path) => {
            let config = Config::load(path).context("Failed to load configuration file")?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            Project::from_config(root, config).context("Failed to load project")
        }
        None => Project::discover(&args.project_dir).context("Failed to load project"),
    }
}

/// Command line flags win over data_check.yml
fn settings_for(args: &GlobalArgs, config: &Config) -> RunSettings {
    RunSettings {
        workers: args.workers.unwrap_or(config.parallel_workers).max(1),
        print_format: args.print_format.unwrap_or(config.print_format),
        traceback: args.traceback || config.traceback,
        default_load_mode: config.default_load_mode,
        generate: false,
        force: false,
        handle_interrupt: true,
    }
}

impl RuntimeContext {
    /// Load the project, connect, and open the log file
    pub async fn new(args: &GlobalArgs) -> Result<Self> {
        let project = load_project(args)?;
        let config = &project.config;
        if config.use_process {
            log::debug!("use_process is set; workers run as tasks with their own connections");
        }

        let (name, connection) = config
            .connection(args.connection.as_deref())
            .context("Failed to resolve connection")?;
        let db = dc_db::connect(&connection, &project.root)
            .with_context(|| format!("Failed to connect to '{}'", name))?;

        let settings = settings_for(args, config);
        let mut output = Output::new(settings.print_format, settings.traceback);
        let log_path: Option<PathBuf> = args
            .log
            .clone()
            .or_else(|| config.log_path_absolute(&project.root));
        if let Some(path) = log_path {
            output = output
                .with_log_file(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
        }

        let ctx = CheckContext::for_project(&project, db, &name, &connection, settings, Arc::new(output));
        log::debug!("Using connection {} at {}", name, project.root.display());
        Ok(Self { project, ctx })
    }

    /// Given paths, or the configured checks directory when none are given
    pub fn paths_or_checks(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        if paths.is_empty() {
            vec![self.project.checks_path()]
        } else {
            paths.to_vec()
        }
    }
}
