//! Everything a running check needs besides its own paths

use crate::output::Output;
use dc_core::{LoadMode, PrintFormat, Project};
use dc_db::Database;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings shared by every check in a run
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Concurrently running checks; 1 runs inline on the shared connection
    pub workers: usize,
    pub print_format: PrintFormat,
    pub traceback: bool,
    pub default_load_mode: LoadMode,
    /// Write expectation files instead of comparing
    pub generate: bool,
    /// Overwrite existing expectation files in generate mode
    pub force: bool,
    /// Stop the runner on Ctrl-C
    pub handle_interrupt: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workers: 1,
            print_format: PrintFormat::default(),
            traceback: false,
            default_load_mode: LoadMode::default(),
            generate: false,
            force: false,
            handle_interrupt: false,
        }
    }
}

/// Shared state handed to checks, pipeline steps and the loader.
///
/// Cloning is cheap; workers clone it and swap in their own connection
/// with [`CheckContext::with_db`].
#[derive(Clone)]
pub struct CheckContext {
    pub db: Arc<dyn Database>,
    pub project_root: PathBuf,
    pub connection_name: String,
    pub connection_string: String,
    pub template_data: Arc<BTreeMap<String, serde_yaml::Value>>,
    pub settings: RunSettings,
    pub output: Arc<Output>,
}

impl CheckContext {
    pub fn new(db: Arc<dyn Database>, project_root: PathBuf, output: Arc<Output>) -> Self {
        Self {
            db,
            project_root,
            connection_name: String::new(),
            connection_string: String::new(),
            template_data: Arc::new(BTreeMap::new()),
            settings: RunSettings::default(),
            output,
        }
    }

    /// Context for a loaded project with a connected database
    pub fn for_project(
        project: &Project,
        db: Arc<dyn Database>,
        connection_name: &str,
        connection_string: &str,
        settings: RunSettings,
        output: Arc<Output>,
    ) -> Self {
        Self {
            db,
            project_root: project.root.clone(),
            connection_name: connection_name.to_string(),
            connection_string: connection_string.to_string(),
            template_data: Arc::new(project.template_data.clone()),
            settings,
            output,
        }
    }

    pub fn with_db(&self, db: Arc<dyn Database>) -> Self {
        Self {
            db,
            ..self.clone()
        }
    }

    pub fn with_settings(mut self, settings: RunSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_template_data(mut self, data: BTreeMap<String, serde_yaml::Value>) -> Self {
        self.template_data = Arc::new(data);
        self
    }

    pub fn with_connection(mut self, name: &str, connection_string: &str) -> Self {
        self.connection_name = name.to_string();
        self.connection_string = connection_string.to_string();
        self
    }
}
