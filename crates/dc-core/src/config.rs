//! Configuration types and parsing for data_check.yml

use crate::env::expand_env_vars;
use crate::error::{CoreError, CoreResult};
use crate::load_mode::LoadMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Name of the project configuration file
pub const CONFIG_FILE_NAME: &str = "data_check.yml";

/// Project configuration from data_check.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Named connection strings
    #[serde(default)]
    pub connections: BTreeMap<String, String>,

    /// Connection used when none is given on the command line
    #[serde(default)]
    pub default_connection: Option<String>,

    /// Number of checks run concurrently
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,

    /// Accepted for compatibility; workers are always tasks with their own connection
    #[serde(default)]
    pub use_process: bool,

    /// Append formatted results to this file
    #[serde(default)]
    pub log: Option<PathBuf>,

    /// Root directory for check discovery
    #[serde(default = "default_checks_path")]
    pub checks_path: PathBuf,

    /// Directory holding lookup queries
    #[serde(default = "default_lookups_path")]
    pub lookups_path: PathBuf,

    /// YAML mapping merged into every template render
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Load mode used when a load step or command does not name one
    #[serde(default)]
    pub default_load_mode: LoadMode,

    /// Diff rendering for failed checks
    #[serde(default)]
    pub print_format: PrintFormat,

    /// Include error chains in failure output
    #[serde(default)]
    pub traceback: bool,
}

fn default_parallel_workers() -> usize {
    4
}

fn default_checks_path() -> PathBuf {
    PathBuf::from("checks")
}

fn default_lookups_path() -> PathBuf {
    PathBuf::from("lookups")
}

fn default_template_path() -> PathBuf {
    PathBuf::from("checks/template.yml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connections: BTreeMap::new(),
            default_connection: None,
            parallel_workers: default_parallel_workers(),
            use_process: false,
            log: None,
            checks_path: default_checks_path(),
            lookups_path: default_lookups_path(),
            template_path: default_template_path(),
            default_load_mode: LoadMode::default(),
            print_format: PrintFormat::default(),
            traceback: false,
        }
    }
}

/// How diffs are rendered in failure messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintFormat {
    /// Aligned text table
    #[default]
    Pandas,
    /// Comma-separated values
    Csv,
    /// Array of JSON records
    Json,
}

impl fmt::Display for PrintFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintFormat::Pandas => write!(f, "pandas"),
            PrintFormat::Csv => write!(f, "csv"),
            PrintFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for PrintFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pandas" | "table" => Ok(PrintFormat::Pandas),
            "csv" => Ok(PrintFormat::Csv),
            "json" => Ok(PrintFormat::Json),
            other => Err(CoreError::ConfigInvalid {
                message: format!("unknown print_format '{other}'"),
            }),
        }
    }
}

impl Config {
    /// Parse configuration from YAML text
    pub fn parse(content: &str, origin: &Path) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                path: origin.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, path)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.parallel_workers == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "parallel_workers must be at least 1".to_string(),
            });
        }
        if let Some(default) = &self.default_connection {
            if !self.connections.contains_key(default) {
                return Err(self.unknown_connection(default));
            }
        }
        Ok(())
    }

    fn unknown_connection(&self, name: &str) -> CoreError {
        CoreError::UnknownConnection {
            name: name.to_string(),
            known: self
                .connections
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Resolve a connection name (or the default) to `(name, connection string)`.
    ///
    /// Environment variables in the connection string are expanded here.
    pub fn connection(&self, name: Option<&str>) -> CoreResult<(String, String)> {
        let name = match name.or(self.default_connection.as_deref()) {
            Some(n) => n,
            None if self.connections.len() == 1 => self
                .connections
                .keys()
                .next()
                .map(String::as_str)
                .ok_or(CoreError::NoDefaultConnection)?,
            None => return Err(CoreError::NoDefaultConnection),
        };
        let raw = self
            .connections
            .get(name)
            .ok_or_else(|| self.unknown_connection(name))?;
        Ok((name.to_string(), expand_env_vars(raw)))
    }

    /// Get absolute checks path
    pub fn checks_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.checks_path)
    }

    /// Get absolute lookups path
    pub fn lookups_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.lookups_path)
    }

    /// Get absolute template data path
    pub fn template_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.template_path)
    }

    /// Get absolute log file path, if logging to a file is configured
    pub fn log_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.log.as_ref().map(|p| root.join(p))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
