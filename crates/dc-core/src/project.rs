//! Project discovery: locate data_check.yml and load template data.

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A loaded data-check project
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing data_check.yml
    pub root: PathBuf,

    /// Parsed configuration
    pub config: Config,

    /// Values from the template data file, empty when the file is absent
    pub template_data: BTreeMap<String, serde_yaml::Value>,
}

impl Project {
    /// Find data_check.yml in `start` or the nearest parent directory and load it
    pub fn discover(start: &Path) -> CoreResult<Self> {
        let start = start
            .canonicalize()
            .map_err(|e| CoreError::IoWithPath {
                path: start.display().to_string(),
                source: e,
            })?;

        let root = start
            .ancestors()
            .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
            .ok_or_else(|| CoreError::ConfigNotFound {
                path: start.display().to_string(),
            })?;

        Self::load(root)
    }

    /// Load a project whose data_check.yml lives directly in `root`
    pub fn load(root: &Path) -> CoreResult<Self> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            return Err(CoreError::ConfigNotFound {
                path: root.display().to_string(),
            });
        }
        let config = Config::load(&config_path)?;
        Self::from_config(root.to_path_buf(), config)
    }

    /// Build a project from an already parsed config
    pub fn from_config(root: PathBuf, config: Config) -> CoreResult<Self> {
        let template_path = config.template_path_absolute(&root);
        let template_data = load_template_data(&template_path)?;
        log::debug!(
            "Loaded project at {} ({} template values)",
            root.display(),
            template_data.len()
        );
        Ok(Self {
            root,
            config,
            template_data,
        })
    }

    /// Absolute checks directory
    pub fn checks_path(&self) -> PathBuf {
        self.config.checks_path_absolute(&self.root)
    }
}

/// Read a YAML mapping of template values; a missing file yields an empty map
pub fn load_template_data(path: &Path) -> CoreResult<BTreeMap<String, serde_yaml::Value>> {
    if !path.is_file() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    let value: serde_yaml::Value = serde_yaml::from_str(&content)?;
    match value {
        serde_yaml::Value::Null => Ok(BTreeMap::new()),
        serde_yaml::Value::Mapping(map) => Ok(map
            .into_iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
            .collect()),
        _ => Err(CoreError::TemplateDataInvalid {
            path: path.display().to_string(),
        }),
    }
}
