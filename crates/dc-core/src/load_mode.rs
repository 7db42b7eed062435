//! Table load modes

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a file's rows are written into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Delete all rows, keep the table definition
    #[default]
    Truncate,
    /// Keep existing rows, insert new ones
    Append,
    /// Drop the table and re-create it from the file
    Replace,
    /// Insert or overwrite on primary-key collision
    Upsert,
}

impl LoadMode {
    /// All modes, in documentation order
    pub const ALL: [LoadMode; 4] = [
        LoadMode::Truncate,
        LoadMode::Append,
        LoadMode::Replace,
        LoadMode::Upsert,
    ];

    /// Lowercase name as used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadMode::Truncate => "truncate",
            LoadMode::Append => "append",
            LoadMode::Replace => "replace",
            LoadMode::Upsert => "upsert",
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        LoadMode::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidLoadMode {
                value: s.to_string(),
            })
    }
}
