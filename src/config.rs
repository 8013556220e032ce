//! Project configuration
//!
//! The chosen subdomain and hosted zone persist in `.updraft.toml` next to
//! the content, so later runs publish to the same site without prompting.
//! A missing file is not an error; it loads as defaults and is written on
//! first publish.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

/// File name of the project-local configuration.
pub const CONFIG_FILE_NAME: &str = ".updraft.toml";

/// Project-local configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Publishing settings persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishConfig {
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub hosted_zone_id: String,
    #[serde(default)]
    pub domain_name: String,
}

impl ProjectConfig {
    /// Load from `dir`, or defaults when the file does not exist yet.
    pub fn load(dir: &Path) -> PublishResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(PublishError::FileRead { path, source }),
        };

        toml::from_str(&data).map_err(|err| PublishError::ConfigParse {
            path,
            message: err.to_string(),
        })
    }

    /// Write back to `dir`.
    pub fn save(&self, dir: &Path) -> PublishResult<()> {
        let path = dir.join(CONFIG_FILE_NAME);
        let data = toml::to_string_pretty(self).map_err(|err| PublishError::ConfigSerialize {
            message: err.to_string(),
        })?;
        fs::write(&path, data).map_err(|source| PublishError::ConfigWrite { path, source })
    }
}
