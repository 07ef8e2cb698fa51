//! rw-shad configuration
//!
//! Two optional YAML layers, both with the same keys:
//! - global: `<platform config dir>/rw-shad/config.yaml`
//! - project: `web/config/rw-shad.yaml`
//!
//! Project values override global values; anything unset falls back to the
//! built-in defaults.
//!
//! ```yaml
//! registry_url: https://ui.shadcn.com/registry
//! style: default
//! installer: shadcn@2.1.2
//! lint_command: yarn rw lint --fix
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ShadError};
use crate::paths::ProjectPaths;

/// Default component registry (serves `index.json`)
pub const DEFAULT_REGISTRY_URL: &str = "https://ui.shadcn.com/registry";

/// Default registry style used for single item lookups
pub const DEFAULT_STYLE: &str = "default";

/// Installer package run through `npx`. This build understands `--config-dir`.
pub const DEFAULT_INSTALLER: &str =
    "https://verdaccio.tobbe.dev/shadcn/-/shadcn-2.1.2-tobbe-20241029-0244.tgz";

/// Command used to format generated sources
pub const DEFAULT_LINT_COMMAND: &str = "yarn rw lint --fix";

/// One configuration layer as written on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_command: Option<String>,
}

impl ConfigFile {
    /// Read a layer, treating a missing file as empty
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ShadError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| ShadError::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Overlay `other` on top of `self`
    fn merge(self, other: ConfigFile) -> ConfigFile {
        ConfigFile {
            registry_url: other.registry_url.or(self.registry_url),
            style: other.style.or(self.style),
            installer: other.installer.or(self.installer),
            lint_command: other.lint_command.or(self.lint_command),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadConfig {
    /// Registry base URL, without trailing slash
    pub registry_url: String,
    /// Registry style for item lookups
    pub style: String,
    /// Package spec handed to `npx`
    pub installer: String,
    /// Lint command as program + arguments
    pub lint_command: Vec<String>,
}

impl Default for ShadConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            style: DEFAULT_STYLE.to_string(),
            installer: DEFAULT_INSTALLER.to_string(),
            lint_command: DEFAULT_LINT_COMMAND.split(' ').map(str::to_string).collect(),
        }
    }
}

impl ShadConfig {
    /// Load the global and project layers for a project
    pub fn load(paths: &ProjectPaths) -> Result<Self> {
        let global = match Self::global_config_path() {
            Some(path) => ConfigFile::load_from_path(&path)?,
            None => ConfigFile::default(),
        };
        let project = ConfigFile::load_from_path(&paths.project_config_file())?;

        Self::resolve(global.merge(project))
    }

    /// Location of the global layer, if the platform has a config directory
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rw-shad")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Fill unset values with defaults and validate
    pub fn resolve(file: ConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let registry_url = match file.registry_url {
            Some(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ShadError::Config(format!(
                        "registry_url must start with http:// or https://, got '{url}'"
                    )));
                }
                url.trim_end_matches('/').to_string()
            }
            None => defaults.registry_url,
        };

        let lint_command = match file.lint_command {
            Some(command) => {
                let words = shell_words::split(&command).map_err(|e| {
                    ShadError::Config(format!("Invalid lint_command '{command}': {e}"))
                })?;
                if words.is_empty() {
                    return Err(ShadError::Config("lint_command cannot be empty".to_string()));
                }
                words
            }
            None => defaults.lint_command,
        };

        Ok(Self {
            registry_url,
            style: file.style.unwrap_or(defaults.style),
            installer: file.installer.unwrap_or(defaults.installer),
            lint_command,
        })
    }

    /// URL of the registry index
    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.registry_url)
    }

    /// URL of a single registry item
    pub fn item_url(&self, name: &str) -> String {
        format!("{}/styles/{}/{}.json", self.registry_url, self.style, name)
    }
}
