//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/srview/srview.toml`
//! 3. Local config: `<dir>/.srview.toml` (usually the working directory)
//! 4. Environment variables: `SRVIEW_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::DEFAULT_ROOT_LABEL;
use crate::util::path::expand_env_vars;

/// How trees and result lists are printed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySettings {
    /// Prefix each line with the node id
    pub show_ids: bool,
    /// Prefix each line with the relationship to the parent
    pub show_relationship: bool,
    /// Colored output (NO_COLOR is honored regardless)
    pub color: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_ids: true,
            show_relationship: true,
            color: true,
        }
    }
}

impl DisplaySettings {
    fn merge(&self, overlay: &RawDisplaySettings) -> Self {
        Self {
            show_ids: overlay.show_ids.unwrap_or(self.show_ids),
            show_relationship: overlay.show_relationship.unwrap_or(self.show_relationship),
            color: overlay.color.unwrap_or(self.color),
        }
    }
}

/// Raw display settings (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplaySettings {
    pub show_ids: Option<bool>,
    pub show_relationship: Option<bool>,
    pub color: Option<bool>,
}

/// Raw settings for intermediate parsing.
///
/// Used during layered config merging to distinguish between:
/// - `None` → field not specified, inherit from base
/// - `Some([])` → explicit empty array
/// - `Some([...])` → explicit values to merge
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub root_label: Option<String>,
    pub scan_dir: Option<PathBuf>,
    pub document_extensions: Option<Vec<String>>,
    pub display: RawDisplaySettings,
}

/// Unified configuration for srview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Label of the synthetic document root node
    pub root_label: String,
    /// Default directory for `scan` (default: current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_dir: Option<PathBuf>,
    /// File extensions treated as documents by `scan`
    pub document_extensions: Vec<String>,
    /// Output settings
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_label: DEFAULT_ROOT_LABEL.to_string(),
            scan_dir: None,
            document_extensions: vec!["json".into()],
            display: DisplaySettings::default(),
        }
    }
}

/// Get the XDG config directory for srview.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "srview").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("srview.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".srview.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["json"], &["dcmjson"])        // → ["dcmjson", "json"]
    /// merge_array(&["json"], &["!json", "sr"])    // → ["sr"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        // Convert to sorted Vec for deterministic output
        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.scan_dir {
            self.scan_dir = Some(PathBuf::from(expand_env_vars(&dir.to_string_lossy())));
        }
    }

    /// Merge overlay config onto self (base) with union semantics for arrays.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            root_label: overlay
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            scan_dir: overlay.scan_dir.clone().or_else(|| self.scan_dir.clone()),
            document_extensions: overlay
                .document_extensions
                .as_ref()
                .map(|o| Self::merge_array(&self.document_extensions, o))
                .unwrap_or_else(|| self.document_extensions.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            root_label: global
                .root_label
                .clone()
                .unwrap_or_else(|| self.root_label.clone()),
            scan_dir: global.scan_dir.clone().or_else(|| self.scan_dir.clone()),
            document_extensions: global
                .document_extensions
                .clone()
                .unwrap_or_else(|| self.document_extensions.clone()),
            display: self.display.merge(&global.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.srview.toml`
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SRVIEW_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SRVIEW")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("document_extensions"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("root_label") {
            settings.root_label = val;
        }
        if let Ok(val) = config.get_string("scan_dir") {
            settings.scan_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get::<Vec<String>>("document_extensions") {
            settings.document_extensions = val;
        }
        if let Ok(val) = config.get_bool("display.show_ids") {
            settings.display.show_ids = val;
        }
        if let Ok(val) = config.get_bool("display.show_relationship") {
            settings.display.show_relationship = val;
        }
        if let Ok(val) = config.get_bool("display.color") {
            settings.display.color = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# srview configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/srview/srview.toml
#   Local:  ./.srview.toml
#   Env:    SRVIEW_* environment variables (SRVIEW_DISPLAY__COLOR=false)
#
# Local config UNIONS document_extensions with global.
# Use "!ext" in local config to remove an inherited extension.

# Label of the synthetic root node
# root_label = "Structured Report"

# Default directory for `srview scan`
# scan_dir = "~/reports"

# File extensions treated as documents
# document_extensions = ["json"]

[display]
# show_ids = true
# show_relationship = true
# color = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
