//! Application configuration, stored as YAML.
//!
//! # File layout
//!
//! ```text
//! vista.yaml
//!   template_dirs: [templates]      relative to the config file's directory
//!   default_layout: default
//!   default_view_class: AppView     optional
//!   helpers: [Number]               enabled for every view
//! ```
//!
//! Every loader takes an explicit path; callers decide where the file lives.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file name, looked up in the working directory by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "vista.yaml";

/// Application-wide view configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Template roots, searched in order. Relative entries are resolved
    /// against the directory holding the config file.
    pub template_dirs: Vec<PathBuf>,
    /// Layout used when a builder does not name one.
    pub default_layout: String,
    /// View class used when neither the host nor the builder names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_view_class: Option<String>,
    /// Helpers enabled on every view in addition to the builder's own.
    pub helpers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec![PathBuf::from("templates")],
            default_layout: "default".to_string(),
            default_view_class: None,
            helpers: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Template directories with relative entries joined onto `base`.
    pub fn resolve_template_dirs(&self, base: &Path) -> Vec<PathBuf> {
        self.template_dirs
            .iter()
            .map(|dir| if dir.is_absolute() { dir.clone() } else { base.join(dir) })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load a config file.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Like [`load_at`], but a missing file yields [`AppConfig::default`].
pub fn load_or_default_at(path: &Path) -> Result<AppConfig, ConfigError> {
    match load_at(path) {
        Err(ConfigError::ConfigNotFound { .. }) => Ok(AppConfig::default()),
        other => other,
    }
}

/// Atomically save a config file: serialize → `.tmp` sibling → `rename`.
pub fn save_at(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("helpers: [Number]\n").expect("parse");
        assert_eq!(cfg.template_dirs, vec![PathBuf::from("templates")]);
        assert_eq!(cfg.default_layout, "default");
        assert_eq!(cfg.helpers, vec!["Number".to_string()]);
    }

    #[test]
    fn relative_dirs_resolve_against_base() {
        let cfg = AppConfig {
            template_dirs: vec![PathBuf::from("templates"), PathBuf::from("/abs/tpl")],
            ..Default::default()
        };
        let dirs = cfg.resolve_template_dirs(Path::new("/srv/app"));
        assert_eq!(dirs[0], PathBuf::from("/srv/app/templates"));
        assert_eq!(dirs[1], PathBuf::from("/abs/tpl"));
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = load_or_default_at(&dir.path().join("vista.yaml")).expect("load");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("conf").join("vista.yaml");
        let cfg = AppConfig {
            default_view_class: Some("AppView".into()),
            ..Default::default()
        };
        save_at(&path, &cfg).expect("save");
        assert!(!dir.path().join("conf").join("vista.yaml.tmp").exists());
        assert_eq!(load_at(&path).expect("load"), cfg);
    }
}
