//! Shared, read-only view environment: config, templates, helpers, classes.

use std::fmt;
use std::path::Path;

use vista_core::{config, AppConfig};

use crate::classes::ViewClassRegistry;
use crate::engine::TemplateEngine;
use crate::error::ViewError;
use crate::helpers::HelperRegistry;

/// Everything views of one application share. Build it once and hand it to
/// hosts behind an `Arc`.
pub struct ViewEnvironment {
    pub config: AppConfig,
    pub engine: TemplateEngine,
    pub helpers: HelperRegistry,
    pub classes: ViewClassRegistry,
}

impl ViewEnvironment {
    /// Environment with the built-in helpers and view classes.
    pub fn new(config: AppConfig, engine: TemplateEngine) -> Self {
        Self {
            config,
            engine,
            helpers: HelperRegistry::with_builtins(),
            classes: ViewClassRegistry::with_builtins(),
        }
    }

    /// Load templates from `config.template_dirs`, relative to `base`.
    pub fn from_config(config: AppConfig, base: &Path) -> Result<Self, ViewError> {
        let dirs = config.resolve_template_dirs(base);
        let engine = TemplateEngine::from_dirs(&dirs)?;
        Ok(Self::new(config, engine))
    }

    /// Read the config file at `path` (defaults if absent) and load its templates.
    pub fn load(path: &Path) -> Result<Self, ViewError> {
        let config = config::load_or_default_at(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::debug!(config = %path.display(), dirs = ?config.template_dirs, "loading view environment");
        Self::from_config(config, base)
    }
}

impl Default for ViewEnvironment {
    fn default() -> Self {
        Self::new(AppConfig::default(), TemplateEngine::empty())
    }
}

impl fmt::Debug for ViewEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewEnvironment")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("helpers", &self.helpers)
            .field("classes", &self.classes)
            .finish()
    }
}
