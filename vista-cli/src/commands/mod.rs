//! Subcommand implementations.

pub mod init;
pub mod render;
pub mod templates;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use vista_core::config;
use vista_view::ViewEnvironment;

/// Load the config at `config_path` (defaults when absent). Non-empty
/// `template_dirs` replace the configured directories and are taken
/// relative to the working directory.
pub(crate) fn load_environment(
    config_path: &Path,
    template_dirs: &[PathBuf],
) -> Result<ViewEnvironment> {
    let mut app = config::load_or_default_at(config_path)
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;

    let base = if template_dirs.is_empty() {
        config_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf()
    } else {
        app.template_dirs = template_dirs.to_vec();
        PathBuf::from(".")
    };

    ViewEnvironment::from_config(app, &base).context("failed to load templates")
}
