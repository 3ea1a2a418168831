//! `vista init [--template-dir DIR]... [--helper H]... [--layout L] [--force]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use vista_core::{config, AppConfig};

/// Starter layout written when the layout file does not exist yet.
const STARTER_LAYOUT: &str = "<!DOCTYPE html>\n<html>\n<body>\n{{ content | safe }}\n</body>\n</html>\n";

/// Write a config file and create its template directories.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Template directory to record; repeatable. Defaults to `templates`.
    #[arg(long = "template-dir", short = 'd', value_name = "DIR")]
    pub template_dirs: Vec<PathBuf>,

    /// Helper enabled for every view; repeatable.
    #[arg(long = "helper")]
    pub helpers: Vec<String>,

    /// Default layout name.
    #[arg(long)]
    pub layout: Option<String>,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        if config_path.exists() && !self.force {
            bail!(
                "'{}' already exists (use --force to overwrite)",
                config_path.display()
            );
        }

        let mut app = AppConfig::default();
        if !self.template_dirs.is_empty() {
            app.template_dirs = self.template_dirs;
        }
        if let Some(layout) = self.layout {
            app.default_layout = layout;
        }
        app.helpers = self.helpers;

        config::save_at(config_path, &app)
            .with_context(|| format!("failed to write '{}'", config_path.display()))?;

        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        for dir in app.resolve_template_dirs(base) {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("cannot create '{}'", dir.display()))?;
        }
        if let Some(first) = app.resolve_template_dirs(base).first() {
            let layout = first.join("Layout").join(format!("{}.tera", app.default_layout));
            if !layout.exists() {
                if let Some(parent) = layout.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("cannot create '{}'", parent.display()))?;
                }
                std::fs::write(&layout, STARTER_LAYOUT)
                    .with_context(|| format!("cannot write '{}'", layout.display()))?;
                tracing::debug!(layout = %layout.display(), "wrote starter layout");
            }
        }

        println!("✓ Wrote {}", config_path.display());
        Ok(())
    }
}
