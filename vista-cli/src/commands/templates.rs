//! `vista templates` — list loaded template names.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use super::load_environment;

/// Arguments for `vista templates`.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Template directory; repeatable, overrides the config file's list.
    #[arg(long = "template-dir", short = 'd', value_name = "DIR")]
    pub template_dirs: Vec<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl TemplatesArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let env = load_environment(config_path, &self.template_dirs)?;
        let names = env.engine.template_names();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&names)?);
            return Ok(());
        }
        if names.is_empty() {
            println!("No templates found in {:?}.", env.engine.dirs());
            return Ok(());
        }
        for name in names {
            println!("{name}");
        }
        Ok(())
    }
}
