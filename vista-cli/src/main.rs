//! Vista — render view templates from the command line.
//!
//! # Usage
//!
//! ```text
//! vista [--config vista.yaml] render <template> [--template-dir DIR]... [--path P]
//!       [--layout L | --no-layout] [--layout-path P] [--theme T] [--plugin P]
//!       [--class C] [--helper H]... [--var key=value]... [--vars-file FILE.json]
//! vista [--config vista.yaml] templates [--template-dir DIR]... [--json]
//! vista [--config vista.yaml] init [--template-dir DIR]... [--helper H]... [--layout L] [--force]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

mod commands;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

use commands::{init::InitArgs, render::RenderArgs, templates::TemplatesArgs};
use vista_core::config::DEFAULT_CONFIG_FILE;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "vista",
    version,
    about = "Render view templates with view vars, layouts and helpers",
    long_about = None,
)]
struct Cli {
    /// Path to the application config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file and create its template directories.
    Init(InitArgs),

    /// Render a template (or a JSON view) and print the output.
    Render(RenderArgs),

    /// List the templates the configured directories provide.
    Templates(TemplatesArgs),
}

// ---------------------------------------------------------------------------
// Shared `key=value` argument
// ---------------------------------------------------------------------------

/// A `--var key=value` pair. Values that parse as JSON keep their type;
/// anything else is a string.
#[derive(Debug, Clone, PartialEq)]
pub struct VarArg {
    pub key: String,
    pub value: Value,
}

impl FromStr for VarArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (key, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty variable name in '{s}'"));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(Self { key: key.to_string(), value })
    }
}

impl fmt::Display for VarArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(&cli.config),
        Commands::Render(args) => args.run(&cli.config),
        Commands::Templates(args) => args.run(&cli.config),
    }
}
