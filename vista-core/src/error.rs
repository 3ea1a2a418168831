//! Error types for vista-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can arise while loading or saving [`AppConfig`](crate::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },
}

/// Errors from the view vars store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VarsError {
    /// Positional `set_pairs` received sequences of different lengths.
    #[error("cannot pair {keys} key(s) with {values} value(s)")]
    MismatchedPairs { keys: usize, values: usize },
}
