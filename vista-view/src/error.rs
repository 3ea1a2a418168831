//! Error types for vista-view.

use std::path::PathBuf;

use thiserror::Error;

use vista_core::{ConfigError, VarsError};

/// All errors that can arise while building or rendering a view.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No registered view class matches the requested (or default) name.
    #[error("view class `{class}` could not be found")]
    MissingView { class: String },

    /// None of the candidate template files exist.
    #[error("template `{name}` could not be found (searched: {})", .searched.join(", "))]
    MissingTemplate { name: String, searched: Vec<String> },

    /// None of the candidate layout files exist.
    #[error("layout `{name}` could not be found (searched: {})", .searched.join(", "))]
    MissingLayout { name: String, searched: Vec<String> },

    /// The builder names a helper the environment does not provide.
    #[error("helper `{name}` could not be found")]
    MissingHelper { name: String },

    /// Invalid input to the view vars store.
    #[error(transparent)]
    Vars(#[from] VarsError),

    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building contexts, JSON views, builder state).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// Application config could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ViewError {
    ViewError::Io { path: path.into(), source }
}
