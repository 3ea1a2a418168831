//! Vista core library — view vars, host-side view types, configuration and
//! the request/response/event collaborators a view is built with.
//!
//! - [`vars`] — [`ViewVars`], the context store handed to views
//! - [`types`] — legacy view properties and the valid-options allowlist
//! - [`config`] — YAML application configuration
//! - [`http`] — [`Request`] / [`Response`] value types
//! - [`event`] — synchronous [`EventManager`]
//! - [`error`] — [`ConfigError`], [`VarsError`]

pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod types;
pub mod vars;

pub use config::AppConfig;
pub use error::{ConfigError, VarsError};
pub use event::{Event, EventManager};
pub use http::{Request, Response};
pub use types::{LegacyViewProps, ValidViewOptions};
pub use vars::ViewVars;
