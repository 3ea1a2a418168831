//! # vista-view
//!
//! View builder, view classes and the tera template engine behind them.
//!
//! A host (controller, command, …) collects view vars through
//! [`ViewVarsHost::set`], configures its [`ViewBuilder`], and calls
//! [`ViewVarsHost::create_view`] to get a renderer.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vista_view::{ViewEnvironment, ViewState, ViewVarsHost};
//!
//! struct ArticlesController {
//!     state: ViewState,
//! }
//!
//! impl ViewVarsHost for ArticlesController {
//!     fn view_state(&self) -> &ViewState { &self.state }
//!     fn view_state_mut(&mut self) -> &mut ViewState { &mut self.state }
//!     fn name(&self) -> Option<String> { Some("Articles".into()) }
//! }
//!
//! fn index(env: Arc<ViewEnvironment>) -> Result<String, vista_view::ViewError> {
//!     let mut controller = ArticlesController { state: ViewState::new(env) };
//!     controller.set("title", "Latest articles");
//!     controller.view_builder().set_template("index");
//!     controller.create_view(None)?.render(None, None)
//! }
//!
//! # let env = Arc::new(ViewEnvironment::load(Path::new("vista.yaml")).unwrap());
//! # let _ = index(env);
//! ```

pub mod builder;
pub mod classes;
pub mod engine;
pub mod env;
pub mod error;
pub mod helpers;
pub mod host;
pub mod view;

pub use builder::ViewBuilder;
pub use classes::{ViewClassRegistry, ViewConstructor};
pub use engine::TemplateEngine;
pub use env::ViewEnvironment;
pub use error::ViewError;
pub use helpers::{Helper, HelperRegistry};
pub use host::{ViewState, ViewVarsHost};
pub use view::{JsonView, TemplateView, View, ViewConfig, ViewParts};
