//! View vars host — gives controller-like types `set()` and `create_view()`.
//!
//! A host owns a [`ViewState`] and implements [`ViewVarsHost`]; everything
//! else has default implementations. Optional hooks (`name`, `helpers`,
//! `plugin`, `request`, `response`, `event_manager`, `view_option`) feed the
//! builder when a view is created.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use vista_core::{
    EventManager, LegacyViewProps, Request, Response, ValidViewOptions, ViewVars,
};

use crate::builder::ViewBuilder;
use crate::env::ViewEnvironment;
use crate::error::ViewError;
use crate::view::View;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Per-host view state: vars, legacy settings and the lazily created builder.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    env: Arc<ViewEnvironment>,
    /// Accumulated view vars.
    pub vars: ViewVars,
    /// Deprecated: prefer `view_builder().set_class_name()`.
    pub view_class: Option<String>,
    /// Deprecated per-host view settings.
    pub legacy: LegacyViewProps,
    valid_options: ValidViewOptions,
    builder: Option<ViewBuilder>,
}

impl ViewState {
    pub fn new(env: Arc<ViewEnvironment>) -> Self {
        Self { env, ..Self::default() }
    }

    pub fn environment(&self) -> &Arc<ViewEnvironment> {
        &self.env
    }

    /// Whether the builder has been created yet.
    pub fn has_builder(&self) -> bool {
        self.builder.is_some()
    }

    fn builder_mut(&mut self) -> &mut ViewBuilder {
        let env = &self.env;
        self.builder
            .get_or_insert_with(|| ViewBuilder::with_environment(Arc::clone(env)))
    }
}

// ---------------------------------------------------------------------------
// Deprecation diagnostics
// ---------------------------------------------------------------------------

fn deprecated_property(property: &str, replacement: &str) {
    tracing::warn!(
        target: "vista::deprecation",
        property,
        replacement,
        "property `{property}` is deprecated, use ViewBuilder::{replacement}() instead"
    );
}

/// Copy every present legacy property onto `builder`, warning for each.
fn apply_legacy_props(builder: &mut ViewBuilder, legacy: &LegacyViewProps) {
    if let Some(layout) = &legacy.layout {
        builder.set_layout(layout.as_str());
        deprecated_property("layout", "set_layout");
    }
    if let Some(view) = &legacy.view {
        builder.set_template(view.as_str());
        deprecated_property("view", "set_template");
    }
    if let Some(theme) = &legacy.theme {
        builder.set_theme(theme.as_str());
        deprecated_property("theme", "set_theme");
    }
    if let Some(auto_layout) = legacy.auto_layout {
        builder.enable_auto_layout(auto_layout);
        deprecated_property("auto_layout", "enable_auto_layout");
    }
    if let Some(path) = &legacy.view_path {
        builder.set_template_path(path.as_str());
        deprecated_property("view_path", "set_template_path");
    }
    if let Some(path) = &legacy.layout_path {
        builder.set_layout_path(path.as_str());
        deprecated_property("layout_path", "set_layout_path");
    }
}

// ---------------------------------------------------------------------------
// ViewVarsHost
// ---------------------------------------------------------------------------

/// Collects template context and turns it into a view.
pub trait ViewVarsHost {
    fn view_state(&self) -> &ViewState;
    fn view_state_mut(&mut self) -> &mut ViewState;

    /// Host name; also the default template path.
    fn name(&self) -> Option<String> {
        None
    }

    fn helpers(&self) -> Option<Vec<String>> {
        None
    }

    fn plugin(&self) -> Option<String> {
        None
    }

    fn request(&self) -> Option<Request> {
        None
    }

    fn response(&self) -> Option<Response> {
        None
    }

    fn event_manager(&self) -> Option<Arc<EventManager>> {
        None
    }

    /// Value of an allowlisted option, if this host has one.
    fn view_option(&self, _option: &str) -> Option<Value> {
        None
    }

    /// The host's builder, created on first access.
    fn view_builder(&mut self) -> &mut ViewBuilder {
        self.view_state_mut().builder_mut()
    }

    fn view_vars(&self) -> &ViewVars {
        &self.view_state().vars
    }

    /// Save a var for the view. An existing var with the same name wins.
    fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self
    where
        Self: Sized,
    {
        self.view_state_mut().vars.set(name, value);
        self
    }

    /// Save every pair of `data`, with the same precedence as [`set`](Self::set).
    fn set_many<I, K, V>(&mut self, data: I) -> &mut Self
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.view_state_mut().vars.set_many(data);
        self
    }

    /// Pair `names` with `values` positionally; mismatched lengths fail.
    fn set_pairs<K, V>(&mut self, names: Vec<K>, values: Vec<V>) -> Result<&mut Self, ViewError>
    where
        Self: Sized,
        K: Into<String>,
        V: Into<Value>,
    {
        self.view_state_mut().vars.set_pairs(names, values)?;
        Ok(self)
    }

    /// Build a view from the host's vars and settings.
    ///
    /// `view_class` always wins when given. Otherwise a class already on the
    /// builder is kept, and failing that the deprecated `view_class` is moved
    /// onto the builder.
    fn create_view(&mut self, view_class: Option<&str>) -> Result<Box<dyn View>, ViewError> {
        let name = self.name();
        let helpers = self.helpers();
        let plugin = self.plugin();
        let request = self.request();
        let response = self.response();
        let events = self.event_manager();
        let view_options: BTreeMap<String, Value> = self
            .view_state()
            .valid_options
            .iter()
            .filter_map(|option| self.view_option(option).map(|v| (option.clone(), v)))
            .collect();

        let view_class = view_class.filter(|c| !c.is_empty());
        let state = self.view_state_mut();
        let legacy_class = match view_class {
            None if state.builder.as_ref().and_then(|b| b.class_name()).is_none() => {
                state.view_class.take()
            }
            _ => None,
        };
        let legacy = state.legacy.clone();
        let vars = state.vars.clone();
        let builder = state.builder_mut();

        if let Some(class) = legacy_class {
            builder.set_class_name(class);
        }
        if let Some(class) = view_class {
            builder.set_class_name(class);
        }
        apply_legacy_props(builder, &legacy);
        if let Some(name) = name {
            builder.set_name(name);
        }
        if let Some(helpers) = helpers {
            builder.set_helpers(helpers, true);
        }
        if let Some(plugin) = plugin {
            builder.set_plugin(plugin);
        }
        builder.set_options(view_options, true);

        builder.build(vars, request, response, events)
    }

    /// Deprecated: get, extend or replace the allowlist of host options copied
    /// into the builder by [`create_view`](Self::create_view).
    fn view_options(&mut self, options: Option<&[&str]>, merge: bool) -> ValidViewOptions {
        tracing::warn!(
            target: "vista::deprecation",
            "view_options() is deprecated, use ViewBuilder::set_options() instead"
        );
        let valid = &mut self.view_state_mut().valid_options;
        match options {
            None => {}
            Some(options) if merge => {
                valid.merge(options.iter().copied());
            }
            Some(options) => {
                valid.replace(options.iter().copied());
            }
        }
        valid.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
