//! View builder — collects view settings and instantiates the view class.
//!
//! Every setting is optional; unset settings fall back to the environment's
//! defaults when [`ViewBuilder::build`] runs:
//!
//! | Setting         | Default                                  |
//! |-----------------|------------------------------------------|
//! | `class_name`    | config `default_view_class`, `AppView`, `View` |
//! | `template_path` | `name`                                   |
//! | `layout`        | config `default_layout`                  |
//! | `auto_layout`   | `true`                                   |
//! | `helpers`       | config `helpers` + builder helpers       |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vista_core::{EventManager, Request, Response, ViewVars};

use crate::env::ViewEnvironment;
use crate::error::ViewError;
use crate::view::{View, ViewConfig, ViewParts};

/// Mutable view configuration plus the environment it builds against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewBuilder {
    #[serde(skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    template_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_layout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plugin: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    helpers: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "ViewVars::is_empty")]
    vars: ViewVars,
    #[serde(skip)]
    env: Arc<ViewEnvironment>,
}

impl ViewBuilder {
    /// A builder against a default (template-less) environment.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(env: Arc<ViewEnvironment>) -> Self {
        Self { env, ..Self::default() }
    }

    pub fn environment(&self) -> &Arc<ViewEnvironment> {
        &self.env
    }

    pub fn set_environment(&mut self, env: Arc<ViewEnvironment>) -> &mut Self {
        self.env = env;
        self
    }

    // -----------------------------------------------------------------------
    // Setters / getters
    // -----------------------------------------------------------------------

    pub fn set_class_name(&mut self, class_name: impl Into<String>) -> &mut Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.template = Some(template.into());
        self
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn set_template_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn template_path(&self) -> Option<&str> {
        self.template_path.as_deref()
    }

    pub fn set_layout(&mut self, layout: impl Into<String>) -> &mut Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn set_layout_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.layout_path = Some(path.into());
        self
    }

    pub fn layout_path(&self) -> Option<&str> {
        self.layout_path.as_deref()
    }

    pub fn enable_auto_layout(&mut self, enabled: bool) -> &mut Self {
        self.auto_layout = Some(enabled);
        self
    }

    pub fn disable_auto_layout(&mut self) -> &mut Self {
        self.enable_auto_layout(false)
    }

    /// `None` until set explicitly; views treat that as enabled.
    pub fn is_auto_layout_enabled(&self) -> Option<bool> {
        self.auto_layout
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) -> &mut Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn set_plugin(&mut self, plugin: impl Into<String>) -> &mut Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    /// Add (`merge = true`) or replace helpers. Duplicates are dropped.
    pub fn set_helpers<I, S>(&mut self, helpers: I, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !merge {
            self.helpers.clear();
        }
        for helper in helpers {
            let helper = helper.into();
            if !self.helpers.contains(&helper) {
                self.helpers.push(helper);
            }
        }
        self
    }

    pub fn helpers(&self) -> &[String] {
        &self.helpers
    }

    /// Add (`merge = true`) or replace view options. Merging overwrites keys.
    pub fn set_options<I, K>(&mut self, options: I, merge: bool) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        if !merge {
            self.options.clear();
        }
        self.options.extend(options.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn options(&self) -> &BTreeMap<String, Value> {
        &self.options
    }

    /// Builder-level var; host vars passed to [`build`](Self::build) take precedence.
    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.vars.set(key, value);
        self
    }

    pub fn vars(&self) -> &ViewVars {
        &self.vars
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the settings (not the environment).
    pub fn to_json(&self) -> Result<String, ViewError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore settings saved by [`to_json`](Self::to_json) against `env`.
    pub fn from_json(json: &str, env: Arc<ViewEnvironment>) -> Result<Self, ViewError> {
        let mut builder: ViewBuilder = serde_json::from_str(json)?;
        builder.env = env;
        Ok(builder)
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    /// Settings with defaults applied, for class `class_name`.
    pub fn view_config(&self, class_name: String) -> ViewConfig {
        let app = &self.env.config;
        let mut helpers: Vec<String> = app.helpers.clone();
        for helper in &self.helpers {
            if !helpers.contains(helper) {
                helpers.push(helper.clone());
            }
        }
        ViewConfig {
            class_name,
            name: self.name.clone(),
            template: self.template.clone(),
            template_path: self.template_path.clone().or_else(|| self.name.clone()),
            layout: self.layout.clone().or_else(|| Some(app.default_layout.clone())),
            layout_path: self.layout_path.clone(),
            auto_layout: self.auto_layout.unwrap_or(true),
            theme: self.theme.clone(),
            plugin: self.plugin.clone(),
            helpers,
            options: self.options.clone(),
        }
    }

    /// Instantiate the configured view class.
    ///
    /// Returns `ViewError::MissingView` if the class name cannot be resolved.
    pub fn build(
        &self,
        vars: ViewVars,
        request: Option<Request>,
        response: Option<Response>,
        events: Option<Arc<EventManager>>,
    ) -> Result<Box<dyn View>, ViewError> {
        let (class_name, constructor) = self
            .env
            .classes
            .resolve(self.class_name.as_deref(), self.env.config.default_view_class.as_deref())?;

        let mut vars = vars;
        vars.merge(self.vars.clone());

        let config = self.view_config(class_name);
        tracing::debug!(
            class = %config.class_name,
            template = ?config.template,
            layout = ?config.layout,
            vars = vars.len(),
            "building view"
        );

        constructor(ViewParts {
            config,
            vars,
            request,
            response,
            events,
            env: Arc::clone(&self.env),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
