//! Views — the renderers a [`ViewBuilder`](crate::ViewBuilder) produces.
//!
//! | Class      | Output                                                |
//! |------------|-------------------------------------------------------|
//! | `View`     | tera template, optionally wrapped in a layout (HTML)  |
//! | `JsonView` | view vars serialized as JSON                          |

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vista_core::{Event, EventManager, Request, Response, ViewVars};

use crate::engine;
use crate::env::ViewEnvironment;
use crate::error::ViewError;
use crate::helpers::Helper;

pub const BEFORE_RENDER: &str = "View.beforeRender";
pub const AFTER_RENDER: &str = "View.afterRender";
pub const BEFORE_LAYOUT: &str = "View.beforeLayout";
pub const AFTER_LAYOUT: &str = "View.afterLayout";

/// Var holding the inner template output while a layout renders.
pub const CONTENT_VAR: &str = "content";

// ---------------------------------------------------------------------------
// ViewConfig / ViewParts
// ---------------------------------------------------------------------------

/// Builder settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Registered class name the view was resolved to.
    pub class_name: String,
    pub name: Option<String>,
    pub template: Option<String>,
    pub template_path: Option<String>,
    pub layout: Option<String>,
    pub layout_path: Option<String>,
    pub auto_layout: bool,
    pub theme: Option<String>,
    pub plugin: Option<String>,
    pub helpers: Vec<String>,
    pub options: BTreeMap<String, Value>,
}

/// Everything a view constructor receives.
#[derive(Debug, Clone)]
pub struct ViewParts {
    pub config: ViewConfig,
    pub vars: ViewVars,
    pub request: Option<Request>,
    pub response: Option<Response>,
    pub events: Option<Arc<EventManager>>,
    pub env: Arc<ViewEnvironment>,
}

impl ViewParts {
    fn dispatch(&self, event: Event) {
        if let Some(events) = &self.events {
            let ran = events.dispatch(&event);
            tracing::trace!(event = event.name(), listeners = ran, "dispatched view event");
        }
    }

    fn write_response(&mut self, content_type: &str, body: &str) {
        if let Some(response) = self.response.as_mut() {
            response.set_content_type(content_type);
            response.set_body(body);
        }
    }
}

// ---------------------------------------------------------------------------
// View trait
// ---------------------------------------------------------------------------

/// A configured renderer.
pub trait View: Send + Sync {
    fn parts(&self) -> &ViewParts;

    /// Render and return the output; the response (if any) receives it too.
    ///
    /// `template` / `layout` override the configured names for this call.
    fn render(&mut self, template: Option<&str>, layout: Option<&str>) -> Result<String, ViewError>;

    fn class_name(&self) -> &str {
        &self.parts().config.class_name
    }

    fn config(&self) -> &ViewConfig {
        &self.parts().config
    }

    fn vars(&self) -> &ViewVars {
        &self.parts().vars
    }

    fn request(&self) -> Option<&Request> {
        self.parts().request.as_ref()
    }

    fn response(&self) -> Option<&Response> {
        self.parts().response.as_ref()
    }
}

// ---------------------------------------------------------------------------
// TemplateView
// ---------------------------------------------------------------------------

/// Renders tera templates, wrapped in a layout when auto-layout is on.
#[derive(Debug)]
pub struct TemplateView {
    parts: ViewParts,
    helpers: Vec<Arc<Helper>>,
}

impl TemplateView {
    /// Resolve the configured helpers; unknown helper names fail.
    pub fn new(parts: ViewParts) -> Result<Self, ViewError> {
        let helpers = parts
            .config
            .helpers
            .iter()
            .map(|name| {
                parts
                    .env
                    .helpers
                    .get(name)
                    .ok_or_else(|| ViewError::MissingHelper { name: name.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TemplateView { parts, helpers })
    }

    /// Candidate names for `template`, most specific first.
    ///
    /// A leading `/` skips the template path.
    pub fn template_candidates(&self, template: &str) -> Vec<String> {
        let config = &self.parts.config;
        let base = match (template.starts_with('/'), config.template_path.as_deref()) {
            (false, Some(path)) if !path.is_empty() => {
                format!("{}/{}", path.trim_matches('/'), template)
            }
            _ => template.trim_start_matches('/').to_string(),
        };
        engine::candidate_names(&base, config.theme.as_deref(), config.plugin.as_deref())
    }

    /// Candidate names for `layout` under `Layout/[<layout_path>/]`.
    pub fn layout_candidates(&self, layout: &str) -> Vec<String> {
        let config = &self.parts.config;
        let base = match config.layout_path.as_deref().map(|p| p.trim_matches('/')) {
            Some(path) if !path.is_empty() => format!("Layout/{path}/{layout}"),
            _ => format!("Layout/{layout}"),
        };
        engine::candidate_names(&base, config.theme.as_deref(), config.plugin.as_deref())
    }

    fn tera_context(&self) -> Result<tera::Context, ViewError> {
        let config = &self.parts.config;
        let mut ctx = tera::Context::from_serialize(&self.parts.vars)?;
        ctx.insert(
            "_view",
            &serde_json::json!({
                "name": config.name,
                "template": config.template,
                "layout": config.layout,
                "theme": config.theme,
                "plugin": config.plugin,
            }),
        );
        Ok(ctx)
    }
}

impl View for TemplateView {
    fn parts(&self) -> &ViewParts {
        &self.parts
    }

    fn render(&mut self, template: Option<&str>, layout: Option<&str>) -> Result<String, ViewError> {
        let template = template
            .map(str::to_owned)
            .or_else(|| self.parts.config.template.clone())
            .ok_or_else(|| ViewError::MissingTemplate { name: String::new(), searched: vec![] })?;

        let candidates = self.template_candidates(&template);
        let found = self
            .parts
            .env
            .engine
            .find(&candidates)
            .ok_or_else(|| ViewError::MissingTemplate {
                name: template.clone(),
                searched: candidates.clone(),
            })?
            .to_owned();
        tracing::debug!(template = %found, class = %self.parts.config.class_name, "rendering template");

        let mut ctx = self.tera_context()?;
        self.parts.dispatch(Event::new(BEFORE_RENDER).with_data("template", found.as_str()));
        let content = self.parts.env.engine.render(&found, &ctx, &self.helpers)?;
        self.parts.dispatch(Event::new(AFTER_RENDER).with_data("template", found.as_str()));

        let layout = layout
            .map(str::to_owned)
            .or_else(|| self.parts.config.layout.clone())
            .filter(|l| !l.is_empty());
        let output = match layout {
            Some(layout) if self.parts.config.auto_layout => {
                let candidates = self.layout_candidates(&layout);
                let found = self
                    .parts
                    .env
                    .engine
                    .find(&candidates)
                    .ok_or_else(|| ViewError::MissingLayout {
                        name: layout.clone(),
                        searched: candidates.clone(),
                    })?
                    .to_owned();
                tracing::debug!(layout = %found, "rendering layout");

                self.parts.dispatch(Event::new(BEFORE_LAYOUT).with_data("layout", found.as_str()));
                ctx.insert(CONTENT_VAR, &content);
                let wrapped = self.parts.env.engine.render(&found, &ctx, &self.helpers)?;
                self.parts.dispatch(Event::new(AFTER_LAYOUT).with_data("layout", found.as_str()));
                wrapped
            }
            _ => content,
        };

        self.parts.write_response("text/html", &output);
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// JsonView
// ---------------------------------------------------------------------------

/// Serializes view vars as JSON. Never applies a layout.
///
/// Options:
/// - `serialize`: absent or `true` → all vars; a string → that var alone;
///   an array of strings → an object of those vars.
/// - `pretty`: pretty-print when `true`.
#[derive(Debug)]
pub struct JsonView {
    parts: ViewParts,
}

impl JsonView {
    pub fn new(parts: ViewParts) -> Result<Self, ViewError> {
        Ok(JsonView { parts })
    }

    /// The value that will be serialized.
    pub fn payload(&self) -> Value {
        let vars = &self.parts.vars;
        match self.parts.config.options.get("serialize") {
            Some(Value::String(key)) => vars.get(key).cloned().unwrap_or(Value::Null),
            Some(Value::Array(keys)) => Value::Object(
                keys.iter()
                    .filter_map(Value::as_str)
                    .filter_map(|k| vars.get(k).map(|v| (k.to_string(), v.clone())))
                    .collect(),
            ),
            Some(Value::Bool(false)) => Value::Null,
            _ => vars.to_value(),
        }
    }
}

impl View for JsonView {
    fn parts(&self) -> &ViewParts {
        &self.parts
    }

    fn render(&mut self, _template: Option<&str>, _layout: Option<&str>) -> Result<String, ViewError> {
        self.parts.dispatch(Event::new(BEFORE_RENDER).with_data("template", Value::Null));
        let payload = self.payload();
        let pretty = matches!(self.parts.config.options.get("pretty"), Some(Value::Bool(true)));
        let output = if pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };
        self.parts.dispatch(Event::new(AFTER_RENDER).with_data("template", Value::Null));
        self.parts.write_response("application/json", &output);
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TemplateEngine;
    use serde_json::json;
    use vista_core::AppConfig;

    fn parts(engine: TemplateEngine, config: ViewConfig) -> ViewParts {
        let env = ViewEnvironment::new(AppConfig::default(), engine);
        let mut vars = ViewVars::new();
        vars.set("title", "Hello").set("count", 3);
        ViewParts {
            config,
            vars,
            request: None,
            response: Some(Response::new()),
            events: None,
            env: Arc::new(env),
        }
    }

    fn config(class_name: &str) -> ViewConfig {
        ViewConfig {
            class_name: class_name.to_string(),
            name: Some("Articles".into()),
            template: Some("index".into()),
            template_path: Some("Articles".into()),
            layout: Some("default".into()),
            layout_path: None,
            auto_layout: true,
            theme: None,
            plugin: None,
            helpers: vec![],
            options: BTreeMap::new(),
        }
    }

    #[test]
    fn template_candidates_respect_theme_and_slash() {
        let mut cfg = config("View");
        cfg.theme = Some("Dark".into());
        let view = TemplateView::new(parts(TemplateEngine::empty(), cfg)).unwrap();
        assert_eq!(
            view.template_candidates("index"),
            vec!["themes/Dark/Articles/index.tera", "Articles/index.tera"]
        );
        assert_eq!(
            view.template_candidates("/Pages/home"),
            vec!["themes/Dark/Pages/home.tera", "Pages/home.tera"]
        );
    }

    #[test]
    fn layout_candidates_use_layout_path() {
        let mut cfg = config("View");
        cfg.layout_path = Some("admin".into());
        let view = TemplateView::new(parts(TemplateEngine::empty(), cfg)).unwrap();
        assert_eq!(view.layout_candidates("default"), vec!["Layout/admin/default.tera"]);
    }

    #[test]
    fn renders_template_inside_layout() {
        let engine = TemplateEngine::from_raw([
            ("Articles/index.tera", "<h1>{{ title }}</h1>"),
            ("Layout/default.tera", "<main>{{ content | safe }}</main>"),
        ])
        .unwrap();
        let mut view = TemplateView::new(parts(engine, config("View"))).unwrap();
        let out = view.render(None, None).unwrap();
        assert_eq!(out, "<main><h1>Hello</h1></main>");
        let response = view.response().unwrap();
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
        assert_eq!(response.body, out);
    }

    #[test]
    fn auto_layout_off_skips_layout() {
        let engine = TemplateEngine::from_raw([("Articles/index.tera", "{{ count }}")]).unwrap();
        let mut cfg = config("View");
        cfg.auto_layout = false;
        let mut view = TemplateView::new(parts(engine, cfg)).unwrap();
        assert_eq!(view.render(None, None).unwrap(), "3");
    }

    #[test]
    fn missing_template_lists_candidates() {
        let mut view = TemplateView::new(parts(TemplateEngine::empty(), config("View"))).unwrap();
        let err = view.render(Some("edit"), None).unwrap_err();
        match err {
            ViewError::MissingTemplate { name, searched } => {
                assert_eq!(name, "edit");
                assert_eq!(searched, vec!["Articles/edit.tera"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_layout_is_reported() {
        let engine = TemplateEngine::from_raw([("Articles/index.tera", "x")]).unwrap();
        let mut view = TemplateView::new(parts(engine, config("View"))).unwrap();
        let err = view.render(None, Some("print")).unwrap_err();
        assert!(matches!(err, ViewError::MissingLayout { ref name, .. } if name == "print"), "got: {err}");
    }

    #[test]
    fn unknown_helper_fails_construction() {
        let mut cfg = config("View");
        cfg.helpers = vec!["Paginator".into()];
        let err = TemplateView::new(parts(TemplateEngine::empty(), cfg)).unwrap_err();
        assert!(matches!(err, ViewError::MissingHelper { ref name } if name == "Paginator"));
    }

    #[test]
    fn json_view_serializes_selected_vars() {
        let mut cfg = config("JsonView");
        cfg.options.insert("serialize".into(), json!(["title", "missing"]));
        let mut view = JsonView::new(parts(TemplateEngine::empty(), cfg)).unwrap();
        assert_eq!(view.render(None, None).unwrap(), r#"{"title":"Hello"}"#);
        assert_eq!(
            view.response().unwrap().content_type.as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn json_view_single_and_all() {
        let mut cfg = config("JsonView");
        cfg.options.insert("serialize".into(), json!("count"));
        let view = JsonView::new(parts(TemplateEngine::empty(), cfg)).unwrap();
        assert_eq!(view.payload(), json!(3));

        let view = JsonView::new(parts(TemplateEngine::empty(), config("JsonView"))).unwrap();
        assert_eq!(view.payload(), json!({"count": 3, "title": "Hello"}));
    }
}
