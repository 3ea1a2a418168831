//! `vista render <template>` — build a view through the host trait and print it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use vista_core::{Request, Response};
use vista_view::{View, ViewEnvironment, ViewState, ViewVarsHost};

use super::load_environment;
use crate::VarArg;

/// Arguments for `vista render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name, relative to the template path (a leading `/` ignores it).
    pub template: String,

    /// Template directory; repeatable, overrides the config file's list.
    #[arg(long = "template-dir", short = 'd', value_name = "DIR")]
    pub template_dirs: Vec<PathBuf>,

    /// Template path (sub-directory) the template lives in.
    #[arg(long)]
    pub path: Option<String>,

    /// Layout to wrap the output in.
    #[arg(long, conflicts_with = "no_layout")]
    pub layout: Option<String>,

    /// Render without a layout.
    #[arg(long)]
    pub no_layout: bool,

    /// Sub-directory of `Layout/` the layout lives in.
    #[arg(long)]
    pub layout_path: Option<String>,

    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long)]
    pub plugin: Option<String>,

    /// View class, e.g. `View` or `Json`.
    #[arg(long = "class", short = 'c')]
    pub class: Option<String>,

    /// Helper to enable; repeatable.
    #[arg(long = "helper")]
    pub helpers: Vec<String>,

    /// View var as key=value (JSON values keep their type); repeatable.
    #[arg(long = "var", short = 'v', value_name = "KEY=VALUE")]
    pub vars: Vec<VarArg>,

    /// JSON object file whose entries become view vars.
    #[arg(long)]
    pub vars_file: Option<PathBuf>,
}

/// The command acts as the view vars host.
struct RenderCommand {
    state: ViewState,
    helpers: Vec<String>,
    plugin: Option<String>,
    request: Request,
}

impl ViewVarsHost for RenderCommand {
    fn view_state(&self) -> &ViewState {
        &self.state
    }

    fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn helpers(&self) -> Option<Vec<String>> {
        (!self.helpers.is_empty()).then(|| self.helpers.clone())
    }

    fn plugin(&self) -> Option<String> {
        self.plugin.clone()
    }

    fn request(&self) -> Option<Request> {
        Some(self.request.clone())
    }

    fn response(&self) -> Option<Response> {
        Some(Response::new())
    }
}

fn read_vars_file(path: &Path) -> Result<serde_json::Map<String, Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read vars file '{}'", path.display()))?;
    match serde_json::from_str(&contents)
        .with_context(|| format!("invalid JSON in '{}'", path.display()))?
    {
        Value::Object(map) => Ok(map),
        other => bail!(
            "vars file '{}' must hold a JSON object, found {}",
            path.display(),
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl RenderArgs {
    pub fn run(self, config_path: &Path) -> Result<()> {
        let env = load_environment(config_path, &self.template_dirs)?;
        let output = self.render(Arc::new(env))?;
        print!("{output}");
        if !output.ends_with('\n') {
            println!();
        }
        Ok(())
    }

    fn render(self, env: Arc<ViewEnvironment>) -> Result<String> {
        let mut host = RenderCommand {
            state: ViewState::new(env),
            helpers: self.helpers,
            plugin: self.plugin,
            request: Request::new("GET", format!("/{}", self.template.trim_start_matches('/'))),
        };

        // --var entries first so they win over the file.
        host.set_many(self.vars.into_iter().map(|v| (v.key, v.value)));
        if let Some(path) = &self.vars_file {
            host.set_many(read_vars_file(path)?);
        }

        let builder = host.view_builder();
        if let Some(path) = self.path {
            builder.set_template_path(path);
        }
        if let Some(layout) = self.layout {
            builder.set_layout(layout);
        }
        if self.no_layout {
            builder.disable_auto_layout();
        }
        if let Some(path) = self.layout_path {
            builder.set_layout_path(path);
        }
        if let Some(theme) = self.theme {
            builder.set_theme(theme);
        }

        let mut view = host
            .create_view(self.class.as_deref())
            .context("failed to build view")?;
        tracing::debug!(class = view.class_name(), template = %self.template, "rendering");
        view.render(Some(&self.template), None)
            .with_context(|| format!("failed to render '{}'", self.template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vista_core::AppConfig;
    use vista_view::TemplateEngine;

    fn args(template: &str) -> RenderArgs {
        RenderArgs {
            template: template.to_string(),
            template_dirs: vec![],
            path: None,
            layout: None,
            no_layout: false,
            layout_path: None,
            theme: None,
            plugin: None,
            class: None,
            helpers: vec![],
            vars: vec![],
            vars_file: None,
        }
    }

    fn env(templates: &[(&str, &str)]) -> Arc<ViewEnvironment> {
        let engine = TemplateEngine::from_raw(templates.iter().copied()).unwrap();
        Arc::new(ViewEnvironment::new(AppConfig::default(), engine))
    }

    #[test]
    fn command_line_vars_win_over_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("vars.json");
        std::fs::write(&file, r#"{"title": "from file", "extra": 2}"#).unwrap();

        let mut a = args("page");
        a.no_layout = true;
        a.vars = vec!["title=from flag".parse().unwrap()];
        a.vars_file = Some(file);
        let out = a.render(env(&[("page.tera", "{{ title }}/{{ extra }}")])).unwrap();
        assert_eq!(out, "from flag/2");
    }

    #[test]
    fn vars_file_must_be_object() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("vars.json");
        std::fs::write(&file, "[1, 2]").unwrap();
        let err = read_vars_file(&file).unwrap_err();
        assert!(err.to_string().contains("an array"), "got: {err}");
    }

    #[test]
    fn json_class_ignores_templates() {
        let mut a = args("anything");
        a.class = Some("Json".into());
        a.vars = vec!["n=1".parse().unwrap()];
        let out = a.render(env(&[])).unwrap();
        assert_eq!(out, r#"{"n":1}"#);
    }
}
