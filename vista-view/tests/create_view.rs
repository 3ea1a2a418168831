//! End-to-end host → builder → view tests against templates on disk.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

use vista_core::{AppConfig, Event, EventManager, LegacyViewProps, Request, Response};
use vista_view::{ViewEnvironment, ViewError, ViewState, ViewVarsHost};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, content).expect("write template");
}

fn template_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Articles/index.tera", "<h1>{{ title }}</h1>");
    write(dir.path(), "Articles/total.tera", "{{ total | number_format }}");
    write(dir.path(), "Articles/admin/list.tera", "admin list");
    write(dir.path(), "themes/Dark/Articles/index.tera", "<h1 class=\"dark\">{{ title }}</h1>");
    write(dir.path(), "plugins/Blog/Posts/view.tera", "post {{ _view.plugin }}");
    write(dir.path(), "Layout/default.tera", "<body>{{ content | safe }}</body>");
    write(dir.path(), "Layout/admin/default.tera", "<admin>{{ content | safe }}</admin>");
    dir
}

fn environment(dir: &TempDir) -> Arc<ViewEnvironment> {
    let config = AppConfig {
        template_dirs: vec![dir.path().to_path_buf()],
        ..Default::default()
    };
    Arc::new(ViewEnvironment::from_config(config, dir.path()).expect("environment"))
}

/// Controller-like host exposing every optional hook.
#[derive(Default)]
struct ArticlesController {
    state: ViewState,
    helpers: Option<Vec<String>>,
    plugin: Option<String>,
    request: Option<Request>,
    response: Option<Response>,
    events: Option<Arc<EventManager>>,
    serialize: Option<Value>,
}

impl ArticlesController {
    fn new(env: Arc<ViewEnvironment>) -> Self {
        Self {
            state: ViewState::new(env),
            ..Default::default()
        }
    }
}

impl ViewVarsHost for ArticlesController {
    fn view_state(&self) -> &ViewState {
        &self.state
    }

    fn view_state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn name(&self) -> Option<String> {
        Some("Articles".to_string())
    }

    fn helpers(&self) -> Option<Vec<String>> {
        self.helpers.clone()
    }

    fn plugin(&self) -> Option<String> {
        self.plugin.clone()
    }

    fn request(&self) -> Option<Request> {
        self.request.clone()
    }

    fn response(&self) -> Option<Response> {
        self.response.clone()
    }

    fn event_manager(&self) -> Option<Arc<EventManager>> {
        self.events.clone()
    }

    fn view_option(&self, option: &str) -> Option<Value> {
        match option {
            "serialize" => self.serialize.clone(),
            _ => None,
        }
    }
}

/// Collects formatted tracing output.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, captured.text())
}

// ---------------------------------------------------------------------------
// 1. Context store precedence through the host
// ---------------------------------------------------------------------------

#[test]
fn repeated_set_keeps_first_value_in_rendered_output() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.set("title", "first").set("title", "second");
    controller.view_builder().set_template("index");

    let out = controller.create_view(None).expect("view").render(None, None).expect("render");
    assert_eq!(out, "<body><h1>first</h1></body>");
}

#[test]
fn mapping_then_single_set() {
    let mut controller = ArticlesController::default();
    controller.set_many([("x", 1), ("y", 2)]);
    controller.set("x", 99);
    assert_eq!(controller.view_vars().get("x"), Some(&json!(1)));
    assert_eq!(controller.view_vars().get("y"), Some(&json!(2)));
}

#[test]
fn mismatched_pairs_are_rejected() {
    let mut controller = ArticlesController::default();
    let err = controller
        .set_pairs(vec!["a", "b", "c"], vec![1, 2])
        .err()
        .expect("should fail");
    assert!(matches!(err, ViewError::Vars(_)), "got: {err}");
    assert!(controller.view_vars().is_empty());
}

// ---------------------------------------------------------------------------
// 2. Class resolution
// ---------------------------------------------------------------------------

#[rstest]
#[case(None, None, "View")]
#[case(Some("Json"), None, "JsonView")]
#[case(None, Some("Json"), "JsonView")]
#[case(Some("View"), Some("Json"), "View")]
fn explicit_class_always_wins(
    #[case] explicit: Option<&str>,
    #[case] preset: Option<&str>,
    #[case] expected: &str,
) {
    let mut controller = ArticlesController::default();
    if let Some(preset) = preset {
        controller.view_builder().set_class_name(preset);
    }
    let view = controller.create_view(explicit).expect("view");
    assert_eq!(view.class_name(), expected);
}

#[test]
fn missing_class_is_reported() {
    let mut controller = ArticlesController::default();
    let err = controller.create_view(Some("Pdf")).err().expect("should fail");
    assert!(matches!(err, ViewError::MissingView { ref class } if class == "Pdf"), "got: {err}");
}

#[test]
fn config_default_class_applies_when_nothing_is_named() {
    let env = ViewEnvironment::new(
        AppConfig { default_view_class: Some("Json".into()), ..Default::default() },
        Default::default(),
    );
    let mut controller = ArticlesController::new(Arc::new(env));
    let view = controller.create_view(None).expect("view");
    assert_eq!(view.class_name(), "JsonView");
}

// ---------------------------------------------------------------------------
// 3. Legacy properties
// ---------------------------------------------------------------------------

#[test]
fn legacy_props_apply_with_deprecation_warnings() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.state.legacy = LegacyViewProps {
        view: Some("list".into()),
        view_path: Some("Articles/admin".into()),
        layout_path: Some("admin".into()),
        ..Default::default()
    };

    let (out, logs) = with_captured_logs(|| {
        controller.create_view(None).expect("view").render(None, None).expect("render")
    });
    assert_eq!(out, "<admin>admin list</admin>");
    assert!(logs.contains("property `view` is deprecated"), "logs: {logs}");
    assert!(logs.contains("ViewBuilder::set_template_path()"), "logs: {logs}");
    assert!(logs.contains("property `layout_path` is deprecated"), "logs: {logs}");
    assert!(!logs.contains("property `theme`"), "only present props warn: {logs}");
}

#[test]
fn legacy_auto_layout_off() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.state.legacy.auto_layout = Some(false);
    controller.set("title", "bare");
    controller.view_builder().set_template("index");

    let out = controller.create_view(None).expect("view").render(None, None).expect("render");
    assert_eq!(out, "<h1>bare</h1>");
}

#[test]
fn view_options_call_warns() {
    let mut controller = ArticlesController::default();
    let (opts, logs) = with_captured_logs(|| controller.view_options(Some(&["serialize"][..]), true));
    assert_eq!(opts.as_slice(), &["serialize"]);
    assert!(logs.contains("view_options() is deprecated"), "logs: {logs}");
}

// ---------------------------------------------------------------------------
// 4. Template lookup, layouts, helpers
// ---------------------------------------------------------------------------

#[test]
fn theme_template_shadows_application_template() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.set("title", "Themed");
    controller.view_builder().set_template("index").set_theme("Dark");

    let out = controller.create_view(None).expect("view").render(None, None).expect("render");
    assert_eq!(out, "<body><h1 class=\"dark\">Themed</h1></body>");
}

#[test]
fn plugin_templates_are_found() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.plugin = Some("Blog".into());
    controller
        .view_builder()
        .set_template_path("Posts")
        .set_template("view")
        .disable_auto_layout();

    let out = controller.create_view(None).expect("view").render(None, None).expect("render");
    assert_eq!(out, "post Blog");
}

#[test]
fn host_helpers_enable_filters() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.helpers = Some(vec!["Number".into()]);
    controller.set("total", 1234567.5);
    controller.view_builder().set_template("total").disable_auto_layout();

    let out = controller.create_view(None).expect("view").render(None, None).expect("render");
    assert_eq!(out, "1,234,567.50");
}

#[test]
fn filter_without_helper_fails() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    controller.set("total", 10);
    controller.view_builder().set_template("total").disable_auto_layout();

    let err = controller
        .create_view(None)
        .expect("view")
        .render(None, None)
        .unwrap_err();
    assert!(matches!(err, ViewError::Tera(_)), "got: {err}");
}

#[test]
fn missing_template_names_search_path() {
    let dir = template_dir();
    let mut controller = ArticlesController::new(environment(&dir));
    let err = controller
        .create_view(None)
        .expect("view")
        .render(Some("edit"), None)
        .unwrap_err();
    assert!(err.to_string().contains("Articles/edit.tera"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 5. Request / response / events
// ---------------------------------------------------------------------------

#[test]
fn request_response_and_events_reach_the_view() {
    let dir = template_dir();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventManager::new();
    for name in [
        "View.beforeRender",
        "View.afterRender",
        "View.beforeLayout",
        "View.afterLayout",
    ] {
        let seen = Arc::clone(&seen);
        events.on(name, move |e: &Event| seen.lock().expect("lock").push(e.name().to_string()));
    }

    let mut controller = ArticlesController::new(environment(&dir));
    controller.request = Some(Request::new("GET", "/articles").with_param("page", "2"));
    controller.response = Some(Response::new());
    controller.events = Some(Arc::new(events));
    controller.set("title", "Evented");
    controller.view_builder().set_template("index");

    let mut view = controller.create_view(None).expect("view");
    let out = view.render(None, None).expect("render");

    assert_eq!(view.request().and_then(|r| r.param("page")), Some("2"));
    let response = view.response().expect("response");
    assert_eq!(response.body, out);
    assert_eq!(response.content_type.as_deref(), Some("text/html"));
    assert_eq!(
        *seen.lock().expect("lock"),
        vec![
            "View.beforeRender",
            "View.afterRender",
            "View.beforeLayout",
            "View.afterLayout",
        ]
    );
}

#[test]
fn json_view_dispatches_render_events() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut events = EventManager::new();
    for name in ["View.beforeRender", "View.afterRender", "View.beforeLayout"] {
        let seen = Arc::clone(&seen);
        events.on(name, move |e: &Event| seen.lock().expect("lock").push(e.name().to_string()));
    }

    let mut controller = ArticlesController::default();
    controller.response = Some(Response::new());
    controller.events = Some(Arc::new(events));
    controller.set("id", 7);

    let mut view = controller.create_view(Some("Json")).expect("view");
    assert_eq!(view.render(None, None).expect("render"), r#"{"id":7}"#);
    assert_eq!(
        view.response().and_then(|r| r.content_type.as_deref()),
        Some("application/json")
    );
    assert_eq!(*seen.lock().expect("lock"), vec!["View.beforeRender", "View.afterRender"]);
}

#[test]
fn allowlisted_host_options_drive_json_view() {
    let mut controller = ArticlesController::default();
    controller.serialize = Some(json!(["title"]));
    controller.set("title", "Only me").set("secret", "hidden");
    controller.view_options(Some(&["serialize"][..]), true);

    let mut view = controller.create_view(Some("Json")).expect("view");
    assert_eq!(view.render(None, None).expect("render"), r#"{"title":"Only me"}"#);
}

#[test]
fn options_not_allowlisted_are_ignored() {
    let mut controller = ArticlesController::default();
    controller.serialize = Some(json!("title"));
    controller.set("title", "t").set("other", "o");

    let mut view = controller.create_view(Some("Json")).expect("view");
    assert_eq!(view.render(None, None).expect("render"), r#"{"other":"o","title":"t"}"#);
}
