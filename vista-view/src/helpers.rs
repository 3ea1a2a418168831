//! View helpers — named bundles of template filters.
//!
//! A view only sees the filters of the helpers its builder (or the app
//! config) enables. Built-in helpers:
//!
//! - `Number`: `number_format(precision=2, thousands=",")`
//! - `Text`: `autop` (escape, then wrap blank-line separated blocks in `<p>`)

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tera::{Filter, Tera, Value};

/// A named set of tera filters.
pub struct Helper {
    name: String,
    filters: Vec<(String, Arc<dyn Filter>)>,
}

impl Helper {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), filters: Vec::new() }
    }

    pub fn with_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push((name.into(), Arc::new(filter)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(n, _)| n.as_str())
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("name", &self.name)
            .field("filters", &self.filter_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Tera wants owned filters; this forwards to a shared one.
struct SharedFilter(Arc<dyn Filter>);

impl Filter for SharedFilter {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.filter(value, args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// Register every filter of `helpers` on `tera`.
pub(crate) fn install(tera: &mut Tera, helpers: &[Arc<Helper>]) {
    for helper in helpers {
        for (name, filter) in &helper.filters {
            tera.register_filter(name, SharedFilter(Arc::clone(filter)));
        }
    }
}

// ---------------------------------------------------------------------------
// HelperRegistry
// ---------------------------------------------------------------------------

/// Helpers available to an environment, by name.
#[derive(Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, Arc<Helper>>,
}

impl HelperRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `Number` and `Text` helpers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(Helper::new("Number").with_filter("number_format", NumberFormat))
            .register(Helper::new("Text").with_filter("autop", AutoParagraph));
        registry
    }

    pub fn register(&mut self, helper: Helper) -> &mut Self {
        self.helpers.insert(helper.name.clone(), Arc::new(helper));
        self
    }

    /// Look a helper up by name. `FooHelper` and `Plugin.Foo` both resolve to `Foo`.
    pub fn get(&self, name: &str) -> Option<Arc<Helper>> {
        let short = name.rsplit('.').next().unwrap_or(name);
        self.helpers
            .get(short)
            .or_else(|| short.strip_suffix("Helper").and_then(|s| self.helpers.get(s)))
            .cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.helpers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry").field("helpers", &self.names()).finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in filters
// ---------------------------------------------------------------------------

/// Largest `precision` `number_format` accepts.
const MAX_PRECISION: usize = 20;

struct NumberFormat;

impl Filter for NumberFormat {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let n = value.as_f64().ok_or_else(|| {
            tera::Error::msg(format!("number_format: expected a number, got {value}"))
        })?;
        let precision = match args.get("precision") {
            Some(p) => p
                .as_u64()
                .filter(|p| *p <= MAX_PRECISION as u64)
                .ok_or_else(|| {
                    tera::Error::msg(format!(
                        "number_format: `precision` must be an integer from 0 to {MAX_PRECISION}"
                    ))
                })? as usize,
            None => 2,
        };
        let thousands = match args.get("thousands") {
            Some(Value::String(s)) => s.as_str(),
            Some(_) => return Err(tera::Error::msg("number_format: `thousands` must be a string")),
            None => ",",
        };
        Ok(Value::String(format_number(n, precision, thousands)))
    }
}

fn format_number(n: f64, precision: usize, thousands: &str) -> String {
    let formatted = format!("{:.*}", precision, n.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3);
    if n < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(thousands);
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

struct AutoParagraph;

impl Filter for AutoParagraph {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
        let text = value
            .as_str()
            .ok_or_else(|| tera::Error::msg(format!("autop: expected a string, got {value}")))?;
        let normalized = text.replace("\r\n", "\n");
        let paragraphs: Vec<String> = normalized
            .split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                let escaped = tera::escape_html(block);
                format!("<p>{}</p>", escaped.replace('\n', "<br />\n"))
            })
            .collect();
        Ok(Value::String(paragraphs.join("\n")))
    }

    // Input is escaped above.
    fn is_safe(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
