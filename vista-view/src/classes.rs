//! View class registry — resolves class names to view constructors.
//!
//! Resolution for a requested name `N`:
//! 1. `Plugin.N` is looked up as `N`,
//! 2. `N` itself if registered,
//! 3. `NView` (so `Json` finds `JsonView`).
//!
//! With no name at all: `AppView` if registered, else `View`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::ViewError;
use crate::view::{JsonView, TemplateView, View, ViewParts};

pub const DEFAULT_CLASS: &str = "View";
pub const APP_CLASS: &str = "AppView";

/// Builds a view from its parts.
pub type ViewConstructor =
    Arc<dyn Fn(ViewParts) -> Result<Box<dyn View>, ViewError> + Send + Sync>;

/// Named view constructors.
#[derive(Clone, Default)]
pub struct ViewClassRegistry {
    classes: HashMap<String, ViewConstructor>,
}

impl ViewClassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `View` and `JsonView`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register(DEFAULT_CLASS, |parts| Ok(Box::new(TemplateView::new(parts)?) as Box<dyn View>))
            .register("JsonView", |parts| Ok(Box::new(JsonView::new(parts)?) as Box<dyn View>));
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(ViewParts) -> Result<Box<dyn View>, ViewError> + Send + Sync + 'static,
    {
        self.classes.insert(name.into(), Arc::new(constructor));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `requested` (or `fallback` when `requested` is `None`) to its
    /// registered name and constructor.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        fallback: Option<&str>,
    ) -> Result<(String, ViewConstructor), ViewError> {
        match requested.or(fallback).filter(|n| !n.is_empty()) {
            Some(name) => self
                .lookup(name)
                .ok_or_else(|| ViewError::MissingView { class: name.to_string() }),
            None => self
                .lookup(APP_CLASS)
                .or_else(|| self.lookup(DEFAULT_CLASS))
                .ok_or_else(|| ViewError::MissingView { class: DEFAULT_CLASS.to_string() }),
        }
    }

    fn lookup(&self, name: &str) -> Option<(String, ViewConstructor)> {
        let short = name.rsplit('.').next().unwrap_or(name);
        let get = |n: String| self.classes.get(&n).map(|c| (n, Arc::clone(c)));
        get(short.to_string()).or_else(|| get(format!("{short}View")))
    }
}

impl fmt::Debug for ViewClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewClassRegistry").field("classes", &self.names()).finish()
    }
}
