//! Host-side view configuration types.
//!
//! [`LegacyViewProps`] carries the deprecated per-host view settings that are
//! copied onto a view builder at render time. [`ValidViewOptions`] is the
//! allowlist of host properties forwarded as builder options.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Legacy view properties
// ---------------------------------------------------------------------------

/// Deprecated view settings a host may still carry.
///
/// Every field that is `Some` is applied to the builder when a view is
/// created, with a deprecation diagnostic pointing at the builder setter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyViewProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    /// Template name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<bool>,
    /// Template path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_path: Option<String>,
}

impl LegacyViewProps {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Valid view options
// ---------------------------------------------------------------------------

/// Ordered, duplicate-free list of option names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidViewOptions(Vec<String>);

impl ValidViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `options`, skipping names already registered.
    pub fn merge<I, S>(&mut self, options: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for option in options {
            let option = option.into();
            if !self.0.contains(&option) {
                self.0.push(option);
            }
        }
        self
    }

    /// Discard the current list and register `options` instead.
    pub fn replace<I, S>(&mut self, options: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.clear();
        self.merge(options)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.iter().any(|o| o == option)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ValidViewOptions {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut options = ValidViewOptions::new();
        options.merge(iter);
        options
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
