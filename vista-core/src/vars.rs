//! View vars — the context store a host accumulates for its view.
//!
//! Merging is additive and never destructive: a key that is already present
//! keeps its value when the same key is set again. Use [`ViewVars::replace`]
//! to overwrite explicitly.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VarsError;

/// Key-ordered mapping of template variable names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewVars(BTreeMap<String, Value>);

impl ViewVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a single variable. An existing entry with the same key wins.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.entry(key.into()).or_insert_with(|| value.into());
        self
    }

    /// Save every pair of `data`, honoring the same precedence as [`set`](Self::set).
    pub fn set_many<I, K, V>(&mut self, data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in data {
            self.set(key, value);
        }
        self
    }

    /// Pair `keys` with `values` positionally and merge the result.
    ///
    /// Mismatched lengths are rejected and the store is left untouched.
    pub fn set_pairs<K, V>(&mut self, keys: Vec<K>, values: Vec<V>) -> Result<&mut Self, VarsError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        if keys.len() != values.len() {
            return Err(VarsError::MismatchedPairs {
                keys: keys.len(),
                values: values.len(),
            });
        }
        Ok(self.set_many(keys.into_iter().zip(values)))
    }

    /// Merge `other` into `self`; entries already in `self` win.
    pub fn merge(&mut self, other: ViewVars) -> &mut Self {
        self.set_many(other.0)
    }

    /// Overwrite `key` unconditionally, returning the previous value.
    pub fn replace(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// Render the vars as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ViewVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = ViewVars::new();
        vars.set_many(iter);
        vars
    }
}

impl IntoIterator for ViewVars {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ViewVars {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
