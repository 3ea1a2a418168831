//! Synchronous event dispatch.
//!
//! Listeners are registered while the manager is still exclusively owned and
//! the manager is then shared behind an `Arc`; dispatch only needs `&self`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;

/// A named event with free-form data.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    name: String,
    data: BTreeMap<String, Value>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), data: BTreeMap::new() }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

type Listener = Box<dyn Fn(&Event) + Send + Sync>;

/// Maps event names to listeners, called in registration order.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<String, Vec<Listener>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, name: impl Into<String>, listener: F) -> &mut Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.listeners.entry(name.into()).or_default().push(Box::new(listener));
        self
    }

    /// Call every listener registered for `event.name()`; returns how many ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        match self.listeners.get(event.name()) {
            Some(listeners) => {
                for listener in listeners {
                    listener(event);
                }
                listeners.len()
            }
            None => 0,
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self.listeners.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventManager").field("listeners", &counts).finish()
    }
}
