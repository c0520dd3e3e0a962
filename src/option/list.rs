//! List-policy option: ordered accretion of contributions.

use serde_json::Value;

use super::{ExtensionPoint, OptionEntry, PluginValue};
use crate::plugin::{PluginError, PluginResult};

/// Result of applying one list entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedValue {
    /// Plugin that contributed the entry.
    pub contributor: String,
    /// Return value of a callback, or the entry's own data.
    pub value: Value,
}

/// Ordered list of contributions for hooks, pages, components and similar.
#[derive(Debug, Clone)]
pub struct ListOption {
    point: ExtensionPoint,
    entries: Vec<OptionEntry>,
}

impl ListOption {
    pub fn new(point: ExtensionPoint) -> Self {
        Self { point, entries: Vec::new() }
    }

    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    /// Append a contribution. List contributions are flattened one level.
    pub fn add(&mut self, contributor: &str, value: PluginValue) {
        match value {
            PluginValue::Null => {}
            PluginValue::List(items) => {
                self.entries.extend(
                    items
                        .into_iter()
                        .filter(|item| !item.is_null())
                        .map(|value| OptionEntry::new(contributor, value)),
                );
            }
            value => self.entries.push(OptionEntry::new(contributor, value)),
        }
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// Aggregated values in contribution order.
    pub fn values(&self) -> impl Iterator<Item = &PluginValue> {
        self.entries.iter().map(|e| &e.value)
    }

    /// Callback values in contribution order.
    pub fn functions(&self) -> impl Iterator<Item = &super::Callback> {
        self.values().filter_map(PluginValue::as_function)
    }

    /// String values in contribution order.
    pub fn strings(&self) -> Vec<&str> {
        self.values().filter_map(PluginValue::as_str).collect()
    }

    /// Invoke every callback with `args` and pass data entries through.
    ///
    /// Stops at the first failing callback.
    pub fn apply(&self, args: &[Value]) -> PluginResult<Vec<AppliedValue>> {
        let mut applied = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let value = match &entry.value {
                PluginValue::Function(callback) => {
                    let mut target = Value::Null;
                    callback.call(&mut target, args).map_err(|source| PluginError::Callback {
                        plugin: entry.contributor.clone(),
                        option: self.point.name(),
                        source,
                    })?
                }
                data => data.to_json().unwrap_or(Value::Null),
            };

            applied.push(AppliedValue { contributor: entry.contributor.clone(), value });
        }

        Ok(applied)
    }

    /// Remove every entry contributed by `contributor`. Returns how many were removed.
    pub fn remove(&mut self, contributor: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.contributor != contributor);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
