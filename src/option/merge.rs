//! Merge-policy option: shallow key merge for `define` and `alias`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ExtensionPoint, OptionEntry, PluginValue};
use crate::plugin::{PluginError, PluginResult};

/// What happens when two contributions write the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later contribution wins, nothing is logged.
    #[default]
    Override,
    /// Later contribution wins and a warning is logged.
    Warn,
    /// Earlier contribution is kept and the collision is reported.
    Error,
}

/// A key written by more than one contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub key: String,
    pub previous: String,
    pub current: String,
}

/// Accumulated key/value mapping built from object contributions.
#[derive(Debug, Clone)]
pub struct MergeOption {
    point: ExtensionPoint,
    policy: CollisionPolicy,
    entries: Vec<OptionEntry>,
    merged: Map<String, Value>,
    owners: HashMap<String, String>,
    collisions: Vec<Collision>,
}

impl MergeOption {
    pub fn new(point: ExtensionPoint, policy: CollisionPolicy) -> Self {
        Self {
            point,
            policy,
            entries: Vec::new(),
            merged: Map::new(),
            owners: HashMap::new(),
            collisions: Vec::new(),
        }
    }

    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Record a contribution. Objects are merged immediately; callbacks are
    /// kept and evaluated by [`MergeOption::resolve`].
    pub fn add(&mut self, contributor: &str, value: PluginValue) {
        if value.is_null() {
            return;
        }

        self.insert(contributor, value, true);
    }

    fn insert(&mut self, contributor: &str, value: PluginValue, report: bool) {
        if let PluginValue::Object(map) = &value {
            self.merge_object(contributor, map, report);
        }
        self.entries.push(OptionEntry::new(contributor, value));
    }

    fn merge_object(&mut self, contributor: &str, map: &Map<String, Value>, report: bool) {
        for (key, value) in map {
            if let Some(previous) = self.owners.get(key) {
                let collision = Collision {
                    key: key.clone(),
                    previous: previous.clone(),
                    current: contributor.to_string(),
                };
                if report {
                    self.report(&collision);
                }
                self.collisions.push(collision);

                if self.policy == CollisionPolicy::Error {
                    continue;
                }
            }

            self.owners.insert(key.clone(), contributor.to_string());
            self.merged.insert(key.clone(), value.clone());
        }
    }

    fn report(&self, collision: &Collision) {
        match self.policy {
            CollisionPolicy::Override => {}
            CollisionPolicy::Warn => tracing::warn!(
                option = self.point.name(),
                key = %collision.key,
                previous = %collision.previous,
                current = %collision.current,
                "Option key overridden"
            ),
            CollisionPolicy::Error => tracing::warn!(
                option = self.point.name(),
                key = %collision.key,
                previous = %collision.previous,
                current = %collision.current,
                "Option key collision rejected, keeping earlier value"
            ),
        }
    }

    /// Merged mapping of all object contributions.
    pub fn merged(&self) -> &Map<String, Value> {
        &self.merged
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key)
    }

    /// Every collision seen so far, in the order they happened.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Evaluate callback contributions with `args` and merge everything in
    /// contribution order.
    ///
    /// Callbacks must return an object; other results are ignored with a warning.
    pub fn resolve(&self, args: &[Value]) -> PluginResult<Map<String, Value>> {
        let mut resolved = Map::new();

        for entry in &self.entries {
            let produced;
            let map = match &entry.value {
                PluginValue::Object(map) => map,
                PluginValue::Function(callback) => {
                    let mut target = Value::Null;
                    produced = callback.call(&mut target, args).map_err(|source| {
                        PluginError::Callback {
                            plugin: entry.contributor.clone(),
                            option: self.point.name(),
                            source,
                        }
                    })?;
                    match &produced {
                        Value::Object(map) => map,
                        Value::Null => continue,
                        other => {
                            tracing::warn!(
                                plugin = %entry.contributor,
                                option = self.point.name(),
                                "Expected an object, ignoring {}",
                                other
                            );
                            continue;
                        }
                    }
                }
                _ => continue,
            };

            for (key, value) in map {
                if self.policy == CollisionPolicy::Error && resolved.contains_key(key) {
                    continue;
                }
                resolved.insert(key.clone(), value.clone());
            }
        }

        Ok(resolved)
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// Drop every contribution from `contributor` and rebuild the mapping.
    ///
    /// Collisions between the remaining contributions are recomputed but not
    /// logged again.
    pub fn remove(&mut self, contributor: &str) -> usize {
        let before = self.entries.len();
        let remaining: Vec<OptionEntry> =
            self.entries.drain(..).filter(|e| e.contributor != contributor).collect();
        let removed = before - remaining.len();

        self.clear();
        for entry in remaining {
            self.insert(&entry.contributor, entry.value, false);
        }

        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.merged.clear();
        self.owners.clear();
        self.collisions.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
