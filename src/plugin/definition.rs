//! Plugin definitions, factories and queue records.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{PluginApi, PluginConfigEntry, PluginContext, PluginError, PluginResult};
use crate::option::{ExtensionPoint, PluginValue};

/// Fields of a definition that are not extension points.
pub(crate) const RESERVED_FIELDS: &[&str] = &["name", "shortcut", "enabled", "multiple", "plugins"];

/// A plugin as authored: metadata plus raw extension point values.
#[derive(Debug, Clone)]
pub struct PluginDefinition {
    /// Plugin name. May be empty for inline plugins; the engine assigns one.
    pub name: String,
    /// Short alias the plugin was referenced by.
    pub shortcut: Option<String>,
    /// Whether the plugin is applied.
    pub enabled: bool,
    /// Allow several records with this name in the queue.
    pub multiple: bool,
    /// Plugins registered right after this one.
    pub plugins: Vec<PluginConfigEntry>,
    /// Raw values keyed by field name.
    pub fields: BTreeMap<String, PluginValue>,
}

impl PluginDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shortcut: None,
            enabled: true,
            multiple: false,
            plugins: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Set a field by name.
    ///
    /// Unknown names are kept and ignored when the plugin is applied.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<PluginValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Set an extension point field.
    #[must_use]
    pub fn with_point(self, point: ExtensionPoint, value: impl Into<PluginValue>) -> Self {
        self.with(point.name(), value)
    }

    #[must_use]
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    /// Add a nested plugin.
    #[must_use]
    pub fn plugin(mut self, entry: PluginConfigEntry) -> Self {
        self.plugins.push(entry);
        self
    }

    pub fn field(&self, name: &str) -> Option<&PluginValue> {
        self.fields.get(name)
    }

    /// Build a data-only definition from an object.
    ///
    /// `name`, `shortcut`, `enabled`, `multiple` and `plugins` are read as
    /// metadata; every other key becomes a field.
    pub fn from_json(object: &Map<String, Value>) -> PluginResult<Self> {
        let name = match object.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(PluginError::InvalidDefinition(format!(
                    "\"name\" must be a string, got {other}"
                )))
            }
        };

        let mut definition = Self::new(name);
        definition.shortcut = object.get("shortcut").and_then(Value::as_str).map(str::to_string);
        definition.enabled = object.get("enabled").and_then(Value::as_bool).unwrap_or(true);
        definition.multiple = object.get("multiple").and_then(Value::as_bool).unwrap_or(false);

        if let Some(plugins) = object.get("plugins") {
            definition.plugins = PluginConfigEntry::parse_list(plugins)?;
        }

        for (key, value) in object {
            if !RESERVED_FIELDS.contains(&key.as_str()) {
                definition.fields.insert(key.clone(), PluginValue::from(value.clone()));
            }
        }

        Ok(definition)
    }
}

type FactoryFn =
    dyn Fn(&Map<String, Value>, &PluginContext, &PluginApi) -> anyhow::Result<PluginDefinition>
        + Send
        + Sync;

/// A function producing a definition from user options.
#[derive(Clone)]
pub struct PluginFactory {
    inner: Arc<FactoryFn>,
}

impl PluginFactory {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Map<String, Value>, &PluginContext, &PluginApi) -> anyhow::Result<PluginDefinition>
            + Send
            + Sync
            + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    pub fn call(
        &self,
        options: &Map<String, Value>,
        context: &PluginContext,
        api: &PluginApi,
    ) -> anyhow::Result<PluginDefinition> {
        (self.inner)(options, context, api)
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PluginFactory(..)")
    }
}

/// What a plugin reference resolves to.
#[derive(Debug, Clone)]
pub enum PluginEntry {
    Definition(PluginDefinition),
    Factory(PluginFactory),
}

impl From<PluginDefinition> for PluginEntry {
    fn from(definition: PluginDefinition) -> Self {
        Self::Definition(definition)
    }
}

impl From<PluginFactory> for PluginEntry {
    fn from(factory: PluginFactory) -> Self {
        Self::Factory(factory)
    }
}

/// Lifecycle state of a queued plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// In the queue, contributions not routed yet.
    Registered,
    /// Contributions routed into the option set.
    Applied,
}

/// A normalized plugin in the queue.
#[derive(Debug, Clone)]
pub struct PluginRecord {
    pub(crate) name: String,
    pub(crate) shortcut: Option<String>,
    pub(crate) enabled: bool,
    pub(crate) multiple: bool,
    pub(crate) options: Map<String, Value>,
    pub(crate) fields: BTreeMap<String, PluginValue>,
    pub(crate) state: RecordState,
}

impl PluginRecord {
    pub(crate) fn new(definition: PluginDefinition, options: Map<String, Value>) -> Self {
        Self {
            name: definition.name,
            shortcut: definition.shortcut,
            enabled: definition.enabled,
            multiple: definition.multiple,
            options,
            fields: definition.fields,
            state: RecordState::Registered,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// User options the plugin was built with.
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn fields(&self) -> &BTreeMap<String, PluginValue> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&PluginValue> {
        self.fields.get(name)
    }

    pub fn state(&self) -> RecordState {
        self.state
    }
}
