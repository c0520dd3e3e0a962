//! Declarative plugin-list configuration.
//!
//! A plugin list is either a sequence or a map:
//!
//! ```toml
//! plugins = [
//!     "search",                            # bare reference
//!     ["pwa", { serviceWorker = true }],   # reference with options
//!     { name = "inline", alias = {} },     # inline definition
//!     false,                               # skipped
//! ]
//! ```
//!
//! ```toml
//! [plugins]
//! search = {}
//! pwa = false   # registered but disabled
//! ```

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{PluginDefinition, PluginEntry, PluginError, PluginFactory, PluginResult};

/// How a plugin is referenced.
#[derive(Debug, Clone)]
pub enum PluginRef {
    /// A name or shortcut, resolved through the resolver.
    Name(String),
    /// A definition or factory supplied directly.
    Entry(PluginEntry),
}

impl From<&str> for PluginRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PluginRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<PluginDefinition> for PluginRef {
    fn from(definition: PluginDefinition) -> Self {
        Self::Entry(PluginEntry::Definition(definition))
    }
}

impl From<PluginFactory> for PluginRef {
    fn from(factory: PluginFactory) -> Self {
        Self::Entry(PluginEntry::Factory(factory))
    }
}

/// One entry of a plugin list: a reference plus user options.
#[derive(Debug, Clone)]
pub struct PluginConfigEntry {
    pub reference: PluginRef,
    /// Raw options. Objects are passed to the plugin, booleans toggle it.
    pub options: Value,
}

impl PluginConfigEntry {
    pub fn new(reference: impl Into<PluginRef>, options: Value) -> Self {
        Self { reference: reference.into(), options }
    }

    /// Reference without options.
    pub fn bare(reference: impl Into<PluginRef>) -> Self {
        Self::new(reference, Value::Null)
    }

    /// Parse one list item. `false` and `null` yield `None`.
    pub fn parse(item: &Value) -> PluginResult<Option<Self>> {
        match item {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::String(name) => Ok(Some(Self::bare(name.as_str()))),
            Value::Object(object) => {
                Ok(Some(Self::bare(PluginDefinition::from_json(object)?)))
            }
            Value::Array(pair) => match pair.as_slice() {
                [reference] => Ok(Self::parse_reference(reference)?.map(Self::bare)),
                [reference, options] => Ok(Self::parse_reference(reference)?
                    .map(|reference| Self::new(reference, options.clone()))),
                _ => Err(PluginError::InvalidConfigEntry(format!(
                    "expected [reference, options], got an array of {} items",
                    pair.len()
                ))),
            },
            other => Err(PluginError::InvalidConfigEntry(format!("unsupported entry {other}"))),
        }
    }

    fn parse_reference(reference: &Value) -> PluginResult<Option<PluginRef>> {
        match reference {
            Value::Null | Value::Bool(false) => Ok(None),
            Value::String(name) => Ok(Some(PluginRef::from(name.as_str()))),
            Value::Object(object) => Ok(Some(PluginDefinition::from_json(object)?.into())),
            other => Err(PluginError::InvalidConfigEntry(format!(
                "plugin reference must be a string or an object, got {other}"
            ))),
        }
    }

    /// Parse a whole plugin list in sequence or map form.
    pub fn parse_list(value: &Value) -> PluginResult<Vec<Self>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    entries.extend(Self::parse(item)?);
                }
                Ok(entries)
            }
            Value::Object(map) => Ok(map
                .iter()
                .map(|(name, options)| Self::new(name.as_str(), options.clone()))
                .collect()),
            other => Err(PluginError::InvalidConfigEntry(format!(
                "plugins must be a list or a map, got {other}"
            ))),
        }
    }
}

/// A parsed plugin list, as found in configuration files.
#[derive(Debug, Clone, Default)]
pub struct PluginsConfig {
    entries: Vec<PluginConfigEntry>,
}

impl PluginsConfig {
    pub fn new(entries: Vec<PluginConfigEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json(value: &Value) -> PluginResult<Self> {
        PluginConfigEntry::parse_list(value).map(Self::new)
    }

    pub fn entries(&self) -> &[PluginConfigEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for PluginsConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
