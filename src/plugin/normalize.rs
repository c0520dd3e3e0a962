//! Turning a plugin reference plus user options into a definition.

use serde_json::{Map, Value};

use super::{PluginApi, PluginDefinition, PluginEntry, PluginError, PluginRef, PluginResult};

/// User options after normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginOptions {
    /// Object options passed to factories and kept on the record.
    pub values: Map<String, Value>,
    /// Set when the options were a boolean.
    pub enabled: Option<bool>,
}

/// Normalize raw user options.
///
/// Objects are kept, booleans toggle the plugin and `null` means no options.
/// Anything else is an error; callers fall back to empty options.
pub fn normalize_options(plugin: &str, raw: &Value) -> PluginResult<PluginOptions> {
    match raw {
        Value::Null => Ok(PluginOptions::default()),
        Value::Bool(enabled) => Ok(PluginOptions { values: Map::new(), enabled: Some(*enabled) }),
        Value::Object(values) => Ok(PluginOptions { values: values.clone(), enabled: None }),
        other => Err(PluginError::InvalidPluginOptions {
            plugin: plugin.to_string(),
            actual: crate::option::PluginValue::from(other.clone()).type_name(),
        }),
    }
}

/// A definition ready to be queued.
#[derive(Debug)]
pub struct NormalizedPlugin {
    pub definition: PluginDefinition,
    pub options: Map<String, Value>,
    /// Non-fatal problems found along the way.
    pub warnings: Vec<PluginError>,
}

/// Resolve `reference` and build its definition.
///
/// The returned definition may still have an empty name; the engine assigns
/// one when it is queued.
pub fn normalize(
    api: &PluginApi,
    reference: &PluginRef,
    raw: &Value,
) -> PluginResult<NormalizedPlugin> {
    let (resolved_name, shortcut, entry) = match reference {
        PluginRef::Name(reference) => {
            let resolved = api.resolver().resolve(reference)?;
            (Some(resolved.name), resolved.shortcut, resolved.entry)
        }
        PluginRef::Entry(entry) => (None, None, entry.clone()),
    };

    let hint = match (&resolved_name, &entry) {
        (Some(name), _) => name.clone(),
        (None, PluginEntry::Definition(d)) if !d.name.is_empty() => d.name.clone(),
        _ => "<anonymous>".to_string(),
    };

    let mut warnings = Vec::new();
    let options = normalize_options(&hint, raw).unwrap_or_else(|err| {
        warnings.push(err);
        PluginOptions::default()
    });

    let mut definition = match entry {
        PluginEntry::Definition(definition) => definition,
        PluginEntry::Factory(factory) => factory
            .call(&options.values, api.context(), api)
            .map_err(|source| PluginError::Factory { plugin: hint, source })?,
    };

    if definition.name.is_empty() {
        if let Some(name) = resolved_name {
            definition.name = name;
        }
    }
    if definition.shortcut.is_none() {
        definition.shortcut = shortcut;
    }
    if let Some(enabled) = options.enabled {
        definition.enabled = enabled;
    }

    Ok(NormalizedPlugin { definition, options: options.values, warnings })
}
