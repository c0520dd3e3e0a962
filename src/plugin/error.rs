//! Plugin system error types.

use thiserror::Error;

use crate::option::{AcceptedTypes, Policy};

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur during plugin registration and aggregation.
///
/// Most of these never escape the engine: they are logged, stored as
/// diagnostics, and the offending plugin or contribution is dropped.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin reference could not be resolved to a definition.
    #[error("Cannot resolve plugin \"{reference}\": {reason}")]
    Resolution { reference: String, reason: String },

    /// A field name is not part of the extension point catalogue.
    #[error("Unknown extension point: {0}")]
    UnknownExtensionPoint(String),

    /// A contribution does not match the extension point's accepted types.
    #[error("[{plugin}] Invalid value for option \"{option}\": expected {expected}, but got {actual}")]
    ContributionTypeMismatch {
        plugin: String,
        option: &'static str,
        expected: AcceptedTypes,
        actual: &'static str,
    },

    /// User options for a plugin were neither an object nor a boolean.
    #[error("[{plugin}] Invalid value for plugin options: expected Object or Boolean, but got {actual}")]
    InvalidPluginOptions { plugin: String, actual: &'static str },

    /// An entry of the plugin-list configuration has an unsupported shape.
    #[error("Invalid plugin config entry: {0}")]
    InvalidConfigEntry(String),

    /// A definition failed basic validation (e.g. empty name).
    #[error("Invalid plugin definition: {0}")]
    InvalidDefinition(String),

    /// A plugin is nested inside itself, directly or through other plugins.
    #[error("[{plugin}] Cyclic nested plugin: {path}")]
    CyclicNesting { plugin: String, path: String },

    /// Two contributions to a merge-policy option wrote the same key.
    #[error("Option \"{option}\" key \"{key}\" from [{current}] collides with [{previous}]")]
    KeyCollision { option: &'static str, key: String, previous: String, current: String },

    /// An option was read through an accessor of another policy.
    #[error("Option \"{option}\" uses the {actual:?} policy, not {expected:?}")]
    WrongPolicy { option: &'static str, expected: Policy, actual: Policy },

    /// A plugin factory failed to produce a definition.
    #[error("Plugin factory for \"{plugin}\" failed: {source}")]
    Factory {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// A contributed callback failed while the option was applied.
    #[error("[{plugin}] \"{option}\" failed: {source}")]
    Callback {
        plugin: String,
        option: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Name of the plugin this error is attributed to, if any.
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::ContributionTypeMismatch { plugin, .. }
            | Self::InvalidPluginOptions { plugin, .. }
            | Self::Factory { plugin, .. }
            | Self::Callback { plugin, .. }
            | Self::CyclicNesting { plugin, .. } => Some(plugin),
            Self::KeyCollision { current, .. } => Some(current),
            _ => None,
        }
    }
}
