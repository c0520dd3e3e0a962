//! Configuration management for plugin-weave.
//!
//! Handles loading configuration from TOML (and, with the `yaml` feature,
//! YAML) files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::option::CollisionPolicy;
use crate::plugin::{
    PluginApi, PluginCatalog, PluginContext, PluginError, PluginResult, PluginsConfig,
    DEFAULT_PREFIX, DEFAULT_SCOPED_PREFIX,
};

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = ".weave.toml";

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Shortcut resolution settings
    pub resolver: ResolverConfig,

    /// Plugins to register, in sequence or map form
    pub plugins: PluginsConfig,
}

/// General engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// What happens when merge-policy contributions write the same key
    pub collision: CollisionPolicy,

    /// Plugins whose name starts with this are logged at debug level
    pub internal_prefix: String,
}

/// Shortcut resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Prefix of unscoped plugin names (`search` -> `weave-plugin-search`)
    pub prefix: String,

    /// Prefix of the package part of scoped names (`@org/x` -> `@org/plugin-x`)
    pub scoped_prefix: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.weave.toml` in current directory
    /// 2. `~/.config/plugin-weave/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> PluginResult<Self> {
        // Try local config first
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, everything else as TOML.
    pub fn load_from_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let is_yaml =
            path.extension().and_then(|e| e.to_str()).is_some_and(|e| matches!(e, "yaml" | "yml"));
        let config =
            if is_yaml { Self::from_yaml_str(&content)? } else { Self::from_toml_str(&content)? };

        tracing::debug!(path = %path.display(), plugins = config.plugins.len(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> PluginResult<Self> {
        toml::from_str(content).map_err(|e| PluginError::Config(e.to_string()))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(content: &str) -> PluginResult<Self> {
        serde_yaml::from_str(content).map_err(|e| PluginError::Config(e.to_string()))
    }

    #[cfg(not(feature = "yaml"))]
    pub fn from_yaml_str(_content: &str) -> PluginResult<Self> {
        Err(PluginError::Config(
            "YAML support is disabled, enable the \"yaml\" feature".to_string(),
        ))
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("plugin-weave"))
    }

    /// An empty catalogue using the configured prefixes.
    pub fn catalog(&self) -> PluginCatalog {
        PluginCatalog::with_prefixes(&self.resolver.prefix, &self.resolver.scoped_prefix)
    }

    /// Create an engine with these settings and register the configured plugins.
    pub fn build_api(&self, catalog: PluginCatalog, context: PluginContext) -> PluginApi {
        let mut api = PluginApi::with_config(&self.general, catalog, context);
        api.use_config(self.plugins.entries());
        api
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { collision: CollisionPolicy::Override, internal_prefix: "@internal/".to_string() }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            scoped_prefix: DEFAULT_SCOPED_PREFIX.to_string(),
        }
    }
}
