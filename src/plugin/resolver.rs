//! Resolving plugin references to entries.
//!
//! The engine never loads code itself. A [`PluginResolver`] maps a textual
//! reference to a [`PluginEntry`]; [`PluginCatalog`] is the in-memory
//! implementation with shortcut support:
//!
//! | reference | looked up as |
//! |---|---|
//! | `search` | `search`, then `weave-plugin-search` |
//! | `@acme/search` | `@acme/search`, then `@acme/plugin-search` |

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{PluginEntry, PluginError, PluginResult};

static SCOPED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(@[^/\s]+)/([^/\s]+)$").expect("scoped name pattern is valid"));

/// Default prefix of unscoped plugin names.
pub const DEFAULT_PREFIX: &str = "weave-plugin-";

/// Default prefix of the package part of scoped plugin names.
pub const DEFAULT_SCOPED_PREFIX: &str = "plugin-";

/// A reference resolved to an entry.
#[derive(Debug, Clone)]
pub struct ResolvedPlugin {
    /// Full plugin name.
    pub name: String,
    /// Short alias of the name, when it has one.
    pub shortcut: Option<String>,
    pub entry: PluginEntry,
}

/// Turns plugin references into entries.
pub trait PluginResolver: Send + Sync {
    /// Resolve `reference` or fail with [`PluginError::Resolution`].
    fn resolve(&self, reference: &str) -> PluginResult<ResolvedPlugin>;
}

/// In-memory plugin catalogue.
#[derive(Debug, Clone)]
pub struct PluginCatalog {
    prefix: String,
    scoped_prefix: String,
    entries: HashMap<String, PluginEntry>,
}

impl Default for PluginCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::with_prefixes(DEFAULT_PREFIX, DEFAULT_SCOPED_PREFIX)
    }

    pub fn with_prefixes(prefix: impl Into<String>, scoped_prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), scoped_prefix: scoped_prefix.into(), entries: HashMap::new() }
    }

    /// Add an entry under its full name, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<PluginEntry>) -> &mut Self {
        self.entries.insert(name.into(), entry.into());
        self
    }

    /// Builder form of [`PluginCatalog::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, entry: impl Into<PluginEntry>) -> Self {
        self.insert(name, entry);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand a shortcut to a full name. Full names are returned unchanged.
    pub fn full_name(&self, reference: &str) -> String {
        if let Some(caps) = SCOPED_NAME.captures(reference) {
            let (scope, package) = (&caps[1], &caps[2]);
            if package.starts_with(&self.scoped_prefix) {
                return reference.to_string();
            }
            return format!("{scope}/{}{package}", self.scoped_prefix);
        }

        if reference.starts_with('@') || reference.starts_with(&self.prefix) {
            reference.to_string()
        } else {
            format!("{}{reference}", self.prefix)
        }
    }

    /// The shortcut of a full name, if it follows the naming convention.
    pub fn shortcut_of(&self, name: &str) -> Option<String> {
        if let Some(caps) = SCOPED_NAME.captures(name) {
            let short = caps[2].strip_prefix(self.scoped_prefix.as_str())?;
            return (!short.is_empty()).then(|| format!("{}/{short}", &caps[1]));
        }

        name.strip_prefix(self.prefix.as_str()).filter(|s| !s.is_empty()).map(str::to_string)
    }
}

impl PluginResolver for PluginCatalog {
    fn resolve(&self, reference: &str) -> PluginResult<ResolvedPlugin> {
        if reference.trim().is_empty() {
            return Err(PluginError::Resolution {
                reference: reference.to_string(),
                reason: "empty reference".to_string(),
            });
        }

        let name = if self.entries.contains_key(reference) {
            reference.to_string()
        } else {
            self.full_name(reference)
        };

        let entry = self.entries.get(&name).cloned().ok_or_else(|| PluginError::Resolution {
            reference: reference.to_string(),
            reason: if name == reference {
                "not found in catalog".to_string()
            } else {
                format!("neither \"{reference}\" nor \"{name}\" is in the catalog")
            },
        })?;

        Ok(ResolvedPlugin { shortcut: self.shortcut_of(&name), name, entry })
    }
}
