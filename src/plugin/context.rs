//! Host context handed to plugin factories.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Read-only information about the host application.
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    source_dir: PathBuf,
    is_prod: bool,
    data: Map<String, Value>,
}

impl PluginContext {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self { source_dir: source_dir.into(), ..Self::default() }
    }

    #[must_use]
    pub fn production(mut self, is_prod: bool) -> Self {
        self.is_prod = is_prod;
        self
    }

    /// Attach arbitrary site data.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn is_prod(&self) -> bool {
        self.is_prod
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}
