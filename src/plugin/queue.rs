//! Ordered queue of plugin records.

use super::PluginRecord;

/// Plugin records in registration order.
///
/// At most one record per name unless the record allows multiple instances.
/// Re-registering a single-instance name evicts the earlier record and
/// appends the new one at the tail.
#[derive(Debug, Clone, Default)]
pub struct PluginQueue {
    records: Vec<PluginRecord>,
}

impl PluginQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting same-name records unless it is `multiple`.
    ///
    /// Returns the evicted records.
    pub fn push(&mut self, record: PluginRecord) -> Vec<PluginRecord> {
        let mut evicted = Vec::new();

        if !record.multiple {
            let mut kept = Vec::with_capacity(self.records.len());
            for existing in self.records.drain(..) {
                if existing.name == record.name {
                    evicted.push(existing);
                } else {
                    kept.push(existing);
                }
            }
            self.records = kept;
        }

        self.records.push(record);
        evicted
    }

    /// Enabled records in queue order.
    pub fn enabled(&self) -> impl Iterator<Item = &PluginRecord> {
        self.records.iter().filter(|r| r.enabled)
    }

    /// Disabled records in queue order.
    pub fn disabled(&self) -> impl Iterator<Item = &PluginRecord> {
        self.records.iter().filter(|r| !r.enabled)
    }

    /// First record with `name`.
    pub fn get(&self, name: &str) -> Option<&PluginRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Toggle every record named `name`. Returns whether any matched.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let mut found = false;
        for record in self.records.iter_mut().filter(|r| r.name == name) {
            record.enabled = enabled;
            found = true;
        }
        found
    }

    /// Remove every record named `name`.
    pub fn remove(&mut self, name: &str) -> Vec<PluginRecord> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            self.records.drain(..).partition(|r| r.name == name);
        self.records = kept;
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginRecord> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PluginRecord> {
        self.records.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a PluginQueue {
    type Item = &'a PluginRecord;
    type IntoIter = std::slice::Iter<'a, PluginRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
