//! The per-session set of option instances.

use std::fmt::Write as _;

use super::{
    descriptors, ChainOption, CollisionPolicy, ExtensionPoint, ListOption, MergeOption,
    OptionInstance, PluginValue,
};

/// One [`OptionInstance`] per extension point, in catalogue order.
#[derive(Debug, Clone)]
pub struct OptionSet {
    instances: Vec<OptionInstance>,
}

impl OptionSet {
    /// Create an empty instance for every extension point.
    pub fn new(collision: CollisionPolicy) -> Self {
        let instances =
            descriptors().iter().map(|d| OptionInstance::for_point(d.point, collision)).collect();
        Self { instances }
    }

    pub fn get(&self, point: ExtensionPoint) -> &OptionInstance {
        &self.instances[point as usize]
    }

    pub fn get_mut(&mut self, point: ExtensionPoint) -> &mut OptionInstance {
        &mut self.instances[point as usize]
    }

    /// The list instance of `point`, or `None` if it uses another policy.
    pub fn list(&self, point: ExtensionPoint) -> Option<&ListOption> {
        self.get(point).as_list()
    }

    pub fn chain(&self, point: ExtensionPoint) -> Option<&ChainOption> {
        self.get(point).as_chain()
    }

    pub fn merge(&self, point: ExtensionPoint) -> Option<&MergeOption> {
        self.get(point).as_merge()
    }

    /// Route an already validated contribution.
    pub fn add(&mut self, point: ExtensionPoint, contributor: &str, value: PluginValue) {
        self.get_mut(point).add(contributor, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionInstance> {
        self.instances.iter()
    }

    /// Drop every contribution from `contributor` across all points.
    pub fn remove_contributor(&mut self, contributor: &str) -> usize {
        self.instances.iter_mut().map(|o| o.remove(contributor)).sum()
    }

    pub fn clear(&mut self) {
        self.instances.iter_mut().for_each(OptionInstance::clear);
    }

    /// One line per non-empty point: `name: contributor, contributor`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for instance in self.instances.iter().filter(|o| !o.is_empty()) {
            let contributors: Vec<String> = instance
                .entries()
                .iter()
                .map(|entry| match entry.value.to_json() {
                    Some(serde_json::Value::String(s)) => format!("{}={}", entry.contributor, s),
                    _ => entry.contributor.clone(),
                })
                .collect();
            let _ = writeln!(out, "{}: {}", instance.point(), contributors.join(", "));
        }
        out
    }
}

impl Default for OptionSet {
    fn default() -> Self {
        Self::new(CollisionPolicy::default())
    }
}
