//! Option instances: one aggregated value per extension point.
//!
//! Each extension point in the [`descriptor`] catalogue gets exactly one
//! [`OptionInstance`] per session. The instance's policy decides how the
//! contributions of several plugins are combined:
//!
//! - **List**: ordered accretion (hooks, pages, components, modules)
//! - **Chain**: transforms piped over a single mutable target
//!   (`chainWebpack`, `extendMarkdown`, `chainMarkdown`)
//! - **Merge**: shallow key merge, last writer wins (`define`, `alias`)

pub mod descriptor;
mod chain;
mod list;
mod merge;
mod set;
mod value;

pub use chain::ChainOption;
pub use descriptor::{
    describe, descriptors, AcceptedType, AcceptedTypes, ExtensionPoint, ExtensionPointDescriptor,
    Policy,
};
pub use list::{AppliedValue, ListOption};
pub use merge::{Collision, CollisionPolicy, MergeOption};
pub use set::OptionSet;
pub use value::{Callback, PluginValue};

/// One contribution held by an option instance.
#[derive(Debug, Clone)]
pub struct OptionEntry {
    /// Name of the contributing plugin.
    pub contributor: String,
    /// The contributed value.
    pub value: PluginValue,
}

impl OptionEntry {
    pub fn new(contributor: impl Into<String>, value: PluginValue) -> Self {
        Self { contributor: contributor.into(), value }
    }
}

/// The aggregation state of one extension point.
#[derive(Debug, Clone)]
pub enum OptionInstance {
    List(ListOption),
    Chain(ChainOption),
    Merge(MergeOption),
}

impl OptionInstance {
    /// Create the instance matching the point's policy.
    pub fn for_point(point: ExtensionPoint, collision: CollisionPolicy) -> Self {
        match point.policy() {
            Policy::List => Self::List(ListOption::new(point)),
            Policy::Chain => Self::Chain(ChainOption::new(point)),
            Policy::Merge => Self::Merge(MergeOption::new(point, collision)),
        }
    }

    pub fn point(&self) -> ExtensionPoint {
        match self {
            Self::List(o) => o.point(),
            Self::Chain(o) => o.point(),
            Self::Merge(o) => o.point(),
        }
    }

    /// Add a contribution. Never fails; callers validate beforehand.
    pub fn add(&mut self, contributor: &str, value: PluginValue) {
        match self {
            Self::List(o) => o.add(contributor, value),
            Self::Chain(o) => o.add(contributor, value),
            Self::Merge(o) => o.add(contributor, value),
        }
    }

    pub fn entries(&self) -> &[OptionEntry] {
        match self {
            Self::List(o) => o.entries(),
            Self::Chain(o) => o.entries(),
            Self::Merge(o) => o.entries(),
        }
    }

    /// Distinct contributors in order of first contribution.
    pub fn contributors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in self.entries() {
            if !names.contains(&entry.contributor.as_str()) {
                names.push(&entry.contributor);
            }
        }
        names
    }

    pub fn remove(&mut self, contributor: &str) -> usize {
        match self {
            Self::List(o) => o.remove(contributor),
            Self::Chain(o) => o.remove(contributor),
            Self::Merge(o) => o.remove(contributor),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::List(o) => o.clear(),
            Self::Chain(o) => o.clear(),
            Self::Merge(o) => o.clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn as_list(&self) -> Option<&ListOption> {
        match self {
            Self::List(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_chain(&self) -> Option<&ChainOption> {
        match self {
            Self::Chain(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_merge(&self) -> Option<&MergeOption> {
        match self {
            Self::Merge(o) => Some(o),
            _ => None,
        }
    }
}
