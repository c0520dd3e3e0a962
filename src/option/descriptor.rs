//! Extension point catalogue.
//!
//! Every extension point a plugin can contribute to is described once here:
//! its canonical field name, the value shapes it accepts and how contributions
//! from several plugins are combined. The catalogue order is the order in
//! which a plugin's fields are applied, so aggregation is deterministic for a
//! given registration order.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use super::PluginValue;
use crate::plugin::{PluginError, PluginResult};

/// Key of an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionPoint {
    Ready,
    Compiled,
    Updated,
    Generated,
    ChainWebpack,
    EnhanceAppFiles,
    ExtendMarkdown,
    ChainMarkdown,
    ExtendPageData,
    ClientDynamicModules,
    ClientRootMixin,
    AdditionalPages,
    GlobalUiComponents,
    Define,
    Alias,
    BeforeDevServer,
    AfterDevServer,
    ExtendCli,
}

impl ExtensionPoint {
    /// The descriptor for this key.
    pub fn descriptor(self) -> &'static ExtensionPointDescriptor {
        &DESCRIPTORS[self as usize]
    }

    /// Canonical field name used in plugin definitions.
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Aggregation policy of this extension point.
    pub fn policy(self) -> Policy {
        self.descriptor().policy
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value shape an extension point accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptedType {
    /// A single callback.
    Function,
    /// A list whose elements are all callbacks.
    FunctionList,
    /// Any list.
    List,
    /// A plain object.
    Object,
    /// A string.
    String,
    /// A list whose elements are all strings.
    StringList,
}

impl AcceptedType {
    /// Check a value against this shape.
    pub fn matches(self, value: &PluginValue) -> bool {
        match (self, value) {
            (Self::Function, PluginValue::Function(_))
            | (Self::List, PluginValue::List(_))
            | (Self::Object, PluginValue::Object(_))
            | (Self::String, PluginValue::String(_)) => true,
            (Self::FunctionList, PluginValue::List(items)) => {
                items.iter().all(|item| matches!(item, PluginValue::Function(_)))
            }
            (Self::StringList, PluginValue::List(items)) => {
                items.iter().all(|item| matches!(item, PluginValue::String(_)))
            }
            _ => false,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Function => "Function",
            Self::FunctionList => "Array<Function>",
            Self::List => "Array",
            Self::Object => "Object",
            Self::String => "String",
            Self::StringList => "Array<String>",
        }
    }
}

/// The accepted-type set of a descriptor, formatted as `A, B or C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedTypes(pub &'static [AcceptedType]);

impl fmt::Display for AcceptedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|t| t.display_name()).collect();
        match names.split_last() {
            None => f.write_str("nothing"),
            Some((last, [])) => f.write_str(last),
            Some((last, rest)) => write!(f, "{} or {}", rest.join(", "), last),
        }
    }
}

/// How contributions from several plugins are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Ordered list; list contributions are flattened.
    List,
    /// Ordered transforms applied in sequence to one mutable target.
    Chain,
    /// Shallow key merge, last writer wins.
    Merge,
}

/// Static description of one extension point.
#[derive(Debug)]
pub struct ExtensionPointDescriptor {
    /// Key.
    pub point: ExtensionPoint,
    /// Canonical field name.
    pub name: &'static str,
    /// Accepted value shapes.
    pub accepted: AcceptedTypes,
    /// Aggregation policy.
    pub policy: Policy,
}

impl ExtensionPointDescriptor {
    /// Type-check a contribution.
    ///
    /// On mismatch returns the name of the actual type for the diagnostic.
    pub fn check(&self, value: &PluginValue) -> Result<(), &'static str> {
        if self.accepted.0.iter().any(|t| t.matches(value)) {
            Ok(())
        } else {
            Err(value.type_name())
        }
    }
}

const HOOK: AcceptedTypes = AcceptedTypes(&[AcceptedType::Function, AcceptedType::FunctionList]);
const FUNCTION: AcceptedTypes = AcceptedTypes(&[AcceptedType::Function]);

const fn descriptor(
    point: ExtensionPoint,
    name: &'static str,
    accepted: AcceptedTypes,
    policy: Policy,
) -> ExtensionPointDescriptor {
    ExtensionPointDescriptor { point, name, accepted, policy }
}

/// The catalogue, indexed by `ExtensionPoint as usize`.
static DESCRIPTORS: [ExtensionPointDescriptor; 18] = [
    descriptor(ExtensionPoint::Ready, "ready", HOOK, Policy::List),
    descriptor(ExtensionPoint::Compiled, "compiled", HOOK, Policy::List),
    descriptor(ExtensionPoint::Updated, "updated", HOOK, Policy::List),
    descriptor(ExtensionPoint::Generated, "generated", HOOK, Policy::List),
    descriptor(ExtensionPoint::ChainWebpack, "chainWebpack", FUNCTION, Policy::Chain),
    descriptor(
        ExtensionPoint::EnhanceAppFiles,
        "enhanceAppFiles",
        AcceptedTypes(&[
            AcceptedType::String,
            AcceptedType::Object,
            AcceptedType::List,
            AcceptedType::Function,
        ]),
        Policy::List,
    ),
    descriptor(ExtensionPoint::ExtendMarkdown, "extendMarkdown", FUNCTION, Policy::Chain),
    descriptor(ExtensionPoint::ChainMarkdown, "chainMarkdown", FUNCTION, Policy::Chain),
    descriptor(ExtensionPoint::ExtendPageData, "extendPageData", FUNCTION, Policy::List),
    descriptor(
        ExtensionPoint::ClientDynamicModules,
        "clientDynamicModules",
        FUNCTION,
        Policy::List,
    ),
    descriptor(
        ExtensionPoint::ClientRootMixin,
        "clientRootMixin",
        AcceptedTypes(&[AcceptedType::String]),
        Policy::List,
    ),
    descriptor(
        ExtensionPoint::AdditionalPages,
        "additionalPages",
        AcceptedTypes(&[AcceptedType::List, AcceptedType::Function]),
        Policy::List,
    ),
    descriptor(
        ExtensionPoint::GlobalUiComponents,
        "globalUIComponents",
        AcceptedTypes(&[AcceptedType::String, AcceptedType::StringList]),
        Policy::List,
    ),
    descriptor(
        ExtensionPoint::Define,
        "define",
        AcceptedTypes(&[AcceptedType::Object, AcceptedType::Function]),
        Policy::Merge,
    ),
    descriptor(
        ExtensionPoint::Alias,
        "alias",
        AcceptedTypes(&[AcceptedType::Object, AcceptedType::Function]),
        Policy::Merge,
    ),
    descriptor(ExtensionPoint::BeforeDevServer, "beforeDevServer", FUNCTION, Policy::List),
    descriptor(ExtensionPoint::AfterDevServer, "afterDevServer", FUNCTION, Policy::List),
    descriptor(ExtensionPoint::ExtendCli, "extendCli", FUNCTION, Policy::List),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static ExtensionPointDescriptor>> =
    Lazy::new(|| DESCRIPTORS.iter().map(|d| (d.name, d)).collect());

/// All descriptors in application order.
pub fn descriptors() -> &'static [ExtensionPointDescriptor] {
    &DESCRIPTORS
}

/// Look up a descriptor by canonical field name.
pub fn describe(name: &str) -> PluginResult<&'static ExtensionPointDescriptor> {
    BY_NAME.get(name).copied().ok_or_else(|| PluginError::UnknownExtensionPoint(name.to_string()))
}
