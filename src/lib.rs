#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::should_implement_trait)]

//! # plugin-weave
//!
//! Plugin registration and option aggregation for extensible build hosts.
//!
//! Independently authored plugins contribute to a fixed set of named extension
//! points (lifecycle hooks, config chain mutators, markdown extenders, dev
//! server enhancers, ...). plugin-weave validates, orders and combines those
//! contributions into one value per extension point, dropping invalid ones
//! without aborting the pipeline.
//!
//! ## Features
//!
//! - **Typed catalogue**: every extension point declares its accepted shapes and policy
//! - **Three policies**: ordered lists, piped chains and shallow merges
//! - **Plugin queue**: one record per name, re-registration moves to the tail
//! - **Shortcuts**: `search` resolves to `weave-plugin-search`
//! - **Config files**: plugin lists in TOML or YAML
//!
//! ## Quick Start
//!
//! ```
//! use plugin_weave::{
//!     Callback, ExtensionPoint, PluginApi, PluginCatalog, PluginContext, PluginDefinition,
//! };
//!
//! let mut api = PluginApi::new(PluginCatalog::new(), PluginContext::default());
//! api.register(
//!     PluginDefinition::new("hello")
//!         .with_point(ExtensionPoint::Ready, Callback::hook(|_| Ok(()))),
//! );
//! api.apply_all();
//!
//! assert_eq!(api.option(ExtensionPoint::Ready).len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;
pub mod option;
pub mod plugin;

// Re-export commonly used types
pub use crate::core::{Config, GeneralConfig, ResolverConfig};
pub use option::{
    AppliedValue, Callback, ChainOption, CollisionPolicy, ExtensionPoint,
    ExtensionPointDescriptor, ListOption, MergeOption, OptionInstance, OptionSet, PluginValue,
    Policy,
};
pub use plugin::{
    PluginApi, PluginCatalog, PluginConfigEntry, PluginContext, PluginDefinition, PluginEntry,
    PluginError, PluginFactory, PluginQueue, PluginRecord, PluginRef, PluginResolver,
    PluginResult, PluginsConfig, RecordState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
