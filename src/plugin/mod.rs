//! Plugin registration for plugin-weave.
//!
//! This module turns plugin references into queued records and drives the
//! aggregation of their contributions.
//!
//! # Flow
//!
//! 1. **Resolve**: a [`PluginResolver`] maps a name or shortcut to an entry
//! 2. **Normalize**: user options are checked and factories are called
//! 3. **Queue**: the [`PluginQueue`] keeps one record per name, in order
//! 4. **Apply**: [`PluginApi::apply_all`] routes every enabled plugin's
//!    fields into the option set, in catalogue order
//!
//! # Example Configuration
//!
//! ```toml
//! plugins = [
//!     "search",
//!     ["@acme/pwa", { popup = true }],
//! ]
//! ```

mod api;
mod context;
mod definition;
mod entries;
mod error;
mod normalize;
mod queue;
mod resolver;

pub use api::PluginApi;
pub use context::PluginContext;
pub use definition::{PluginDefinition, PluginEntry, PluginFactory, PluginRecord, RecordState};
pub use entries::{PluginConfigEntry, PluginRef, PluginsConfig};
pub use error::{PluginError, PluginResult};
pub use normalize::{normalize, normalize_options, NormalizedPlugin, PluginOptions};
pub use queue::PluginQueue;
pub use resolver::{
    PluginCatalog, PluginResolver, ResolvedPlugin, DEFAULT_PREFIX, DEFAULT_SCOPED_PREFIX,
};
