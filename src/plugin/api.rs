//! The aggregation engine.
//!
//! A [`PluginApi`] is one session: it owns the plugin queue and one option
//! instance per extension point. Plugins are registered (directly, by
//! reference or from a plugin list), then [`PluginApi::apply_all`] routes the
//! contributions of every enabled plugin into the option set.
//!
//! Nothing here aborts on a bad plugin. Problems are logged, stored as
//! diagnostics and the offending plugin or contribution is dropped.

use std::fmt;

use serde_json::{Map, Value};

use super::normalize::normalize;
use super::{
    PluginConfigEntry, PluginContext, PluginDefinition, PluginError, PluginQueue, PluginRecord,
    PluginRef, PluginResolver, PluginResult, RecordState,
};
use crate::core::GeneralConfig;
use crate::option::{
    describe, descriptors, AppliedValue, Collision, CollisionPolicy, ExtensionPoint,
    ExtensionPointDescriptor, OptionInstance, OptionSet, Policy, PluginValue,
};

/// A plugin registration and aggregation session.
pub struct PluginApi {
    resolver: Box<dyn PluginResolver>,
    context: PluginContext,
    internal_prefix: String,
    queue: PluginQueue,
    options: OptionSet,
    diagnostics: Vec<PluginError>,
    anonymous: usize,
    applied: bool,
    /// Names whose nested plugins are being registered, outermost first.
    registering: Vec<String>,
}

impl fmt::Debug for PluginApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginApi")
            .field("context", &self.context)
            .field("queue", &self.queue.names())
            .field("diagnostics", &self.diagnostics.len())
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl PluginApi {
    /// Create a session with default settings.
    pub fn new(resolver: impl PluginResolver + 'static, context: PluginContext) -> Self {
        Self::with_config(&GeneralConfig::default(), resolver, context)
    }

    pub fn with_config(
        config: &GeneralConfig,
        resolver: impl PluginResolver + 'static,
        context: PluginContext,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            context,
            internal_prefix: config.internal_prefix.clone(),
            queue: PluginQueue::new(),
            options: OptionSet::new(config.collision),
            diagnostics: Vec::new(),
            anonymous: 0,
            applied: false,
            registering: Vec::new(),
        }
    }

    pub fn resolver(&self) -> &dyn PluginResolver {
        self.resolver.as_ref()
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Queue a definition.
    ///
    /// Same-name records are evicted unless the definition allows multiple
    /// instances. Nested plugins are registered right after.
    pub fn register(&mut self, definition: PluginDefinition) -> &mut Self {
        self.enqueue(definition, Map::new())
    }

    /// Resolve and normalize a reference, then queue it.
    pub fn use_plugin(&mut self, reference: impl Into<PluginRef>, options: Value) -> &mut Self {
        let reference = reference.into();

        match normalize(self, &reference, &options) {
            Ok(normalized) => {
                for warning in normalized.warnings {
                    self.report(warning);
                }
                self.enqueue(normalized.definition, normalized.options)
            }
            Err(err) => {
                self.report(err);
                self
            }
        }
    }

    /// Register every entry of a plugin list in order.
    pub fn use_config(&mut self, entries: &[PluginConfigEntry]) -> &mut Self {
        for entry in entries {
            self.use_plugin(entry.reference.clone(), entry.options.clone());
        }
        self
    }

    /// Register a raw plugin list. Invalid entries are reported and skipped.
    pub fn use_json(&mut self, plugins: &Value) -> &mut Self {
        let Value::Array(items) = plugins else {
            match PluginConfigEntry::parse_list(plugins) {
                Ok(entries) => {
                    self.use_config(&entries);
                }
                Err(err) => self.report(err),
            }
            return self;
        };

        for item in items {
            match PluginConfigEntry::parse(item) {
                Ok(Some(entry)) => {
                    self.use_plugin(entry.reference, entry.options);
                }
                Ok(None) => {}
                Err(err) => self.report(err),
            }
        }
        self
    }

    fn enqueue(
        &mut self,
        mut definition: PluginDefinition,
        options: Map<String, Value>,
    ) -> &mut Self {
        if definition.name.trim().is_empty() {
            self.anonymous += 1;
            definition.name = format!("anonymous-{}", self.anonymous);
        }

        if self.registering.contains(&definition.name) {
            let path = format!("{} -> {}", self.registering.join(" -> "), definition.name);
            tracing::warn!(
                plugin = %definition.name,
                path = %path,
                "Skipping cyclic nested plugin"
            );
            self.diagnostics.push(PluginError::CyclicNesting { plugin: definition.name, path });
            return self;
        }

        let nested = std::mem::take(&mut definition.plugins);
        let record = PluginRecord::new(definition, options);
        let name = record.name().to_string();

        let evicted = self.queue.push(record);
        if !evicted.is_empty() {
            tracing::debug!(plugin = %name, "Replacing previously registered plugin");
            if evicted.iter().any(|r| r.state() == RecordState::Applied) {
                self.retract(&name);
            }
        }

        if !nested.is_empty() {
            tracing::debug!(plugin = %name, count = nested.len(), "Registering nested plugins");
            self.registering.push(name);
            self.use_config(&nested);
            self.registering.pop();
        }

        self
    }

    /// Remove every queued record named `name`.
    ///
    /// Contributions of applied records are dropped from the option set.
    /// Returns how many records were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let removed = self.queue.remove(name);
        if removed.iter().any(|r| r.state() == RecordState::Applied) {
            self.retract(name);
        }
        removed.len()
    }

    /// Drop the contributions of `contributor` and the collision diagnostics
    /// involving it. Collisions the rebuild uncovers between the remaining
    /// contributors are recorded without being logged again.
    fn retract(&mut self, contributor: &str) {
        self.options.remove_contributor(contributor);
        self.diagnostics.retain(|d| {
            !matches!(
                d,
                PluginError::KeyCollision { previous, current, .. }
                    if previous == contributor || current == contributor
            )
        });

        for merge in self.options.iter().filter_map(OptionInstance::as_merge) {
            if merge.policy() == CollisionPolicy::Override {
                continue;
            }
            let option = merge.point().name();
            for collision in merge.collisions() {
                let known = self.diagnostics.iter().any(|d| {
                    matches!(
                        d,
                        PluginError::KeyCollision { option: o, key, previous, current }
                            if *o == option
                                && *key == collision.key
                                && *previous == collision.previous
                                && *current == collision.current
                    )
                });
                if !known {
                    self.diagnostics.push(key_collision(option, collision));
                }
            }
        }
    }

    /// Validate a contribution and route it to its option instance.
    ///
    /// Returns `Ok(false)` when the value was dropped for having the wrong
    /// type; the mismatch is logged and kept as a diagnostic.
    pub fn register_option(
        &mut self,
        name: &str,
        value: PluginValue,
        contributor: &str,
    ) -> PluginResult<bool> {
        let descriptor = describe(name)?;
        Ok(route(&mut self.options, &mut self.diagnostics, descriptor, contributor, value))
    }

    /// Route the contributions of every enabled, not yet applied plugin.
    ///
    /// Returns how many plugins were applied.
    pub fn apply_all(&mut self) -> usize {
        if self.applied {
            tracing::warn!("Plugins were already applied, applying new registrations only");
        }
        self.applied = true;

        let mut count = 0;
        for record in self.queue.iter_mut() {
            if record.state == RecordState::Applied {
                continue;
            }
            if !record.enabled {
                tracing::debug!(plugin = %record.name, "Skipping disabled plugin");
                continue;
            }

            if record.name.starts_with(&self.internal_prefix) {
                tracing::debug!(plugin = %record.name, "Applying plugin");
            } else {
                tracing::info!(plugin = %record.name, "Applying plugin");
            }

            for descriptor in descriptors() {
                if let Some(value) = record.fields.get(descriptor.name) {
                    route(
                        &mut self.options,
                        &mut self.diagnostics,
                        descriptor,
                        &record.name,
                        value.clone(),
                    );
                }
            }

            for field in record.fields.keys().filter(|f| describe(f).is_err()) {
                tracing::debug!(plugin = %record.name, field = %field, "Ignoring unknown field");
            }

            record.state = RecordState::Applied;
            count += 1;
        }

        count
    }

    /// Whether `name` counts as an internal plugin for logging.
    pub fn is_internal(&self, name: &str) -> bool {
        name.starts_with(&self.internal_prefix)
    }

    pub fn queue(&self) -> &PluginQueue {
        &self.queue
    }

    /// Mutable queue access, e.g. to toggle plugins before applying.
    ///
    /// Removing applied records here leaves their contributions in place; use
    /// [`PluginApi::remove`] to retract them as well.
    pub fn queue_mut(&mut self) -> &mut PluginQueue {
        &mut self.queue
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn option(&self, point: ExtensionPoint) -> &OptionInstance {
        self.options.get(point)
    }

    /// Problems found so far, oldest first.
    pub fn diagnostics(&self) -> &[PluginError] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<PluginError> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Invoke a list-policy option.
    pub fn apply_hook(
        &self,
        point: ExtensionPoint,
        args: &[Value],
    ) -> PluginResult<Vec<AppliedValue>> {
        self.options.list(point).ok_or_else(|| wrong_policy(point, Policy::List))?.apply(args)
    }

    /// Run a chain-policy option against `target`.
    pub fn apply_chain(
        &self,
        point: ExtensionPoint,
        target: &mut Value,
        args: &[Value],
    ) -> PluginResult<()> {
        self.options
            .chain(point)
            .ok_or_else(|| wrong_policy(point, Policy::Chain))?
            .apply(target, args)
    }

    /// Resolve a merge-policy option.
    pub fn resolve_merge(
        &self,
        point: ExtensionPoint,
        args: &[Value],
    ) -> PluginResult<Map<String, Value>> {
        self.options.merge(point).ok_or_else(|| wrong_policy(point, Policy::Merge))?.resolve(args)
    }

    fn report(&mut self, err: PluginError) {
        match &err {
            PluginError::Resolution { reference, .. } => {
                tracing::warn!(reference = %reference, error = %err, "Skipping plugin")
            }
            PluginError::Factory { plugin, .. } => {
                tracing::warn!(plugin = %plugin, error = %err, "Skipping plugin")
            }
            PluginError::InvalidPluginOptions { plugin, .. } => {
                tracing::warn!(plugin = %plugin, error = %err, "Ignoring plugin options")
            }
            _ => tracing::warn!(error = %err, "Skipping plugin config entry"),
        }
        self.diagnostics.push(err);
    }
}

fn route(
    options: &mut OptionSet,
    diagnostics: &mut Vec<PluginError>,
    descriptor: &ExtensionPointDescriptor,
    contributor: &str,
    value: PluginValue,
) -> bool {
    match descriptor.check(&value) {
        Ok(()) => {
            let seen = options.merge(descriptor.point).map_or(0, |m| m.collisions().len());
            options.add(descriptor.point, contributor, value);

            if let Some(merge) = options.merge(descriptor.point) {
                if merge.policy() != CollisionPolicy::Override {
                    let new = &merge.collisions()[seen..];
                    diagnostics.extend(new.iter().map(|c| key_collision(descriptor.name, c)));
                }
            }
            true
        }
        Err(actual) => {
            let err = PluginError::ContributionTypeMismatch {
                plugin: contributor.to_string(),
                option: descriptor.name,
                expected: descriptor.accepted,
                actual,
            };
            tracing::warn!(plugin = %contributor, option = descriptor.name, "{err}");
            diagnostics.push(err);
            false
        }
    }
}

fn key_collision(option: &'static str, collision: &Collision) -> PluginError {
    PluginError::KeyCollision {
        option,
        key: collision.key.clone(),
        previous: collision.previous.clone(),
        current: collision.current.clone(),
    }
}

fn wrong_policy(point: ExtensionPoint, expected: Policy) -> PluginError {
    PluginError::WrongPolicy { option: point.name(), expected, actual: point.policy() }
}
