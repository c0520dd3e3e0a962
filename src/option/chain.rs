//! Chain-policy option: transforms piped over one mutable target.

use serde_json::Value;

use super::{ExtensionPoint, OptionEntry, PluginValue};
use crate::plugin::{PluginError, PluginResult};

/// Ordered transforms such as `chainWebpack` or `extendMarkdown`.
///
/// Each transform receives the target as left by the previous one; return
/// values are discarded.
#[derive(Debug, Clone)]
pub struct ChainOption {
    point: ExtensionPoint,
    entries: Vec<OptionEntry>,
}

impl ChainOption {
    pub fn new(point: ExtensionPoint) -> Self {
        Self { point, entries: Vec::new() }
    }

    pub fn point(&self) -> ExtensionPoint {
        self.point
    }

    pub fn add(&mut self, contributor: &str, value: PluginValue) {
        if !value.is_null() {
            self.entries.push(OptionEntry::new(contributor, value));
        }
    }

    pub fn entries(&self) -> &[OptionEntry] {
        &self.entries
    }

    /// Run every transform against `target` in contribution order.
    ///
    /// Entries that are not callbacks are skipped.
    pub fn apply(&self, target: &mut Value, args: &[Value]) -> PluginResult<()> {
        for entry in &self.entries {
            let Some(callback) = entry.value.as_function() else {
                continue;
            };

            callback.call(target, args).map_err(|source| PluginError::Callback {
                plugin: entry.contributor.clone(),
                option: self.point.name(),
                source,
            })?;
        }

        Ok(())
    }

    /// The composed transform as a single function.
    pub fn applier(&self) -> impl Fn(&mut Value, &[Value]) -> PluginResult<()> + '_ {
        move |target, args| self.apply(target, args)
    }

    pub fn remove(&mut self, contributor: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.contributor != contributor);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::Callback;
    use serde_json::json;

    fn push(tag: &'static str) -> PluginValue {
        PluginValue::from(Callback::new(move |target, _| {
            target["steps"].as_array_mut().unwrap().push(json!(tag));
            Ok(json!("ignored"))
        }))
    }

    #[test]
    fn test_apply_pipes_target() {
        let mut option = ChainOption::new(ExtensionPoint::ChainWebpack);
        option.add("a", push("a"));
        option.add("b", push("b"));

        let mut config = json!({ "steps": [] });
        option.apply(&mut config, &[json!(false)]).unwrap();

        assert_eq!(config, json!({ "steps": ["a", "b"] }));
    }

    #[test]
    fn test_applier_receives_args() {
        let mut option = ChainOption::new(ExtensionPoint::ChainWebpack);
        option.add(
            "server-only",
            PluginValue::from(Callback::mutator(|target, args| {
                if args.first() == Some(&json!(true)) {
                    target["server"] = json!(true);
                }
                Ok(())
            })),
        );

        let apply = option.applier();
        let mut client = json!({});
        let mut server = json!({});
        apply(&mut client, &[json!(false)]).unwrap();
        apply(&mut server, &[json!(true)]).unwrap();

        assert_eq!(client, json!({}));
        assert_eq!(server, json!({ "server": true }));
    }

    #[test]
    fn test_failure_stops_chain() {
        let mut option = ChainOption::new(ExtensionPoint::ExtendMarkdown);
        option.add("broken", PluginValue::from(Callback::mutator(|_, _| anyhow::bail!("bad"))));
        option.add("after", push("after"));

        let mut md = json!({ "steps": [] });
        let err = option.apply(&mut md, &[]).unwrap_err();

        assert_eq!(err.plugin(), Some("broken"));
        assert_eq!(md, json!({ "steps": [] }));
    }

    #[test]
    fn test_empty_chain_leaves_target() {
        let option = ChainOption::new(ExtensionPoint::ChainMarkdown);
        let mut target = json!({ "untouched": true });
        option.apply(&mut target, &[]).unwrap();
        assert_eq!(target, json!({ "untouched": true }));
    }
}
