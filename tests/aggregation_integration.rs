//! Integration tests for plugin registration and option aggregation.

use std::io;
use std::sync::{Arc, Mutex};

use plugin_weave::{
    Callback, CollisionPolicy, ExtensionPoint, GeneralConfig, PluginApi, PluginCatalog,
    PluginConfigEntry, PluginContext, PluginDefinition, PluginError, PluginFactory, PluginRecord,
};
use serde_json::{json, Value};

fn api() -> PluginApi {
    PluginApi::new(PluginCatalog::new(), PluginContext::default())
}

fn names<'a>(records: impl Iterator<Item = &'a PluginRecord>) -> Vec<&'a str> {
    records.map(PluginRecord::name).collect()
}

/// Log sink shared with a test subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn lines_with(&self, needle: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

fn with_logs<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer)
}

#[test]
fn test_enabled_disabled_partition() {
    let mut api = api();
    api.register(PluginDefinition::new("a"))
        .register(PluginDefinition::new("b").enabled(false))
        .register(PluginDefinition::new("c"))
        .use_plugin(PluginDefinition::new("d"), json!(false));

    assert_eq!(names(api.queue().enabled()), vec!["a", "c"]);
    assert_eq!(names(api.queue().disabled()), vec!["b", "d"]);
    assert_eq!(api.queue().len(), 4);
}

#[test]
fn test_reregistration_moves_to_tail() {
    let mut api = api();
    api.register(PluginDefinition::new("a"))
        .register(PluginDefinition::new("b"))
        .register(PluginDefinition::new("a"));

    assert_eq!(api.queue().names(), vec!["b", "a"]);
}

#[test]
fn test_multiple_keeps_every_instance() {
    let mut api = api();
    let mixin = |file: &str| {
        PluginDefinition::new("m").multiple(true).with_point(ExtensionPoint::ClientRootMixin, file)
    };
    api.register(mixin("1.js")).register(mixin("2.js"));
    api.apply_all();

    assert_eq!(api.queue().names(), vec!["m", "m"]);
    let mixins = api.options().list(ExtensionPoint::ClientRootMixin).unwrap();
    assert_eq!(mixins.strings(), vec!["1.js", "2.js"]);
}

#[test]
fn test_list_aggregation_follows_queue_without_disabled() {
    let mut api = api();
    api.register(PluginDefinition::new("a").with_point(ExtensionPoint::GlobalUiComponents, "A"))
        .register(
            PluginDefinition::new("b")
                .enabled(false)
                .with_point(ExtensionPoint::GlobalUiComponents, "B"),
        )
        .register(
            PluginDefinition::new("c")
                .with_point(ExtensionPoint::GlobalUiComponents, vec!["C1", "C2"]),
        );
    api.apply_all();

    let components = api.options().list(ExtensionPoint::GlobalUiComponents).unwrap();
    assert_eq!(components.strings(), vec!["A", "C1", "C2"]);
    assert_eq!(api.option(ExtensionPoint::GlobalUiComponents).contributors(), vec!["a", "c"]);
}

#[test]
fn test_enabling_before_apply() {
    let mut api = api();
    api.register(
        PluginDefinition::new("late").enabled(false).with("define", json!({ "LATE": true })),
    );
    assert!(api.queue_mut().set_enabled("late", true));
    api.apply_all();

    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(define.get("LATE"), Some(&json!(true)));
}

#[test]
fn test_type_mismatch_warns_once_and_continues() {
    let (api, logs) = with_logs(|| {
        let mut api = api();
        api.register(PluginDefinition::new("bad").with("ready", "not a function"))
            .register(PluginDefinition::new("good").with("ready", Callback::hook(|_| Ok(()))));
        api.apply_all();
        api
    });

    let warnings = logs.lines_with("WARN");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("[bad] Invalid value for option \"ready\""));
    assert!(warnings[0].contains("expected Function or Array<Function>, but got String"));

    assert_eq!(api.option(ExtensionPoint::Ready).contributors(), vec!["good"]);
    assert_eq!(api.diagnostics().len(), 1);
    assert!(matches!(
        &api.diagnostics()[0],
        PluginError::ContributionTypeMismatch { plugin, option: "ready", .. } if plugin == "bad"
    ));
}

#[test]
fn test_merge_last_writer_wins() {
    let mut api = api();
    api.register(PluginDefinition::new("p1").with("define", json!({ "a": 1 })))
        .register(PluginDefinition::new("p2").with("define", json!({ "b": 2 })))
        .register(PluginDefinition::new("p3").with("define", json!({ "a": 3 })));
    api.apply_all();

    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(Value::Object(define.merged().clone()), json!({ "a": 3, "b": 2 }));
}

fn warn_api() -> PluginApi {
    let config = GeneralConfig { collision: CollisionPolicy::Warn, ..GeneralConfig::default() };
    PluginApi::with_config(&config, PluginCatalog::new(), PluginContext::default())
}

#[test]
fn test_warn_collision_policy() {
    let (api, logs) = with_logs(|| {
        let mut api = warn_api();
        api.register(PluginDefinition::new("a").with("define", json!({ "K": 1 })))
            .register(PluginDefinition::new("b").with("define", json!({ "K": 2 })));
        api.apply_all();
        api
    });

    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(define.get("K"), Some(&json!(2)));

    assert_eq!(api.diagnostics().len(), 1);
    assert!(matches!(
        &api.diagnostics()[0],
        PluginError::KeyCollision { option: "define", key, previous, current }
            if key == "K" && previous == "a" && current == "b"
    ));

    let warnings = logs.lines_with("WARN");
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].contains("Option key overridden"));
}

#[test]
fn test_evicting_applied_plugin_does_not_relog_collisions() {
    let (api, logs) = with_logs(|| {
        let mut api = warn_api();
        api.register(PluginDefinition::new("a").with("define", json!({ "K": 1 })))
            .register(PluginDefinition::new("b").with("define", json!({ "K": 2 })))
            .register(PluginDefinition::new("c").with("define", json!({ "K": 3 })));
        api.apply_all();
        api.register(PluginDefinition::new("c").with("define", json!({ "Z": 3 })));
        api.apply_all();
        api
    });

    // a/b and b/c collided once each; the rebuild after evicting c stays quiet
    assert_eq!(logs.lines_with("Option key overridden").len(), 2);

    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(Value::Object(define.merged().clone()), json!({ "K": 2, "Z": 3 }));
    assert_eq!(api.diagnostics().len(), 1);
    assert!(matches!(
        &api.diagnostics()[0],
        PluginError::KeyCollision { previous, current, .. } if previous == "a" && current == "b"
    ));
}

#[test]
fn test_ready_hooks_in_order() {
    let fn1 = Callback::hook(|_| Ok(()));
    let fn2 = Callback::hook(|_| Ok(()));

    let mut api = api();
    api.register(PluginDefinition::new("x").with_point(ExtensionPoint::Ready, fn1.clone()))
        .register(PluginDefinition::new("y").with_point(ExtensionPoint::Ready, fn2.clone()));
    api.apply_all();

    let ready: Vec<&Callback> =
        api.options().list(ExtensionPoint::Ready).unwrap().functions().collect();
    assert_eq!(ready.len(), 2);
    assert!(ready[0].ptr_eq(&fn1));
    assert!(ready[1].ptr_eq(&fn2));
}

#[test]
fn test_hook_list_is_flattened() {
    let mut api = api();
    api.register(PluginDefinition::new("x").with_point(
        ExtensionPoint::Generated,
        vec![Callback::producer(|_| Ok(json!(1))), Callback::producer(|_| Ok(json!(2)))],
    ));
    api.apply_all();

    let values: Vec<Value> = api
        .apply_hook(ExtensionPoint::Generated, &[])
        .unwrap()
        .into_iter()
        .map(|applied| applied.value)
        .collect();
    assert_eq!(values, vec![json!(1), json!(2)]);
}

#[test]
fn test_chain_pipes_in_queue_order() {
    let step = |tag: &'static str| {
        Callback::mutator(move |config, _| {
            config["loaders"].as_array_mut().unwrap().push(json!(tag));
            Ok(())
        })
    };

    let mut api = api();
    let plugin = |name: &'static str| {
        PluginDefinition::new(name).with_point(ExtensionPoint::ChainWebpack, step(name))
    };
    api.register(plugin("one")).register(plugin("two")).register(plugin("one"));
    api.apply_all();

    let mut config = json!({ "loaders": [] });
    api.apply_chain(ExtensionPoint::ChainWebpack, &mut config, &[json!(false)]).unwrap();
    assert_eq!(config, json!({ "loaders": ["two", "one"] }));
}

#[test]
fn test_resolution_by_shortcut_and_config_list() {
    let catalog = PluginCatalog::new()
        .with(
            "weave-plugin-search",
            PluginFactory::new(|options, _, _| {
                let max = options.get("max").cloned().unwrap_or(json!(5));
                Ok(PluginDefinition::new("").with("define", json!({ "SEARCH_MAX": max })))
            }),
        )
        .with(
            "@acme/plugin-theme",
            PluginDefinition::new("@acme/plugin-theme")
                .with("alias", json!({ "@theme": "/theme" }))
                .plugin(PluginConfigEntry::new("search", json!({ "max": 10 }))),
        );

    let mut api = PluginApi::new(catalog, PluginContext::new("docs"));
    api.use_json(&json!(["@acme/theme", "missing", ["search", { "max": 3 }]]));
    api.apply_all();

    assert_eq!(api.queue().names(), vec!["@acme/plugin-theme", "weave-plugin-search"]);
    assert_eq!(api.queue().get("weave-plugin-search").unwrap().shortcut(), Some("search"));
    assert_eq!(api.queue().get("weave-plugin-search").unwrap().options()["max"], json!(3));

    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(define.get("SEARCH_MAX"), Some(&json!(3)));

    assert_eq!(api.diagnostics().len(), 1);
    assert!(matches!(api.diagnostics()[0], PluginError::Resolution { .. }));
}

#[test]
fn test_invalid_options_warn_and_use_defaults() {
    let (api, logs) = with_logs(|| {
        let mut api = api();
        api.use_plugin(PluginDefinition::new("p"), json!(12));
        api
    });

    assert_eq!(logs.lines_with("WARN").len(), 1);
    assert!(api.queue().get("p").unwrap().options().is_empty());
    assert!(api.queue().get("p").unwrap().is_enabled());
}

#[test]
fn test_apply_twice_warns() {
    let (count, logs) = with_logs(|| {
        let mut api = api();
        api.register(PluginDefinition::new("a"));
        api.apply_all() + api.apply_all()
    });

    assert_eq!(count, 1);
    assert_eq!(logs.lines_with("already applied").len(), 1);
}

#[test]
fn test_internal_plugins_log_at_debug() {
    let (_, logs) = with_logs(|| {
        let mut api = api();
        api.register(PluginDefinition::new("@internal/core"))
            .register(PluginDefinition::new("user-plugin"));
        api.apply_all();
    });

    let applying = logs.lines_with("Applying plugin");
    assert_eq!(applying.len(), 2);
    assert!(applying[0].contains("DEBUG") && applying[0].contains("@internal/core"));
    assert!(applying[1].contains("INFO") && applying[1].contains("user-plugin"));
}

#[test]
fn test_unknown_fields_are_ignored() {
    let mut api = api();
    api.register(
        PluginDefinition::new("p").with("somethingElse", true).with("alias", json!({ "x": "y" })),
    );
    api.apply_all();

    assert!(api.diagnostics().is_empty());
    assert_eq!(api.option(ExtensionPoint::Alias).len(), 1);
}

#[test]
fn test_full_pipeline_summary() {
    let mut api = api();
    api.register(
        PluginDefinition::new("@internal/core")
            .with_point(ExtensionPoint::EnhanceAppFiles, "enhanceApp.js")
            .with_point(ExtensionPoint::Ready, Callback::hook(|_| Ok(()))),
    )
    .register(
        PluginDefinition::new("search")
            .with_point(ExtensionPoint::ClientRootMixin, "search-mixin.js")
            .with_point(ExtensionPoint::GlobalUiComponents, vec!["SearchBox"])
            .with_point(ExtensionPoint::Ready, Callback::hook(|_| Ok(()))),
    )
    .register(PluginDefinition::new("pwa").with("alias", json!({ "@pwa": "/pwa" })));
    api.apply_all();

    insta::assert_snapshot!(api.options().summary(), @r"
    ready: @internal/core, search
    enhanceAppFiles: @internal/core=enhanceApp.js
    clientRootMixin: search=search-mixin.js
    globalUIComponents: search=SearchBox
    alias: pwa
    ");
}
