//! Integration tests for loading plugin lists from config files.

use std::fs;

use plugin_weave::{
    CollisionPolicy, Config, ExtensionPoint, PluginContext, PluginDefinition, PluginFactory,
};
use serde_json::json;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_toml_and_build_api() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        &temp_dir,
        "weave.toml",
        r#"
            plugins = ["search", ["pwa", { updatePopup = true }], false]

            [general]
            collision = "error"
        "#,
    );

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.general.collision, CollisionPolicy::Error);

    let catalog = config
        .catalog()
        .with(
            "weave-plugin-search",
            PluginDefinition::new("weave-plugin-search")
                .with("define", json!({ "MODE": "search" })),
        )
        .with(
            "weave-plugin-pwa",
            PluginFactory::new(|options, _, _| {
                Ok(PluginDefinition::new("weave-plugin-pwa")
                    .with("define", json!({ "MODE": "pwa", "POPUP": options["updatePopup"] })))
            }),
        );

    let mut api = config.build_api(catalog, PluginContext::new(temp_dir.path()));
    api.apply_all();

    assert_eq!(api.queue().names(), vec!["weave-plugin-search", "weave-plugin-pwa"]);
    let define = api.options().merge(ExtensionPoint::Define).unwrap();
    assert_eq!(define.get("MODE"), Some(&json!("search")));
    assert_eq!(define.get("POPUP"), Some(&json!(true)));
    assert_eq!(define.collisions().len(), 1);
}

#[test]
fn test_load_map_form_with_custom_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        &temp_dir,
        "weave.toml",
        r#"
            [resolver]
            prefix = "site-"

            [plugins]
            blog = { perPage = 5 }
            comments = false
        "#,
    );

    let config = Config::load_from_file(&path).unwrap();
    let catalog = config
        .catalog()
        .with("site-blog", PluginDefinition::new("site-blog"))
        .with("site-comments", PluginDefinition::new("site-comments"));
    let api = config.build_api(catalog, PluginContext::default());

    assert_eq!(api.queue().names(), vec!["site-blog", "site-comments"]);
    assert!(!api.queue().get("site-comments").unwrap().is_enabled());
    assert_eq!(api.queue().get("site-blog").unwrap().options()["perPage"], json!(5));
}

#[cfg(feature = "yaml")]
#[test]
fn test_load_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        &temp_dir,
        "weave.yaml",
        "general:\n  collision: warn\n  internal_prefix: \"@core/\"\nplugins:\n  - search\n  - name: inline\n    alias:\n      \"@x\": /x\n",
    );

    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.general.collision, CollisionPolicy::Warn);
    assert_eq!(config.general.internal_prefix, "@core/");
    assert_eq!(config.plugins.len(), 2);

    let mut api = config.build_api(config.catalog(), PluginContext::default());
    api.apply_all();

    // "search" is not in the empty catalogue
    assert_eq!(api.queue().names(), vec!["inline"]);
    assert_eq!(api.diagnostics().len(), 1);
    let alias = api.options().merge(ExtensionPoint::Alias).unwrap();
    assert_eq!(alias.get("@x"), Some(&json!("/x")));
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_malformed_plugin_list_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(&temp_dir, "weave.toml", "plugins = [[\"a\", {}, \"extra\"]]");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Invalid plugin config entry"));
}
