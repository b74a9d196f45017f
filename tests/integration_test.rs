// Integration tests for loading default preference manifests
use defprefs::{
    load_dir, load_file, load_manifest, load_str, write_manifest, BuildConfig, Error, Feature,
    Guard, Item, LoaderConfig, Manifest, Platform, PrefKind, PrefValue,
};
use std::path::PathBuf;

// Helper function to get fixtures path
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn firefox_js() -> PathBuf {
    fixtures_path().join("firefox.js")
}

fn linux_build() -> BuildConfig {
    BuildConfig::new()
        .with_platform(Platform::Unix)
        .with_feature(Feature::SafeBrowsingEnabled)
        .with_define("AB_CD", "en-US")
}

#[test]
fn test_load_fixture_for_linux() {
    let loaded = load_file(&firefox_js(), &LoaderConfig::new(linux_build()))
        .expect("Failed to load firefox.js");
    let registry = &loaded.registry;

    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
    assert_eq!(registry.len(), 28);

    assert_eq!(
        registry.get("general.useragent.locale"),
        Some(&PrefValue::from("en-US"))
    );
    assert_eq!(
        registry.get("browser.download.useDownloadDir"),
        Some(&PrefValue::Bool(false))
    );
    assert_eq!(
        registry.get("toolbar.customization.usesheet"),
        Some(&PrefValue::Bool(false))
    );
    assert_eq!(
        registry.get("browser.preferences.instantApply"),
        Some(&PrefValue::Bool(true))
    );
    assert_eq!(
        registry.get("browser.dom.window.dump.enabled"),
        Some(&PrefValue::Bool(false))
    );
    assert_eq!(
        registry.get("browser.safebrowsing.provider.0.lookupURL"),
        Some(&PrefValue::from(
            "http://safebrowsing.example.com/lookup?client=en-US"
        ))
    );
}

#[test]
fn test_load_fixture_for_macos() {
    let build = BuildConfig::new()
        .with_platform(Platform::Macos)
        .with_define("AB_CD", "de");
    let loaded = load_file(&firefox_js(), &LoaderConfig::new(build)).unwrap();
    let registry = &loaded.registry;

    // The manifest-local UNIX_BUT_NOT_MAC define is skipped on macOS
    assert_eq!(
        registry.get("browser.download.useDownloadDir"),
        Some(&PrefValue::Bool(true))
    );
    assert_eq!(
        registry.get("toolbar.customization.usesheet"),
        Some(&PrefValue::Bool(true))
    );
    assert!(registry.get("browser.safebrowsing.malware.enabled").is_none());
    assert_eq!(registry.len(), 25);
    assert!(loaded.warnings.is_empty(), "{:?}", loaded.warnings);
}

#[test]
fn test_fixture_loads_under_strict_guards() {
    let config = LoaderConfig {
        build: BuildConfig::new()
            .with_platform(Platform::Windows)
            .with_feature(Feature::DebugBuild)
            .with_define("AB_CD", "fr"),
        strict_guards: true,
    };
    let registry = load_file(&firefox_js(), &config).unwrap().registry;
    assert_eq!(
        registry.get("browser.preferences.instantApply"),
        Some(&PrefValue::Bool(false))
    );
    assert_eq!(
        registry.get("browser.dom.window.dump.enabled"),
        Some(&PrefValue::Bool(true))
    );
}

#[test]
fn test_fixture_without_locale_fails() {
    let build = BuildConfig::new().with_platform(Platform::Unix);
    let result = load_file(&firefox_js(), &LoaderConfig::new(build));
    assert!(matches!(
        result,
        Err(Error::UndefinedSubstitution { ref name, line: 13 }) if name == "AB_CD"
    ));
}

#[test]
fn test_fixture_last_write_wins_and_kinds() {
    let registry = load_file(&firefox_js(), &LoaderConfig::new(linux_build()))
        .unwrap()
        .registry;

    let interval = registry.get_entry("browser.sessionstore.interval").unwrap();
    assert_eq!(interval.value, PrefValue::Integer(15000));
    assert_eq!(interval.source.as_deref(), Some("firefox.js"));

    assert_eq!(
        registry.get_entry("app.update.auto").unwrap().kind,
        PrefKind::Locked
    );
    assert_eq!(
        registry.get_entry("browser.tabs.warnOnClose").unwrap().kind,
        PrefKind::Sticky
    );
    assert_eq!(
        registry.get_entry("extensions.update.enabled").unwrap().kind,
        PrefKind::Default
    );
}

#[test]
fn test_fixture_lists_and_localized_values() {
    let registry = load_file(&firefox_js(), &LoaderConfig::new(linux_build()))
        .unwrap()
        .registry;

    let types = registry.list("browser.contentHandlers.types");
    assert_eq!(types.len(), 2);
    assert_eq!(types[0].index, 0);
    assert_eq!(types[1].index, 1);
    assert_eq!(types[1].fields.len(), 3);
    assert_eq!(
        types[1].fields["type"],
        PrefValue::from("application/vnd.mozilla.maybe.feed")
    );

    let localized = registry.localized_references();
    assert_eq!(localized.len(), 7);
    assert!(localized.contains(&(
        "extensions.{972ce4c6-7e08-4474-a285-3208198ce6fd}.name",
        "chrome://browser/locale/browser.properties"
    )));
}

#[test]
fn test_fixture_query() {
    let registry = load_file(&firefox_js(), &LoaderConfig::new(linux_build()))
        .unwrap()
        .registry;
    let extensions = registry.query(&["extensions.*"]).unwrap();
    assert_eq!(extensions.len(), 5);
    assert_eq!(
        extensions.get("extensions.update.interval"),
        Some(&PrefValue::Integer(86400))
    );
}

#[test]
fn test_fixture_flattens_and_reloads() {
    let first = load_file(&firefox_js(), &LoaderConfig::new(linux_build()))
        .unwrap()
        .registry;

    let text = write_manifest(&first);
    let from_text = load_str(&text, &LoaderConfig::default()).unwrap().registry;
    assert_eq!(first, from_text);

    let from_tree = load_manifest(&first.to_manifest(), &LoaderConfig::default())
        .unwrap()
        .registry;
    assert_eq!(first, from_tree);
}

#[test]
fn test_one_entry_per_declared_key() {
    let content = r#"
        pref("a.b", 1);
        pref("a.c", "x");
        pref("a.b", 2);
    "#;
    let registry = load_str(content, &LoaderConfig::default()).unwrap().registry;
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("a.b"), Some(&PrefValue::Integer(2)));
    assert_eq!(registry.get("a.x"), None);
}

#[test]
fn test_branch_selection_depends_on_flags() {
    let content = r#"
#ifdef XP_MACOSX
pref("k", "mac");
#else
pref("k", "other");
#endif
"#;
    let mac = load_str(
        content,
        &LoaderConfig::new(BuildConfig::new().with_platform(Platform::Macos)),
    )
    .unwrap();
    assert_eq!(mac.registry.get("k"), Some(&PrefValue::from("mac")));

    let none = load_str(content, &LoaderConfig::default()).unwrap();
    assert_eq!(none.registry.get("k"), Some(&PrefValue::from("other")));
}

#[test]
fn test_later_unconditional_declaration_overrides_branch() {
    let content = r#"
#ifdef XP_WIN
pref("k", 1);
#endif
pref("k", 2);
"#;
    let build = BuildConfig::new().with_platform(Platform::Windows);
    let registry = load_str(content, &LoaderConfig::new(build))
        .unwrap()
        .registry;
    assert_eq!(registry.get("k"), Some(&PrefValue::Integer(2)));
}

#[test]
fn test_malformed_key_fails_whole_load() {
    let content = "pref(\"ok.key\", true);\npref(\"a.3d\", true);\n";
    match load_str(content, &LoaderConfig::default()) {
        Err(Error::MalformedKey { key, line, .. }) => {
            assert_eq!(key, "a.3d");
            assert_eq!(line, 2);
        }
        other => panic!("Expected MalformedKey, got {:?}", other),
    }
}

#[test]
fn test_load_manifest_built_in_code() {
    let manifest = Manifest::new(vec![
        Item::pref("browser.tabs.max", 20),
        Item::conditional(
            Guard::defined("DEBUG"),
            vec![Item::pref("browser.dom.window.dump.enabled", true)],
            vec![Item::pref("browser.dom.window.dump.enabled", false)],
        ),
    ]);

    let release = load_manifest(&manifest, &LoaderConfig::default()).unwrap();
    assert_eq!(
        release.registry.get_bool("browser.dom.window.dump.enabled").unwrap(),
        Some(false)
    );
    assert_eq!(release.registry.get_int("browser.tabs.max").unwrap(), Some(20));

    let debug = BuildConfig::new().with_feature(Feature::DebugBuild);
    let debug = load_manifest(&manifest, &LoaderConfig::new(debug)).unwrap();
    assert_eq!(
        debug.registry.get_bool("browser.dom.window.dump.enabled").unwrap(),
        Some(true)
    );
}

#[test]
fn test_typed_getter_mismatch() {
    let registry = load_str("pref(\"a\", \"text\");", &LoaderConfig::default())
        .unwrap()
        .registry;
    assert!(matches!(
        registry.get_int("a"),
        Err(Error::TypeMismatch { .. })
    ));
    assert_eq!(registry.get_str("a").unwrap(), Some("text"));
    assert_eq!(registry.get_str("missing").unwrap(), None);
}

#[test]
fn test_load_dir_with_fixture_and_override() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    std::fs::copy(firefox_js(), temp_dir.path().join("firefox.js")).unwrap();
    std::fs::write(
        temp_dir.path().join("zz-distribution.js"),
        "pref(\"browser.startup.homepage\", \"https://start.example.org\");\n",
    )
    .unwrap();

    let loaded = load_dir(temp_dir.path(), &LoaderConfig::new(linux_build())).unwrap();
    assert_eq!(loaded.sources.len(), 2);

    let homepage = loaded
        .registry
        .get_entry("browser.startup.homepage")
        .unwrap();
    assert_eq!(homepage.value, PrefValue::from("https://start.example.org"));
    assert_eq!(homepage.source.as_deref(), Some("zz-distribution.js"));
}

#[test]
fn test_registry_serializes_as_flat_object() {
    let registry = load_str(
        "pref(\"b\", \"x\");\npref(\"a\", 1);\npref(\"c\", true);\n",
        &LoaderConfig::default(),
    )
    .unwrap()
    .registry;
    let json = serde_json::to_value(&registry).unwrap();
    assert_eq!(json, serde_json::json!({ "a": 1, "b": "x", "c": true }));
}
