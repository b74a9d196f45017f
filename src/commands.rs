use crate::cli::{self, BuildArgs};
use defprefs::{
    load_path, parse_define, BuildConfig, LoadedRegistry, LoaderConfig, PrefKind, PrefValue,
    write_statement,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Entry of the `json-array` output format
#[derive(Serialize)]
struct OutputEntry<'a> {
    key: &'a str,
    value: &'a PrefValue,
    kind: PrefKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
}

/// Resolve a manifest and print its defaults
pub fn resolve(
    path: &Path,
    build: &BuildArgs,
    query_patterns: &[&str],
    get: Option<String>,
    output_type: cli::OutputType,
) -> anyhow::Result<()> {
    let loaded = load(path, build)?;
    let registry = &loaded.registry;

    // Handle --get mode: single preference retrieval with raw output
    if let Some(get_key) = get {
        if let Some(value) = registry.get(&get_key) {
            output_raw_value(value);
            return Ok(());
        }
        return Err(anyhow::anyhow!("Preference '{}' not found", get_key));
    }

    // Apply queries if provided
    let filtered = if !query_patterns.is_empty() {
        Some(
            registry
                .query(query_patterns)
                .map_err(|e| anyhow::anyhow!("Failed to apply query: {}", e))?,
        )
    } else {
        None
    };
    let selected = |key: &str| filtered.as_ref().map_or(true, |f| f.contains_key(key));

    let output = match output_type {
        cli::OutputType::JsonObject => {
            let object: BTreeMap<&str, &PrefValue> = registry
                .iter()
                .filter(|(key, _)| selected(*key))
                .collect();
            serde_json::to_string_pretty(&object)?
        }
        cli::OutputType::JsonArray => {
            let array_output: Vec<OutputEntry> = registry
                .entries()
                .filter(|(key, _)| selected(*key))
                .map(|(key, entry)| OutputEntry {
                    key,
                    value: &entry.value,
                    kind: entry.kind,
                    source: entry.source.as_deref(),
                })
                .collect();
            serde_json::to_string_pretty(&array_output)?
        }
        cli::OutputType::Prefs => registry
            .entries()
            .filter(|(key, _)| selected(*key))
            .map(|(key, entry)| write_statement(key, entry) + "\n")
            .collect(),
    };

    print!("{}", output);
    if output_type != cli::OutputType::Prefs {
        println!();
    }
    Ok(())
}

/// Print the items of a numbered-key list as JSON
pub fn list(path: &Path, build: &BuildArgs, prefix: &str) -> anyhow::Result<()> {
    let loaded = load(path, build)?;
    let items = loaded.registry.list(prefix);
    if items.is_empty() {
        return Err(anyhow::anyhow!("No list items found under '{}'", prefix));
    }

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn load(path: &Path, build: &BuildArgs) -> anyhow::Result<LoadedRegistry> {
    let config = LoaderConfig {
        build: build_config(build)?,
        strict_guards: build.strict,
    };

    let loaded = load_path(path, &config).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load manifest at {}: {}. Check the file syntax and the build flags.",
            path.display(),
            e
        )
    })?;

    for warning in &loaded.warnings {
        eprintln!("Warning: {}", warning);
    }
    Ok(loaded)
}

fn build_config(args: &BuildArgs) -> anyhow::Result<BuildConfig> {
    let mut config = match &args.flags {
        Some(path) => BuildConfig::from_json_file(path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to read build flags from {}: {}",
                path.display(),
                e
            )
        })?,
        None => BuildConfig::new(),
    };

    if let Some(platform) = &args.platform {
        config = config.with_platform(platform.parse()?);
    }
    for feature in &args.features {
        config = config.with_feature(feature.parse()?);
    }
    for define in &args.defines {
        let (name, value) = parse_define(define)?;
        config = config.with_define(name, value);
    }
    Ok(config)
}

/// Output a single preference value in raw format (no JSON wrapping)
fn output_raw_value(value: &PrefValue) {
    match value {
        PrefValue::String(s) => println!("{}", s),
        PrefValue::Bool(b) => println!("{}", b),
        PrefValue::Integer(n) => println!("{}", n),
    }
}
