//! Resolve a default preference manifest for one platform
//!
//! This example loads a firefox.js-style manifest under a build
//! configuration and prints the resolved defaults, optionally filtered by
//! glob patterns.

use defprefs::{load_path, BuildConfig, LoaderConfig, Platform, PrefKind};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!(
            "Usage: {} <manifest or directory> <platform> [pattern...]",
            args[0]
        );
        eprintln!("\nExamples:");
        eprintln!("  {} tests/fixtures/firefox.js macos", args[0]);
        eprintln!("  {} tests/fixtures/firefox.js unix 'browser.*'", args[0]);
        return Ok(());
    }

    let path = Path::new(&args[1]);
    let platform: Platform = args[2].parse()?;
    let patterns: Vec<&str> = args[3..].iter().map(|s| s.as_str()).collect();

    let build = BuildConfig::new()
        .with_platform(platform)
        .with_define("AB_CD", "en-US");
    let loaded = load_path(path, &LoaderConfig::new(build))?;

    for warning in &loaded.warnings {
        eprintln!("Warning: {}", warning);
    }

    println!(
        "Resolved {} defaults for {} from {} file(s)",
        loaded.registry.len(),
        platform,
        loaded.sources.len()
    );
    println!("{:-<80}", "");

    let selected = if patterns.is_empty() {
        None
    } else {
        Some(loaded.registry.query(&patterns)?)
    };

    for (key, entry) in loaded.registry.entries() {
        if selected.as_ref().is_some_and(|s| !s.contains_key(key)) {
            continue;
        }
        let marker = match entry.kind {
            PrefKind::Default => "",
            PrefKind::Sticky => " (sticky)",
            PrefKind::Locked => " (locked)",
        };
        println!("{:<60} = {}{}", key, defprefs::literal(&entry.value), marker);
    }

    Ok(())
}
