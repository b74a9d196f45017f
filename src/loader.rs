//! Manifest loading
//!
//! Entry points that turn manifest text, files, directories or in-code
//! [`Manifest`]s into a [`PrefRegistry`]. A load either succeeds completely
//! or returns the first error; no partially filled registry escapes.

use crate::error::{Error, Result};
use crate::flags::BuildConfig;
use crate::manifest::Manifest;
use crate::parser::parse_manifest;
use crate::registry::PrefRegistry;
use crate::resolver::Resolver;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for manifest loading
///
/// # Example
///
/// ```rust
/// use defprefs::{BuildConfig, LoaderConfig, Platform};
///
/// let config = LoaderConfig {
///     build: BuildConfig::new().with_platform(Platform::Windows),
///     strict_guards: true,
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Active build flags
    pub build: BuildConfig,
    /// Fail on guard symbols the build configuration does not know,
    /// instead of treating them as undefined with a warning
    pub strict_guards: bool,
}

impl LoaderConfig {
    pub fn new(build: BuildConfig) -> Self {
        LoaderConfig {
            build,
            strict_guards: false,
        }
    }
}

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct LoadedRegistry {
    pub registry: PrefRegistry,
    /// Non-fatal findings (unknown guard symbols, empty substitutions)
    pub warnings: Vec<String>,
    /// Files read, in processing order
    pub sources: Vec<PathBuf>,
}

/// Load a registry from manifest text
///
/// # Example
///
/// ```rust
/// use defprefs::{load_str, BuildConfig, LoaderConfig, PrefValue};
///
/// let content = r#"
///     pref("a.b", 1);
///     #ifdef X
///     pref("a.b", 2);
///     #endif
/// "#;
///
/// let loaded = load_str(content, &LoaderConfig::default())?;
/// assert_eq!(loaded.registry.get("a.b"), Some(&PrefValue::Integer(1)));
///
/// let config = LoaderConfig::new(BuildConfig::new().with_symbol("X"));
/// let loaded = load_str(content, &config)?;
/// assert_eq!(loaded.registry.get("a.b"), Some(&PrefValue::Integer(2)));
/// # Ok::<(), defprefs::Error>(())
/// ```
pub fn load_str(content: &str, config: &LoaderConfig) -> Result<LoadedRegistry> {
    let manifest = parse_manifest(content)?;
    load_manifest(&manifest, config)
}

/// Load a registry from a declaration tree built in code or parsed earlier
pub fn load_manifest(manifest: &Manifest, config: &LoaderConfig) -> Result<LoadedRegistry> {
    let mut resolver = Resolver::new(config);
    resolver.resolve(manifest, None)?;
    let (registry, warnings) = resolver.finish();
    Ok(LoadedRegistry {
        registry,
        warnings,
        sources: Vec::new(),
    })
}

/// Load a registry from a single manifest file
pub fn load_file(path: &Path, config: &LoaderConfig) -> Result<LoadedRegistry> {
    let content = std::fs::read_to_string(path)?;
    let manifest = parse_manifest(&content)?;

    let mut resolver = Resolver::new(config);
    resolver.resolve(&manifest, Some(display_name(path)))?;
    let (registry, warnings) = resolver.finish();
    Ok(LoadedRegistry {
        registry,
        warnings,
        sources: vec![path.to_path_buf()],
    })
}

/// Load every `*.js` manifest directly inside `dir`, in file name order
///
/// The files form one declaration sequence: a key declared in a later file
/// replaces the same key from an earlier one. `#define`s and filters stay
/// local to their file. Errors are wrapped in [`Error::InFile`].
pub fn load_dir(dir: &Path, config: &LoaderConfig) -> Result<LoadedRegistry> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "js") {
            files.push(path.to_path_buf());
        }
    }

    let mut resolver = Resolver::new(config);
    let mut warnings = Vec::new();
    for path in &files {
        let in_file = |source: Error| Error::InFile {
            path: path.clone(),
            source: Box::new(source),
        };
        let content = std::fs::read_to_string(path).map_err(|e| in_file(e.into()))?;
        let manifest = parse_manifest(&content).map_err(in_file)?;
        resolver
            .resolve(&manifest, Some(display_name(path)))
            .map_err(in_file)?;
    }

    let (registry, resolver_warnings) = resolver.finish();
    warnings.extend(resolver_warnings);
    if files.is_empty() {
        warnings.push(format!("no .js manifests found in {}", dir.display()));
    }

    Ok(LoadedRegistry {
        registry,
        warnings,
        sources: files,
    })
}

/// Load from a file or a directory of manifests
pub fn load_path(path: &Path, config: &LoaderConfig) -> Result<LoadedRegistry> {
    if path.is_dir() {
        load_dir(path, config)
    } else if path.is_file() {
        load_file(path, config)
    } else {
        Err(Error::ManifestNotFound(path.to_path_buf()))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
