//! Build configuration
//!
//! The active build flags decide which conditional branches of a manifest are
//! included. A [`BuildConfig`] is turned into the initial symbol table seen by
//! `#ifdef` / `#if` guards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Target platform of the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Unix,
    Macos,
    Windows,
    Os2,
}

impl Platform {
    /// Guard symbols defined for this platform
    ///
    /// macOS builds are Unix builds as well, so both symbols are defined.
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            Platform::Unix => &["XP_UNIX"],
            Platform::Macos => &["XP_UNIX", "XP_MACOSX"],
            Platform::Windows => &["XP_WIN"],
            Platform::Os2 => &["XP_OS2"],
        }
    }

    pub fn all() -> &'static [Platform] {
        &[
            Platform::Unix,
            Platform::Macos,
            Platform::Windows,
            Platform::Os2,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Platform::Unix => "unix",
            Platform::Macos => "macos",
            Platform::Windows => "windows",
            Platform::Os2 => "os2",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Platform::all()
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                Error::InvalidBuildFlag(format!(
                    "unknown platform '{}'. Expected unix, macos, windows, or os2",
                    s
                ))
            })
    }
}

/// Named feature toggle of the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    DebugBuild,
    SafeBrowsingEnabled,
    MaintenanceService,
    ServicesSync,
    E10sCompat,
}

impl Feature {
    /// Guard symbol defined when the feature is on
    pub fn symbol(self) -> &'static str {
        match self {
            Feature::DebugBuild => "DEBUG",
            Feature::SafeBrowsingEnabled => "MOZ_SAFE_BROWSING",
            Feature::MaintenanceService => "MOZ_MAINTENANCE_SERVICE",
            Feature::ServicesSync => "MOZ_SERVICES_SYNC",
            Feature::E10sCompat => "MOZ_E10S_COMPAT",
        }
    }

    pub fn all() -> &'static [Feature] {
        &[
            Feature::DebugBuild,
            Feature::SafeBrowsingEnabled,
            Feature::MaintenanceService,
            Feature::ServicesSync,
            Feature::E10sCompat,
        ]
    }

    fn name(self) -> &'static str {
        match self {
            Feature::DebugBuild => "debug-build",
            Feature::SafeBrowsingEnabled => "safe-browsing-enabled",
            Feature::MaintenanceService => "maintenance-service",
            Feature::ServicesSync => "services-sync",
            Feature::E10sCompat => "e10s-compat",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Feature::all()
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::InvalidBuildFlag(format!("unknown feature '{}'", s)))
    }
}

/// Active build flags
///
/// # Example
///
/// ```rust
/// use defprefs::{BuildConfig, Feature, Platform};
///
/// let flags = BuildConfig::new()
///     .with_platform(Platform::Macos)
///     .with_feature(Feature::DebugBuild)
///     .with_define("AB_CD", "en-US");
///
/// let symbols = flags.symbols();
/// assert!(symbols.contains_key("XP_MACOSX"));
/// assert!(symbols.contains_key("DEBUG"));
/// assert_eq!(symbols["AB_CD"], "en-US");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Target platform; `None` defines no platform symbol
    pub platform: Option<Platform>,
    /// Enabled feature toggles
    pub features: BTreeSet<Feature>,
    /// Extra symbols with their values (e.g. `AB_CD` for substitution)
    pub defines: BTreeMap<String, String>,
    /// Symbols that may legitimately be undefined, for strict guard checking
    pub known_symbols: BTreeSet<String>,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.insert(feature);
        self
    }

    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(name.into(), value.into());
        self
    }

    /// Define a symbol with the value `"1"`, as a command-line `-DNAME` does
    ///
    /// Unlike a manifest `#define NAME` (empty value), the symbol is truthy
    /// in `#if NAME` as well as defined for `#ifdef NAME`.
    pub fn with_symbol(self, name: impl Into<String>) -> Self {
        self.with_define(name, "1")
    }

    /// Read build flags from a JSON file
    ///
    /// ```json
    /// { "platform": "macos", "features": ["debug-build"], "defines": { "AB_CD": "en-US" } }
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Initial symbol table for guard evaluation
    pub fn symbols(&self) -> BTreeMap<String, String> {
        let mut symbols = BTreeMap::new();
        if let Some(platform) = self.platform {
            for symbol in platform.symbols() {
                symbols.insert(symbol.to_string(), "1".to_string());
            }
        }
        for feature in &self.features {
            symbols.insert(feature.symbol().to_string(), "1".to_string());
        }
        for (name, value) in &self.defines {
            symbols.insert(name.clone(), value.clone());
        }
        symbols
    }

    /// Returns true if `name` is a symbol this configuration knows about,
    /// whether or not it is currently defined
    pub fn is_known_symbol(&self, name: &str) -> bool {
        Platform::all()
            .iter()
            .any(|p| p.symbols().contains(&name))
            || Feature::all().iter().any(|f| f.symbol() == name)
            || self.defines.contains_key(name)
            || self.known_symbols.contains(name)
    }
}

/// Parse a `NAME` or `NAME=VALUE` define, as given on the command line
pub fn parse_define(spec: &str) -> Result<(String, String)> {
    let (name, value) = match spec.split_once('=') {
        Some((name, value)) => (name.trim(), value.to_string()),
        None => (spec.trim(), "1".to_string()),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidBuildFlag(format!("invalid define '{}'", spec)));
    }
    Ok((name.to_string(), value))
}
