//! # defprefs - Default Preference Manifest Loader
//!
//! This library resolves default preference manifests (`firefox.js`-style
//! files of `pref("key", value);` declarations wrapped in `#ifdef` blocks)
//! into an immutable, typed registry. The registry is the default layer a
//! settings store is built on; user overrides are layered elsewhere.
//!
//! ## Features
//!
//! - Parse manifests with full JavaScript escape sequence support
//! - Evaluate `#ifdef` / `#ifndef` / `#if` / `#elif` / `#else` blocks against an
//!   explicit set of build flags (platform, features, extra defines)
//! - `#define`, `#undef`, `#filter substitution` (`@AB_CD@`) and `#error`
//! - Last-write-wins for keys declared more than once
//! - Key syntax validation and boolean / integer / string value checking
//! - Ordered access to numbered-key lists (`...types.0.title`, `...types.1.title`)
//! - Query entries by glob patterns (e.g., `"browser.*"`)
//! - Flatten a resolved registry back into plain manifest text
//!
//! ## Quick Start
//!
//! ```rust
//! use defprefs::{load_str, BuildConfig, LoaderConfig, Platform, PrefValue};
//!
//! let content = r#"
//!     pref("browser.chromeURL", "chrome://browser/content/");
//!     #ifdef XP_MACOSX
//!     pref("toolbar.customization.usesheet", true);
//!     #else
//!     pref("toolbar.customization.usesheet", false);
//!     #endif
//! "#;
//!
//! let config = LoaderConfig::new(BuildConfig::new().with_platform(Platform::Macos));
//! let loaded = load_str(content, &config)?;
//! let registry = loaded.registry;
//!
//! assert_eq!(registry.get("toolbar.customization.usesheet"), Some(&PrefValue::Bool(true)));
//! assert_eq!(registry.get("no.such.pref"), None);
//! # Ok::<(), defprefs::Error>(())
//! ```
//!
//! ### Loading a Defaults Directory
//!
//! ```rust,no_run
//! use defprefs::{load_dir, BuildConfig, Feature, LoaderConfig, Platform};
//! use std::path::Path;
//!
//! let build = BuildConfig::new()
//!     .with_platform(Platform::Unix)
//!     .with_feature(Feature::SafeBrowsingEnabled)
//!     .with_define("AB_CD", "en-US");
//!
//! let loaded = load_dir(Path::new("defaults/pref"), &LoaderConfig::new(build))?;
//! for warning in &loaded.warnings {
//!     eprintln!("Warning: {}", warning);
//! }
//! println!("{} defaults from {} files", loaded.registry.len(), loaded.sources.len());
//! # Ok::<(), defprefs::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Loading is all-or-nothing. The first problem aborts the load and is
//! reported through [`Error`]:
//!
//! ```rust
//! use defprefs::{load_str, Error, LoaderConfig};
//!
//! match load_str(r#"pref("browser.3d.enabled", true);"#, &LoaderConfig::default()) {
//!     Ok(_) => println!("Loaded"),
//!     Err(Error::MalformedKey { key, line, reason }) => {
//!         eprintln!("Bad key {} at line {}: {}", key, line, reason);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

// Re-export all public types at crate root
pub use types::{DeclaredValue, PrefKind, PrefValue};

// Re-export error types
pub use error::{Error, Result};

// Build configuration
pub use flags::{parse_define, BuildConfig, Feature, Platform};

// Declaration tree and guards
pub use guard::{CompareOp, Guard, Operand, SymbolTable};
pub use manifest::{Branch, Conditional, Declaration, Filter, Item, Manifest};

// Re-export all public functions at crate root
pub use key::{is_valid_key, validate_key};
pub use loader::{
    load_dir, load_file, load_manifest, load_path, load_str, LoadedRegistry, LoaderConfig,
};
pub use parser::{parse_manifest, parse_manifest_file};
pub use query::query_preferences;
pub use registry::{ListItem, PrefRegistry, RegistryEntry};
pub use writer::{literal, write_manifest, write_statement};

// All modules are private - use re-exports above for public API
mod error;
mod flags;
mod guard;
mod key;
mod lexer;
mod loader;
mod manifest;
mod parser;
mod query;
mod registry;
mod resolver;
mod types;
mod writer;
