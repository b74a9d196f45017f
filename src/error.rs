//! Error types for manifest loading and registry access
//!
//! Every load-time failure aborts the whole load; there is no partial registry.
//! All public functions return [`Result<T, Error>`].

use std::path::PathBuf;

/// Errors that can occur while loading a preference manifest or reading the registry
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexer error during tokenization
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer {
        line: usize,
        column: usize,
        message: String,
    },

    /// Parser error: bad statement or directive structure
    #[error("Parser error at line {line}, column {column}: {message}")]
    Parser {
        line: usize,
        column: usize,
        message: String,
    },

    /// Key does not follow the preference key syntax
    #[error("Malformed preference key '{key}' at line {line}: {reason}")]
    MalformedKey {
        key: String,
        line: usize,
        reason: String,
    },

    /// Value is not a boolean, integer or string
    #[error("Unsupported value type for '{key}' at line {line}: {found} (expected boolean, integer or string)")]
    UnsupportedValueType {
        key: String,
        line: usize,
        found: &'static str,
    },

    /// A guard referenced a symbol the build configuration does not know (strict mode only)
    #[error("Unknown build flag '{name}' referenced at line {line}")]
    UnknownBuildFlag { name: String, line: usize },

    /// `@NAME@` substitution with no definition for NAME
    #[error("Undefined substitution variable '{name}' at line {line}")]
    UndefinedSubstitution { name: String, line: usize },

    /// `#error` directive reached in an included branch
    #[error("#error at line {line}: {message}")]
    ExplicitError { line: usize, message: String },

    /// Typed registry access found a different value type
    #[error("Preference '{key}' is {found}, not {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Unknown platform or feature name
    #[error("Invalid build flag: {0}")]
    InvalidBuildFlag(String),

    /// Invalid glob pattern in query
    #[error("Invalid glob pattern: {0}")]
    InvalidGlobPattern(String),

    /// Error inside one file of a multi-file load
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Manifest path is neither a file nor a directory
    #[error("Manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Build flag file could not be decoded
    #[error("Invalid build flag file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
///
/// # Example
///
/// ```rust
/// use defprefs::{load_str, LoaderConfig, Result};
///
/// fn count_defaults(content: &str) -> Result<usize> {
///     let loaded = load_str(content, &LoaderConfig::default())?;
///     Ok(loaded.registry.len())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
