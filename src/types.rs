use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved default value
///
/// Only three types exist in a defaults manifest. Lists are encoded as
/// numbered flat keys (see [`crate::PrefRegistry::list`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl PrefValue {
    /// Name of the value type, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "boolean",
            PrefValue::Integer(_) => "integer",
            PrefValue::String(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrefValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Locale bundle this value points at, if it is a localized indirection
    ///
    /// Defaults such as `browser.startup.homepage` hold a `chrome://` URL of a
    /// `.properties` bundle instead of a literal value. The registry keeps the
    /// URL as-is; looking the real value up is left to the consumer.
    pub fn localized_bundle(&self) -> Option<&str> {
        self.as_str()
            .filter(|s| s.starts_with("chrome://") && s.ends_with(".properties"))
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Integer(n) => write!(f, "{}", n),
            PrefValue::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue::Bool(value)
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue::Integer(value)
    }
}

impl From<i32> for PrefValue {
    fn from(value: i32) -> Self {
        PrefValue::Integer(value.into())
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue::String(value.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue::String(value)
    }
}

/// Declaration function used for a preference
///
/// - **pref()** - [`PrefKind::Default`]
/// - **sticky_pref()** - [`PrefKind::Sticky`]: a user value equal to the default is still kept
/// - **lock_pref()** - [`PrefKind::Locked`]: users cannot override it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefKind {
    #[default]
    Default,
    Sticky,
    Locked,
}

impl PrefKind {
    /// Function name that declares this kind in manifest text
    pub fn function_name(self) -> &'static str {
        match self {
            PrefKind::Default => "pref",
            PrefKind::Sticky => "sticky_pref",
            PrefKind::Locked => "lock_pref",
        }
    }
}

/// A literal exactly as written in the manifest
///
/// Floats and `null` are accepted by the parser so that they only fail the
/// load when their declaration is actually included.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredValue {
    Bool(bool),
    Integer(i64),
    String(String),
    Float(f64),
    Null,
}

impl DeclaredValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            DeclaredValue::Bool(_) => "boolean",
            DeclaredValue::Integer(_) => "integer",
            DeclaredValue::String(_) => "string",
            DeclaredValue::Float(_) => "float",
            DeclaredValue::Null => "null",
        }
    }

    /// Convert to a registry value, or `None` for unsupported types
    pub fn to_pref_value(&self) -> Option<PrefValue> {
        match self {
            DeclaredValue::Bool(b) => Some(PrefValue::Bool(*b)),
            DeclaredValue::Integer(n) => Some(PrefValue::Integer(*n)),
            DeclaredValue::String(s) => Some(PrefValue::String(s.clone())),
            DeclaredValue::Float(_) | DeclaredValue::Null => None,
        }
    }
}

impl From<PrefValue> for DeclaredValue {
    fn from(value: PrefValue) -> Self {
        match value {
            PrefValue::Bool(b) => DeclaredValue::Bool(b),
            PrefValue::Integer(n) => DeclaredValue::Integer(n),
            PrefValue::String(s) => DeclaredValue::String(s),
        }
    }
}
