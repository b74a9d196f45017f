//! Resolved preference registry
//!
//! A [`PrefRegistry`] is produced once by the loader and never mutated
//! afterwards. Hand it to the components that need defaults by reference (or
//! wrap it in an `Arc`); there is no process-wide instance.

use crate::error::{Error, Result};
use crate::manifest::{Declaration, Item, Manifest};
use crate::types::{DeclaredValue, PrefKind, PrefValue};
use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::Bound;

/// One resolved default with its provenance
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegistryEntry {
    pub value: PrefValue,
    pub kind: PrefKind,
    /// Line of the winning declaration, 0 for declarations built in code
    pub line: usize,
    /// File the winning declaration came from, if loaded from disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Element of a numbered-key list
///
/// `browser.contentHandlers.types.0.title` and
/// `browser.contentHandlers.types.0.uri` become one item with index 0 and
/// fields `title` and `uri`. A value stored directly at the index key
/// (`xpinstall.whitelist.add.36`) is the field `""`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ListItem {
    pub index: u64,
    pub fields: BTreeMap<String, PrefValue>,
}

/// Immutable key → default value mapping
///
/// Two registries are equal when they hold the same keys, values and kinds;
/// source positions are not compared.
#[derive(Debug, Clone, Default)]
pub struct PrefRegistry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl PrefRegistry {
    pub(crate) fn from_entries(entries: BTreeMap<String, RegistryEntry>) -> Self {
        PrefRegistry { entries }
    }

    /// Default value for `key`, or `None` when the manifest declares none
    ///
    /// ```rust
    /// use defprefs::{load_str, LoaderConfig, PrefValue};
    ///
    /// let loaded = load_str(r#"pref("browser.tabs.animate", true);"#, &LoaderConfig::default())?;
    /// assert_eq!(loaded.registry.get("browser.tabs.animate"), Some(&PrefValue::Bool(true)));
    /// assert_eq!(loaded.registry.get("browser.tabs.missing"), None);
    /// # Ok::<(), defprefs::Error>(())
    /// ```
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn get_entry(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and values, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrefValue)> {
        self.entries
            .iter()
            .map(|(key, entry)| (key.as_str(), &entry.value))
    }

    /// Keys and full entries, sorted by key
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Owned copy of every key and value
    pub fn snapshot(&self) -> BTreeMap<String, PrefValue> {
        self.iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.typed(key, "boolean", PrefValue::as_bool)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.typed(key, "integer", PrefValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&str>> {
        self.typed(key, "string", PrefValue::as_str)
    }

    fn typed<'a, T>(
        &'a self,
        key: &str,
        expected: &'static str,
        extract: impl Fn(&'a PrefValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => match extract(value) {
                Some(v) => Ok(Some(v)),
                None => Err(Error::TypeMismatch {
                    key: key.to_string(),
                    expected,
                    found: value.type_name(),
                }),
            },
        }
    }

    /// Ordered list stored under `prefix` with numbered keys
    ///
    /// Keys under the prefix whose next segment is not a number are ignored.
    ///
    /// ```rust
    /// use defprefs::{load_str, LoaderConfig, PrefValue};
    ///
    /// let loaded = load_str(r#"
    ///     pref("browser.contentHandlers.types.1.title", "Yahoo");
    ///     pref("browser.contentHandlers.types.0.title", "My Yahoo!");
    ///     pref("browser.contentHandlers.types.0.type", "application/vnd.mozilla.maybe.feed");
    /// "#, &LoaderConfig::default())?;
    ///
    /// let types = loaded.registry.list("browser.contentHandlers.types");
    /// assert_eq!(types.len(), 2);
    /// assert_eq!(types[0].fields["title"], PrefValue::from("My Yahoo!"));
    /// assert_eq!(types[1].fields["title"], PrefValue::from("Yahoo"));
    /// # Ok::<(), defprefs::Error>(())
    /// ```
    pub fn list(&self, prefix: &str) -> Vec<ListItem> {
        let prefix = format!("{}.", prefix.trim_end_matches('.'));
        let mut items: BTreeMap<u64, BTreeMap<String, PrefValue>> = BTreeMap::new();

        let from_prefix = (Bound::Included(prefix.as_str()), Bound::Unbounded);
        for (key, entry) in self.entries.range::<str, _>(from_prefix) {
            let rest = match key.strip_prefix(&prefix) {
                Some(rest) => rest,
                None => break,
            };
            let (index, field) = rest.split_once('.').unwrap_or((rest, ""));
            if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if let Ok(index) = index.parse::<u64>() {
                items
                    .entry(index)
                    .or_default()
                    .insert(field.to_string(), entry.value.clone());
            }
        }

        items
            .into_iter()
            .map(|(index, fields)| ListItem { index, fields })
            .collect()
    }

    /// Entries whose value points at a locale property bundle
    ///
    /// The registry does not resolve these; the consumer decides when to look
    /// up the localized value.
    pub fn localized_references(&self) -> Vec<(&str, &str)> {
        self.iter()
            .filter_map(|(key, value)| value.localized_bundle().map(|bundle| (key, bundle)))
            .collect()
    }

    /// Entries whose key matches any of the glob patterns
    pub fn query(&self, patterns: &[&str]) -> Result<BTreeMap<String, PrefValue>> {
        crate::query::query_preferences(self, patterns)
    }

    /// Flatten into plain, unconditional declarations
    ///
    /// Loading the result again yields an equal registry.
    pub fn to_manifest(&self) -> Manifest {
        Manifest::new(
            self.entries
                .iter()
                .map(|(key, entry)| {
                    Item::Pref(Declaration {
                        key: key.clone(),
                        value: DeclaredValue::from(entry.value.clone()),
                        kind: entry.kind,
                        line: 0,
                    })
                })
                .collect(),
        )
    }
}

impl PartialEq for PrefRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, a), (kb, b))| ka == kb && a.value == b.value && a.kind == b.kind)
    }
}

impl Eq for PrefRegistry {}

/// Serializes as a flat `{ key: value }` object
impl Serialize for PrefRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}
