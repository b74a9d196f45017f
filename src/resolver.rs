//! Conditional resolution
//!
//! Walks a [`Manifest`] top-down against the symbol table built from the
//! active [`crate::BuildConfig`] and collects the included declarations into
//! registry entries. Later declarations of a key replace earlier ones,
//! whether or not either sits inside a conditional block. The first error
//! aborts resolution.

use crate::error::{Error, Result};
use crate::guard::Guard;
use crate::key::validate_key;
use crate::loader::LoaderConfig;
use crate::manifest::{Conditional, Declaration, Filter, Item, Manifest};
use crate::registry::{PrefRegistry, RegistryEntry};
use crate::types::PrefValue;
use std::collections::{BTreeMap, BTreeSet};

pub(crate) struct Resolver<'c> {
    config: &'c LoaderConfig,
    entries: BTreeMap<String, RegistryEntry>,
    warnings: Vec<String>,
    warned_symbols: BTreeSet<String>,
    // Per-manifest state, reset by `resolve`
    symbols: BTreeMap<String, String>,
    manifest_symbols: BTreeSet<String>,
    substitution: Option<Filter>,
    source: Option<String>,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(config: &'c LoaderConfig) -> Self {
        Resolver {
            config,
            entries: BTreeMap::new(),
            warnings: Vec::new(),
            warned_symbols: BTreeSet::new(),
            symbols: BTreeMap::new(),
            manifest_symbols: BTreeSet::new(),
            substitution: None,
            source: None,
        }
    }

    /// Resolve one manifest on top of everything resolved so far
    ///
    /// Symbols defined and filters enabled by a manifest do not carry over
    /// to the next one.
    pub(crate) fn resolve(&mut self, manifest: &Manifest, source: Option<String>) -> Result<()> {
        self.symbols = self.config.build.symbols();
        self.manifest_symbols = manifest
            .local_symbols()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.substitution = None;
        self.source = source;
        self.walk(&manifest.items)
    }

    pub(crate) fn finish(self) -> (PrefRegistry, Vec<String>) {
        (PrefRegistry::from_entries(self.entries), self.warnings)
    }

    fn walk(&mut self, items: &[Item]) -> Result<()> {
        for item in items {
            match item {
                Item::Pref(declaration) => self.declare(declaration)?,
                Item::Conditional(block) => self.select(block)?,
                Item::Define { name, value, .. } => {
                    self.symbols.insert(name.clone(), value.clone());
                }
                Item::Undef { name, .. } => {
                    self.symbols.remove(name);
                }
                Item::Filter {
                    filters, enabled, ..
                } => {
                    for filter in filters {
                        self.set_filter(*filter, *enabled);
                    }
                }
                Item::Error { message, line } => {
                    return Err(Error::ExplicitError {
                        line: *line,
                        message: message.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    fn set_filter(&mut self, filter: Filter, enabled: bool) {
        match filter {
            Filter::Substitution | Filter::AttemptSubstitution => {
                if enabled {
                    self.substitution = Some(filter);
                } else if self.substitution == Some(filter) {
                    self.substitution = None;
                }
            }
            Filter::Cosmetic => {}
        }
    }

    /// Include the first branch whose guard holds, else the `#else` items
    fn select(&mut self, block: &Conditional) -> Result<()> {
        for branch in &block.branches {
            self.check_symbols(&branch.guard, branch.line)?;
            if branch.guard.evaluate(&self.symbols) {
                return self.walk(&branch.items);
            }
        }
        self.walk(&block.otherwise)
    }

    /// Report guard symbols that neither the build configuration nor the
    /// manifest knows about
    fn check_symbols(&mut self, guard: &Guard, line: usize) -> Result<()> {
        for name in guard.referenced_symbols() {
            if self.symbols.contains_key(name)
                || self.manifest_symbols.contains(name)
                || self.config.build.is_known_symbol(name)
            {
                continue;
            }
            if self.config.strict_guards {
                return Err(Error::UnknownBuildFlag {
                    name: name.to_string(),
                    line,
                });
            }
            if self.warned_symbols.insert(name.to_string()) {
                self.warnings.push(format!(
                    "line {}: unknown build flag '{}' treated as undefined",
                    line, name
                ));
            }
        }
        Ok(())
    }

    fn declare(&mut self, declaration: &Declaration) -> Result<()> {
        let line = declaration.line;
        let key = self.substitute(&declaration.key, line)?;

        validate_key(&key).map_err(|reason| Error::MalformedKey {
            key: key.clone(),
            line,
            reason,
        })?;

        let value = match declaration.value.to_pref_value() {
            Some(PrefValue::String(s)) => PrefValue::String(self.substitute(&s, line)?),
            Some(value) => value,
            None => {
                return Err(Error::UnsupportedValueType {
                    key,
                    line,
                    found: declaration.value.type_name(),
                })
            }
        };

        self.entries.insert(
            key,
            RegistryEntry {
                value,
                kind: declaration.kind,
                line,
                source: self.source.clone(),
            },
        );
        Ok(())
    }

    /// Replace `@NAME@` references while a substitution filter is on
    fn substitute(&mut self, text: &str, line: usize) -> Result<String> {
        let mode = match self.substitution {
            Some(mode) => mode,
            None => return Ok(text.to_string()),
        };

        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find('@') {
            let after = &rest[start + 1..];
            let name = match after.find('@') {
                Some(end)
                    if end > 0
                        && after[..end]
                            .chars()
                            .all(|c| c.is_ascii_alphanumeric() || c == '_') =>
                {
                    &after[..end]
                }
                _ => {
                    out.push_str(&rest[..=start]);
                    rest = after;
                    continue;
                }
            };

            out.push_str(&rest[..start]);
            match self.symbols.get(name) {
                Some(value) => out.push_str(value),
                None if mode == Filter::AttemptSubstitution => {
                    self.warnings.push(format!(
                        "line {}: substitution variable '{}' is undefined, replaced with empty string",
                        line, name
                    ));
                }
                None => {
                    return Err(Error::UndefinedSubstitution {
                        name: name.to_string(),
                        line,
                    })
                }
            }
            rest = &after[name.len() + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
