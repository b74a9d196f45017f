//! Declaration tree of a preference manifest
//!
//! A [`Manifest`] is what the parser produces and what the resolver consumes.
//! It does not depend on build flags: conditional blocks keep every branch,
//! and the resolver picks one per block against a [`crate::BuildConfig`].
//! Manifests can also be built directly in code.
//!
//! ```rust
//! use defprefs::{load_manifest, Guard, Item, LoaderConfig, Manifest, PrefValue};
//!
//! let manifest = Manifest::new(vec![
//!     Item::pref("a.b", 1),
//!     Item::conditional(Guard::defined("X"), vec![Item::pref("a.b", 2)], vec![]),
//! ]);
//!
//! let loaded = load_manifest(&manifest, &LoaderConfig::default())?;
//! assert_eq!(loaded.registry.get("a.b"), Some(&PrefValue::Integer(1)));
//! # Ok::<(), defprefs::Error>(())
//! ```

use crate::guard::Guard;
use crate::types::{DeclaredValue, PrefKind, PrefValue};
use std::collections::BTreeSet;

/// One `pref("key", value);` statement
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub key: String,
    pub value: DeclaredValue,
    pub kind: PrefKind,
    /// Line of the statement in its source, 0 for declarations built in code
    pub line: usize,
}

/// Branch of a conditional block
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub guard: Guard,
    pub items: Vec<Item>,
    pub line: usize,
}

/// `#if` ... `#elif` ... `#else` ... `#endif`
///
/// The first branch whose guard holds is included; if none holds, the
/// `otherwise` items are.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub branches: Vec<Branch>,
    pub otherwise: Vec<Item>,
}

/// Output filters toggled by `#filter` / `#unfilter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// `@NAME@` is replaced by the value of NAME; undefined names are errors
    Substitution,
    /// Like `Substitution`, but undefined names become empty strings
    AttemptSubstitution,
    /// Line-formatting filters that do not change resolved values
    Cosmetic,
}

impl Filter {
    pub fn from_name(name: &str) -> Option<Filter> {
        match name {
            "substitution" => Some(Filter::Substitution),
            "attemptSubstitution" => Some(Filter::AttemptSubstitution),
            "emptyLines" | "slashslash" | "spaces" | "dumbComments" => Some(Filter::Cosmetic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Pref(Declaration),
    Conditional(Conditional),
    Define {
        name: String,
        value: String,
        line: usize,
    },
    Undef {
        name: String,
        line: usize,
    },
    Filter {
        filters: Vec<Filter>,
        enabled: bool,
        line: usize,
    },
    Error {
        message: String,
        line: usize,
    },
}

impl Item {
    /// Plain `pref()` declaration
    pub fn pref(key: impl Into<String>, value: impl Into<PrefValue>) -> Self {
        let value: PrefValue = value.into();
        Item::Pref(Declaration {
            key: key.into(),
            value: DeclaredValue::from(value),
            kind: PrefKind::Default,
            line: 0,
        })
    }

    /// Single-branch conditional block with an optional else branch
    pub fn conditional(guard: Guard, then: Vec<Item>, otherwise: Vec<Item>) -> Self {
        Item::Conditional(Conditional {
            branches: vec![Branch {
                guard,
                items: then,
                line: 0,
            }],
            otherwise,
        })
    }

    pub fn define(name: impl Into<String>, value: impl Into<String>) -> Self {
        Item::Define {
            name: name.into(),
            value: value.into(),
            line: 0,
        }
    }
}

/// Ordered declaration sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub items: Vec<Item>,
}

impl Manifest {
    pub fn new(items: Vec<Item>) -> Self {
        Manifest { items }
    }

    /// Number of `pref()` statements, counting every branch
    pub fn declaration_count(&self) -> usize {
        fn count(items: &[Item]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    Item::Pref(_) => 1,
                    Item::Conditional(block) => {
                        block
                            .branches
                            .iter()
                            .map(|b| count(&b.items))
                            .sum::<usize>()
                            + count(&block.otherwise)
                    }
                    _ => 0,
                })
                .sum()
        }
        count(&self.items)
    }

    /// Names touched by `#define` or `#undef` anywhere in the tree, including
    /// branches a given build excludes
    pub fn local_symbols(&self) -> BTreeSet<&str> {
        fn collect<'a>(items: &'a [Item], names: &mut BTreeSet<&'a str>) {
            for item in items {
                match item {
                    Item::Define { name, .. } | Item::Undef { name, .. } => {
                        names.insert(name.as_str());
                    }
                    Item::Conditional(block) => {
                        for branch in &block.branches {
                            collect(&branch.items, names);
                        }
                        collect(&block.otherwise, names);
                    }
                    _ => {}
                }
            }
        }
        let mut names = BTreeSet::new();
        collect(&self.items, &mut names);
        names
    }
}
