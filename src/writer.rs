//! Render a registry back into manifest text
//!
//! The output holds one unconditional statement per entry, in key order,
//! using the escapes the lexer understands. Loading it again yields an equal
//! registry.

use crate::registry::{PrefRegistry, RegistryEntry};
use crate::types::PrefValue;
use std::fmt::Write;

/// Render every entry as a `pref()` / `sticky_pref()` / `lock_pref()` statement
///
/// ```rust
/// use defprefs::{load_str, write_manifest, LoaderConfig};
///
/// let loaded = load_str(r#"
///     #ifdef DEBUG
///     pref("a.b", 2);
///     #else
///     pref("a.b", 1);
///     #endif
/// "#, &LoaderConfig::default())?;
///
/// assert_eq!(write_manifest(&loaded.registry), "pref(\"a.b\", 1);\n");
/// # Ok::<(), defprefs::Error>(())
/// ```
pub fn write_manifest(registry: &PrefRegistry) -> String {
    registry
        .entries()
        .map(|(key, entry)| write_statement(key, entry) + "\n")
        .collect()
}

/// One entry as a statement, without the trailing newline
pub fn write_statement(key: &str, entry: &RegistryEntry) -> String {
    format!(
        "{}(\"{}\", {});",
        entry.kind.function_name(),
        escape(key),
        literal(&entry.value)
    )
}

/// Value as a manifest literal
pub fn literal(value: &PrefValue) -> String {
    match value {
        PrefValue::Bool(b) => b.to_string(),
        PrefValue::Integer(n) => n.to_string(),
        PrefValue::String(s) => format!("\"{}\"", escape(s)),
    }
}

/// Escape a string for use inside double quotes
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            // \x00 rather than \0, which would read as an octal escape before a '0'
            c if (c as u32) < 0x20 || c == '\x7f' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
