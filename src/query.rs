use crate::error::{Error, Result};
use crate::registry::PrefRegistry;
use crate::types::PrefValue;
use glob::Pattern;
use std::collections::BTreeMap;

/// Query registry entries by glob patterns (OR logic)
/// Returns entries matching any of the provided patterns
pub fn query_preferences(
    registry: &PrefRegistry,
    patterns: &[&str],
) -> Result<BTreeMap<String, PrefValue>> {
    // Compile all patterns first to fail fast on invalid patterns
    let compiled_patterns: Vec<Pattern> = patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| Error::InvalidGlobPattern(format!("'{}': {}", p, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(registry
        .iter()
        .filter(|(key, _)| compiled_patterns.iter().any(|pattern| pattern.matches(key)))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{load_str, LoaderConfig};

    fn create_test_registry() -> PrefRegistry {
        let content = r#"
            pref("network.protocol-handler.expose-all", true);
            pref("network.cookie.cookieBehavior", 0);
            pref("browser.startup.homepage", "https://example.com");
            pref("browser.search.region", "US");
            pref("javascript.enabled", true);
        "#;
        load_str(content, &LoaderConfig::default()).unwrap().registry
    }

    #[test]
    fn test_query_single_pattern() {
        let registry = create_test_registry();
        let queried = query_preferences(&registry, &["network.*"]).unwrap();
        assert_eq!(queried.len(), 2);
        assert!(queried.contains_key("network.protocol-handler.expose-all"));
        assert!(queried.contains_key("network.cookie.cookieBehavior"));
    }

    #[test]
    fn test_query_multiple_patterns_or_logic() {
        let registry = create_test_registry();
        let queried =
            query_preferences(&registry, &["network.*", "javascript.enabled"]).unwrap();
        assert_eq!(queried.len(), 3);
        assert!(queried.contains_key("javascript.enabled"));
    }

    #[test]
    fn test_query_no_matches() {
        let registry = create_test_registry();
        let queried = query_preferences(&registry, &["nonexistent.*"]).unwrap();
        assert!(queried.is_empty());
    }

    #[test]
    fn test_query_invalid_pattern() {
        let registry = create_test_registry();
        let result = query_preferences(&registry, &["[invalid"]);
        assert!(matches!(result, Err(Error::InvalidGlobPattern(_))));
    }

    #[test]
    fn test_query_via_registry() {
        let registry = create_test_registry();
        let queried = registry.query(&["browser.*.homepage"]).unwrap();
        assert_eq!(
            queried.get("browser.startup.homepage"),
            Some(&PrefValue::from("https://example.com"))
        );
    }
}
