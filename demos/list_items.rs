//! Numbered-key list example
//!
//! Defaults such as `browser.contentHandlers.types.0.title` encode lists as
//! flat keys. This example shows them as ordered items, and also prints the
//! entries whose values point at locale bundles.

use defprefs::{load_str, BuildConfig, LoaderConfig, Platform};

const MANIFEST: &str = r#"
#filter substitution
pref("general.useragent.locale", "@AB_CD@");
pref("browser.contentHandlers.types.1.title", "chrome://browser-region/locale/region.properties");
pref("browser.contentHandlers.types.1.uri", "https://add.my.yahoo.com/rss?url=%s");
pref("browser.contentHandlers.types.0.title", "chrome://browser-region/locale/region.properties");
pref("browser.contentHandlers.types.0.uri", "https://www.bloglines.com/login?r=/sub/%s");
#ifdef XP_MACOSX
pref("browser.contentHandlers.types.2.title", "Mac only");
#endif
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildConfig::new()
        .with_platform(Platform::Macos)
        .with_define("AB_CD", "en-US");
    let registry = load_str(MANIFEST, &LoaderConfig::new(build))?.registry;

    println!("browser.contentHandlers.types:");
    for item in registry.list("browser.contentHandlers.types") {
        println!("  [{}]", item.index);
        for (field, value) in &item.fields {
            println!("    {:<8} {}", field, value);
        }
    }

    println!("\nLocalized values:");
    for (key, bundle) in registry.localized_references() {
        println!("  {} -> {}", key, bundle);
    }

    Ok(())
}
