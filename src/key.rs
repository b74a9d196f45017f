//! Preference key syntax
//!
//! Keys are delimited by `.` and `-`. The first character of the key and the
//! first character after every delimiter must be alphabetic, with two
//! exceptions the default manifests rely on:
//!
//! - a segment made only of ASCII digits after a `.` (numbered list entries,
//!   e.g. `browser.contentHandlers.types.0.title`)
//! - a brace-wrapped identifier (add-on ids, e.g.
//!   `extensions.{972ce4c6-7e08-4474-a285-3208198ce6fd}.name`); dashes inside
//!   the braces are not delimiters

use std::iter::Peekable;
use std::str::Chars;

/// Check a key against the preference key syntax
///
/// Returns a human-readable reason when the key is malformed.
///
/// ```rust
/// use defprefs::validate_key;
///
/// assert!(validate_key("browser.tabs.animate").is_ok());
/// assert!(validate_key("browser.contentHandlers.types.0.title").is_ok());
/// assert!(validate_key("browser.3d.enabled").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key is empty".to_string());
    }

    let mut chars = key.chars().peekable();
    // Delimiter preceding the segment being started, None for the first segment
    let mut delimiter: Option<char> = None;

    loop {
        check_segment_start(&mut chars, delimiter)?;

        // Consume the rest of the segment up to the next delimiter
        delimiter = None;
        for c in chars.by_ref() {
            if c == '.' || c == '-' {
                delimiter = Some(c);
                break;
            }
        }

        match delimiter {
            Some(_) => continue,
            None => return Ok(()),
        }
    }
}

/// Returns true if the key follows the preference key syntax
pub fn is_valid_key(key: &str) -> bool {
    validate_key(key).is_ok()
}

fn check_segment_start(chars: &mut Peekable<Chars<'_>>, delimiter: Option<char>) -> Result<(), String> {
    let c = match chars.peek() {
        Some(&c) => c,
        None => return Err(format!("key ends with delimiter '{}'", delimiter.unwrap_or('.'))),
    };

    match c {
        '.' | '-' => Err(format!("empty segment before delimiter '{}'", c)),
        '{' => {
            chars.next();
            let mut inner = 0usize;
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(_) => inner += 1,
                    None => return Err("unclosed '{' in key".to_string()),
                }
            }
            if inner == 0 {
                return Err("empty '{}' segment".to_string());
            }
            match chars.peek() {
                None | Some('.') | Some('-') => Ok(()),
                Some(&other) => Err(format!("unexpected character '{}' after '}}'", other)),
            }
        }
        '0'..='9' if delimiter == Some('.') => {
            let mut segment = String::new();
            while let Some(&d) = chars.peek() {
                if d == '.' || d == '-' {
                    break;
                }
                segment.push(d);
                chars.next();
            }
            if segment.chars().all(|d| d.is_ascii_digit()) {
                Ok(())
            } else {
                Err(format!(
                    "segment '{}' starts with a digit but is not a list index",
                    segment
                ))
            }
        }
        c if c.is_alphabetic() => Ok(()),
        c => match delimiter {
            None => Err(format!(
                "key must start with an alphabetic character, found '{}'",
                c
            )),
            Some(d) => Err(format!(
                "first character after '{}' must be alphabetic, found '{}'",
                d, c
            )),
        },
    }
}
