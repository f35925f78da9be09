//! Text annotation: tag and mention extraction.
//!
//! Post text carries two kinds of inline references:
//! - **Tags**: `#word` tokens used for topical filtering. Folded to
//!   lowercase so `#Rust` and `#rust` name the same topic.
//! - **Mentions**: `@username` tokens. Usernames are case-sensitive, so
//!   mentions are kept exactly as written.
//!
//! Both extractors are pure and total: they split on whitespace, keep
//! tokens whose prefix is followed by a word character, strip the prefix,
//! and deduplicate preserving first-occurrence order.

use std::collections::HashSet;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn extract_prefixed(text: &str, prefix: char, lowercase: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in text.split_whitespace() {
        let Some(rest) = token.strip_prefix(prefix) else {
            continue;
        };
        if !rest.chars().next().is_some_and(is_word_char) {
            continue;
        }
        let value = if lowercase {
            rest.to_lowercase()
        } else {
            rest.to_string()
        };
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

/// Extracts `#tag` tokens from post text.
///
/// Tags are lowercased and deduplicated preserving first-occurrence order.
pub fn extract_tags(text: &str) -> Vec<String> {
    extract_prefixed(text, '#', true)
}

/// Extracts `@username` tokens from post text.
///
/// Mentions keep their original casing (usernames are case-sensitive) and
/// are deduplicated preserving first-occurrence order.
pub fn extract_mentions(text: &str) -> Vec<String> {
    extract_prefixed(text, '@', false)
}
