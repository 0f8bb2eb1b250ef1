//! Token scanning and substitution.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Matches `{{...}}` where the inner text holds no braces. Single braces and
/// unclosed openers never match.
fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("Invalid placeholder regex"))
}

/// Result of scanning content for placeholder tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    /// Unique non-empty tokens, in order of first appearance
    tokens: Vec<String>,
    /// Total number of `{{...}}` spans, including duplicates and empty ones
    occurrences: usize,
    /// Number of spans whose inner text is empty or whitespace
    empty_occurrences: usize,
}

impl Placeholders {
    /// Unique non-empty tokens in order of first appearance.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether no non-empty token was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Total number of delimiter pairs found, duplicates and empty ones included.
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Number of empty tokens (`{{}}` or whitespace only).
    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.empty_occurrences
    }

    #[must_use]
    pub fn has_empty(&self) -> bool {
        self.empty_occurrences > 0
    }

    /// Tokens wrapped back in their delimiters, for display.
    pub fn display_tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.tokens.iter().map(|t| format!("{{{{{t}}}}}"))
    }
}

/// Scan `content` for `{{...}}` tokens.
///
/// The token is the text strictly between the delimiters, kept as written.
/// Duplicates appear once in [`Placeholders::tokens`]. Empty and
/// whitespace-only tokens are not listed but are counted in
/// [`Placeholders::empty_count`].
#[must_use]
pub fn extract_placeholders(content: &str) -> Placeholders {
    let mut found = Placeholders::default();

    for caps in placeholder_regex().captures_iter(content) {
        found.occurrences += 1;
        let inner = caps.get(1).map_or("", |m| m.as_str());

        if inner.trim().is_empty() {
            found.empty_occurrences += 1;
        } else if !found.tokens.iter().any(|t| t == inner) {
            found.tokens.push(inner.to_string());
        }
    }

    found
}

/// Replace every token that has a value in `values`; unknown and empty
/// tokens are left as written.
///
/// Lookups try the token as written first, then its trimmed form, so
/// `{{ topic }}` is filled by a `topic` entry.
#[must_use]
pub fn fill_placeholders(content: &str, values: &HashMap<String, String>) -> String {
    if values.is_empty() {
        return content.to_string();
    }

    placeholder_regex()
        .replace_all(content, |caps: &Captures<'_>| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            values
                .get(inner)
                .or_else(|| values.get(inner.trim()))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
