//! Structural token restoration
//!
//! The detector masks anything it classifies as PII, including structural
//! tokens a chat payload needs intact: `"role": "user"` comes back as
//! `"role": "****"`. Masked runs whose length matches exactly one
//! whitelisted token are restored; a length shared by two whitelist entries
//! is ambiguous and left masked.

use regex::Regex;

/// Restore whitelisted tokens the detector masked
///
/// A run of `mask` characters is replaced by the whitelist token of the
/// same length, provided exactly one token has that length. Runs are only
/// considered when delimited by non-word characters (quotes, whitespace,
/// punctuation), so a mask embedded in a longer redaction is untouched.
#[must_use]
pub fn restore_structural_tokens(text: &str, whitelist: &[String], mask: char) -> String {
    if whitelist.is_empty() {
        return text.to_string();
    }

    let mask_pattern = format!("{}+", regex::escape(&mask.to_string()));
    // Unwrap is safe: the pattern is a single escaped character class.
    let runs = Regex::new(&mask_pattern).expect("mask pattern is always valid");

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for found in runs.find_iter(text) {
        result.push_str(&text[last..found.start()]);

        let delimited = boundary_before(text, found.start()) && boundary_after(text, found.end());
        let run_chars = found.as_str().chars().count();
        let replacement = if delimited {
            unique_match(whitelist, run_chars)
        } else {
            None
        };

        match replacement {
            Some(token) => result.push_str(token),
            None => result.push_str(found.as_str()),
        }
        last = found.end();
    }
    result.push_str(&text[last..]);
    result
}

fn unique_match(whitelist: &[String], length: usize) -> Option<&str> {
    let mut matched = None;
    for token in whitelist {
        if token.chars().count() == length {
            if matched.is_some() {
                return None; // ambiguous length
            }
            matched = Some(token.as_str());
        }
    }
    matched
}

fn boundary_before(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric())
}

fn boundary_after(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric())
}
