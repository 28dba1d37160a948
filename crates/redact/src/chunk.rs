//! Bounded chunk splitting
//!
//! Splits text into sequential chunks of at most `limit` bytes. A split
//! never lands inside a UTF-8 scalar; when the tail of a window contains
//! whitespace, the split moves back to the last whitespace so words stay
//! whole. Concatenating the chunks reproduces the input byte-for-byte.

/// Split `text` into chunks of at most `limit` bytes
///
/// Boundary preference, in order:
/// 1. never inside a multi-byte character;
/// 2. after the last whitespace in the window, provided that keeps the
///    chunk at least half full (degenerate splits on long unbroken runs
///    are worse than splitting mid-word).
///
/// A `limit` of zero is treated as one: progress must always be possible.
#[must_use]
pub fn split_chunks(text: &str, limit: usize) -> Vec<&str> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.len() > limit {
        let mut end = limit;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        // A multi-byte scalar wider than the limit itself: take it whole
        // rather than loop forever.
        if end == 0 {
            end = rest
                .char_indices()
                .nth(1)
                .map_or(rest.len(), |(idx, _)| idx);
        }

        let window = &rest[..end];
        if let Some(pos) = window.rfind(char::is_whitespace) {
            let candidate = pos + window[pos..].chars().next().map_or(1, char::len_utf8);
            if candidate >= end / 2 {
                end = candidate;
            }
        }

        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }

    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest);
    }
    chunks
}
