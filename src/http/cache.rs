//! Conditional request handling
//!
//! `ETag` generation and `If-None-Match` evaluation for static responses.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Generate a strong `ETag` for a body, quoted per RFC 9110.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Evaluate a client `If-None-Match` header against the computed `ETag`.
///
/// Accepts a single tag, a comma-separated list, or the `*` wildcard.
/// Returns true when the client copy is current (respond 304).
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|candidates| {
        candidates
            .split(',')
            .any(|c| c.trim() == etag || c.trim() == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_is_quoted() {
        let etag = generate_etag(b"<html></html>");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert!(etag.len() > 2);
    }

    #[test]
    fn etag_stable_for_same_content() {
        assert_eq!(generate_etag(b"page"), generate_etag(b"page"));
    }

    #[test]
    fn etag_differs_for_different_content() {
        assert_ne!(generate_etag(b"page a"), generate_etag(b"page b"));
    }

    #[test]
    fn if_none_match_evaluation() {
        let etag = "\"f00d\"";
        assert!(etag_matches(Some("\"f00d\""), etag));
        assert!(etag_matches(Some("\"aaaa\", \"f00d\""), etag));
        assert!(etag_matches(Some("*"), etag));
        assert!(!etag_matches(Some("\"aaaa\""), etag));
        assert!(!etag_matches(None, etag));
    }
}
