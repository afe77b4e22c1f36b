//! Text normalization, fingerprinting, and word-overlap similarity.
//!
//! Both the exact-match fingerprint and the Jaccard comparison operate on the
//! same normalized form, so "Привет!" and "  привет " are the same message.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use xxhash_rust::xxh3::xxh3_128;

use chatgate_core::types::ContentHash;

/// Anything that is neither a Unicode word character nor whitespace.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("Invalid punctuation regex"));

/// Lowercase, drop punctuation, collapse whitespace runs, trim.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION_RE.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 128-bit xxh3 digest of already-normalized text.
pub fn fingerprint(normalized: &str) -> ContentHash {
    ContentHash(xxh3_128(normalized.as_bytes()))
}

/// Jaccard similarity of the distinct words of two raw texts, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_normalized(&normalize(a), &normalize(b))
}

/// Same as [`similarity`] for inputs that went through [`normalize`].
pub(crate) fn similarity_normalized(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}
