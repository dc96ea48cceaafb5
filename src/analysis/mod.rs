//! Pure string analysis.
//!
//! `analyze` derives the full property set for a value: length,
//! case-insensitive palindrome check, unique-character count, word
//! count, content hash, and a per-character frequency map. The
//! function is deterministic; recomputing it for the same value always
//! yields the same properties, which is what makes the content hash
//! usable as a stable record identifier.

use std::collections::BTreeMap;

use sha3::{Digest, Sha3_256};

use crate::models::StringProperties;

/// Trim a raw input value, rejecting values that are empty after
/// trimming.
///
/// Both the CLI and the HTTP layer normalize input through this helper
/// so that uniqueness and hashing always operate on the same form.
pub fn normalize_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Compute SHA3-256 of a value and return it as lowercase hex.
pub fn content_hash(value: &str) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Analyze a (already normalized) string value.
pub fn analyze(value: &str) -> StringProperties {
    let chars: Vec<char> = value.chars().collect();

    let mut character_frequency: BTreeMap<char, u64> = BTreeMap::new();
    for ch in &chars {
        *character_frequency.entry(*ch).or_insert(0) += 1;
    }

    let lowered: Vec<char> = value.to_lowercase().chars().collect();
    let is_palindrome = lowered.iter().eq(lowered.iter().rev());

    StringProperties {
        length: chars.len() as u64,
        is_palindrome,
        unique_characters: character_frequency.len() as u64,
        word_count: value.split_whitespace().count() as u64,
        hash: content_hash(value),
        character_frequency,
    }
}
