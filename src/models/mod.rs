//! Shared data models for records, filters, and store configuration.
//!
//! These types form the stable JSON API surface used by the CLI
//! and the daemon/server mode.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Schema version for `Record` JSON payloads.
///
/// This version follows semver semantics (MAJOR.MINOR.PATCH):
/// - MAJOR: Breaking changes to required fields or field semantics.
/// - MINOR: Backward-compatible additions (new optional fields).
/// - PATCH: Documentation or internal changes only.
///
/// Clients consuming `--format=json` output should check this version
/// to ensure compatibility and handle newer minor versions
/// conservatively.
pub const RECORD_SCHEMA_VERSION: &str = "1.0.0";

/// Immutable analysis output for a stored string value.
///
/// Properties are computed exactly once when a record is created and
/// are never recomputed or mutated afterwards. `hash` always equals
/// the owning record's `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
    /// Number of characters in the value.
    pub length: u64,
    /// Whether the value reads the same forwards and backwards,
    /// compared case-insensitively.
    pub is_palindrome: bool,
    /// Number of distinct characters in the value.
    pub unique_characters: u64,
    /// Number of whitespace-delimited words in the value.
    pub word_count: u64,
    /// SHA3-256 digest of the value, rendered as lowercase hex.
    pub hash: String,
    /// Occurrence count for every character in the value.
    pub character_frequency: BTreeMap<char, u64>,
}

/// One stored analyzed string plus its derived properties and metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Content hash of the value; doubles as the stable external
    /// identifier. Always equal to `properties.hash`.
    pub id: String,
    /// The trimmed, non-empty original string. Unique across the store.
    pub value: String,
    /// Analysis output, fixed at creation.
    pub properties: StringProperties,
    /// ISO-8601 UTC creation timestamp, second precision, `Z` suffix.
    pub created_at: String,
}

/// Backend-agnostic filter predicate over records.
///
/// Constraints are independent and logically ANDed. Each field holds
/// the raw constraint value as supplied by the caller; coercion to a
/// boolean or number happens through the accessor methods, and a value
/// that fails to coerce is treated as absent rather than as an error.
/// Both storage backends evaluate filters through these accessors so
/// the lenient semantics cannot diverge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filter {
    /// Boolean equality on `properties.is_palindrome`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<String>,
    /// Inclusive lower bound on `properties.length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    /// Inclusive upper bound on `properties.length`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    /// Exact equality on `properties.word_count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<String>,
    /// Literal substring test against `value`. Documented as a single
    /// character, but multi-character substrings are accepted and kept
    /// working for compatibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<String>,
}

impl Filter {
    /// Whether no constraint was supplied at all.
    ///
    /// The natural-language extractor returns an empty filter to
    /// signal that no rule fired; callers surface that as an
    /// extraction failure.
    pub fn is_empty(&self) -> bool {
        self.is_palindrome.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.word_count.is_none()
            && self.contains_character.is_none()
    }

    /// Effective palindrome constraint after lenient boolean coercion.
    ///
    /// Accepts `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`
    /// (ASCII case-insensitive); anything else is treated as absent.
    pub fn palindrome(&self) -> Option<bool> {
        let raw = self.is_palindrome.as_deref()?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    /// Effective minimum length, or `None` when absent or non-numeric.
    pub fn min_length(&self) -> Option<u64> {
        parse_lenient_number(self.min_length.as_deref())
    }

    /// Effective maximum length, or `None` when absent or non-numeric.
    pub fn max_length(&self) -> Option<u64> {
        parse_lenient_number(self.max_length.as_deref())
    }

    /// Effective word-count constraint, or `None` when absent or
    /// non-numeric.
    pub fn word_count(&self) -> Option<u64> {
        parse_lenient_number(self.word_count.as_deref())
    }

    /// Effective substring constraint; empty strings are treated as
    /// absent.
    pub fn contains(&self) -> Option<&str> {
        self.contains_character.as_deref().filter(|s| !s.is_empty())
    }
}

fn parse_lenient_number(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok()
}

/// Concrete storage backend implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    Sqlite,
    Flat,
}

/// Configured backend choice, resolved once at startup.
///
/// `Auto` probes the SQLite engine at the configured path and falls
/// back to the flat store when it cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    Sqlite,
    Flat,
    Auto,
}

/// Storage configuration injected into the backend layer.
///
/// Initialized once at process startup from CLI flags and the config
/// file; no per-request backend selection happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Configured backend choice.
    pub backend: BackendSelection,
    /// Location of the on-disk store.
    ///
    /// For the SQLite backend this is a database file path such as
    /// ".stringstore/strings.sqlite". For the flat backend it is a
    /// JSON file path such as ".stringstore/strings.json".
    pub path: PathBuf,
}

/// Request body for creating (or analyzing) a string value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    pub value: String,
}

/// Response payload for list and search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub count: usize,
    pub records: Vec<Record>,
}

/// Response payload for natural-language search, echoing the filter
/// that was derived from the query text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub filter: Filter,
    pub count: usize,
    pub records: Vec<Record>,
}

/// Response payload for the analyze-only endpoint; nothing is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub value: String,
    pub properties: StringProperties,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_with_serde() {
        let properties = StringProperties {
            length: 5,
            is_palindrome: true,
            unique_characters: 3,
            word_count: 1,
            hash: "ab12".to_string(),
            character_frequency: BTreeMap::from([('a', 2), ('b', 2), ('c', 1)]),
        };

        let record = Record {
            id: "ab12".to_string(),
            value: "abcba".to_string(),
            properties: properties.clone(),
            created_at: "2024-05-01T12:00:00Z".to_string(),
        };

        let json = serde_json::to_string(&record).expect("serialize");
        let decoded: Record = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(decoded.id, record.id);
        assert_eq!(decoded.value, record.value);
        assert_eq!(decoded.properties, properties);
        assert_eq!(decoded.created_at, record.created_at);
    }

    #[test]
    fn filter_coerces_booleans_leniently() {
        let mut filter = Filter {
            is_palindrome: Some("TRUE".to_string()),
            ..Filter::default()
        };
        assert_eq!(filter.palindrome(), Some(true));

        filter.is_palindrome = Some("0".to_string());
        assert_eq!(filter.palindrome(), Some(false));

        // Unparseable values are treated as absent, not as errors.
        filter.is_palindrome = Some("maybe".to_string());
        assert_eq!(filter.palindrome(), None);
    }

    #[test]
    fn filter_drops_non_numeric_bounds() {
        let filter = Filter {
            min_length: Some("abc".to_string()),
            max_length: Some("12".to_string()),
            word_count: Some("-3".to_string()),
            ..Filter::default()
        };

        assert_eq!(filter.min_length(), None);
        assert_eq!(filter.max_length(), Some(12));
        assert_eq!(filter.word_count(), None);
    }

    #[test]
    fn empty_contains_constraint_is_absent() {
        let filter = Filter {
            contains_character: Some(String::new()),
            ..Filter::default()
        };

        assert!(filter.contains().is_none());
        assert!(!filter.is_empty());
    }

    #[test]
    fn default_filter_is_empty() {
        assert!(Filter::default().is_empty());
    }

    #[test]
    fn filter_omits_absent_constraints_in_json() {
        let filter = Filter {
            word_count: Some("1".to_string()),
            ..Filter::default()
        };

        let json = serde_json::to_string(&filter).expect("serialize");
        assert_eq!(json, r#"{"word_count":"1"}"#);
    }
}
