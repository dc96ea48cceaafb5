//! Filter evaluation shared by the storage backends.
//!
//! `matches_record` is the single definition of what a filter means.
//! The flat backend applies it directly to its in-memory scan; the
//! SQLite backend mirrors it as pushdown conditions built from the
//! same lenient accessors, so both backends produce identical result
//! sets for any filter and collection state.

pub mod natural;

use crate::models::{Filter, Record};

/// Decide whether a record satisfies every present constraint.
///
/// Constraints are evaluated independently and ANDed. A constraint
/// whose raw value fails lenient coercion resolves to `None` through
/// the `Filter` accessors and therefore has no filtering effect.
pub fn matches_record(filter: &Filter, record: &Record) -> bool {
    if let Some(want) = filter.palindrome() {
        if record.properties.is_palindrome != want {
            return false;
        }
    }

    if let Some(min) = filter.min_length() {
        if record.properties.length < min {
            return false;
        }
    }

    if let Some(max) = filter.max_length() {
        if record.properties.length > max {
            return false;
        }
    }

    if let Some(count) = filter.word_count() {
        if record.properties.word_count != count {
            return false;
        }
    }

    if let Some(needle) = filter.contains() {
        if !record.value.contains(needle) {
            return false;
        }
    }

    true
}

/// Apply a filter to a collection, preserving iteration order.
pub fn filter_records(filter: &Filter, records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| matches_record(filter, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis;
    use crate::models::Filter;

    fn record_for(value: &str) -> Record {
        let properties = analysis::analyze(value);
        Record {
            id: properties.hash.clone(),
            value: value.to_string(),
            properties,
            created_at: "2024-05-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(matches_record(&filter, &record_for("racecar")));
        assert!(matches_record(&filter, &record_for("hello world")));
    }

    #[test]
    fn palindrome_constraint_is_boolean_equality() {
        let filter = Filter {
            is_palindrome: Some("true".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("racecar")));
        assert!(!matches_record(&filter, &record_for("banana")));

        let filter = Filter {
            is_palindrome: Some("false".to_string()),
            ..Filter::default()
        };

        assert!(!matches_record(&filter, &record_for("racecar")));
        assert!(matches_record(&filter, &record_for("banana")));
    }

    #[test]
    fn length_bounds_are_inclusive() {
        // "hello" has length 5; min=max=5 must include it and exclude
        // lengths 4 and 6 on either side.
        let filter = Filter {
            min_length: Some("5".to_string()),
            max_length: Some("5".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("hello")));
        assert!(!matches_record(&filter, &record_for("hell")));
        assert!(!matches_record(&filter, &record_for("hellos")));
    }

    #[test]
    fn word_count_is_exact_equality() {
        let filter = Filter {
            word_count: Some("2".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("hello world")));
        assert!(!matches_record(&filter, &record_for("hello")));
        assert!(!matches_record(&filter, &record_for("one two three")));
    }

    #[test]
    fn contains_uses_substring_semantics() {
        let filter = Filter {
            contains_character: Some("z".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("puzzle")));
        assert!(!matches_record(&filter, &record_for("hello")));

        // Multi-character needles are accepted by the mechanism even
        // though the documented contract describes a single character.
        let filter = Filter {
            contains_character: Some("zzl".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("puzzle")));
        assert!(!matches_record(&filter, &record_for("zebra")));
    }

    #[test]
    fn non_numeric_constraint_does_not_exclude() {
        let filter = Filter {
            word_count: Some("abc".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("hello world")));
        assert!(matches_record(&filter, &record_for("hello")));
    }

    #[test]
    fn unparseable_boolean_constraint_does_not_exclude() {
        let filter = Filter {
            is_palindrome: Some("maybe".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("racecar")));
        assert!(matches_record(&filter, &record_for("banana")));
    }

    #[test]
    fn constraints_are_anded() {
        let filter = Filter {
            is_palindrome: Some("true".to_string()),
            word_count: Some("1".to_string()),
            ..Filter::default()
        };

        assert!(matches_record(&filter, &record_for("racecar")));
        // Palindrome but two words.
        assert!(!matches_record(&filter, &record_for("aba aba")));
        // One word but not a palindrome.
        assert!(!matches_record(&filter, &record_for("banana")));
    }

    #[test]
    fn filter_records_preserves_order() {
        let records = vec![
            record_for("racecar"),
            record_for("banana"),
            record_for("level"),
        ];

        let filter = Filter {
            is_palindrome: Some("true".to_string()),
            ..Filter::default()
        };

        let kept = filter_records(&filter, records);
        let values: Vec<&str> = kept.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["racecar", "level"]);
    }
}
