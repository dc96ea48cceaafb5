//! Natural-language filter extraction.
//!
//! This module implements a bounded heuristic extractor, not a
//! language model: a fixed, ordered list of independent rules, each
//! inspecting the lower-cased query text and adding one constraint to
//! the result filter when its trigger pattern matches. Rules do not
//! interact; a query may fire several of them and all constraints are
//! merged into one filter.
//!
//! When no rule fires the extractor returns an empty filter, which
//! callers surface as an extraction failure. A partially understood
//! query (some rules fired, others found nothing) is a success by
//! design.

use crate::models::Filter;

/// Pre-processed query text shared by all rules.
struct QueryText {
    lowered: String,
    tokens: Vec<String>,
}

impl QueryText {
    fn new(input: &str) -> Self {
        let lowered = input.to_lowercase();
        let tokens = lowered
            .split_whitespace()
            .map(|tok| tok.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|tok| !tok.is_empty())
            .collect();
        Self { lowered, tokens }
    }
}

/// Ordered rule set. Each entry is applied to the same input; order
/// only matters for documentation since the rules write disjoint
/// filter fields.
const RULES: &[fn(&QueryText, &mut Filter)] = &[
    rule_palindrome,
    rule_word_count,
    rule_min_length,
    rule_max_length,
    rule_contains_letter,
];

/// Derive a filter from free-form query text.
///
/// An empty result filter means no rule recognized anything in the
/// text; callers must treat that as "no meaningful filter could be
/// derived" rather than as an unconstrained match-all.
pub fn extract_filter(input: &str) -> Filter {
    let text = QueryText::new(input);
    let mut filter = Filter::default();

    for rule in RULES {
        rule(&text, &mut filter);
    }

    filter
}

/// Any inflection of "palindrome" requests palindromic strings.
///
/// There is deliberately no negated form: "not a palindrome" still
/// fires this rule. Negation is out of scope for the extractor.
fn rule_palindrome(text: &QueryText, filter: &mut Filter) {
    if text.lowered.contains("palindrom") {
        filter.is_palindrome = Some("true".to_string());
    }
}

/// "single word" / "one word" means exactly one word; otherwise a
/// number immediately before "word"/"words" is used verbatim. The
/// spelled-out form takes precedence.
fn rule_word_count(text: &QueryText, filter: &mut Filter) {
    if text.lowered.contains("single word") || text.lowered.contains("one word") {
        filter.word_count = Some("1".to_string());
        return;
    }

    for window in text.tokens.windows(2) {
        let [count, keyword] = window else { continue };
        if matches!(keyword.as_str(), "word" | "words") {
            if let Ok(n) = count.parse::<u64>() {
                filter.word_count = Some(n.to_string());
                return;
            }
        }
    }
}

/// "longer than N" – the strict bound becomes an inclusive lower
/// bound one past N.
fn rule_min_length(text: &QueryText, filter: &mut Filter) {
    if let Some(n) = number_after_phrase(&text.tokens, "longer", "than") {
        filter.min_length = Some((n + 1).to_string());
    }
}

/// "shorter than N" – symmetric strict-to-inclusive conversion.
fn rule_max_length(text: &QueryText, filter: &mut Filter) {
    if let Some(n) = number_after_phrase(&text.tokens, "shorter", "than") {
        filter.max_length = Some(n.saturating_sub(1).to_string());
    }
}

/// "contain(ing) (the) (letter) c" – a single lowercase letter after a
/// "contain"-prefixed token, optionally separated by filler words.
fn rule_contains_letter(text: &QueryText, filter: &mut Filter) {
    let Some(start) = text
        .tokens
        .iter()
        .position(|tok| tok.starts_with("contain"))
    else {
        return;
    };

    let mut rest = text.tokens[start + 1..].iter();
    let candidate = rest.find(|tok| !matches!(tok.as_str(), "the" | "a" | "letter" | "character"));

    if let Some(tok) = candidate {
        let mut chars = tok.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if letter.is_ascii_lowercase() {
                filter.contains_character = Some(letter.to_string());
            }
        }
    }
}

fn number_after_phrase(tokens: &[String], first: &str, second: &str) -> Option<u64> {
    for window in tokens.windows(3) {
        let [a, b, n] = window else { continue };
        if a.as_str() == first && b.as_str() == second {
            if let Ok(parsed) = n.parse::<u64>() {
                return Some(parsed);
            }
        }
    }
    None
}
