//! Relevance scoring for engine arbitration
//!
//! Produces a heuristic [0, 1] estimate of how well a result set matches
//! the original query. Used only to pick between engines; never exposed
//! as ground-truth relevance.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::types::SearchResult;

/// Bonus per matched adjacent-term phrase
const PHRASE_BONUS: f64 = 0.3;

/// Penalty per matched off-topic category signal
const OFF_TOPIC_PENALTY: f64 = 0.2;

/// Score for a query with no meaningful terms left after stop-word removal
const NEUTRAL_SCORE: f64 = 0.5;

lazy_static! {
    static ref STOP_WORDS: HashSet<&'static str> = [
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was",
        "one", "our", "out", "has", "him", "his", "how", "its", "new", "now", "see", "two",
        "way", "who", "did", "get", "may", "use", "with", "that", "this", "from", "they",
        "will", "what", "when", "where", "which", "your", "about", "into", "than", "them",
        "then", "were", "have", "does", "been", "their", "would", "there", "could", "should",
    ]
    .into_iter()
    .collect();
}

/// Signals that a result drifted into an off-topic category
const OFF_TOPIC_SIGNALS: &[&str] = &[
    // recipes
    "recipe",
    "ingredients list",
    "cooking time",
    // weather
    "weather forecast",
    "hourly forecast",
    // shopping
    "add to cart",
    "free shipping",
    "best deals",
    "% off",
    // entertainment
    "movie review",
    "episode guide",
    "celebrity news",
    // sports
    "final score",
    "league standings",
    "match highlights",
    // travel
    "flight deals",
    "hotel booking",
    "tourist attractions",
    // automotive
    "car dealership",
    "test drive",
    "miles per gallon",
    // real estate
    "homes for sale",
    "mortgage rates",
    "property listing",
];

/// Score a result set against the query it came from
///
/// Zero results score 0; a query with no meaningful terms scores a
/// neutral 0.5. Otherwise the arithmetic mean of per-result scores.
#[must_use]
pub fn score(results: &[SearchResult], query: &str) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let terms = query_terms(query);
    if terms.is_empty() {
        return NEUTRAL_SCORE;
    }
    let phrases = query_phrases(&terms);

    let total: f64 = results
        .iter()
        .map(|result| score_result(result, &terms, &phrases))
        .sum();
    total / results.len() as f64
}

/// Meaningful query terms: case-folded, longer than 2 chars, not stop words
#[must_use]
pub fn query_terms(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Bigrams and trigrams over adjacent meaningful terms
fn query_phrases(terms: &[String]) -> Vec<String> {
    let mut phrases = Vec::new();
    for pair in terms.windows(2) {
        phrases.push(pair.join(" "));
    }
    for triple in terms.windows(3) {
        phrases.push(triple.join(" "));
    }
    phrases
}

fn score_result(result: &SearchResult, terms: &[String], phrases: &[String]) -> f64 {
    let haystack = format!("{} {} {}", result.title, result.description, result.url).to_lowercase();

    let matched = terms
        .iter()
        .filter(|term| haystack.contains(term.as_str()))
        .count();
    let hit_ratio = matched as f64 / terms.len() as f64;

    let phrase_bonus = phrases
        .iter()
        .filter(|phrase| haystack.contains(phrase.as_str()))
        .count() as f64
        * PHRASE_BONUS;

    let penalty = OFF_TOPIC_SIGNALS
        .iter()
        .filter(|signal| haystack.contains(**signal))
        .count() as f64
        * OFF_TOPIC_PENALTY;

    ((hit_ratio + phrase_bonus).min(1.0) - penalty).max(0.0)
}
