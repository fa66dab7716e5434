//! Model-response reconciliation.
//!
//! Turns the raw text a language model returned into a fully-populated
//! [`SentimentResult`], no matter how malformed that text is. Recovery is a
//! layered pipeline: brace-delimited JSON extraction, marker-delimited
//! extraction, a keyword heuristic over the original input, sanitization of
//! the candidate, parse, per-field validation, phrase augmentation, and
//! range clamping. Every layer degrades instead of failing; this module
//! never returns an error.

use crate::phrases::extract_top_phrases;
use crate::text::{process_text, ProcessOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// Greedy: first "{" to last "}". Trailing prose with stray braces lands in
// the parse-failure fallback rather than being trimmed away.
static BRACE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("invalid regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("invalid regex"));

static POSITIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(good|great|excellent|amazing|wonderful|love|happy|awesome|fantastic|best)\b")
        .expect("invalid regex")
});
static NEGATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bad|terrible|awful|horrible|hate|worst|sad|angry|disappointed|poor)\b")
        .expect("invalid regex")
});

const JSON_START_MARKER: &str = "JSON_START";
const JSON_END_MARKER: &str = "JSON_END";

/// An entity mentioned in the analyzed text, with its own polarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub sentiment: f64,
}

/// The validated outcome of one sentiment analysis.
///
/// Every field is always present: `score` is clamped to [-1, 1],
/// `magnitude` to [0, 1], `categories` is never empty and `top_phrases`
/// holds at most five unique entries in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    pub text: String,
    pub score: f64,
    pub magnitude: f64,
    pub categories: Vec<String>,
    pub top_phrases: Vec<String>,
    pub entities: Vec<Entity>,
}

/// Reconcile a raw model reply against the original input text.
pub fn reconcile(raw: &str, original_text: &str) -> SentimentResult {
    let candidate = match extract_candidate(raw) {
        Some(candidate) => candidate,
        // No structured payload anywhere in the reply: fall back to a
        // keyword scan of the original input
        None => return heuristic_result(original_text),
    };

    let sanitized = sanitize_candidate(&candidate);

    let value: Value = match serde_json::from_str(&sanitized) {
        Ok(value) => value,
        Err(_) => return parse_failure_result(original_text),
    };

    let mut result = validate_fields(&value, original_text);
    result.top_phrases = augment_phrases(result.top_phrases, original_text);
    result.score = result.score.clamp(-1.0, 1.0);
    result.magnitude = result.magnitude.clamp(0.0, 1.0);
    result
}

/// The last-resort result for failures outside the recovery pipeline,
/// e.g. a transport error before any reply text exists.
pub fn terminal_fallback(original_text: &str) -> SentimentResult {
    SentimentResult {
        text: original_text.to_string(),
        score: 0.0,
        magnitude: 0.5,
        categories: vec!["error".to_string()],
        top_phrases: vec!["Analysis failed".to_string()],
        entities: Vec::new(),
    }
}

/// Locate the JSON candidate inside the raw reply: a brace-delimited span
/// first, then a `JSON_START`/`JSON_END` marker pair.
fn extract_candidate(raw: &str) -> Option<String> {
    if let Some(found) = BRACE_SPAN_RE.find(raw) {
        return Some(found.as_str().to_string());
    }

    let start = raw.find(JSON_START_MARKER)?;
    let end = raw.find(JSON_END_MARKER)?;
    let body_start = start + JSON_START_MARKER.len();
    if body_start > end {
        return None;
    }

    let inner = raw[body_start..end].trim();
    if inner.starts_with('{') && inner.ends_with('}') {
        Some(inner.to_string())
    } else {
        Some(format!("{{{}}}", inner))
    }
}

/// Strip markdown fence markers, collapse whitespace and force the
/// candidate into a braced form so a parse attempt is always possible,
/// even on truncated output.
fn sanitize_candidate(candidate: &str) -> String {
    let stripped = candidate
        .replace("```json", " ")
        .replace("```", " ")
        .replace('`', " ");

    let mut collapsed = WHITESPACE_RE
        .replace_all(&stripped, " ")
        .trim()
        .to_string();

    if !collapsed.starts_with('{') {
        collapsed.insert(0, '{');
    }
    if !collapsed.ends_with('}') {
        collapsed.push('}');
    }
    collapsed
}

/// Keyword polarity guess over the original input, used when the reply
/// contains no structured payload at all. Deterministic by design.
fn heuristic_result(original_text: &str) -> SentimentResult {
    let score = match (
        POSITIVE_RE.is_match(original_text),
        NEGATIVE_RE.is_match(original_text),
    ) {
        (true, false) => 0.5,
        (false, true) => -0.5,
        _ => 0.0,
    };

    SentimentResult {
        text: original_text.to_string(),
        score,
        magnitude: 0.5,
        categories: vec!["general".to_string()],
        top_phrases: original_text
            .split_whitespace()
            .take(5)
            .map(str::to_string)
            .collect(),
        entities: Vec::new(),
    }
}

/// Hard fallback when a candidate was found but refused to parse.
fn parse_failure_result(original_text: &str) -> SentimentResult {
    let snippet: String = original_text.chars().take(50).collect();
    SentimentResult {
        text: original_text.to_string(),
        score: 0.0,
        magnitude: 0.5,
        categories: vec!["general".to_string()],
        top_phrases: vec![snippet],
        entities: Vec::new(),
    }
}

/// Field-by-field validation with defaults. Model output is untrusted:
/// each field may be missing or carry the wrong type.
fn validate_fields(value: &Value, original_text: &str) -> SentimentResult {
    let score = value.get("score").and_then(Value::as_f64).unwrap_or(0.0);
    let magnitude = value
        .get("magnitude")
        .and_then(Value::as_f64)
        .unwrap_or(0.5);

    let categories = match value.get("categories").and_then(Value::as_array) {
        Some(array) => {
            let names: Vec<String> = array
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                vec!["general".to_string()]
            } else {
                names
            }
        }
        None => vec!["general".to_string()],
    };

    let top_phrases = value
        .get("topPhrases")
        .and_then(Value::as_array)
        .map(|array| {
            array
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let entities = value
        .get("entities")
        .and_then(Value::as_array)
        .map(|array| {
            array
                .iter()
                .filter_map(|entry| {
                    let name = entry.get("name").and_then(Value::as_str)?;
                    let sentiment = entry
                        .get("sentiment")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0);
                    Some(Entity {
                        name: name.to_string(),
                        sentiment,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    SentimentResult {
        text: original_text.to_string(),
        score,
        magnitude,
        categories,
        top_phrases,
        entities,
    }
}

/// Top up a thin phrase list from the original text. Fewer than three
/// surviving phrases triggers extraction; an empty list after that falls
/// back to plain normalized tokens.
fn augment_phrases(mut phrases: Vec<String>, original_text: &str) -> Vec<String> {
    if phrases.len() < 3 {
        phrases.extend(extract_top_phrases(original_text, 5));
    }

    let mut seen = HashSet::new();
    phrases.retain(|phrase| seen.insert(phrase.clone()));
    phrases.truncate(5);

    if phrases.is_empty() {
        let options = ProcessOptions {
            apply_stemming: false,
            min_word_length: 4,
            ..Default::default()
        };
        phrases = process_text(original_text, &options)
            .into_iter()
            .take(5)
            .collect();
    }

    phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_embedded_json() {
        let raw = concat!(
            "Here is the breakdown you asked for: ",
            r#"{"score":0.4,"magnitude":0.6,"categories":["x"],"topPhrases":["a b"],"entities":[]}"#,
            " hope it helps"
        );
        let result = reconcile(raw, "short text");

        assert_eq!(result.score, 0.4);
        assert_eq!(result.magnitude, 0.6);
        assert_eq!(result.categories, vec!["x"]);
        assert_eq!(result.top_phrases, vec!["a b"]);
        assert!(result.entities.is_empty());
        assert_eq!(result.text, "short text");
    }

    #[test]
    fn test_fenced_json_is_parsed_and_clamped() {
        let raw = "Sure! ```json\n{\"score\": 2, \"magnitude\": 0.9, \"categories\": [\"tech\"]}\n```";
        let original = "The new laptop display is stunning and the battery lasts forever";
        let result = reconcile(raw, original);

        assert_eq!(result.score, 1.0);
        assert_eq!(result.magnitude, 0.9);
        assert_eq!(result.categories, vec!["tech"]);
        assert!(!result.top_phrases.is_empty());
        assert!(result.top_phrases.len() <= 5);
    }

    #[test]
    fn test_marker_extraction_without_braces() {
        let raw = concat!(
            "JSON_START ",
            r#""score": 0.7, "magnitude": 0.2, "categories": ["service"], "#,
            r#""topPhrases": ["friendly staff", "quick service", "clean rooms"], "entities": []"#,
            " JSON_END"
        );
        let result = reconcile(raw, "the staff were friendly");

        assert_eq!(result.score, 0.7);
        assert_eq!(result.magnitude, 0.2);
        assert_eq!(result.categories, vec!["service"]);
        assert_eq!(
            result.top_phrases,
            vec!["friendly staff", "quick service", "clean rooms"]
        );
    }

    #[test]
    fn test_marker_content_with_fences_survives_sanitization() {
        let raw = concat!(
            "JSON_START ```json ",
            r#""score": 0.9, "magnitude": 0.4, "categories": ["x"], "#,
            r#""topPhrases": ["alpha beta", "gamma delta", "epsilon zeta"], "entities": []"#,
            " ``` JSON_END"
        );
        let result = reconcile(raw, "whatever");

        assert_eq!(result.score, 0.9);
        assert_eq!(result.magnitude, 0.4);
    }

    #[test]
    fn test_heuristic_negative_when_no_json_present() {
        let raw = "I could not find any structured data in the response.";
        let result = reconcile(raw, "This is terrible and awful");

        assert_eq!(result.score, -0.5);
        assert_eq!(result.magnitude, 0.5);
        assert_eq!(result.categories, vec!["general"]);
        assert_eq!(
            result.top_phrases,
            vec!["This", "is", "terrible", "and", "awful"]
        );
        assert!(result.entities.is_empty());
    }

    #[test]
    fn test_heuristic_positive_and_neutral() {
        let raw = "no json here";
        assert_eq!(reconcile(raw, "what a wonderful amazing day").score, 0.5);
        assert_eq!(reconcile(raw, "the sky is blue").score, 0.0);
        // Mixed polarity cancels out
        assert_eq!(reconcile(raw, "good but terrible").score, 0.0);
    }

    #[test]
    fn test_unparseable_braced_reply_hits_hard_fallback() {
        let original = "x".repeat(60);
        let result = reconcile("{this is not valid json at all}", &original);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.magnitude, 0.5);
        assert_eq!(result.categories, vec!["general"]);
        assert_eq!(result.top_phrases, vec!["x".repeat(50)]);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let raw = concat!(
            r#"{"score": -3.5, "magnitude": 7, "categories": ["a"], "#,
            r#""topPhrases": ["one two", "three four", "five six"], "entities": []}"#
        );
        let result = reconcile(raw, "whatever");

        assert_eq!(result.score, -1.0);
        assert_eq!(result.magnitude, 1.0);
    }

    #[test]
    fn test_wrong_field_types_get_defaults() {
        let raw = r#"{"score": "very positive", "magnitude": 0.3, "categories": "tech"}"#;
        let result = reconcile(raw, "the service desk resolved my ticket quickly");

        assert_eq!(result.score, 0.0);
        assert_eq!(result.magnitude, 0.3);
        assert_eq!(result.categories, vec!["general"]);
    }

    #[test]
    fn test_empty_categories_default_to_general() {
        let raw = r#"{"score": 0.1, "magnitude": 0.2, "categories": []}"#;
        let result = reconcile(raw, "plain input without much to say here");
        assert_eq!(result.categories, vec!["general"]);
    }

    #[test]
    fn test_entities_are_salvaged_per_element() {
        let raw = concat!(
            r#"{"score": 0.2, "magnitude": 0.2, "categories": ["a"], "#,
            r#""topPhrases": ["p q", "r s", "t u"], "#,
            r#""entities": [{"name": "Acme", "sentiment": 0.5}, {"sentiment": 1}, {"name": "Zed"}]}"#
        );
        let result = reconcile(raw, "whatever");

        assert_eq!(
            result.entities,
            vec![
                Entity {
                    name: "Acme".to_string(),
                    sentiment: 0.5
                },
                Entity {
                    name: "Zed".to_string(),
                    sentiment: 0.0
                },
            ]
        );
    }

    #[test]
    fn test_phrase_list_is_capped_at_five() {
        let raw = concat!(
            r#"{"score": 0.2, "magnitude": 0.2, "categories": ["a"], "#,
            r#""topPhrases": ["p1 a", "p2 b", "p3 c", "p4 d", "p5 e", "p6 f", "p7 g"]}"#
        );
        let result = reconcile(raw, "whatever");

        assert_eq!(
            result.top_phrases,
            vec!["p1 a", "p2 b", "p3 c", "p4 d", "p5 e"]
        );
    }

    #[test]
    fn test_thin_phrases_augmented_from_original_text() {
        let raw = r#"{"score": 0.6, "magnitude": 0.4, "categories": ["product"], "topPhrases": ["one phrase"]}"#;
        let original = "The camera quality exceeded every expectation we had going in";
        let result = reconcile(raw, original);

        assert_eq!(result.top_phrases[0], "one phrase");
        assert!(result.top_phrases.len() > 1);
        assert!(result.top_phrases.len() <= 5);
    }

    #[test]
    fn test_token_fallback_when_no_phrases_extractable() {
        let raw = r#"{"score": 0.6, "magnitude": 0.4, "categories": ["a"]}"#;
        // Fragment too short for phrase extraction, so normalizer tokens
        // fill in
        let result = reconcile(raw, "nice gear");

        assert_eq!(result.top_phrases, vec!["nice", "gear"]);
    }

    #[test]
    fn test_terminal_fallback_shape() {
        let result = terminal_fallback("some input");

        assert_eq!(result.text, "some input");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.magnitude, 0.5);
        assert_eq!(result.categories, vec!["error"]);
        assert_eq!(result.top_phrases, vec!["Analysis failed"]);
        assert!(result.entities.is_empty());
    }

    #[test]
    fn test_serializes_with_camel_case_phrases() {
        let json = serde_json::to_string(&terminal_fallback("t")).expect("serialize");
        assert!(json.contains("\"topPhrases\""));
        assert!(!json.contains("top_phrases"));
    }
}
