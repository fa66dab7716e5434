//! Candidate phrase extraction.
//!
//! Derives 2-4 word phrases from sentence fragments. Used standalone and as
//! the fallback source of top phrases when a model response carries too few.

use crate::text::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("invalid regex"));
static PHRASE_CLEAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z\s]").expect("invalid regex"));

/// Extract up to `max_phrases` multi-word phrases from `text`.
///
/// Sentences shorter than 10 characters are discarded. Candidates are 2-4
/// token windows whose first token is not a stop word; after stripping
/// non-letter characters a candidate must still be longer than 5 characters.
/// Longer phrases rank first, ties keep discovery order.
pub fn extract_top_phrases(text: &str, max_phrases: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut phrases: Vec<String> = Vec::new();

    for sentence in SENTENCE_SPLIT_RE.split(text) {
        let sentence = sentence.trim();
        if sentence.len() <= 10 {
            continue;
        }

        let lowered = sentence.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        if words.len() < 2 {
            continue;
        }

        for start in 0..words.len() - 1 {
            let longest = std::cmp::min(4, words.len() - start);
            for len in 2..=longest {
                let phrase = words[start..start + len].join(" ");
                if is_stop_word(words[start]) || phrase.len() <= 5 {
                    continue;
                }
                let clean = PHRASE_CLEAN_RE.replace_all(&phrase, "").trim().to_string();
                if clean.len() > 5 && !phrases.contains(&clean) {
                    phrases.push(clean);
                }
            }
        }
    }

    // Length is the cheapest informativeness proxy available; the sort is
    // stable so equal-length phrases keep discovery order
    phrases.sort_by(|a, b| b.len().cmp(&a.len()));
    phrases.truncate(max_phrases);
    phrases
}
