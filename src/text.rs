//! Deterministic text normalization for sentiment processing.
//!
//! Lowercases, strips URLs/mentions/punctuation, filters stop words and
//! applies a lightweight suffix stemmer. All word tables are process-wide
//! constants; no external NLP dependencies.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

// Curated stop-word set: function words plus the social-media filler and
// apostrophe-less contraction forms that survive punctuation stripping.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        // Articles and demonstratives
        "a", "an", "the", "this", "that", "these", "those",
        // Pronouns
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers",
        "herself", "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
        // Prepositions
        "about", "above", "across", "after", "against", "along", "among", "around", "at",
        "before", "behind", "below", "beneath", "beside", "between", "beyond", "by",
        "down", "during", "except", "for", "from", "in", "inside", "into", "near", "of",
        "off", "on", "outside", "over", "since", "through", "throughout", "till", "to",
        "toward", "under", "until", "up", "upon", "with", "within", "without",
        // Conjunctions and question words
        "and", "but", "or", "nor", "yet", "so", "although", "because", "unless", "while",
        "where", "whereas", "wherever", "whether", "which", "whichever", "who", "whoever",
        "whom", "whose", "why", "how", "when",
        // Auxiliaries and common verbs
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
        "having", "do", "does", "did", "doing", "will", "would", "could", "should",
        "may", "might", "must", "can", "shall", "said", "get", "go", "know", "take",
        "see", "come", "think", "look", "want", "give", "use", "find", "tell", "ask",
        "seem", "feel", "try", "leave", "call",
        // Common adverbs
        "not", "no", "yes", "very", "too", "more", "most", "much", "many", "few",
        "less", "least", "only", "just", "even", "also", "still", "already", "always",
        "never", "sometimes", "often", "usually", "again", "once", "here", "there",
        "now", "then",
        // Generic adjectives
        "good", "bad", "big", "small", "large", "great", "little", "old", "new",
        "first", "second", "third", "last", "next", "previous", "long", "short",
        "high", "low", "right", "left", "other", "another", "same", "different",
        "all", "any", "both", "each", "some", "such", "own", "than",
        // Generic nouns
        "time", "times", "person", "year", "way", "day", "thing", "man", "world",
        "life", "hand", "part", "child", "eye", "woman", "place", "work", "week",
        "case", "point", "government", "company", "number", "group", "problem",
        "fact", "moment", "moments",
        // Internet and social media
        "http", "https", "www", "com", "org", "net", "edu", "gov", "html", "php",
        "asp", "jsp", "url", "link", "click", "read", "rt", "via", "cc", "bcc",
        "fwd", "lol", "omg", "wtf", "btw", "imo", "imho", "dm", "pm", "est", "pst",
        "gmt", "utc",
        // Contractions without apostrophes
        "dont", "wont", "cant", "shouldnt", "wouldnt", "couldnt", "isnt", "arent",
        "wasnt", "werent", "hasnt", "havent", "hadnt", "didnt", "doesnt",
        "im", "youre", "hes", "shes", "theyre", "ive", "youve", "weve", "theyve",
        "ill", "youll", "hell", "shell", "well", "theyll",
        // Filler words
        "like", "really", "actually", "basically", "literally", "totally",
        "definitely", "probably", "maybe", "perhaps", "quite", "rather", "pretty",
        // Number words
        "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
        "ten", "hundred", "thousand", "million", "billion",
        // Time and weekday words
        "today", "tomorrow", "yesterday", "soon", "later", "early", "late",
        "morning", "afternoon", "evening", "night", "month", "monday", "tuesday",
        "wednesday", "thursday", "friday", "saturday", "sunday",
    ]
    .into_iter()
    .collect()
});

// Suffix-stripping rules in priority order. Only the FIRST matching rule is
// applied per word; the cascade is intentionally non-iterative so token
// identity stays stable across runs.
static STEMMING_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // Plurals
        (r"sses$", "ss"),
        (r"ies$", "i"),
        (r"ss$", "ss"),
        (r"s$", ""),
        // Verb forms
        (r"eed$", "ee"),
        (r"(ed|ing)$", ""),
        // Derivational suffixes
        (r"ational$", "ate"),
        (r"tional$", "tion"),
        (r"enci$", "ence"),
        (r"anci$", "ance"),
        (r"izer$", "ize"),
        (r"abli$", "able"),
        (r"alli$", "al"),
        (r"entli$", "ent"),
        (r"eli$", "e"),
        (r"ousli$", "ous"),
        (r"ization$", "ize"),
        (r"ation$", "ate"),
        (r"ator$", "ate"),
        (r"alism$", "al"),
        (r"iveness$", "ive"),
        (r"fulness$", "ful"),
        (r"ousness$", "ous"),
        (r"aliti$", "al"),
        (r"iviti$", "ive"),
        (r"biliti$", "ble"),
        (r"icate$", "ic"),
        (r"ative$", ""),
        (r"alize$", "al"),
        (r"iciti$", "ic"),
        (r"ical$", "ic"),
        (r"ful$", ""),
        (r"ness$", ""),
        // Residual suffix class
        (
            r"(al|ance|ence|er|ic|able|ible|ant|ement|ment|ent|ion|ou|ism|ate|iti|ous|ive|ize)$",
            "",
        ),
        // Trailing e, doubled l
        (r"e$", ""),
        (r"ll$", "l"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let regex = Regex::new(pattern).expect("invalid stemming rule pattern");
        (regex, replacement)
    })
    .collect()
});

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("invalid regex"));
static WWW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"www\.\S+").expect("invalid regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("invalid regex")
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[#@]([a-zA-Z0-9_]+)").expect("invalid regex"));
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("invalid regex"));
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("invalid regex"));

/// Knobs for [`process_text`]. Defaults match what the sentiment pipeline
/// expects for tweet-sized input.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub remove_stop_words: bool,
    pub apply_stemming: bool,
    pub min_word_length: usize,
    pub remove_numbers: bool,
    pub remove_urls: bool,
    pub remove_punctuation: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
            apply_stemming: true,
            min_word_length: 3,
            remove_numbers: true,
            remove_urls: true,
            remove_punctuation: true,
        }
    }
}

/// Check whether a word is in the stop-word set.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word.to_lowercase().as_str())
}

/// Stem a word by applying the first matching suffix rule. Words of two
/// characters or fewer pass through untouched.
pub fn stem_word(word: &str) -> String {
    if word.len() <= 2 {
        return word.to_string();
    }

    let lowered = word.to_lowercase();
    for (pattern, replacement) in STEMMING_RULES.iter() {
        if pattern.is_match(&lowered) {
            return pattern.replace(&lowered, *replacement).into_owned();
        }
    }
    lowered
}

/// Normalize free text into a deduplicated token sequence.
///
/// The cleanup steps run in a fixed order: lowercase, URL/email removal,
/// hashtag/mention marker stripping, punctuation removal, whitespace split,
/// length filter, number filter, stop-word filter, stemming, and finally an
/// order-preserving dedup. Empty input yields an empty vec.
pub fn process_text(text: &str, options: &ProcessOptions) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut processed = text.to_lowercase();

    if options.remove_urls {
        processed = URL_RE.replace_all(&processed, " ").into_owned();
        processed = WWW_RE.replace_all(&processed, " ").into_owned();
        processed = EMAIL_RE.replace_all(&processed, " ").into_owned();
    }

    // Keep hashtag/mention text, drop the marker itself
    processed = TAG_RE.replace_all(&processed, "$1").into_owned();

    if options.remove_punctuation {
        processed = PUNCT_RE.replace_all(&processed, " ").into_owned();
    }

    let mut words: Vec<String> = processed
        .split_whitespace()
        .filter(|word| word.len() >= options.min_word_length)
        .map(str::to_string)
        .collect();

    if options.remove_numbers {
        words.retain(|word| !NUMBER_RE.is_match(word));
    }

    if options.remove_stop_words {
        words.retain(|word| !STOP_WORDS.contains(word.as_str()));
    }

    if options.apply_stemming {
        words = words.iter().map(|word| stem_word(word)).collect();
    }

    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|word| !word.is_empty())
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Aggregate token frequencies across many texts, most frequent first,
/// truncated to `max_words`. Feeds word-cloud style consumers.
pub fn extract_word_counts(
    texts: &[String],
    options: &ProcessOptions,
    max_words: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for text in texts {
        for word in process_text(text, options) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.truncate(max_words);
    sorted
}
