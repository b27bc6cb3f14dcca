//! Text normalisation, tokenisation and sentence splitting shared by every
//! analysis stage.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Closed list of English function words ignored by content-bearing metrics.
const STOPWORD_LIST: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "dare", "ought", "used", "it", "its", "this", "that", "these", "those", "i", "you", "he",
    "she", "we", "they", "what", "which", "who", "whom", "whose", "where", "when", "why", "how",
    "all", "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "just", "also", "now", "here",
    "there", "then", "once", "if", "else", "while", "although", "though", "because", "unless",
    "until", "about", "into", "through", "during", "before", "after", "above", "below",
    "between", "under", "again",
];

static STOPWORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOPWORD_LIST.iter().copied().collect());

static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("static regex"));

/// Returns true when `word` belongs to the stopword list.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase, turn every non-word character into a separator, collapse
/// whitespace runs and trim. Word characters are ASCII alphanumerics and `_`,
/// so accented letters split the word they appear in.
pub fn normalize(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_space && !normalized.is_empty() {
                normalized.push(' ');
            }
            pending_space = false;
            normalized.push(ch);
        } else {
            pending_space = true;
        }
    }
    normalized
}

/// Split normalised text into tokens. With `remove_stopwords` the stopword
/// list and every token of two characters or fewer are dropped as well.
pub fn tokenize(text: &str, remove_stopwords: bool) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| !token.is_empty())
        .filter(|token| {
            !remove_stopwords || (!is_stopword(token) && token.chars().count() > 2)
        })
        .map(str::to_string)
        .collect()
}

/// Split raw text on runs of `.`, `!` and `?`, keeping non-blank pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK_RE
        .split(text)
        .filter(|sentence| !sentence.trim().is_empty())
        .collect()
}
