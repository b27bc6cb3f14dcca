//! Word n-grams and character shingles.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::round_to;
use crate::text::{normalize, tokenize};

pub const DEFAULT_NGRAM_SIZE: usize = 3;
pub const DEFAULT_SHINGLE_SIZE: usize = 5;

/// Sliding windows of `n` consecutive tokens joined by a single space.
/// Stopwords are kept so the original word order survives.
pub fn word_ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let tokens = tokenize(text, false);
    tokens.windows(n).map(|window| window.join(" ")).collect()
}

/// Distinct character shingles of length `k` over the normalised text with
/// all whitespace removed, in first-occurrence order.
pub fn char_shingles(text: &str, k: usize) -> Vec<String> {
    if k == 0 {
        return Vec::new();
    }
    let compact: Vec<char> = normalize(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let mut seen = HashSet::new();
    let mut shingles = Vec::new();
    for window in compact.windows(k) {
        let shingle: String = window.iter().collect();
        if seen.insert(shingle.clone()) {
            shingles.push(shingle);
        }
    }
    shingles
}

/// Repetition statistics over the word n-grams of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgramAnalysis {
    pub total_ngrams: usize,
    pub unique_ngrams: usize,
    pub repetition_rate: f64,
}

impl NgramAnalysis {
    pub fn from_ngrams(ngrams: &[String]) -> Self {
        let unique: HashSet<&str> = ngrams.iter().map(String::as_str).collect();
        let repetition_rate = if ngrams.is_empty() {
            0.0
        } else {
            round_to(1.0 - unique.len() as f64 / ngrams.len() as f64, 2)
        };
        Self {
            total_ngrams: ngrams.len(),
            unique_ngrams: unique.len(),
            repetition_rate,
        }
    }
}
