//! Direct two-document similarity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::fingerprint::fingerprint_with;
use crate::ngram::word_ngrams;
use crate::round_to;
use crate::similarity::jaccard;
use crate::text::tokenize;

const JACCARD_WEIGHT: f64 = 0.3;
const NGRAM_WEIGHT: f64 = 0.5;
const FINGERPRINT_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub jaccard_similarity: f64,
    pub ngram_overlap: f64,
    pub fingerprint_similarity: f64,
    pub overall_similarity: f64,
}

/// Sizes of the features compared; defaults are 3-word n-grams, 5-char
/// shingles and a winnowing window of 4.
#[derive(Debug, Clone, Copy)]
pub struct CompareSettings {
    pub ngram_size: usize,
    pub shingle_size: usize,
    pub window_size: usize,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            ngram_size: crate::ngram::DEFAULT_NGRAM_SIZE,
            shingle_size: crate::ngram::DEFAULT_SHINGLE_SIZE,
            window_size: crate::fingerprint::DEFAULT_WINDOW_SIZE,
        }
    }
}

pub fn compare_with(a: &str, b: &str, settings: CompareSettings) -> ComparisonResult {
    let words_a: HashSet<String> = tokenize(a, true).into_iter().collect();
    let words_b: HashSet<String> = tokenize(b, true).into_iter().collect();
    let word_sim = jaccard(&words_a, &words_b);

    let ngrams_a: HashSet<String> = word_ngrams(a, settings.ngram_size).into_iter().collect();
    let ngrams_b: HashSet<String> = word_ngrams(b, settings.ngram_size).into_iter().collect();
    let ngram_sim = jaccard(&ngrams_a, &ngrams_b);

    let fp_a: HashSet<u32> = fingerprint_with(a, settings.shingle_size, settings.window_size)
        .into_iter()
        .collect();
    let fp_b: HashSet<u32> = fingerprint_with(b, settings.shingle_size, settings.window_size)
        .into_iter()
        .collect();
    let fp_sim = jaccard(&fp_a, &fp_b);

    let overall =
        word_sim * JACCARD_WEIGHT + ngram_sim * NGRAM_WEIGHT + fp_sim * FINGERPRINT_WEIGHT;

    ComparisonResult {
        jaccard_similarity: round_to(word_sim, 2),
        ngram_overlap: round_to(ngram_sim, 2),
        fingerprint_similarity: round_to(fp_sim, 2),
        overall_similarity: round_to(overall, 2),
    }
}
