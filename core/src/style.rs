//! Sentence-level style statistics and abrupt style-shift detection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::round_to;
use crate::text::{split_sentences, tokenize};

const FORMAL_WORDS: &[&str] = &[
    "therefore",
    "however",
    "furthermore",
    "consequently",
    "moreover",
    "nevertheless",
    "notwithstanding",
    "aforementioned",
    "henceforth",
    "whereby",
];

/// Ratio of adjacent sentence-length delta to the average length that counts
/// as a shift.
const SHIFT_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleShift {
    /// Index of the sentence that starts the new style.
    pub position: usize,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleAnalysis {
    pub avg_sentence_length: f64,
    pub vocabulary_richness: f64,
    pub formality_score: f64,
    pub consistency_score: f64,
    pub style_shifts: Vec<StyleShift>,
}

impl StyleAnalysis {
    /// Canonical result for a document with no tokens.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True for documents without a single token; their consistency score is
    /// a placeholder rather than a measurement. A tokenised document always
    /// differs from the canonical value, even when its rounded average
    /// sentence length is zero, because its token-bearing sentence is a shift.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

pub fn analyze_style(text: &str) -> StyleAnalysis {
    let words = tokenize(text, false);
    if words.is_empty() {
        return StyleAnalysis::empty();
    }

    let lengths: Vec<usize> = split_sentences(text)
        .into_iter()
        .map(|sentence| tokenize(sentence, false).len())
        .collect();
    if lengths.is_empty() {
        return StyleAnalysis::empty();
    }

    let count = lengths.len() as f64;
    let avg = lengths.iter().sum::<usize>() as f64 / count;

    let unique: HashSet<String> = tokenize(text, true).into_iter().collect();
    let vocabulary_richness = unique.len() as f64 / words.len() as f64;

    let formal_count = words
        .iter()
        .filter(|w| FORMAL_WORDS.contains(&w.as_str()))
        .count();
    let formality_score = (formal_count as f64 / (words.len() as f64 / 100.0)).min(1.0);

    let style_shifts = lengths
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].abs_diff(pair[0]) as f64 > avg * SHIFT_FACTOR)
        .map(|(idx, pair)| StyleShift {
            position: idx + 1,
            description: format!(
                "Sentence length changed from {} to {} words",
                pair[0], pair[1]
            ),
        })
        .collect();

    let consistency_score = if avg == 0.0 {
        0.0
    } else {
        let variance = lengths
            .iter()
            .map(|&len| (len as f64 - avg).powi(2))
            .sum::<f64>()
            / count;
        (1.0 - variance.sqrt() / avg * 0.5).max(0.0)
    };

    StyleAnalysis {
        avg_sentence_length: round_to(avg, 1),
        vocabulary_richness: round_to(vocabulary_richness, 2),
        formality_score: round_to(formality_score, 2),
        consistency_score: round_to(consistency_score, 2),
        style_shifts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_punctuation_only_documents_are_canonical() {
        for text in ["", "   ", "...?!", "— – …"] {
            let style = analyze_style(text);
            assert_eq!(style, StyleAnalysis::empty(), "text {text:?}");
            assert!(style.is_empty());
        }
    }

    #[test]
    fn sparse_tokens_are_not_an_empty_document() {
        let text = format!("Word.{}", " ;.".repeat(20));
        let style = analyze_style(&text);
        assert_eq!(style.avg_sentence_length, 0.0);
        assert_eq!(style.consistency_score, 0.0);
        assert_eq!(style.style_shifts.len(), 1);
        assert!(!style.is_empty());
    }

    #[test]
    fn uniform_sentences_are_consistent() {
        let style =
            analyze_style("One two three four. Five six seven eight. Nine ten eleven twelve.");
        assert_eq!(style.avg_sentence_length, 4.0);
        assert_eq!(style.consistency_score, 1.0);
        assert!(style.style_shifts.is_empty());
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        let style = analyze_style("just a single run on line");
        assert_eq!(style.avg_sentence_length, 6.0);
        assert_eq!(style.consistency_score, 1.0);
    }

    #[test]
    fn records_shift_with_description() {
        let long = "word ".repeat(20);
        let text = format!("Short one. {long}. Short one.");
        let style = analyze_style(&text);
        // lengths 2, 20, 2: avg 8, deltas 18 > 12
        assert_eq!(style.style_shifts.len(), 2);
        assert_eq!(style.style_shifts[0].position, 1);
        assert_eq!(
            style.style_shifts[0].description,
            "Sentence length changed from 2 to 20 words"
        );
        assert_eq!(style.style_shifts[1].position, 2);
        assert!(style.consistency_score < 0.6);
    }

    #[test]
    fn formality_is_density_per_hundred_words_capped() {
        let style = analyze_style("However, we left. Therefore we rested.");
        assert_eq!(style.formality_score, 1.0);

        let mut text = String::from("Moreover ");
        text.push_str(&"plain ".repeat(199));
        let style = analyze_style(&text);
        assert_eq!(style.formality_score, 0.5);
    }

    #[test]
    fn vocabulary_richness_uses_filtered_unique_over_all_tokens() {
        let style = analyze_style("The river and the river and the river.");
        // one unique content word ("river") over eight tokens
        assert_eq!(style.vocabulary_richness, 0.13);
    }
}
