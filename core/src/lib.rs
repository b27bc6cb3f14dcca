//! Plagiarism-risk analysis engine.
//! Flags tell-tale phrasing, measures style consistency and compares
//! documents with deterministic heuristics. No corpus or network is
//! consulted: the result is a stylistic-anomaly score, not a match report.

pub mod compare;
pub mod config;
pub mod detector;
pub mod enrich;
pub mod fingerprint;
pub mod ngram;
pub mod risk;
pub mod similarity;
pub mod style;
pub mod text;

use once_cell::sync::Lazy;
use thiserror::Error;

pub use compare::{CompareSettings, ComparisonResult};
pub use config::Config;
pub use detector::{PatternRule, PhraseDetector, Severity, SuspiciousPhrase};
pub use enrich::{AugmentedResult, RewriteSuggestion, SuggestionProvider};
pub use ngram::NgramAnalysis;
pub use risk::{PlagiarismResult, RiskLevel};
pub use style::{StyleAnalysis, StyleShift};

/// Precondition failures a host reports before running an analysis.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("text is required")]
    Empty,
    #[error("text is too long: {len} characters (maximum {max})")]
    TooLong { len: usize, max: usize },
}

/// Analyzer holds the compiled pattern table and feature settings for reuse
/// across documents.
pub struct Analyzer {
    config: Config,
    detector: PhraseDetector,
}

impl Analyzer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let detector = PhraseDetector::new(&config.patterns.extra)?;
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reject empty text and text over the configured character limit.
    pub fn check_input(&self, text: &str) -> Result<(), InputError> {
        if text.trim().is_empty() {
            return Err(InputError::Empty);
        }
        let len = text.chars().count();
        let max = self.config.limits.max_input_chars;
        if len > max {
            return Err(InputError::TooLong { len, max });
        }
        Ok(())
    }

    pub fn analyze(&self, text: &str) -> PlagiarismResult {
        let ngrams = ngram::word_ngrams(text, self.config.analysis.ngram_size);
        let ngram_analysis = NgramAnalysis::from_ngrams(&ngrams);
        let phrases = self.detector.detect(text);
        let style = style::analyze_style(text);
        let result = risk::compose(phrases, style, ngram_analysis);
        tracing::debug!(
            score = result.overall_score,
            risk = %result.risk_level,
            phrases = result.suspicious_phrases.len(),
            "plagiarism analysis complete"
        );
        result
    }

    pub fn compare(&self, a: &str, b: &str) -> ComparisonResult {
        let settings = CompareSettings {
            ngram_size: self.config.analysis.ngram_size,
            shingle_size: self.config.analysis.shingle_size,
            window_size: self.config.analysis.window_size,
        };
        compare::compare_with(a, b, settings)
    }
}

static DEFAULT_ANALYZER: Lazy<Analyzer> =
    Lazy::new(|| Analyzer::new(Config::default()).expect("built-in patterns compile"));

/// Analyze `text` with the default configuration.
pub fn analyze_plagiarism(text: &str) -> PlagiarismResult {
    DEFAULT_ANALYZER.analyze(text)
}

/// Compare two texts with the default configuration.
pub fn compare_texts(a: &str, b: &str) -> ComparisonResult {
    DEFAULT_ANALYZER.compare(a, b)
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
