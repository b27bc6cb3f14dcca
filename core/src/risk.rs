//! Folds detector output and style metrics into the final risk report.

use serde::{Deserialize, Serialize};

use crate::detector::{Severity, SuspiciousPhrase};
use crate::ngram::NgramAnalysis;
use crate::style::StyleAnalysis;

const INCONSISTENCY_WEIGHT: f64 = 20.0;
const STYLE_SHIFT_WEIGHT: f64 = 5.0;
const FORMALITY_WEIGHT: f64 = 15.0;
const SCORE_MAX: u32 = 100;

const LOW_CONSISTENCY: f64 = 0.6;
const HIGH_FORMALITY: f64 = 0.5;
const MANY_STYLE_SHIFTS: usize = 2;

const NO_FINDINGS_SUMMARY: &str = "No significant plagiarism indicators detected.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=19 => RiskLevel::Low,
            20..=44 => RiskLevel::Medium,
            45..=69 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very-high",
        };
        f.write_str(name)
    }
}

/// Composite plagiarism-risk report for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlagiarismResult {
    pub overall_score: u32,
    pub risk_level: RiskLevel,
    pub suspicious_phrases: Vec<SuspiciousPhrase>,
    pub style_analysis: StyleAnalysis,
    pub ngram_analysis: NgramAnalysis,
    pub summary: String,
    pub recommendations: Vec<String>,
}

pub fn compose(
    suspicious_phrases: Vec<SuspiciousPhrase>,
    style_analysis: StyleAnalysis,
    ngram_analysis: NgramAnalysis,
) -> PlagiarismResult {
    let overall_score = score(&suspicious_phrases, &style_analysis);
    let risk_level = RiskLevel::from_score(overall_score);
    let summary = summarize(&suspicious_phrases, &style_analysis);
    let recommendations = recommend(risk_level, &suspicious_phrases, &style_analysis);
    PlagiarismResult {
        overall_score,
        risk_level,
        suspicious_phrases,
        style_analysis,
        ngram_analysis,
        summary,
        recommendations,
    }
}

fn score(phrases: &[SuspiciousPhrase], style: &StyleAnalysis) -> u32 {
    let phrase_points: u32 = phrases.iter().map(|p| p.severity.weight()).sum();
    let mut total = f64::from(phrase_points);
    // The consistency of an empty document is a placeholder, not a finding.
    if !style.is_empty() {
        total += (1.0 - style.consistency_score) * INCONSISTENCY_WEIGHT;
    }
    total += style.style_shifts.len() as f64 * STYLE_SHIFT_WEIGHT;
    total += style.formality_score * FORMALITY_WEIGHT;
    (total.round().max(0.0) as u32).min(SCORE_MAX)
}

fn summarize(phrases: &[SuspiciousPhrase], style: &StyleAnalysis) -> String {
    let mut parts = Vec::new();
    if !phrases.is_empty() {
        parts.push(format!(
            "Found {} potentially suspicious phrase(s)",
            phrases.len()
        ));
    }
    if !style.style_shifts.is_empty() {
        parts.push(format!(
            "Detected {} writing style shift(s)",
            style.style_shifts.len()
        ));
    }
    if !style.is_empty() && style.consistency_score < LOW_CONSISTENCY {
        parts.push("Writing style shows inconsistencies".to_string());
    }
    if style.formality_score > HIGH_FORMALITY {
        parts.push("Text contains highly formal academic language".to_string());
    }

    if parts.is_empty() {
        NO_FINDINGS_SUMMARY.to_string()
    } else {
        format!("{}.", parts.join(". "))
    }
}

fn recommend(
    level: RiskLevel,
    phrases: &[SuspiciousPhrase],
    style: &StyleAnalysis,
) -> Vec<String> {
    if level == RiskLevel::Low {
        return Vec::new();
    }
    let mut recommendations =
        vec!["Consider rephrasing highlighted sections in your own words".to_string()];
    if phrases.iter().any(|p| p.reason.contains("citation")) {
        recommendations.push("Add proper citations for referenced studies or research".into());
    }
    if style.style_shifts.len() > MANY_STYLE_SHIFTS {
        recommendations.push("Review the text for consistency in writing style".into());
    }
    if style.formality_score > HIGH_FORMALITY {
        recommendations.push("Consider using more natural, conversational language".into());
    }
    recommendations
}

/// Count of phrases per severity, in ascending severity order.
pub fn severity_counts(phrases: &[SuspiciousPhrase]) -> [(Severity, usize); 3] {
    let count = |s: Severity| phrases.iter().filter(|p| p.severity == s).count();
    [
        (Severity::Low, count(Severity::Low)),
        (Severity::Medium, count(Severity::Medium)),
        (Severity::High, count(Severity::High)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleShift;

    fn phrase(severity: Severity, reason: &str) -> SuspiciousPhrase {
        SuspiciousPhrase {
            text: "x".into(),
            start_index: 0,
            end_index: 1,
            reason: reason.into(),
            severity,
            suggestion: None,
        }
    }

    fn steady_style() -> StyleAnalysis {
        StyleAnalysis {
            avg_sentence_length: 10.0,
            vocabulary_richness: 0.5,
            formality_score: 0.0,
            consistency_score: 1.0,
            style_shifts: Vec::new(),
        }
    }

    #[test]
    fn risk_breakpoints() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(44), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(45), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::VeryHigh);
    }

    #[test]
    fn empty_inputs_compose_to_clean_report() {
        let result = compose(Vec::new(), StyleAnalysis::empty(), NgramAnalysis::default());
        assert_eq!(result.overall_score, 0);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.summary, NO_FINDINGS_SUMMARY);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn score_adds_weights_and_clamps() {
        let phrases = vec![
            phrase(Severity::High, "a"),
            phrase(Severity::Medium, "b"),
            phrase(Severity::Low, "c"),
        ];
        let result = compose(phrases, steady_style(), NgramAnalysis::default());
        assert_eq!(result.overall_score, 26);

        let many = (0..10).map(|_| phrase(Severity::High, "a")).collect();
        let result = compose(many, steady_style(), NgramAnalysis::default());
        assert_eq!(result.overall_score, 100);
        assert_eq!(result.risk_level, RiskLevel::VeryHigh);
    }

    #[test]
    fn style_terms_contribute() {
        let mut style = steady_style();
        style.consistency_score = 0.5;
        style.formality_score = 0.6;
        style.style_shifts = (1..=3)
            .map(|position| StyleShift {
                position,
                description: format!("shift {position}"),
            })
            .collect();
        // 10 + 15 + 9
        let result = compose(Vec::new(), style, NgramAnalysis::default());
        assert_eq!(result.overall_score, 34);
        assert_eq!(
            result.summary,
            "Detected 3 writing style shift(s). Writing style shows inconsistencies. \
             Text contains highly formal academic language."
        );
        assert_eq!(
            result.recommendations,
            vec![
                "Consider rephrasing highlighted sections in your own words",
                "Review the text for consistency in writing style",
                "Consider using more natural, conversational language",
            ]
        );
    }

    #[test]
    fn citation_advice_follows_reason_text() {
        let phrases = vec![
            phrase(Severity::Medium, "Generic citation without source"),
            phrase(Severity::High, "other"),
        ];
        let result = compose(phrases, steady_style(), NgramAnalysis::default());
        assert_eq!(result.summary, "Found 2 potentially suspicious phrase(s).");
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.starts_with("Add proper citations")));
    }

    #[test]
    fn low_risk_has_no_recommendations_even_with_findings() {
        let result = compose(
            vec![phrase(Severity::Medium, "Generic citation without source")],
            steady_style(),
            NgramAnalysis::default(),
        );
        assert_eq!(result.overall_score, 8);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn counts_by_severity() {
        let phrases = vec![phrase(Severity::Low, "a"), phrase(Severity::Low, "b")];
        assert_eq!(severity_counts(&phrases)[0], (Severity::Low, 2));
        assert_eq!(severity_counts(&phrases)[2], (Severity::High, 0));
    }
}
