//! Best-effort rewrite suggestions attached to an already complete report.
//!
//! The rewriting service is an external collaborator. Nothing here can change
//! a score, a span or a summary: the worst outcome is a report without
//! suggestions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SuggestionSettings;
use crate::risk::PlagiarismResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteSuggestion {
    pub original: String,
    pub suggestion: String,
}

/// Parsed collaborator response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionBatch {
    pub insights: String,
    pub suggestions: Vec<RewriteSuggestion>,
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("response contains no JSON object")]
    NoJsonObject,
    #[error("malformed suggestion payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of raw rewrite responses for a batch of flagged phrases.
pub trait SuggestionProvider {
    fn request(&self, phrases: &[String]) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub additional_insights: String,
    pub rephrasing_suggestions: Vec<RewriteSuggestion>,
}

/// Report plus whatever the rewriting service contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentedResult {
    #[serde(flatten)]
    pub result: PlagiarismResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

/// Phrases worth sending for rewriting, in document order.
pub fn rewrite_candidates(
    result: &PlagiarismResult,
    settings: &SuggestionSettings,
) -> Vec<String> {
    result
        .suspicious_phrases
        .iter()
        .filter(|p| settings.accepts(p.severity))
        .take(settings.max_phrases)
        .map(|p| p.text.clone())
        .collect()
}

/// Pull the outermost `{...}` object out of free text and parse it.
pub fn parse_suggestion_response(raw: &str) -> Result<SuggestionBatch, EnrichError> {
    let start = raw.find('{').ok_or(EnrichError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(EnrichError::NoJsonObject)?;
    if end < start {
        return Err(EnrichError::NoJsonObject);
    }
    Ok(serde_json::from_str(&raw[start..=end])?)
}

/// Attach each suggestion to the first phrase whose text contains, or is
/// contained in, the suggestion's original (case-insensitive).
pub fn enrich(mut result: PlagiarismResult, suggestions: &[RewriteSuggestion]) -> PlagiarismResult {
    for suggestion in suggestions {
        let original = suggestion.original.trim().to_lowercase();
        if original.is_empty() {
            continue;
        }
        let matching = result.suspicious_phrases.iter_mut().find(|p| {
            let text = p.text.to_lowercase();
            text.contains(&original) || original.contains(&text)
        });
        if let Some(phrase) = matching {
            phrase.suggestion = Some(suggestion.suggestion.clone());
        }
    }
    result
}

/// Ask `provider` for rewrites and fold them in. Provider failures leave the
/// report untouched; unparsable responses are kept as raw insights.
pub fn augment(
    result: PlagiarismResult,
    provider: &dyn SuggestionProvider,
    settings: &SuggestionSettings,
) -> AugmentedResult {
    let candidates = rewrite_candidates(&result, settings);
    if candidates.is_empty() {
        return AugmentedResult {
            result,
            ai_analysis: None,
        };
    }

    let raw = match provider.request(&candidates) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "suggestion provider failed");
            return AugmentedResult {
                result,
                ai_analysis: None,
            };
        }
    };

    match parse_suggestion_response(&raw) {
        Ok(batch) => {
            let result = enrich(result, &batch.suggestions);
            AugmentedResult {
                result,
                ai_analysis: Some(AiAnalysis {
                    additional_insights: batch.insights,
                    rephrasing_suggestions: batch.suggestions,
                }),
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "unparsable suggestion response");
            AugmentedResult {
                result,
                ai_analysis: Some(AiAnalysis {
                    additional_insights: raw,
                    rephrasing_suggestions: Vec::new(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze_plagiarism;

    struct Fixed(&'static str);

    impl SuggestionProvider for Fixed {
        fn request(&self, _phrases: &[String]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    impl SuggestionProvider for Failing {
        fn request(&self, _phrases: &[String]) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    const TEXT: &str = "According to research, the results hold. Moreover, it is argued that \
                        this paper will matter.";

    #[test]
    fn candidates_skip_low_severity_and_respect_limit() {
        let result = analyze_plagiarism(TEXT);
        let settings = SuggestionSettings::default();
        assert_eq!(
            rewrite_candidates(&result, &settings),
            vec!["According to research", "it is argued that", "this paper will"]
        );
        let one = SuggestionSettings {
            max_phrases: 1,
            include_low_severity: true,
        };
        assert_eq!(rewrite_candidates(&result, &one), vec!["According to research"]);
    }

    #[test]
    fn parses_json_wrapped_in_prose() {
        let batch = parse_suggestion_response(concat!(
            "Sure! {\"insights\": \"vague\", ",
            "\"suggestions\": [{\"original\": \"a\", \"suggestion\": \"b\"}]} Thanks",
        ))
        .unwrap();
        assert_eq!(batch.insights, "vague");
        assert_eq!(batch.suggestions.len(), 1);
        assert!(matches!(
            parse_suggestion_response("no object here"),
            Err(EnrichError::NoJsonObject)
        ));
        assert!(matches!(
            parse_suggestion_response("{not json}"),
            Err(EnrichError::Malformed(_))
        ));
        assert_eq!(parse_suggestion_response("{}").unwrap(), SuggestionBatch::default());
    }

    #[test]
    fn enrich_only_touches_suggestions() {
        let result = analyze_plagiarism(TEXT);
        let enriched = enrich(
            result.clone(),
            &[
                RewriteSuggestion {
                    original: "according to research".into(),
                    suggestion: "Smith (2021) found".into(),
                },
                RewriteSuggestion {
                    original: "".into(),
                    suggestion: "ignored".into(),
                },
            ],
        );
        assert_eq!(
            enriched.suspicious_phrases[0].suggestion.as_deref(),
            Some("Smith (2021) found")
        );
        assert!(enriched.suspicious_phrases[1..].iter().all(|p| p.suggestion.is_none()));
        assert_eq!(enriched.overall_score, result.overall_score);
        assert_eq!(enriched.summary, result.summary);
    }

    #[test]
    fn provider_failure_fails_open() {
        let result = analyze_plagiarism(TEXT);
        let augmented = augment(result.clone(), &Failing, &SuggestionSettings::default());
        assert_eq!(augmented.result, result);
        assert!(augmented.ai_analysis.is_none());
    }

    #[test]
    fn garbage_response_becomes_raw_insights() {
        let result = analyze_plagiarism(TEXT);
        let augmented = augment(
            result.clone(),
            &Fixed("I cannot help"),
            &SuggestionSettings::default(),
        );
        assert_eq!(augmented.result, result);
        let analysis = augmented.ai_analysis.unwrap();
        assert_eq!(analysis.additional_insights, "I cannot help");
        assert!(analysis.rephrasing_suggestions.is_empty());
    }

    #[test]
    fn good_response_attaches_suggestions() {
        let result = analyze_plagiarism(TEXT);
        let augmented = augment(
            result,
            &Fixed(concat!(
                r#"{"insights":"x","suggestions":"#,
                r#"[{"original":"this paper will","suggestion":"I expect this to"}]}"#,
            )),
            &SuggestionSettings::default(),
        );
        let phrase = augmented
            .result
            .suspicious_phrases
            .iter()
            .find(|p| p.text == "this paper will")
            .unwrap();
        assert_eq!(phrase.suggestion.as_deref(), Some("I expect this to"));
        let json = serde_json::to_value(&augmented).unwrap();
        assert!(json.get("overallScore").is_some());
        assert_eq!(json["aiAnalysis"]["additionalInsights"], "x");
    }

    #[test]
    fn no_candidates_skips_provider() {
        let result = analyze_plagiarism("Plain words only here.");
        let augmented = augment(result, &Failing, &SuggestionSettings::default());
        assert!(augmented.ai_analysis.is_none());
    }
}
