//! Table-driven scan for phrasing that commonly shows up in copied or
//! unattributed academic text.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Weight class of a suspicious phrase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Score contribution of one phrase of this severity.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Low => 3,
            Severity::Medium => 8,
            Severity::High => 15,
        }
    }

    pub fn parse(name: &str) -> Option<Severity> {
        match name.trim().to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(name)
    }
}

/// Span of raw input flagged by a pattern. Offsets count chars, not bytes;
/// consumers expecting UTF-16 offsets (JavaScript string indices) must convert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousPhrase {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub reason: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// One row of the pattern table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatternRule {
    pub pattern: String,
    pub reason: String,
    pub severity: Severity,
}

struct BuiltinRule {
    pattern: &'static str,
    reason: &'static str,
    severity: Severity,
}

const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        pattern: r"according to (?:recent )?(?:studies|research|experts)",
        reason: "Generic citation without source",
        severity: Severity::Medium,
    },
    BuiltinRule {
        pattern: r"it is (?:widely|generally|commonly) (?:known|accepted|believed)",
        reason: "Unattributed common knowledge claim",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"(?:studies|research) (?:has |have )?shown that",
        reason: "Vague research reference",
        severity: Severity::Medium,
    },
    BuiltinRule {
        pattern: r"in (?:recent|modern) (?:years|times|decades)",
        reason: "Generic time reference often found in copied content",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"(?:the|a) (?:significant|substantial|considerable) (?:amount|number|body) of",
        reason: "Formal academic phrasing",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"it (?:is|has been) (?:argued|suggested|proposed) that",
        reason: "Passive voice hiding source",
        severity: Severity::Medium,
    },
    BuiltinRule {
        pattern: r"(?:furthermore|moreover|additionally|consequently|therefore|thus|hence)",
        reason: "Academic transition word",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"\b(?:plethora|myriad|multitude)\b",
        reason: "Overly formal vocabulary",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"in (?:order )?to (?:fully )?understand",
        reason: "Common textbook phrasing",
        severity: Severity::Low,
    },
    BuiltinRule {
        pattern: r"(?:this|the) (?:essay|paper|article|study) (?:will|aims to|seeks to)",
        reason: "Academic introduction pattern",
        severity: Severity::Medium,
    },
];

/// The built-in pattern table as owned rows.
pub fn builtin_rules() -> Vec<PatternRule> {
    BUILTIN_RULES
        .iter()
        .map(|rule| PatternRule {
            pattern: rule.pattern.to_string(),
            reason: rule.reason.to_string(),
            severity: rule.severity,
        })
        .collect()
}

struct CompiledRule {
    regex: Regex,
    reason: String,
    severity: Severity,
}

/// Compiled pattern table; cheap to share across documents.
pub struct PhraseDetector {
    rules: Vec<CompiledRule>,
}

impl PhraseDetector {
    /// Compile the built-in table followed by `extra` rows.
    pub fn new(extra: &[PatternRule]) -> anyhow::Result<Self> {
        let mut rules = Vec::with_capacity(BUILTIN_RULES.len() + extra.len());
        for rule in builtin_rules().iter().chain(extra) {
            let pattern = rule.pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let regex = Regex::new(&format!("(?i){pattern}"))
                .map_err(|e| anyhow::anyhow!("invalid phrase pattern `{pattern}`: {e}"))?;
            rules.push(CompiledRule {
                regex,
                reason: rule.reason.clone(),
                severity: rule.severity,
            });
        }
        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Every match of every rule, sorted by start offset. Overlapping spans
    /// from different rules are all kept.
    pub fn detect(&self, text: &str) -> Vec<SuspiciousPhrase> {
        let mut phrases = Vec::new();
        for rule in &self.rules {
            for m in rule.regex.find_iter(text) {
                if m.as_str().is_empty() {
                    continue;
                }
                let start_index = text[..m.start()].chars().count();
                phrases.push(SuspiciousPhrase {
                    text: m.as_str().to_string(),
                    start_index,
                    end_index: start_index + m.as_str().chars().count(),
                    reason: rule.reason.clone(),
                    severity: rule.severity,
                    suggestion: None,
                });
            }
        }
        phrases.sort_by_key(|phrase| phrase.start_index);
        phrases
    }
}
