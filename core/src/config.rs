//! YAML-backed analyzer configuration.

use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::detector::{PatternRule, Severity};

/// Host-side input limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_input_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_chars: 10_000,
        }
    }
}

/// Feature sizes used by n-gram statistics, shingling and winnowing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub ngram_size: usize,
    pub shingle_size: usize,
    pub window_size: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            ngram_size: crate::ngram::DEFAULT_NGRAM_SIZE,
            shingle_size: crate::ngram::DEFAULT_SHINGLE_SIZE,
            window_size: crate::fingerprint::DEFAULT_WINDOW_SIZE,
        }
    }
}

/// Additional phrase rules appended after the built-in table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PatternConfig {
    pub extra: Vec<PatternRule>,
}

/// Which flagged phrases are handed to the rewriting service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    pub max_phrases: usize,
    pub include_low_severity: bool,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            max_phrases: 5,
            include_low_severity: false,
        }
    }
}

impl SuggestionSettings {
    pub fn accepts(&self, severity: Severity) -> bool {
        self.include_low_severity || severity != Severity::Low
    }
}

/// Paths skipped when hosts walk directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRules {
    pub ignore_globs: Vec<String>,
}

impl Default for FileRules {
    fn default() -> Self {
        Self {
            ignore_globs: vec![
                "**/.git/**".into(),
                "**/node_modules/**".into(),
                "**/target/**".into(),
                "**/dist/**".into(),
                "**/build/**".into(),
            ],
        }
    }
}

/// Top-level configuration for the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub analysis: AnalysisSettings,
    pub patterns: PatternConfig,
    pub suggestions: SuggestionSettings,
    pub files: FileRules,
}

impl Config {
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).context("Failed to parse YAML")?;
        if value.is_null() {
            return Ok(Config::default());
        }
        serde_yaml::from_value(value).context("Invalid config structure")
    }

    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Apply a `key=value` override to a scalar setting.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        let parse_usize = |v: &str| {
            v.parse::<usize>()
                .with_context(|| format!("`{key}` expects a non-negative integer, got `{v}`"))
        };
        match key.trim() {
            "limits.max_input_chars" => self.limits.max_input_chars = parse_usize(value)?,
            "analysis.ngram_size" => self.analysis.ngram_size = parse_usize(value)?,
            "analysis.shingle_size" => self.analysis.shingle_size = parse_usize(value)?,
            "analysis.window_size" => self.analysis.window_size = parse_usize(value)?,
            "suggestions.max_phrases" => self.suggestions.max_phrases = parse_usize(value)?,
            "suggestions.include_low_severity" => {
                self.suggestions.include_low_severity = matches!(value, "true" | "1" | "yes")
            }
            other => anyhow::bail!("unknown config key `{other}`"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.limits.max_input_chars, 10_000);
        assert_eq!(cfg.analysis.ngram_size, 3);
        assert_eq!(cfg.analysis.shingle_size, 5);
        assert_eq!(cfg.analysis.window_size, 4);
        assert_eq!(cfg.suggestions.max_phrases, 5);
        assert!(cfg.patterns.extra.is_empty());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg = Config::from_yaml_str(concat!(
            "limits:\n  max_input_chars: 500\n",
            "patterns:\n  extra:\n",
            "    - pattern: 'in conclusion'\n",
            "      reason: Stock closing phrase\n",
            "      severity: high\n",
        ))
        .unwrap();
        assert_eq!(cfg.limits.max_input_chars, 500);
        assert_eq!(cfg.analysis.window_size, 4);
        assert_eq!(cfg.patterns.extra.len(), 1);
        assert_eq!(cfg.patterns.extra[0].severity, Severity::High);
    }

    #[test]
    fn empty_yaml_is_default() {
        let cfg = Config::from_yaml_str("").unwrap();
        assert_eq!(cfg.limits.max_input_chars, 10_000);
    }

    #[test]
    fn set_overrides_scalars_and_rejects_unknown_keys() {
        let mut cfg = Config::default();
        cfg.set("analysis.ngram_size", "4").unwrap();
        cfg.set("suggestions.include_low_severity", "yes").unwrap();
        assert_eq!(cfg.analysis.ngram_size, 4);
        assert!(cfg.suggestions.accepts(Severity::Low));
        assert!(cfg.set("analysis.ngram_size", "four").is_err());
        assert!(cfg.set("nope", "1").is_err());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let cfg = Config::load(Path::new("/definitely/not/here/plagrisk.yml")).unwrap();
        assert_eq!(cfg.suggestions.max_phrases, 5);
    }
}
