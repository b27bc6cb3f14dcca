//! Plagiarism-risk Language Server Protocol implementation.
//!
//! Keeps the analyzer hot in memory, publishes flagged phrases as diagnostics
//! and answers hovers with the document's overall risk report.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dashmap::DashMap;
use plagrisk_core::{Analyzer, Config, PlagiarismResult, Severity, SuspiciousPhrase};
use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

const DEFAULT_CONFIG_FILE: &str = "plagrisk.yml";
const SOURCE: &str = "plagrisk";

/// Document state cached by the server.
struct DocumentState {
    content: String,
    version: i32,
}

/// Backend for the plagiarism-risk language server.
struct Backend {
    client: Client,
    analyzer: RwLock<Arc<Analyzer>>,
    documents: DashMap<Url, DocumentState>,
    workspace_root: RwLock<Option<PathBuf>>,
    config_path: RwLock<Option<PathBuf>>,
    min_severity: RwLock<Severity>,
}

impl Backend {
    fn new(client: Client) -> Self {
        let analyzer = Analyzer::new(Config::default()).expect("built-in patterns compile");
        Self {
            client,
            analyzer: RwLock::new(Arc::new(analyzer)),
            documents: DashMap::new(),
            workspace_root: RwLock::new(None),
            config_path: RwLock::new(None),
            min_severity: RwLock::new(Severity::Low),
        }
    }

    async fn apply_settings(&self, map: &serde_json::Map<String, Value>) {
        if let Some(Value::String(config_path)) = map.get("configPath") {
            if config_path.trim().is_empty() {
                *self.config_path.write().await = None;
            } else {
                let configured = PathBuf::from(config_path);
                if configured.is_absolute() {
                    *self.config_path.write().await = Some(configured);
                } else if let Some(root) = self.workspace_root.read().await.clone() {
                    *self.config_path.write().await = Some(root.join(configured));
                }
            }
        }
        if let Some(Value::String(name)) = map.get("minSeverity") {
            match Severity::parse(name) {
                Some(severity) => *self.min_severity.write().await = severity,
                None => {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!("Unknown minSeverity `{name}`, expected low, medium or high"),
                        )
                        .await;
                }
            }
        }
    }

    async fn reload_analyzer(&self) -> anyhow::Result<()> {
        let configured = self.config_path.read().await.clone();
        let resolved = match configured {
            Some(path) => path,
            None => match self.workspace_root.read().await.clone() {
                Some(root) => root.join(DEFAULT_CONFIG_FILE),
                None => return Ok(()),
            },
        };

        let cfg = Config::load(&resolved)?;
        let analyzer = Analyzer::new(cfg).context("failed to create analyzer")?;
        *self.analyzer.write().await = Arc::new(analyzer);
        *self.config_path.write().await = Some(resolved.clone());

        tracing::info!(path = %resolved.display(), "config loaded");
        self.client
            .log_message(
                MessageType::INFO,
                format!("plagrisk config loaded: {}", resolved.display()),
            )
            .await;
        Ok(())
    }

    async fn reload_and_republish(&self) {
        if let Err(err) = self.reload_analyzer().await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to reload config: {err:#}"),
                )
                .await;
        }
        let uris: Vec<Url> = self.documents.iter().map(|e| e.key().clone()).collect();
        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }

    async fn analyze_document(&self, uri: &Url) -> Option<(PlagiarismResult, String)> {
        let content = self.documents.get(uri)?.content.clone();
        let analyzer = self.analyzer.read().await.clone();
        Some((analyzer.analyze(&content), content))
    }

    /// Zero-based position of a char offset, with the column in UTF-16 units.
    fn char_to_position(text: &str, char_offset: usize) -> Position {
        let mut line: u32 = 0;
        let mut character: u32 = 0;
        for ch in text.chars().take(char_offset) {
            if ch == '\n' {
                line += 1;
                character = 0;
            } else {
                character += ch.len_utf16() as u32;
            }
        }
        Position { line, character }
    }

    fn to_lsp_diagnostic(phrase: &SuspiciousPhrase, text: &str) -> Diagnostic {
        let range = Range {
            start: Self::char_to_position(text, phrase.start_index),
            end: Self::char_to_position(text, phrase.end_index),
        };
        let severity = match phrase.severity {
            Severity::High | Severity::Medium => DiagnosticSeverity::WARNING,
            Severity::Low => DiagnosticSeverity::INFORMATION,
        };
        let mut message = phrase.reason.clone();
        if let Some(ref suggestion) = phrase.suggestion {
            message.push_str(" → ");
            message.push_str(suggestion);
        }
        Diagnostic {
            range,
            severity: Some(severity),
            code: Some(NumberOrString::String(phrase.severity.to_string())),
            code_description: None,
            source: Some(SOURCE.to_string()),
            message,
            related_information: None,
            tags: None,
            data: None,
        }
    }

    /// Publish diagnostics to the client. Overlapping spans are sent as-is.
    async fn publish_diagnostics(&self, uri: Url) {
        let min_severity = *self.min_severity.read().await;
        let diagnostics = match self.analyze_document(&uri).await {
            Some((result, content)) => result
                .suspicious_phrases
                .iter()
                .filter(|p| p.severity >= min_severity)
                .map(|p| Self::to_lsp_diagnostic(p, &content))
                .collect(),
            None => Vec::new(),
        };
        let version = self.documents.get(&uri).map(|d| d.version);
        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    fn hover_markdown(result: &PlagiarismResult) -> String {
        let mut out = format!(
            "**Plagiarism risk: {}** (score {}/100)\n\n{}",
            result.risk_level, result.overall_score, result.summary
        );
        let style = &result.style_analysis;
        out.push_str(&format!(
            "\n\nAvg sentence length {:.1}, vocabulary richness {:.2}, \
             formality {:.2}, consistency {:.2}",
            style.avg_sentence_length,
            style.vocabulary_richness,
            style.formality_score,
            style.consistency_score
        ));
        if !result.recommendations.is_empty() {
            out.push('\n');
            for recommendation in &result.recommendations {
                out.push_str(&format!("\n- {recommendation}"));
            }
        }
        out
    }

    fn is_config_path(path: &Path, configured: Option<&PathBuf>) -> bool {
        match configured {
            Some(config) => path == config,
            None => path.ends_with(DEFAULT_CONFIG_FILE),
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root_uri) = params.root_uri.or_else(|| {
            params
                .workspace_folders
                .as_ref()
                .and_then(|folders| folders.first().map(|f| f.uri.clone()))
        }) {
            if let Ok(path) = root_uri.to_file_path() {
                *self.workspace_root.write().await = Some(path);
            }
        }

        if let Some(Value::Object(map)) = params.initialization_options {
            self.apply_settings(&map).await;
        }

        if let Err(err) = self.reload_analyzer().await {
            self.client
                .log_message(MessageType::ERROR, format!("Failed to load config: {err:#}"))
                .await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "plagrisk language server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "plagrisk LSP initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.insert(
            uri.clone(),
            DocumentState {
                content: params.text_document.text,
                version: params.text_document.version,
            },
        );
        self.publish_diagnostics(uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        // FULL sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents.insert(
                uri.clone(),
                DocumentState {
                    content: change.text,
                    version,
                },
            );
        }
        self.publish_diagnostics(uri).await;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let config_path = self.config_path.read().await.clone();
        let is_config = uri
            .to_file_path()
            .is_ok_and(|path| Self::is_config_path(&path, config_path.as_ref()));

        if is_config {
            self.reload_and_republish().await;
        } else {
            self.publish_diagnostics(uri).await;
        }
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if let Value::Object(map) = params.settings {
            self.apply_settings(&map).await;
        }
        self.reload_and_republish().await;
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let config_path = self.config_path.read().await.clone();
        let should_reload = params.changes.iter().any(|change| {
            change
                .uri
                .to_file_path()
                .is_ok_and(|path| Self::is_config_path(&path, config_path.as_ref()))
        });
        if should_reload {
            self.reload_and_republish().await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let Some((result, _)) = self.analyze_document(uri).await else {
            return Ok(None);
        };
        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: Self::hover_markdown(&result),
            }),
            range: None,
        }))
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(start: usize, end: usize, severity: Severity) -> SuspiciousPhrase {
        SuspiciousPhrase {
            text: String::new(),
            start_index: start,
            end_index: end,
            reason: "Academic transition word".into(),
            severity,
            suggestion: None,
        }
    }

    #[test]
    fn positions_use_utf16_columns() {
        let text = "a😀b\nthus";
        assert_eq!(Backend::char_to_position(text, 2), Position { line: 0, character: 3 });
        assert_eq!(Backend::char_to_position(text, 4), Position { line: 1, character: 0 });
        assert_eq!(Backend::char_to_position(text, 8), Position { line: 1, character: 4 });
    }

    #[test]
    fn diagnostic_carries_reason_and_severity() {
        let text = "Hence we go.";
        let diag = Backend::to_lsp_diagnostic(&phrase(0, 5, Severity::Low), text);
        assert_eq!(diag.severity, Some(DiagnosticSeverity::INFORMATION));
        assert_eq!(diag.code, Some(NumberOrString::String("low".into())));
        assert_eq!(diag.source.as_deref(), Some(SOURCE));
        assert_eq!(diag.range.end, Position { line: 0, character: 5 });
        assert_eq!(diag.message, "Academic transition word");
    }

    #[test]
    fn hover_lists_score_and_recommendations() {
        let result = plagrisk_core::analyze_plagiarism(
            "According to recent studies, it is widely known that furthermore many experts agree.",
        );
        let markdown = Backend::hover_markdown(&result);
        assert!(markdown.starts_with("**Plagiarism risk: medium** (score 29/100)"));
        assert!(markdown.contains("- Add proper citations"));
    }

    #[test]
    fn default_config_file_is_recognised() {
        assert!(Backend::is_config_path(Path::new("/repo/plagrisk.yml"), None));
        assert!(!Backend::is_config_path(Path::new("/repo/notes.md"), None));
        let custom = PathBuf::from("/repo/cfg/custom.yml");
        assert!(Backend::is_config_path(&custom, Some(&custom)));
    }
}
