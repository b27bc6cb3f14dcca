use std::{
    env,
    ffi::{OsStr, OsString},
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use console::style;
use globset::{Glob, GlobSet, GlobSetBuilder};
use plagrisk_core::{
    enrich::{augment, AugmentedResult},
    risk::severity_counts,
    Analyzer, ComparisonResult, Config, RiskLevel, SuggestionProvider,
};
use serde::Serialize;
use walkdir::WalkDir;

/// Plagiarism-risk CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "plagrisk",
    about = "Score documents for plagiarism-style phrasing and style anomalies."
)]
struct Args {
    /// Path to config file (YAML). Defaults are used when it does not exist.
    #[arg(long, default_value = "plagrisk.yml")]
    config: PathBuf,

    /// Emit JSON output for automation.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Strict mode: exit non-zero when any document is high risk or above.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Suppress per-file output.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Saved rewriting-service response used to attach suggestions.
    #[arg(long, value_name = "FILE")]
    suggestions: Option<PathBuf>,

    /// Set config overrides (repeatable as key=value). Example: --set limits.max_input_chars=20000
    #[arg(long = "set", value_name = "KEY=VALUE", num_args = 0..)]
    sets: Vec<String>,

    /// Files or directories to analyze. Reads stdin when empty.
    #[arg(value_name = "PATH", num_args = 0..)]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
#[command(name = "plagrisk compare", about = "Measure similarity between two documents.")]
struct CompareArgs {
    /// Path to config file (YAML).
    #[arg(long, default_value = "plagrisk.yml")]
    config: PathBuf,

    /// Emit JSON output.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Set config overrides (repeatable as key=value).
    #[arg(long = "set", value_name = "KEY=VALUE", num_args = 0..)]
    sets: Vec<String>,

    #[arg(value_name = "FIRST")]
    first: PathBuf,

    #[arg(value_name = "SECOND")]
    second: PathBuf,
}

#[derive(Debug, Serialize)]
struct FileResult {
    path: String,
    #[serde(flatten)]
    report: AugmentedResult,
}

#[derive(Debug, Serialize)]
struct RejectedInput {
    path: String,
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputReport {
    files: Vec<FileResult>,
    rejected: Vec<RejectedInput>,
    max_score: u32,
}

#[derive(Debug, Serialize)]
struct CompareReport {
    first: String,
    second: String,
    #[serde(flatten)]
    result: ComparisonResult,
}

/// Serves a rewriting-service response saved to disk.
struct SavedResponse {
    path: PathBuf,
}

impl SuggestionProvider for SavedResponse {
    fn request(&self, _phrases: &[String]) -> anyhow::Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read suggestions {}", self.path.display()))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<OsString> = env::args_os().collect();
    if argv.len() > 1 && argv[1].as_os_str() == OsStr::new("compare") {
        let mut forwarded = Vec::with_capacity(argv.len() - 1);
        forwarded.push(argv[0].clone());
        forwarded.extend_from_slice(&argv[2..]);
        let compare_args = CompareArgs::parse_from(forwarded);
        return run_compare(compare_args);
    }

    let args = Args::parse();
    run_analyze(args)
}

fn load_config(path: &Path, sets: &[String]) -> anyhow::Result<Config> {
    let mut cfg = Config::load(path)?;
    for kv in sets {
        let (key, value) = kv
            .split_once('=')
            .with_context(|| format!("override `{kv}` is not key=value"))?;
        cfg.set(key, value)?;
    }
    Ok(cfg)
}

fn run_analyze(args: Args) -> anyhow::Result<()> {
    let cfg = load_config(&args.config, &args.sets)?;
    let analyzer = Analyzer::new(cfg.clone())?;
    let provider = args.suggestions.clone().map(|path| SavedResponse { path });

    let inputs = if args.paths.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        vec![("<stdin>".to_string(), text)]
    } else {
        let ignore = build_ignore_set(&cfg.files.ignore_globs)?;
        let mut files = collect_files(&args.paths, ignore.as_ref())?;
        files.sort();
        let cwd = env::current_dir()?;
        let mut inputs = Vec::with_capacity(files.len());
        for path in files {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let shown = pathdiff::diff_paths(&path, &cwd).unwrap_or_else(|| path.clone());
            inputs.push((shown.to_string_lossy().replace('\\', "/"), text));
        }
        inputs
    };
    tracing::debug!(documents = inputs.len(), config = %args.config.display(), "inputs collected");

    let mut file_results = Vec::new();
    let mut rejected = Vec::new();
    let mut fail = false;

    for (path, text) in inputs {
        if let Err(err) = analyzer.check_input(&text) {
            if !args.json {
                eprintln!("{} {}: {}", style("skipped").red(), path, err);
            }
            rejected.push(RejectedInput {
                path,
                error: err.to_string(),
            });
            fail = true;
            continue;
        }

        let result = analyzer.analyze(&text);
        let report = match &provider {
            Some(provider) => augment(result, provider, &cfg.suggestions),
            None => AugmentedResult {
                result,
                ai_analysis: None,
            },
        };

        if args.strict && report.result.risk_level >= RiskLevel::High {
            fail = true;
        }
        if !args.quiet && !args.json {
            print_human_report(&path, &text, &report);
        }
        file_results.push(FileResult { path, report });
    }

    let max_score = file_results
        .iter()
        .map(|f| f.report.result.overall_score)
        .max()
        .unwrap_or(0);

    if args.json {
        let output = OutputReport {
            files: file_results,
            rejected,
            max_score,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !args.quiet {
        println!(
            "\n{} document(s), {} rejected, highest score {}",
            file_results.len(),
            rejected.len(),
            max_score
        );
    }

    if fail {
        std::process::exit(1);
    }

    Ok(())
}

fn run_compare(args: CompareArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config, &args.sets)?;
    let analyzer = Analyzer::new(cfg)?;
    let first = fs::read_to_string(&args.first)
        .with_context(|| format!("Failed to read {}", args.first.display()))?;
    let second = fs::read_to_string(&args.second)
        .with_context(|| format!("Failed to read {}", args.second.display()))?;
    analyzer.check_input(&first)?;
    analyzer.check_input(&second)?;

    let result = analyzer.compare(&first, &second);
    if args.json {
        let report = CompareReport {
            first: args.first.to_string_lossy().to_string(),
            second: args.second.to_string_lossy().to_string(),
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} vs {}",
        style(args.first.to_string_lossy()).bold(),
        style(args.second.to_string_lossy()).bold()
    );
    println!("  word jaccard:  {:.2}", result.jaccard_similarity);
    println!("  3-gram overlap: {:.2}", result.ngram_overlap);
    println!("  fingerprint:   {:.2}", result.fingerprint_similarity);
    println!(
        "  overall:       {}",
        style(format!("{:.0}%", result.overall_similarity * 100.0)).bold()
    );
    Ok(())
}

fn build_ignore_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob `{pattern}`"))?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(paths: &[PathBuf], ignore: Option<&GlobSet>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry_res) = walker.next() {
                let entry = entry_res?;
                let entry_path = entry.path();
                if let Some(set) = ignore {
                    if set.is_match(entry_path) {
                        if entry.file_type().is_dir() {
                            walker.skip_current_dir();
                        }
                        continue;
                    }
                }
                if entry.file_type().is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() {
            // Explicit files are analyzed regardless of extension.
            files.push(path.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "txt"),
        None => false,
    }
}

/// 1-based line and column of a char offset.
fn char_location(text: &str, char_offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for ch in text.chars().take(char_offset) {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

fn print_human_report(path: &str, text: &str, report: &AugmentedResult) {
    let result = &report.result;
    let level = match result.risk_level {
        RiskLevel::Low => style(result.risk_level.to_string()).green(),
        RiskLevel::Medium => style(result.risk_level.to_string()).yellow(),
        RiskLevel::High | RiskLevel::VeryHigh => style(result.risk_level.to_string()).red(),
    };
    let counts = severity_counts(&result.suspicious_phrases)
        .iter()
        .map(|(severity, count)| format!("{count} {severity}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{} (score {}, risk {}, phrases: {})",
        style(path).bold(),
        result.overall_score,
        level,
        counts
    );
    for phrase in &result.suspicious_phrases {
        let (line, column) = char_location(text, phrase.start_index);
        println!(
            "  [{}] {}:{} \"{}\" {}",
            style(phrase.severity).yellow(),
            line,
            column,
            phrase.text,
            phrase.reason
        );
        if let Some(suggestion) = &phrase.suggestion {
            println!("      suggestion: {suggestion}");
        }
    }
    for shift in &result.style_analysis.style_shifts {
        println!(
            "  [{}] sentence {}: {}",
            style("style").cyan(),
            shift.position + 1,
            shift.description
        );
    }
    println!("  {}", result.summary);
    for recommendation in &result.recommendations {
        println!("  - {recommendation}");
    }
    if let Some(ai) = &report.ai_analysis {
        if !ai.additional_insights.is_empty() {
            println!("  insights: {}", ai.additional_insights);
        }
    }
}
