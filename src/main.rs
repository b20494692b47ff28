//! Changenote Lint CLI - Command-line interface for change report validation
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to validation and listing operations
//! - Handles external concerns like configuration discovery, process exit codes, and terminal output
//! - Provides clean separation between user interface and the rule engine

use anyhow::{Context, Result};
use changenote_lint::{
    patterns::{self, RULESET_VERSION},
    rules_doc, BatchReport, ChangeNoteValidator, LintConfig, OutputFormat, ReportFormatter,
    ReportOptions, Severity,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// Changenote Lint - Validate change notes before they reach customers
#[derive(Parser)]
#[command(name = "changenote-lint")]
#[command(version)]
#[command(about = "Rule-based validation of release-note change reports")]
#[command(long_about = "Changenote Lint checks the entries of change reports against the change note rules: mandatory notes, unknown abbreviations, customer and internal references, and apply notes that merely repeat the change note. Designed for editors and CI pipelines.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List change report files, newest first
    Files {
        /// Use the subset directory
        #[arg(long)]
        subset: bool,
    },

    /// Validate one change report
    Check {
        /// Report file name inside the data directory
        file: String,

        /// Use the subset directory
        #[arg(long)]
        subset: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,

        /// Only show entries with a violation of this severity
        #[arg(short, long, value_enum)]
        severity: Option<SeverityArg>,
    },

    /// Validate several change reports (all of them when none are named)
    CheckAll {
        /// Report file names inside the data directory
        files: Vec<String>,

        /// Use the subset directory
        #[arg(long)]
        subset: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,

        /// Only show entries with a violation of this severity
        #[arg(short, long, value_enum)]
        severity: Option<SeverityArg>,

        /// Disable parallel processing
        #[arg(long)]
        no_parallel: bool,
    },

    /// List the rule catalog
    Rules {
        /// Show the rules document instead
        #[arg(long)]
        doc: bool,
    },

    /// Explain what a specific rule does
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Watch the data directory and re-validate on changes
    Watch {
        /// Use the subset directory
        #[arg(long)]
        subset: bool,

        /// Debounce delay in milliseconds
        #[arg(long, default_value = "500")]
        delay: u64,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

/// Presentation choices shared by the check commands
struct OutputChoice {
    format: OutputFormat,
    severity: Option<Severity>,
}

impl OutputChoice {
    fn resolve(config: &LintConfig, format: Option<OutputFormatArg>, severity: Option<SeverityArg>) -> Self {
        Self {
            format: format.map(Into::into).unwrap_or_else(|| config.output_format()),
            severity: severity.map(Into::into).or(config.output.severity_filter),
        }
    }

    fn formatter(&self, config: &LintConfig) -> ReportFormatter {
        ReportFormatter::new(ReportOptions {
            use_colors: config.output.use_colors,
            severity_filter: self.severity,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match run_command(cli).await {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> Result<i32> {
    if let Commands::ValidateConfig { config_file } = &cli.command {
        return Ok(run_validate_config(config_file.clone().or(cli.config.clone())));
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data.subset_directory = data_dir.join("subset");
        config.data.directory = data_dir;
    }
    if cli.no_color {
        config.output.use_colors = false;
    }

    match cli.command {
        Commands::Files { subset } => run_files(&config, subset),
        Commands::Check { file, subset, format, severity } => {
            run_check(&config, &file, subset, OutputChoice::resolve(&config, format, severity))
        }
        Commands::CheckAll { files, subset, format, severity, no_parallel } => {
            if no_parallel {
                config.batch.parallel = false;
            }
            let choice = OutputChoice::resolve(&config, format, severity);
            run_check_all(&config, files, subset, choice).await
        }
        Commands::Rules { doc } => run_list_rules(&config, doc),
        Commands::Explain { rule_id } => Ok(run_explain(&rule_id)),
        Commands::Watch { subset, delay } => run_watch(&config, subset, delay).await,
        Commands::ValidateConfig { .. } => Ok(0),
    }
}

fn load_config(path: Option<&Path>) -> Result<LintConfig> {
    match path {
        Some(path) => LintConfig::load_from_file(path)
            .with_context(|| format!("Could not load configuration {}", path.display())),
        None => LintConfig::discover(".").context("Could not load configuration"),
    }
}

fn run_files(config: &LintConfig, subset: bool) -> Result<i32> {
    let validator = ChangeNoteValidator::with_config(config)?;
    let files = validator.list_files(subset).with_context(|| {
        format!("Could not list {}", config.data_directory(subset).display())
    })?;

    if files.is_empty() {
        eprintln!("No change reports found in {}", config.data_directory(subset).display());
    }
    for file in files {
        println!("{file}");
    }

    Ok(0)
}

fn run_check(config: &LintConfig, file: &str, subset: bool, choice: OutputChoice) -> Result<i32> {
    let validator = ChangeNoteValidator::with_config(config)?.with_report_formatter(choice.formatter(config));

    let result = validator.validate_file(file, subset).with_context(|| format!("Could not validate {file}"))?;
    println!("{}", validator.format_result(&result, choice.format)?);

    Ok(if result.has_errors() || result.is_failure() { 1 } else { 0 })
}

async fn run_check_all(
    config: &LintConfig,
    files: Vec<String>,
    subset: bool,
    choice: OutputChoice,
) -> Result<i32> {
    let validator = ChangeNoteValidator::with_config(config)?.with_report_formatter(choice.formatter(config));

    let report = validator.validate_all_async(files, subset).await?;
    println!("{}", validator.format_batch(&report, choice.format)?);

    Ok(batch_exit_code(&report))
}

fn batch_exit_code(report: &BatchReport) -> i32 {
    if report.has_errors() {
        1
    } else {
        0
    }
}

async fn run_watch(config: &LintConfig, subset: bool, delay_ms: u64) -> Result<i32> {
    use notify::{Event, EventKind, RecursiveMode, Watcher};

    let validator = ChangeNoteValidator::with_config(config)?;
    let watch_path = config.data_directory(subset).to_path_buf();
    let format = config.output_format();

    println!("🔍 Watching change reports in {}", watch_path.display());
    println!("⏱️  Debounce delay: {delay_ms}ms");
    println!("Press Ctrl+C to stop watching\n");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<Event>| {
            forward_watch_event(&tx, res);
        })
        .context("Failed to create file watcher")?;

    watcher
        .watch(&watch_path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch {}", watch_path.display()))?;

    let source = validator.source().clone();
    let is_report = move |event: &Event| {
        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
            && event.paths.iter().any(|path| {
                path.file_name().and_then(|name| name.to_str()).is_some_and(|name| source.accepts(name))
            })
    };

    run_watch_pass(&validator, subset, format).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = rx.recv() => {
                let Some(event) = event else {
                    eprintln!("File watcher disconnected");
                    break;
                };
                if !is_report(&event) {
                    continue;
                }

                // Collapse bursts of writes into a single pass
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                while rx.try_recv().is_ok() {}

                println!("📝 Change reports modified, validating...");
                run_watch_pass(&validator, subset, format).await;
            }
        }
    }

    Ok(0)
}

/// Hand a watcher event to the validation loop; returns whether it was delivered
fn forward_watch_event(
    tx: &tokio::sync::mpsc::UnboundedSender<notify::Event>,
    res: notify::Result<notify::Event>,
) -> bool {
    match res {
        Ok(event) => match tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Error sending watch event: {}", e);
                false
            }
        },
        Err(e) => {
            tracing::warn!("Watch error: {}", e);
            false
        }
    }
}

async fn run_watch_pass(validator: &ChangeNoteValidator, subset: bool, format: OutputFormat) {
    match validator.validate_all_async(Vec::new(), subset).await {
        Ok(report) => match validator.format_batch(&report, format) {
            Ok(output) => println!("{output}"),
            Err(e) => eprintln!("❌ {e}"),
        },
        Err(e) => eprintln!("❌ Validation failed: {e}"),
    }
}

fn run_validate_config(config_path: Option<PathBuf>) -> i32 {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("changenote_lint.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match LintConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("✅ Configuration is valid");
            println!("📊 Configuration summary:");
            println!("  Data directory: {}", config.data.directory.display());
            println!("  Subset directory: {}", config.data.subset_directory.display());
            println!("  File pattern: {}", config.data.file_pattern);
            println!("  Excluded: {}", config.data.exclude.len());
            println!("  Output format: {}", config.output.format);
            0
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            1
        }
    }
}

fn run_explain(rule_id: &str) -> i32 {
    let Some(rule) = patterns::rule(rule_id) else {
        eprintln!("❌ Rule '{rule_id}' not found");
        println!();
        println!("Available rules:");
        for rule in patterns::RULES {
            println!("  - {}", rule.id);
        }
        return 1;
    };

    println!("📖 Rule: {}", rule.id);
    println!("⚠️ Severity: {}", rule.severity);
    println!("🔍 Field: {}", rule.field.as_str());
    println!();
    println!("📝 Description:");
    println!("   {}", rule.description);
    println!();
    println!("💬 Message:");
    println!("   {}", rule.message);

    0
}

fn run_list_rules(config: &LintConfig, doc: bool) -> Result<i32> {
    if doc {
        let validator = ChangeNoteValidator::with_config(config)?;
        let text = validator.rules_document()?;
        print!("{}", rules_doc::render_document(&text, config.output.use_colors));
        return Ok(0);
    }

    println!("📋 Change Note Rules (ruleset {RULESET_VERSION})\n");
    for rule in patterns::RULES {
        println!("  🔍 {} [{}] ({}) - {}", rule.id, rule.severity, rule.field.as_str(), rule.description);
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LintConfig) {
        let temp_dir = TempDir::new().unwrap();
        let data = temp_dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("clean.json"), r#"[{"ChangeNote": "Improved API speed"}]"#).unwrap();
        fs::write(data.join("dirty.json"), r#"[{"SimCorpReference": "D-9", "ChangeNote": "See S-123456"}]"#)
            .unwrap();
        fs::write(data.join("warn.json"), r#"[{"ChangeNote": "New ABC view"}]"#).unwrap();
        fs::write(temp_dir.path().join("rules.md"), "# Rules\n- one").unwrap();

        let mut config = LintConfig::default();
        config.data.directory = data;
        config.rules_document = temp_dir.path().join("rules.md");
        config.output.use_colors = false;
        (temp_dir, config)
    }

    fn choice(format: OutputFormat) -> OutputChoice {
        OutputChoice { format, severity: None }
    }

    #[test]
    fn test_check_exit_codes() {
        let (_temp_dir, config) = setup();

        assert_eq!(run_check(&config, "clean.json", false, choice(OutputFormat::Json)).unwrap(), 0);
        assert_eq!(run_check(&config, "warn.json", false, choice(OutputFormat::Human)).unwrap(), 0);
        assert_eq!(run_check(&config, "dirty.json", false, choice(OutputFormat::GitHub)).unwrap(), 1);
        assert_eq!(run_check(&config, "missing.json", false, choice(OutputFormat::Human)).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_all_command() {
        let (_temp_dir, config) = setup();

        let all = run_check_all(&config, Vec::new(), false, choice(OutputFormat::Junit)).await;
        assert_eq!(all.unwrap(), 1);

        let clean = run_check_all(
            &config,
            vec!["clean.json".to_string(), "warn.json".to_string()],
            false,
            choice(OutputFormat::Json),
        )
        .await;
        assert_eq!(clean.unwrap(), 0);
    }

    #[test]
    fn test_output_choice_prefers_flags() {
        let mut config = LintConfig::default();
        config.output.format = "json".to_string();
        config.output.severity_filter = Some(Severity::Info);

        let from_config = OutputChoice::resolve(&config, None, None);
        assert_eq!(from_config.format, OutputFormat::Json);
        assert_eq!(from_config.severity, Some(Severity::Info));

        let from_flags =
            OutputChoice::resolve(&config, Some(OutputFormatArg::Github), Some(SeverityArg::Error));
        assert_eq!(from_flags.format, OutputFormat::GitHub);
        assert_eq!(from_flags.severity, Some(Severity::Error));
    }

    #[test]
    fn test_forward_watch_event() {
        use notify::{event::CreateKind, Event, EventKind};

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("a.json"));

        assert!(forward_watch_event(&tx, Ok(event.clone())));
        assert_eq!(rx.try_recv().unwrap(), event);

        assert!(!forward_watch_event(&tx, Err(notify::Error::generic("boom"))));

        drop(rx);
        assert!(!forward_watch_event(&tx, Ok(event)));
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("changenote_lint.yaml");
        fs::write(&config_file, LintConfig::default().to_yaml().unwrap()).unwrap();

        assert_eq!(run_validate_config(Some(config_file)), 0);
        assert_eq!(run_validate_config(Some(temp_dir.path().join("absent.yaml"))), 1);
    }

    #[test]
    fn test_explain_rule() {
        assert_eq!(run_explain("internal-reference"), 0);
        assert_eq!(run_explain("nonexistent-rule"), 1);
    }

    #[test]
    fn test_list_rules() {
        let (_temp_dir, config) = setup();

        assert_eq!(run_list_rules(&config, false).unwrap(), 0);
        assert_eq!(run_list_rules(&config, true).unwrap(), 0);

        let mut missing = config.clone();
        missing.rules_document = PathBuf::from("does-not-exist.md");
        assert!(run_list_rules(&missing, true).is_err());
    }

    #[test]
    fn test_files_command() {
        let (_temp_dir, config) = setup();
        assert_eq!(run_files(&config, false).unwrap(), 0);
    }

    #[test]
    fn test_load_config_reports_bad_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        fs::write(&path, "version: \"9.9\"").unwrap();

        let error = load_config(Some(&path)).unwrap_err();
        assert!(format!("{error:#}").contains("Unsupported configuration version"));
    }
}
