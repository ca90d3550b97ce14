// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use locheck::app_config::{self, CheckKind, Config, ReportFormat};
use locheck::parsers::FileType;
use locheck::pipeline::Pipeline;
use locheck::report::{ConsoleReporter, JsonReporter, Reporter};

/// CLI Wrapper for FileType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFileType {
    Txt,
    Md,
    Xml,
    Csv,
    Html,
}

impl From<CliFileType> for FileType {
    fn from(cli_type: CliFileType) -> Self {
        match cli_type {
            CliFileType::Txt => FileType::Txt,
            CliFileType::Md => FileType::Md,
            CliFileType::Xml => FileType::Xml,
            CliFileType::Csv => FileType::Csv,
            CliFileType::Html => FileType::Html,
        }
    }
}

/// CLI Wrapper for CheckKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCheck {
    Urls,
    Structure,
    Markdown,
    Format,
}

impl From<CliCheck> for CheckKind {
    fn from(cli_check: CliCheck) -> Self {
        match cli_check {
            CliCheck::Urls => CheckKind::Urls,
            CliCheck::Structure => CheckKind::Structure,
            CliCheck::Markdown => CheckKind::Markdown,
            CliCheck::Format => CheckKind::Format,
        }
    }
}

/// CLI Wrapper for ReportFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliReportFormat {
    Console,
    Json,
}

impl From<CliReportFormat> for ReportFormat {
    fn from(cli_format: CliReportFormat) -> Self {
        match cli_format {
            CliReportFormat::Console => ReportFormat::Console,
            CliReportFormat::Json => ReportFormat::Json,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for locheck
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// locheck - localized document validator
///
/// Compares every translation with its reference locale and checks that the
/// links it contains still resolve.
#[derive(Parser, Debug)]
#[command(name = "locheck")]
#[command(version)]
#[command(about = "Validate localized documents against their base locale")]
#[command(long_about = "locheck groups per-locale files into sets, compares each translation with the base file and validates the links they contain.

EXAMPLES:
    locheck                                        # Use locheck.json or the defaults
    locheck 'docs/{lang}/**/*.md' -p lang=en       # English is the base locale
    locheck 'res/values-{lang}/strings.xml' -p lang=en -t xml -q './/string' -k urls -k format
    locheck 'notes/*.txt' -t txt -k urls --batch   # Check every link in a tree once
    locheck --report json > report.json            # Machine readable output
    locheck completions bash > locheck.bash        # Generate bash completions

CONFIGURATION:
    Settings are read from locheck.json by default; use --config for another
    file. Command line options override the file. A missing file means the
    defaults are used.

EXIT STATUS:
    0 when no problem was found, 1 otherwise.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path pattern with {name} placeholders and * / ** wildcards
    #[arg(value_name = "PATTERN")]
    pattern: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "locheck.json")]
    config: PathBuf,

    /// Base value of a placeholder, as name=value
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Content format of the matched files
    #[arg(short = 't', long, value_enum)]
    filetype: Option<CliFileType>,

    /// Element query for xml content (e.g. './/string')
    #[arg(short, long)]
    query: Option<String>,

    /// Render extracted text as Markdown before checking
    #[arg(long)]
    render_markdown: bool,

    /// Check to run; repeat for several
    #[arg(short = 'k', long = "check", value_enum)]
    checks: Vec<CliCheck>,

    /// Base URL for links starting with '/'
    #[arg(long, env = "LOCHECK_ROOT_URL")]
    root_url: Option<String>,

    /// Do not check image sources
    #[arg(long)]
    skip_images: bool,

    /// Check all file sets in one pass
    #[arg(long)]
    batch: bool,

    /// Output format
    #[arg(long, value_enum)]
    report: Option<CliReportFormat>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept everything here; the effective level is set once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Warn);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "locheck", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.into());

    let problems = run(&config).await?;
    if problems > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Config file (or defaults) with command line overrides applied
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_default(&cli.config)?;

    if let Some(pattern) = &cli.pattern {
        config.source = pattern.clone();
    }
    if !cli.params.is_empty() {
        config.parameters = cli.params.iter().cloned().collect();
    }
    if let Some(filetype) = &cli.filetype {
        config.filetype = filetype.clone().into();
    }
    if let Some(query) = &cli.query {
        config.query = Some(query.clone());
    }
    if cli.render_markdown {
        config.render_markdown = true;
    }
    if !cli.checks.is_empty() {
        config.checks = cli.checks.iter().cloned().map(CheckKind::from).collect();
    }
    if let Some(root_url) = &cli.root_url {
        config.urls.root_url = Some(root_url.clone());
    }
    if cli.skip_images {
        config.urls.skip_images = true;
    }
    if cli.batch {
        config.batch = true;
    }
    if let Some(report) = &cli.report {
        config.report = report.clone().into();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Run the pipeline and report; returns the number of diagnostics
async fn run(config: &Config) -> Result<usize> {
    let pipeline = Pipeline::from_config(config).context("Failed to prepare the validation run")?;

    let total = pipeline.file_sets().len();
    if total == 0 {
        return Err(anyhow!("No files match pattern: {}", config.source));
    }
    info!("Found {} file set(s) for {}", total, config.source);

    let progress_bar = ProgressBar::new(total as u64);
    let template_result = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} file sets ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(template_result.progress_chars("#>-"));
    progress_bar.set_message("Checking");

    let pb = progress_bar.clone();
    let diagnostics = pipeline
        .run_with_progress(move |completed, _total| {
            pb.set_position(completed as u64);
        })
        .await;
    progress_bar.finish_and_clear();

    let mut reporter: Box<dyn Reporter> = match config.report {
        ReportFormat::Console => Box::new(ConsoleReporter::stdout()),
        ReportFormat::Json => Box::new(JsonReporter::stdout()),
    };
    reporter
        .report(&diagnostics)
        .context("Failed to write the report")?;

    Ok(diagnostics.len())
}
