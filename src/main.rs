// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subtidy::app_config::{self, Config, MismatchPolicy, TranslationProvider};
use subtidy::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for MismatchPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMismatchPolicy {
    Truncate,
    KeepSource,
    Fail,
}

impl From<CliMismatchPolicy> for MismatchPolicy {
    fn from(cli_policy: CliMismatchPolicy) -> Self {
        match cli_policy {
            CliMismatchPolicy::Truncate => MismatchPolicy::Truncate,
            CliMismatchPolicy::KeepSource => MismatchPolicy::KeepSource,
            CliMismatchPolicy::Fail => MismatchPolicy::Fail,
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
    /// Convert, clean and optionally translate subtitle files (default command)
    Process(ProcessArgs),

    /// Generate shell completions for subtidy
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Subtitle files (.vtt, .srt) or directories to process
    #[arg(value_name = "INPUT_PATH")]
    input_paths: Vec<PathBuf>,

    /// Overwrite translated files that already exist
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translate cleaned subtitles into the target language
    #[arg(long)]
    translate: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Ollama model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code used when the filename carries none (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'ar', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of subtitle blocks sent per translation request
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// What to do when a batch returns a different number of segments
    #[arg(long, value_enum)]
    mismatch_policy: Option<CliMismatchPolicy>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// subtidy - subtitle post-processing for downloaded tracks
///
/// Converts WebVTT tracks to SRT, collapses rolling auto-captions and
/// optionally translates the cleaned track.
#[derive(Parser, Debug)]
#[command(name = "subtidy")]
#[command(version)]
#[command(about = "Subtitle cleaner and translator for downloaded tracks")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subtidy converts downloaded subtitle tracks to SRT, removes rolling-caption duplicates and can translate the result.

EXAMPLES:
    subtidy talk.en.vtt                          # Convert and clean
    subtidy --translate -t ar talk.en.vtt        # Also translate into Arabic
    subtidy -p ollama -m llama3.2:3b --translate /downloads/
    subtidy --log-level debug /downloads/        # Process a whole directory
    subtidy completions bash > subtidy.bash      # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    process: ProcessArgs,
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

    // @returns: ANSI color and label for a level
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept every level; the effective one is applied through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtidy", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Process(args)) => run_process(args).await,
        None => run_process(cli.process).await,
    }
}

// Override config values with the options given on the command line
fn apply_overrides(config: &mut Config, options: &ProcessArgs) {
    if options.translate {
        config.translate = true;
    }

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.ollama.model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(batch_size) = options.batch_size {
        config.translation.batch_size = batch_size;
    }

    if let Some(policy) = &options.mismatch_policy {
        config.translation.mismatch_policy = policy.clone().into();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_process(options: ProcessArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.into());
    }

    if options.input_paths.is_empty() {
        return Err(anyhow!("At least one INPUT_PATH is required"));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.into());

    if config.translate {
        info!(
            "Translating {} -> {} with {}",
            config.source_language,
            config.target_language,
            config.translation.provider.display_name()
        );
    }

    let controller = Controller::with_config(config)?.with_force_overwrite(options.force_overwrite);
    let summary = controller.run(&options.input_paths).await?;

    if summary.failed > 0 {
        return Err(anyhow!("{} of {} subtitle files failed", summary.failed, summary.processed));
    }

    Ok(())
}
