// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use ytdualsub::app_config::{self, Config};
use ytdualsub::app_controller::{Controller, ISSUES_LOG_FILE};
use ytdualsub::errors::AppError;

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
    /// Download bilingual subtitles for every URL in a file (default command)
    Download(DownloadArgs),

    /// Generate shell completions for ytdualsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct DownloadArgs {
    /// Text file with one YouTube URL per line
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    #[command(flatten)]
    options: RunOptions,
}

#[derive(Args, Debug, Clone)]
struct RunOptions {
    /// Directory receiving the transcripts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Language fetched directly (e.g. 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Language the source track is translated into (e.g. 'zh-Hans')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Pause between videos in milliseconds
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// ytdualsub - bilingual YouTube subtitle downloader
///
/// Downloads a source-language and a translated target-language subtitle
/// track for each video and writes them side by side, aligned by timestamp.
#[derive(Parser, Debug)]
#[command(name = "ytdualsub")]
#[command(version)]
#[command(about = "Bilingual YouTube subtitle downloader")]
#[command(long_about = "ytdualsub reads YouTube URLs from a text file, downloads a source-language subtitle track \
and its translation for each video, and writes one aligned bilingual transcript per video.

EXAMPLES:
    ytdualsub links.txt                          # Use default config (en -> zh-Hans)
    ytdualsub -s en -t ja links.txt              # English with Japanese translation
    ytdualsub -o transcripts -d 2000 links.txt   # Custom output dir, 2s between videos
    ytdualsub --log-level debug links.txt        # Verbose logging
    ytdualsub completions bash > ytdualsub.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Text file with one YouTube URL per line
    #[arg(value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,

    #[command(flatten)]
    options: RunOptions,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "ytdualsub", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Download(args)) => {
            run_download(args.input_file, args.options).await
        }
        None => {
            let input_file = cli.input_file.ok_or_else(|| {
                anyhow!("INPUT_FILE is required when no subcommand is specified")
            })?;
            run_download(input_file, cli.options).await
        }
    }
}

async fn run_download(input_file: PathBuf, options: RunOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&options)?;

    config.validate()
        .context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    info!(
        "Downloading {} subtitles with {} translation into {}",
        config.source_language,
        config.target_language,
        config.output_dir.display()
    );

    let output_dir = config.output_dir.clone();
    let controller = Controller::with_config(config)?;

    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler, never interrupt
            std::future::pending::<()>().await;
        }
    };

    match controller.run_until(&input_file, interrupt).await {
        Ok(summary) => {
            info!("Done: downloaded subtitles for {} videos", summary);
            if !summary.skipped.is_empty() {
                warn!(
                    "{} videos skipped, see {}",
                    summary.skipped.len(),
                    output_dir.join(ISSUES_LOG_FILE).display()
                );
            }
            Ok(())
        }
        Err(AppError::Interrupted) => {
            error!("Interrupted by user, batch aborted");
            std::process::exit(130);
        }
        Err(e) => Err(e.into()),
    }
}

/// Load the configuration file, creating a default one when missing, and
/// apply command line overrides
fn load_config(options: &RunOptions) -> Result<Config> {
    let config_path = &options.config_path;
    let mut config: Config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(delay_ms) = options.delay_ms {
        config.request_delay_ms = delay_ms;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
