use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use inform_client::settings::{DEFAULT_CONFIG, Logs};
use inform_client::{Mode, Settings};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub mod ask;
pub mod chat;

/// Overrides the configured log filter when set.
const LOG_ENV: &str = "INFORM_LOG";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base address of the InForm backend
    #[arg(long, global = true, env = "INFORM_API_BASE")]
    api_base: Option<String>,

    /// Answer mode to start in: beginner or intermediate
    #[arg(long, global = true)]
    mode: Option<Mode>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the chat (the default)
    Chat,

    /// Ask one question and print the answer
    Ask {
        /// The question; several words are joined with spaces
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ask::OutputFormat::Text)]
        format: ask::OutputFormat,
    },

    /// Print the default configuration file
    DefaultConfig,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::DefaultConfig => {
            print!("{DEFAULT_CONFIG}");
            Ok(())
        }
        Commands::Chat => {
            let settings = load_settings(cli.api_base)?;
            init_tracing(&settings, cli.verbose, true)?;
            chat::run(&settings, cli.mode.unwrap_or(settings.default_mode)).await
        }
        Commands::Ask { question, format } => {
            let settings = load_settings(cli.api_base)?;
            init_tracing(&settings, cli.verbose, false)?;
            let mode = cli.mode.unwrap_or(settings.default_mode);
            ask::run(&settings, mode, &question.join(" "), format).await
        }
    }
}

/// Settings from config and environment, with `--api-base` on top.
fn load_settings(api_base: Option<String>) -> Result<Settings> {
    let mut settings = Settings::new().wrap_err("could not load settings")?;
    if let Some(api_base) = api_base {
        settings.api_base = api_base;
    }
    Ok(settings)
}

/// The chat UI owns the terminal, so it logs to a daily file. One-shot
/// commands log to stderr, but only with `--verbose` or `INFORM_LOG`.
fn init_tracing(settings: &Settings, verbose: bool, is_chat: bool) -> Result<()> {
    let env_log_set = std::env::var(LOG_ENV).is_ok();

    if is_chat {
        if !settings.logs.enabled {
            return Ok(());
        }

        let log_dir = PathBuf::from(&settings.logs.dir);
        fs_err::create_dir_all(&log_dir)?;

        cleanup_old_logs(&log_dir, Logs::FILE, settings.logs.retention_days);

        let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, Logs::FILE);

        // Use config level unless INFORM_LOG is set
        let filter = if env_log_set {
            EnvFilter::from_env(LOG_ENV)
        } else {
            EnvFilter::default().add_directive(settings.logs.level.as_directive().parse()?)
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_filter(filter),
            )
            .init();

        return Ok(());
    }

    if verbose || env_log_set {
        let filter = if env_log_set {
            EnvFilter::from_env(LOG_ENV)
        } else {
            EnvFilter::default().add_directive("debug".parse()?)
        };

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false)
                    .with_filter(filter),
            )
            .init();
    }

    Ok(())
}

/// Remove rotated log files (`chat.log.2024-02-23` and so on) older than
/// `retention_days`. The live file name itself is never touched.
fn cleanup_old_logs(log_dir: &Path, prefix: &str, retention_days: u64) {
    // A retention too long to represent keeps everything
    let Some(cutoff) = retention_days
        .checked_mul(24 * 60 * 60)
        .map(std::time::Duration::from_secs)
        .and_then(|retention| std::time::SystemTime::now().checked_sub(retention))
    else {
        return;
    };

    let Ok(entries) = fs_err::read_dir(log_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if !name.starts_with(prefix) || name == prefix {
            continue;
        }

        if let Ok(metadata) = entry.metadata()
            && let Ok(modified) = metadata.modified()
            && modified < cutoff
        {
            let _ = fs_err::remove_file(&path);
        }
    }
}
