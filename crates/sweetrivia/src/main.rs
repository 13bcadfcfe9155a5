mod api;
mod config;
mod export;
mod serve;
mod status;
mod wizard;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use sweetrivia_logging::{LogFormat, Logger};

use crate::config::ProjectConfig;

#[derive(Parser, Debug)]
#[command(
    name = "sweetrivia",
    about = "Write a batch of multiple-choice trivia questions and export them as CSV",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Session to work on
    #[arg(long, global = true, default_value = "default")]
    session: String,

    /// SQLite database holding drafts (overrides sweetrivia.toml)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormatChoice,

    /// Tracing level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Also write tracing output to a daily log file
    #[arg(long, global = true)]
    log_file: bool,

    /// Append wizard events as JSON lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    event_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: 3210)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write questions interactively (default)
    Wizard,

    /// Save the finished batch as trivia_questions.csv
    Export {
        /// Directory to write into (default: current directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Print the CSV instead of writing a file
        #[arg(long, conflicts_with = "dir")]
        stdout: bool,
    },

    /// Upload the finished batch to the configured storage
    Publish {
        /// Print the receipt as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where a session stands
    Status {
        /// List every session with stored progress
        #[arg(long)]
        all: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discard a session's progress
    Reset,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.into();
    let _log_guard = if cli.log_file {
        let dir = sweetrivia_logging::default_log_dir()
            .context("Could not determine log directory")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Some(sweetrivia_logging::init_tracing_with_file(
            &cli.log_level,
            log_format,
            &dir,
        ))
    } else {
        sweetrivia_logging::init_tracing(&cli.log_level, log_format);
        None
    };
    let logger = match &cli.event_log {
        Some(path) => Logger::with_file(log_format, path)
            .with_context(|| format!("Failed to open event log {}", path.display()))?,
        None => Logger::new(log_format),
    };

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let mut config = ProjectConfig::load_or_default(&working_dir)?;
    if let Some(path) = cli.database {
        config.database = Some(path);
    }

    let db = config.open_database()?;
    let session = cli.session.as_str();

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Serve { port } => {
            let publisher = config.build_publisher(&working_dir)?;
            serve::handle_serve_command(db, publisher, port.unwrap_or(config.port())).await
        }
        Commands::Wizard => {
            let publisher = config.build_publisher(&working_dir)?;
            wizard::handle_wizard_command(&db, &publisher, session, &logger).await
        }
        Commands::Export { dir, stdout } => {
            export::handle_export_command(&db, session, dir, stdout, &logger)
        }
        Commands::Publish { json } => {
            let publisher = config.build_publisher(&working_dir)?;
            export::handle_publish_command(&db, &publisher, session, json, &logger).await
        }
        Commands::Status { all, json } => status::handle_status_command(&db, session, all, json),
        Commands::Reset => status::handle_reset_command(&db, session, &logger),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_flag_is_global() {
        let cli = Cli::try_parse_from(["sweetrivia", "export", "--event-log", "events.jsonl"])
            .unwrap();
        assert_eq!(cli.event_log, Some(PathBuf::from("events.jsonl")));
        assert!(matches!(cli.command, Some(Commands::Export { .. })));
    }

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["sweetrivia"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.session, "default");
        assert!(cli.event_log.is_none());
    }
}
