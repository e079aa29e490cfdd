//! CLI subcommand definitions and handlers.
//!
//! - `pulsescan scan [targets]` - Scan targets for open ports
//! - `pulsescan monitor [url]` - Watch the latency of a URL
//! - `pulsescan config show|path|init` - Inspect or create settings

mod config;
mod monitor;
mod scan;

pub use config::ConfigCommand;
pub use monitor::MonitorCommand;
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::{CliResult, ConfigResult};
use crate::monitor::UrlSource;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::warn;

/// pulsescan - TCP port scanner and HTTP latency monitor.
#[derive(Parser, Debug)]
#[command(name = "pulsescan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find open ports and watch endpoint latency", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH", env = "PULSESCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan targets for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Poll a URL and classify its latency
    #[command(alias = "m")]
    Monitor(MonitorCommand),

    /// Inspect or create the settings file
    Config(ConfigCommand),
}

impl Cli {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "pulsescan=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Run the selected subcommand.
    pub async fn run(&self) -> CliResult<()> {
        match &self.command {
            Commands::Scan(cmd) => {
                let settings = load_settings(self.config.as_deref())?;
                cmd.execute(&settings, self.verbose, self.quiet).await
            }
            Commands::Monitor(cmd) => {
                let settings = load_settings(self.config.as_deref())?;
                cmd.execute(&settings, self.quiet).await
            }
            Commands::Config(cmd) => cmd.execute(self.config.as_deref()),
        }
    }
}

/// Load settings from `path`, or from the default location.
pub fn load_settings(path: Option<&Path>) -> ConfigResult<AppSettings> {
    match path {
        Some(path) => AppSettings::load_from(path),
        None => AppSettings::load(),
    }
}

/// Line-oriented prompt on standard input.
///
/// Lines are read on a dedicated thread and handed over a channel, so a
/// pending read never holds up runtime shutdown after Ctrl-C.
pub struct Prompt {
    message: &'static str,
    lines: mpsc::UnboundedReceiver<io::Result<String>>,
}

impl Prompt {
    pub fn new(message: &'static str) -> Self {
        Self::from_reader(message, io::BufReader::new(io::stdin()))
    }

    /// Prompt over any line reader.
    pub fn from_reader<R>(message: &'static str, reader: R) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        });

        Self { message, lines: rx }
    }

    /// Print the prompt and read one line. `None` at end of input.
    pub async fn ask(&mut self) -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", self.message)?;
        stdout.flush()?;

        match self.lines.recv().await {
            Some(line) => Ok(Some(line?.trim().to_string())),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UrlSource for Prompt {
    async fn next_url(&mut self) -> Option<String> {
        match self.ask().await {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to read from stdin");
                None
            }
        }
    }
}
