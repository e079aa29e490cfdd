//! Scan subcommand implementation.
//!
//! Handles `pulsescan scan [targets]`.

use super::Prompt;
use crate::config::AppSettings;
use crate::dispatch::TargetDispatcher;
use crate::error::CliResult;
use crate::output::{self, JsonReporter, OutputFormat, PlainReporter};
use crate::scanner::PortScanner;
use crate::types::PortRange;
use clap::Parser;
use tracing::info;

/// Scan one or more targets for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Targets to scan, comma-separated (IP or hostname)
    ///
    /// Prompted for on standard input when omitted.
    ///
    /// Examples:
    ///   192.168.1.1
    ///   example.com
    ///   "10.0.0.1, 10.0.0.2"
    #[arg(value_name = "TARGETS")]
    pub targets: Option<String>,

    /// Ports to scan, e.g. "1-99" or "443"
    #[arg(short, long)]
    pub ports: Option<PortRange>,

    /// Connection timeout per port in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Maximum number of probes in flight per target
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(
        &self,
        settings: &AppSettings,
        verbose: bool,
        quiet: bool,
    ) -> CliResult<()> {
        let mut scanner_settings = settings.scanner.clone();
        if let Some(range) = self.ports {
            scanner_settings.port_start = range.start().as_u16();
            scanner_settings.port_end = range.end().as_u16();
        }
        if let Some(timeout) = self.timeout {
            scanner_settings.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            scanner_settings.concurrency = concurrency;
        }
        scanner_settings.validate()?;

        let raw_targets = match &self.targets {
            Some(targets) => targets.clone(),
            None => match Prompt::new("[+] Enter IP address to scan: ").ask().await? {
                Some(line) => line,
                None => return Ok(()),
            },
        };

        let mut scanner = PortScanner::tcp(scanner_settings.timeout())
            .with_concurrency(scanner_settings.concurrency);
        if verbose && self.output == OutputFormat::Plain {
            scanner = scanner.with_progress();
        }
        let dispatcher = TargetDispatcher::new(scanner, scanner_settings.port_range()?);

        let outcomes = match self.output {
            OutputFormat::Plain => {
                dispatcher
                    .dispatch(&raw_targets, &mut PlainReporter::stdout())
                    .await?
            }
            OutputFormat::Json => {
                dispatcher
                    .dispatch(&raw_targets, &mut JsonReporter::stdout())
                    .await?
            }
        };

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(targets = outcomes.len(), failed, "scan complete");
        if failed > 0 && !quiet && self.output == OutputFormat::Plain {
            output::print_warning(&format!(
                "{} of {} targets could not be scanned",
                failed,
                outcomes.len()
            ));
        }

        Ok(())
    }
}
