//! Monitor subcommand implementation.
//!
//! Handles `pulsescan monitor [url]`.

use super::Prompt;
use crate::config::{AppSettings, MonitorSettings};
use crate::error::CliResult;
use crate::monitor::{LatencyMonitor, LatencySample, UrlSource};
use crate::output::{self, OutputFormat};
use async_trait::async_trait;
use clap::Parser;
use tracing::warn;

const URL_PROMPT: &str = "Enter website to ping: ";

/// Poll a URL and report its latency every `delay` seconds.
///
/// A CRITICAL latency stops polling and asks for the next URL.
#[derive(Parser, Debug)]
pub struct MonitorCommand {
    /// URL to watch; a missing scheme becomes https://
    ///
    /// Prompted for on standard input when omitted.
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Seconds between checks
    #[arg(short, long)]
    pub delay: Option<f64>,

    /// Latency in ms above which a check is HIGH
    #[arg(long)]
    pub alert: Option<f64>,

    /// Latency in ms at or above which a check is CRITICAL
    #[arg(long)]
    pub critical: Option<f64>,

    /// Only treat an exact match of the critical latency as CRITICAL
    #[arg(long)]
    pub legacy_exact_critical: bool,

    /// Timeout for each HTTP request in milliseconds
    #[arg(long)]
    pub request_timeout: Option<u64>,

    /// Stop polling a URL after this many checks
    #[arg(short = 'n', long)]
    pub max_checks: Option<usize>,

    /// Exit after the given URL stops instead of prompting for another
    #[arg(long, requires = "url")]
    pub once: bool,

    /// Output format for samples
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl MonitorCommand {
    /// Merge command-line overrides into the configured monitor settings.
    pub fn settings(&self, base: &MonitorSettings) -> MonitorSettings {
        let mut settings = base.clone();
        if let Some(delay) = self.delay {
            settings.delay_seconds = delay;
        }
        if let Some(alert) = self.alert {
            settings.alert_threshold_ms = alert;
        }
        if let Some(critical) = self.critical {
            settings.critical_threshold_ms = critical;
        }
        if self.legacy_exact_critical {
            settings.legacy_exact_critical = true;
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout_ms = timeout;
        }
        settings
    }

    /// Execute the monitor command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let settings = self.settings(&settings.monitor);
        settings.validate()?;

        let mut monitor = LatencyMonitor::from_settings(&settings)?;
        if let Some(max) = self.max_checks {
            monitor = monitor.with_max_checks(max);
        }

        if !quiet && self.output == OutputFormat::Plain {
            output::print_info(&format!(
                "alert above {} ms, critical at {} ms, checking every {}s",
                settings.alert_threshold_ms, settings.critical_threshold_ms, settings.delay_seconds
            ));
        }

        let thresholds = *monitor.thresholds();
        let format = self.output;
        let report = move |sample: &LatencySample| match format {
            OutputFormat::Plain => output::print_sample(sample, &thresholds),
            OutputFormat::Json => {
                if let Err(e) = output::print_sample_json(sample) {
                    warn!(error = %e, "failed to write sample");
                }
            }
        };

        match (&self.url, self.once) {
            (Some(url), true) => {
                monitor.poll(url, report).await;
            }
            (first, _) => {
                let mut source = FirstThenPrompt {
                    first: first.clone(),
                    prompt: Prompt::new(URL_PROMPT),
                };
                monitor.run(&mut source, report).await;
            }
        }

        Ok(())
    }
}

/// Yields the URL given on the command line, then prompts for more.
struct FirstThenPrompt {
    first: Option<String>,
    prompt: Prompt,
}

#[async_trait]
impl UrlSource for FirstThenPrompt {
    async fn next_url(&mut self) -> Option<String> {
        match self.first.take() {
            Some(url) => Some(url),
            None => self.prompt.next_url().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let cmd = MonitorCommand {
            url: None,
            delay: Some(0.5),
            alert: Some(100.0),
            critical: None,
            legacy_exact_critical: true,
            request_timeout: Some(2000),
            max_checks: None,
            once: false,
            output: OutputFormat::Plain,
        };

        let settings = cmd.settings(&MonitorSettings::default());
        assert_eq!(settings.delay_seconds, 0.5);
        assert_eq!(settings.alert_threshold_ms, 100.0);
        assert_eq!(settings.critical_threshold_ms, 750.0);
        assert!(settings.legacy_exact_critical);
        assert_eq!(settings.request_timeout_ms, 2000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_overrides_can_be_invalid() {
        let cmd = MonitorCommand {
            url: Some("example.com".to_string()),
            delay: None,
            alert: Some(900.0),
            critical: None,
            legacy_exact_critical: false,
            request_timeout: None,
            max_checks: None,
            once: true,
            output: OutputFormat::Json,
        };
        assert!(cmd.settings(&MonitorSettings::default()).validate().is_err());
    }
}
