//! Output formatting module.
//!
//! Provides plain text and JSON reporters for scans, and message
//! formatting for latency samples.

mod json_format;
mod plain;

pub use json_format::{print_sample_json, JsonReporter};
pub use plain::{
    print_error, print_info, print_sample, print_success, print_warning, sample_message,
    PlainReporter,
};

use crate::error::ScanError;
use crate::scanner::ScanReport;
use std::io;

/// Receives scan progress from the target dispatcher.
pub trait Reporter {
    /// A target resolved and its scan is starting.
    fn target_started(&mut self, target: &str) -> io::Result<()>;

    /// A target's scan finished.
    fn target_finished(&mut self, report: &ScanReport) -> io::Result<()>;

    /// A target could not be scanned.
    fn target_failed(&mut self, target: &str, error: &ScanError) -> io::Result<()>;
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}
