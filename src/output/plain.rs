//! Plain text output formatting.
//!
//! Produces the human-readable scan and monitor lines.

use super::Reporter;
use crate::error::ScanError;
use crate::monitor::{Classification, LatencySample, Thresholds};
use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

/// Writes scan progress as plain text lines.
pub struct PlainReporter<W: Write> {
    out: W,
}

impl PlainReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PlainReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for PlainReporter<W> {
    fn target_started(&mut self, target: &str) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "-_0 looking for all open Ports on IP:{}", target)?;
        self.out.flush()
    }

    fn target_finished(&mut self, report: &ScanReport) -> io::Result<()> {
        for port in &report.open_ports {
            writeln!(self.out, "[+] Port {} is open", port)?;
        }
        writeln!(
            self.out,
            "{}",
            style(format!(
                "    {} open / {} scanned in {:.2}s",
                report.open_ports.len(),
                report.ports_scanned,
                report.duration_ms as f64 / 1000.0
            ))
            .dim()
        )?;
        self.out.flush()
    }

    fn target_failed(&mut self, target: &str, error: &ScanError) -> io::Result<()> {
        if target.is_empty() {
            print_error(&format!("empty target in list: {}", error));
        } else {
            print_error(&format!("{}: {}", target, error));
        }
        Ok(())
    }
}

/// The line printed for one latency sample.
pub fn sample_message(sample: &LatencySample, thresholds: &Thresholds) -> String {
    let latency = sample.latency_ms.unwrap_or_default();
    match sample.classification {
        Classification::Normal => format!("latency: {:.2} ms", latency),
        Classification::High => format!("|!| WARNING! \"{:.2}\" Is a high latency", latency),
        Classification::Critical => format!(
            "[!!!] Latency has passed {}! please, check your network's traffic!!! WARNING: {:.2}",
            thresholds.critical_ms, latency
        ),
        Classification::Unreachable => format!(
            "|x| \"{}\" is unreachable: {}",
            sample.url,
            sample.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Print a latency sample with a colour matching its classification.
pub fn print_sample(sample: &LatencySample, thresholds: &Thresholds) {
    let message = sample_message(sample, thresholds);
    match sample.classification {
        Classification::Normal => println!("{}", message),
        Classification::High => println!("{}", style(message).yellow()),
        Classification::Critical => println!("{}", style(message).red().bold()),
        Classification::Unreachable => println!("{}", style(message).red()),
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}
