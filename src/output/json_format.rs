//! JSON output formatting.

use super::plain::print_error;
use super::Reporter;
use crate::error::ScanError;
use crate::monitor::LatencySample;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Writes one pretty-printed JSON document per finished target.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn target_started(&mut self, _target: &str) -> io::Result<()> {
        Ok(())
    }

    fn target_finished(&mut self, report: &ScanReport) -> io::Result<()> {
        let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()
    }

    fn target_failed(&mut self, target: &str, error: &ScanError) -> io::Result<()> {
        print_error(&format!("{}: {}", target, error));
        Ok(())
    }
}

/// Print a latency sample as a single JSON line.
pub fn print_sample_json(sample: &LatencySample) -> io::Result<()> {
    let json = serde_json::to_string(sample).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Port;

    #[test]
    fn test_json_report() {
        let report = ScanReport {
            target: "localhost".to_string(),
            ip_address: "127.0.0.1".to_string(),
            ports_scanned: 99,
            open_ports: vec![Port::new(22).unwrap(), Port::new(80).unwrap()],
            duration_ms: 510,
        };

        let mut reporter = JsonReporter::new(Vec::new());
        reporter.target_started("localhost").unwrap();
        reporter.target_finished(&report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();
        assert_eq!(value["target"], "localhost");
        assert_eq!(value["ip_address"], "127.0.0.1");
        assert_eq!(value["open_ports"], serde_json::json!([22, 80]));
        assert_eq!(value["ports_scanned"], 99);
    }
}
