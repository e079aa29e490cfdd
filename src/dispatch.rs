//! Target dispatch - scans every target of a comma-separated list.
//!
//! Targets are scanned one after another, each with its own resolved
//! address and result set. A target that fails to parse or resolve is
//! reported and skipped; the remaining targets still run.

use crate::error::{ScanError, ScanResult};
use crate::output::Reporter;
use crate::scanner::{PortScanner, Prober, ScanReport, TcpConnectProber};
use crate::types::{resolve, split_targets, PortRange};
use std::io;
use tracing::{info, warn};

/// What happened to one target of a dispatch.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub result: ScanResult<ScanReport>,
}

impl TargetOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs a [`PortScanner`] over every target in a raw target list.
pub struct TargetDispatcher<P: Prober = TcpConnectProber> {
    scanner: PortScanner<P>,
    range: PortRange,
}

impl<P: Prober + 'static> TargetDispatcher<P> {
    pub fn new(scanner: PortScanner<P>, range: PortRange) -> Self {
        Self { scanner, range }
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Scan each target in `raw_targets`, reporting as it goes.
    ///
    /// Only a failure to write the report aborts the dispatch.
    pub async fn dispatch<R: Reporter>(
        &self,
        raw_targets: &str,
        reporter: &mut R,
    ) -> io::Result<Vec<TargetOutcome>> {
        let targets = split_targets(raw_targets);
        info!(count = targets.len(), ports = %self.range, "dispatching targets");

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            let result = self.scan_one(&target, reporter).await?;
            outcomes.push(TargetOutcome { target, result });
        }
        Ok(outcomes)
    }

    async fn scan_one<R: Reporter>(
        &self,
        target: &str,
        reporter: &mut R,
    ) -> io::Result<ScanResult<ScanReport>> {
        let resolved = match resolve(target).await {
            Ok(resolved) => resolved,
            Err(e) => {
                let error = ScanError::from(e);
                warn!(host = target, error = %error, "skipping target");
                reporter.target_failed(target, &error)?;
                return Ok(Err(error));
            }
        };

        reporter.target_started(&resolved.original)?;
        let report = self.scanner.scan_resolved(&resolved, self.range).await;
        reporter.target_finished(&report)?;
        Ok(Ok(report))
    }
}
