//! Scanner module - drives concurrent port probes against one target.
//!
//! A target is resolved once, then every port in the range is probed through
//! a bounded pool of in-flight futures. Results are reordered by port before
//! they are reported, whatever order the probes finished in.

pub mod tcp;
pub mod traits;

use crate::error::ScanResult;
use crate::types::{resolve, Port, PortRange, ScanTarget};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub use tcp::TcpConnectProber;
pub use traits::{ProbeResult, Prober};

/// Results of scanning one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Target as the user typed it.
    pub target: String,
    /// Address every probe was sent to.
    pub ip_address: String,
    pub ports_scanned: usize,
    /// Open ports in ascending order.
    pub open_ports: Vec<Port>,
    pub duration_ms: u64,
}

/// Default size of the probe pool.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Probes a port range on one target with bounded concurrency.
pub struct PortScanner<P: Prober = TcpConnectProber> {
    prober: Arc<P>,
    concurrency: usize,
    progress: bool,
}

impl PortScanner<TcpConnectProber> {
    /// Create a TCP connect scanner with the given per-port timeout.
    pub fn tcp(timeout: Duration) -> Self {
        Self::new(TcpConnectProber::new(timeout))
    }
}

impl<P: Prober + 'static> PortScanner<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            concurrency: DEFAULT_CONCURRENCY,
            progress: false,
        }
    }

    /// Set the maximum number of probes in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Show a progress bar while scanning.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Resolve `target` once and scan `range` against it.
    ///
    /// A resolution failure fails the whole scan.
    pub async fn scan(&self, target: &str, range: PortRange) -> ScanResult<ScanReport> {
        let resolved = resolve(target).await?;
        Ok(self.scan_resolved(&resolved, range).await)
    }

    /// Scan an already resolved target.
    pub async fn scan_resolved(&self, target: &ScanTarget, range: PortRange) -> ScanReport {
        let start_time = Instant::now();
        let ip = target.ip;
        let progress = self.progress.then(|| progress_bar(range.len()));

        info!(
            host = %target,
            ports = %range,
            concurrency = self.concurrency,
            timeout = ?self.prober.timeout(),
            "scanning"
        );

        let results: Vec<ProbeResult> = stream::iter(range.iter())
            .map(|port| {
                let prober = Arc::clone(&self.prober);
                let progress = progress.clone();

                async move {
                    let result = prober.probe(ip, port).await;

                    if let Some(ref pb) = progress {
                        pb.inc(1);
                        if result.open {
                            pb.set_message(format!("Found open port: {}", port));
                        }
                    }

                    result
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let open_ports = collect_open_ports(results);
        let duration = start_time.elapsed();
        debug!(host = %target, open = open_ports.len(), ?duration, "scan finished");

        ScanReport {
            target: target.original.clone(),
            ip_address: ip.to_string(),
            ports_scanned: range.len(),
            open_ports,
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Keep only open ports, sorted ascending.
fn collect_open_ports(results: Vec<ProbeResult>) -> Vec<Port> {
    let mut open: Vec<Port> = results
        .into_iter()
        .filter(|r| r.open)
        .map(|r| r.port)
        .collect();
    open.sort_unstable();
    open
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ScanError, ScanError::ConnectionRefused};
    use crate::types::TargetError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    /// Opens a fixed set of ports. Higher ports answer sooner so completion
    /// order is the reverse of port order.
    struct FakeProber {
        open: HashSet<u16>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeProber {
        fn new(open: &[u16]) -> Self {
            Self {
                open: open.iter().copied().collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn attempt(&self, _ip: IpAddr, port: Port) -> ScanResult<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = 100u64.saturating_sub(port.as_u16() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.open.contains(&port.as_u16()) {
                Ok(())
            } else {
                Err(ConnectionRefused)
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
    }

    #[tokio::test]
    async fn test_results_in_ascending_order() {
        let scanner = PortScanner::new(FakeProber::new(&[80, 7, 53, 22])).with_concurrency(50);
        let report = scanner.scan("127.0.0.1", PortRange::default()).await.unwrap();

        let ports: Vec<u16> = report.open_ports.iter().map(|p| p.as_u16()).collect();
        assert_eq!(ports, vec![7, 22, 53, 80]);
        assert_eq!(report.ports_scanned, 99);
        assert_eq!(report.ip_address, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let scanner = PortScanner::new(FakeProber::new(&[])).with_concurrency(10);
        let report = scanner.scan("127.0.0.1", PortRange::default()).await.unwrap();
        assert!(report.open_ports.is_empty());

        let max = scanner.prober.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 10, "{} probes were in flight", max);
        assert!(max > 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_still_scans() {
        let scanner = PortScanner::new(FakeProber::new(&[99])).with_concurrency(0);
        assert_eq!(scanner.concurrency(), 1);

        let range = PortRange::from_bounds(95, 99).unwrap();
        let report = scanner.scan("127.0.0.1", range).await.unwrap();
        assert_eq!(report.open_ports, vec![Port::new(99).unwrap()]);
    }

    #[tokio::test]
    async fn test_resolution_failure_fails_scan() {
        let scanner = PortScanner::new(FakeProber::new(&[1]));
        let err = scanner
            .scan("definitely not a host", PortRange::default())
            .await
            .unwrap_err();
        assert!(err.is_resolution());
        assert!(matches!(
            err,
            ScanError::Resolution(TargetError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_scan_finds_only_the_listener() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // A window around the listener. Assumes its ephemeral neighbours have
        // no listener of their own, which holds on a quiet loopback.
        let start = port.saturating_sub(5).max(1);
        let end = port.saturating_add(5);
        let range = PortRange::from_bounds(start, end).unwrap();

        let scanner = PortScanner::tcp(Duration::from_millis(500)).with_concurrency(20);
        let report = scanner.scan("127.0.0.1", range).await.unwrap();

        assert_eq!(report.open_ports, vec![Port::new(port).unwrap()]);
        assert_eq!(report.ports_scanned, range.len());
    }

    #[tokio::test]
    async fn test_scan_no_listener_reports_nothing() {
        let free: Vec<u16> = {
            let mut listeners = Vec::new();
            for _ in 0..3 {
                listeners.push(TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap());
            }
            listeners
                .iter()
                .map(|l| l.local_addr().unwrap().port())
                .collect()
        };

        let scanner = PortScanner::tcp(Duration::from_millis(200));
        for port in free {
            let range = PortRange::single(Port::new(port).unwrap());
            let report = scanner.scan("127.0.0.1", range).await.unwrap();
            assert!(report.open_ports.is_empty());
        }
    }
}
