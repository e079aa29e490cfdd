//! Prober trait abstraction.
//!
//! Defines a common interface for single-port probes so the scanner can be
//! driven by the real TCP prober or by test doubles.

use crate::error::ScanResult;
use crate::types::Port;
use async_trait::async_trait;
use serde::Serialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Outcome of probing a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// The port number that was probed.
    pub port: Port,
    /// Whether a connection was established before the timeout.
    pub open: bool,
}

impl ProbeResult {
    pub fn open(port: Port) -> Self {
        Self { port, open: true }
    }

    pub fn closed(port: Port) -> Self {
        Self { port, open: false }
    }
}

/// Trait for single-port probe implementations.
///
/// `attempt` reports why a connection failed; `probe` collapses every
/// failure into a closed port. Closed and filtered are not distinguished.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Try to connect once to `ip:port`.
    async fn attempt(&self, ip: IpAddr, port: Port) -> ScanResult<()>;

    /// Probe a port. Never fails.
    async fn probe(&self, ip: IpAddr, port: Port) -> ProbeResult {
        match self.attempt(ip, port).await {
            Ok(()) => ProbeResult::open(port),
            Err(e) => {
                debug!(%ip, %port, error = %e, "port closed");
                ProbeResult::closed(port)
            }
        }
    }

    /// Get the configured timeout.
    fn timeout(&self) -> Duration;
}
