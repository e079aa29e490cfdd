//! TCP Connect prober implementation.
//!
//! Performs standard TCP connects using the operating system's socket API.
//! The socket is closed as soon as the handshake completes; nothing is sent
//! or read.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::Prober;
use crate::types::Port;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP Connect prober.
///
/// Uses standard socket connect() calls to determine port status.
/// Does not require elevated privileges.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    /// Default per-attempt connect timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    /// Create a new TCP connect prober with the given per-attempt timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    async fn attempt(&self, ip: IpAddr, port: Port) -> ScanResult<()> {
        let addr = SocketAddr::new(ip, port.as_u16());

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(classify_connect_error(ip, port, e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn classify_connect_error(ip: IpAddr, port: Port, e: std::io::Error) -> ScanError {
    if e.kind() == ErrorKind::ConnectionRefused {
        return ScanError::ConnectionRefused;
    }

    let error_str = e.to_string().to_lowercase();
    if error_str.contains("unreachable") {
        if error_str.contains("host") {
            ScanError::HostUnreachable
        } else {
            ScanError::NetworkUnreachable(e.to_string())
        }
    } else {
        ScanError::ConnectionFailed {
            target: ip.to_string(),
            port: port.as_u16(),
            reason: e.to_string(),
        }
    }
}
