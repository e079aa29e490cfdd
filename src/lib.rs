//! # pulsescan - Port Scanner and Latency Monitor
//!
//! Two small network-reachability tools sharing one crate:
//!
//! - A TCP connect scanner that probes a port range on each target of a
//!   comma-separated list, with bounded concurrency and results reported in
//!   ascending port order.
//! - A latency monitor that polls an HTTP endpoint, classifies each round
//!   trip against configurable thresholds and stops on a critical reading.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use pulsescan::scanner::PortScanner;
//! use pulsescan::types::PortRange;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scanner = PortScanner::tcp(Duration::from_millis(500)).with_concurrency(32);
//!     let report = scanner.scan("127.0.0.1", PortRange::default()).await.unwrap();
//!
//!     for port in report.open_ports {
//!         println!("[+] Port {} is open", port);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port ranges, target parsing and resolution
//! - [`scanner`] - Single-port probes and the concurrent `PortScanner`
//! - [`dispatch`] - Runs the scanner over a list of targets
//! - [`monitor`] - HTTP latency checks and the polling loop
//! - [`config`] - Settings file and defaults
//! - [`output`] - Plain and JSON reporters
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod output;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use dispatch::{TargetDispatcher, TargetOutcome};
pub use error::{CliError, MonitorError, ScanError};
pub use monitor::{Classification, LatencyMonitor, LatencySample};
pub use scanner::{PortScanner, ProbeResult, Prober, ScanReport};
pub use types::{Port, PortRange, ScanTarget, TargetSpec};
