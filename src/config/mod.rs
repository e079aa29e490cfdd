//! Configuration management for pulsescan.
//!
//! Provides XDG-compliant configuration storage for scanner and monitor
//! settings.

mod settings;

pub use settings::{AppSettings, MonitorSettings, Paths, ScannerSettings};
