//! Application settings and paths.
//!
//! Manages XDG-compliant paths and the JSON settings file holding scanner
//! and monitor tunables.

use crate::error::{ConfigError, ConfigResult};
use crate::types::PortRange;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/pulsescan)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the XDG directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "pulsescan", "pulsescan")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Port scanner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// First port scanned.
    pub port_start: u16,
    /// Last port scanned, inclusive.
    pub port_end: u16,
    /// Per-port connect timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum probes in flight for one target.
    pub concurrency: usize,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            port_start: PortRange::DEFAULT_START,
            port_end: PortRange::DEFAULT_END,
            timeout_ms: 500,
            concurrency: crate::scanner::DEFAULT_CONCURRENCY,
        }
    }
}

impl ScannerSettings {
    pub fn port_range(&self) -> ConfigResult<PortRange> {
        Ok(PortRange::from_bounds(self.port_start, self.port_end)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Latency monitor tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Pause between two checks of the same URL.
    pub delay_seconds: f64,
    /// Latencies above this are HIGH.
    pub alert_threshold_ms: f64,
    /// Latencies at or above this are CRITICAL and stop polling.
    pub critical_threshold_ms: f64,
    /// Only an exact match of `critical_threshold_ms` is CRITICAL.
    pub legacy_exact_critical: bool,
    /// Upper bound on a single HTTP request.
    pub request_timeout_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            delay_seconds: 1.0,
            alert_threshold_ms: 155.0,
            critical_threshold_ms: 750.0,
            legacy_exact_critical: false,
            request_timeout_ms: 5000,
        }
    }
}

impl MonitorSettings {
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub scanner: ScannerSettings,
    pub monitor: MonitorSettings,
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::discover()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the default location, returning the file written.
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let paths = Paths::discover()?;
        fs::create_dir_all(&paths.config_dir)?;

        let file = paths.settings_file();
        self.save_to(&file)?;
        Ok(file)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reject settings that cannot drive a scan or a monitor loop.
    pub fn validate(&self) -> ConfigResult<()> {
        self.scanner.validate()?;
        self.monitor.validate()
    }
}

impl ScannerSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        self.port_range()?;

        if self.concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "scanner.concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "scanner.timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl MonitorSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.delay_seconds.is_finite() || self.delay_seconds < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "monitor.delay_seconds must be a non-negative number, got {}",
                self.delay_seconds
            )));
        }
        if !self.alert_threshold_ms.is_finite() || self.alert_threshold_ms < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "monitor.alert_threshold_ms must be a non-negative number, got {}",
                self.alert_threshold_ms
            )));
        }
        if !self.critical_threshold_ms.is_finite()
            || self.critical_threshold_ms <= self.alert_threshold_ms
        {
            return Err(ConfigError::InvalidValue(format!(
                "monitor.critical_threshold_ms ({}) must be above alert_threshold_ms ({})",
                self.critical_threshold_ms, self.alert_threshold_ms
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "monitor.request_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
