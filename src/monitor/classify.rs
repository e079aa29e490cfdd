//! Latency classification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::MonitorSettings;

/// How a single check turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Normal,
    High,
    Critical,
    /// The request never produced a response.
    Unreachable,
}

impl Classification {
    /// Whether the polling loop keeps checking the same URL.
    pub fn continues(self) -> bool {
        !matches!(self, Self::Critical)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::High => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unreachable => write!(f, "UNREACHABLE"),
        }
    }
}

/// Latency bounds used by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub alert_ms: f64,
    pub critical_ms: f64,
    /// CRITICAL only on `latency == critical_ms`.
    pub legacy_exact_critical: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&MonitorSettings::default())
    }
}

impl From<&MonitorSettings> for Thresholds {
    fn from(settings: &MonitorSettings) -> Self {
        Self {
            alert_ms: settings.alert_threshold_ms,
            critical_ms: settings.critical_threshold_ms,
            legacy_exact_critical: settings.legacy_exact_critical,
        }
    }
}

/// Classify a measured latency. Pure function of its inputs.
pub fn classify(latency_ms: f64, thresholds: &Thresholds) -> Classification {
    let critical = if thresholds.legacy_exact_critical {
        latency_ms == thresholds.critical_ms
    } else {
        latency_ms >= thresholds.critical_ms
    };

    if critical {
        Classification::Critical
    } else if latency_ms > thresholds.alert_ms {
        Classification::High
    } else {
        Classification::Normal
    }
}

/// One classified check of a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySample {
    /// URL after normalization.
    pub url: String,
    /// Time to response headers; `None` when unreachable.
    pub latency_ms: Option<f64>,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl LatencySample {
    pub fn measured(url: impl Into<String>, latency_ms: f64, thresholds: &Thresholds) -> Self {
        Self {
            url: url.into(),
            latency_ms: Some(latency_ms),
            classification: classify(latency_ms, thresholds),
            error: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unreachable(url: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            latency_ms: None,
            classification: Classification::Unreachable,
            error: Some(error.to_string()),
            checked_at: Utc::now(),
        }
    }

    pub fn continues(&self) -> bool {
        self.classification.continues()
    }
}
