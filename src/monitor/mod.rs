//! Latency monitor - polls an HTTP endpoint and classifies round-trip times.
//!
//! The monitor alternates between two states. In `Prompt` it waits for a URL
//! from a [`UrlSource`]; in `Polling` it checks that URL every `delay`
//! until a check comes back CRITICAL, then returns to `Prompt`.
//! Network failures are classified UNREACHABLE and polling carries on.

mod classify;
mod http;

pub use classify::{classify, Classification, LatencySample, Thresholds};
pub use http::{normalize_url, HttpProbe, ReqwestProbe};

use crate::config::MonitorSettings;
use crate::error::MonitorResult;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Where the monitor gets the next URL to watch.
#[async_trait]
pub trait UrlSource: Send {
    /// `None` ends the monitor.
    async fn next_url(&mut self) -> Option<String>;
}

/// Monitor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    Prompt,
    Polling { url: String },
}

/// Why a polling session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEnd {
    /// A CRITICAL sample was observed.
    Critical,
    /// The configured check budget ran out.
    Exhausted,
    /// The URL could not be parsed; nothing was requested.
    InvalidInput,
}

/// Summary of one polling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub checks: usize,
    pub end: PollEnd,
}

pub struct LatencyMonitor<H: HttpProbe = ReqwestProbe> {
    probe: H,
    thresholds: Thresholds,
    delay: Duration,
    max_checks: Option<usize>,
}

impl LatencyMonitor<ReqwestProbe> {
    /// Build a monitor backed by a real HTTP client.
    pub fn from_settings(settings: &MonitorSettings) -> MonitorResult<Self> {
        let probe = ReqwestProbe::new(settings.request_timeout())?;
        Ok(Self::new(settings, probe))
    }
}

impl<H: HttpProbe> LatencyMonitor<H> {
    pub fn new(settings: &MonitorSettings, probe: H) -> Self {
        Self {
            probe,
            thresholds: Thresholds::from(settings),
            delay: settings.delay(),
            max_checks: None,
        }
    }

    /// Stop each polling session after `max` checks.
    pub fn with_max_checks(mut self, max: usize) -> Self {
        self.max_checks = Some(max);
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Check a URL once.
    ///
    /// A URL without an http(s) scheme gets `https://`. Failures never
    /// escape: they become an UNREACHABLE sample.
    pub async fn check(&self, url: &str) -> LatencySample {
        let url = match normalize_url(url) {
            Ok(url) => url,
            Err(e) => {
                error!(url, error = %e, "unreachable");
                return LatencySample::unreachable(url.trim(), e);
            }
        };

        match self.probe.get(&url).await {
            Ok(elapsed) => {
                let latency_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
                let sample = LatencySample::measured(url, latency_ms, &self.thresholds);
                match sample.classification {
                    Classification::Critical => {
                        error!(url = %sample.url, latency_ms, "critical latency")
                    }
                    Classification::High => warn!(url = %sample.url, latency_ms, "high latency"),
                    _ => info!(url = %sample.url, latency_ms, "latency"),
                }
                sample
            }
            Err(e) => {
                error!(%url, error = %e, "unreachable");
                LatencySample::unreachable(url, e)
            }
        }
    }

    /// Check `url` until a check says stop or the check budget runs out.
    ///
    /// The first check runs immediately; later ones wait `delay`. A URL
    /// that cannot be parsed yields one UNREACHABLE sample and ends the
    /// session at once.
    pub async fn poll<F>(&self, url: &str, mut on_sample: F) -> PollOutcome
    where
        F: FnMut(&LatencySample),
    {
        if let Err(e) = normalize_url(url) {
            error!(url, error = %e, "invalid URL");
            on_sample(&LatencySample::unreachable(url.trim(), e));
            return PollOutcome {
                checks: 0,
                end: PollEnd::InvalidInput,
            };
        }

        let mut checks = 0;
        loop {
            if checks > 0 {
                tokio::time::sleep(self.delay).await;
            }

            let sample = self.check(url).await;
            checks += 1;
            on_sample(&sample);

            if !sample.continues() {
                return PollOutcome {
                    checks,
                    end: PollEnd::Critical,
                };
            }
            if self.max_checks.is_some_and(|max| checks >= max) {
                return PollOutcome {
                    checks,
                    end: PollEnd::Exhausted,
                };
            }
        }
    }

    /// Run the prompt/poll loop until the source is exhausted.
    pub async fn run<S, F>(&self, source: &mut S, mut on_sample: F)
    where
        S: UrlSource,
        F: FnMut(&LatencySample),
    {
        let mut state = MonitorState::Prompt;
        loop {
            state = match state {
                MonitorState::Prompt => match source.next_url().await {
                    Some(url) if url.trim().is_empty() => MonitorState::Prompt,
                    Some(url) => MonitorState::Polling { url },
                    None => {
                        debug!("no more URLs, monitor finished");
                        return;
                    }
                },
                MonitorState::Polling { url } => {
                    let outcome = self.poll(&url, &mut on_sample).await;
                    debug!(%url, checks = outcome.checks, end = ?outcome.end, "polling stopped");
                    MonitorState::Prompt
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted latencies (or failures) and records requested URLs.
    struct ScriptedProbe {
        script: Mutex<VecDeque<Option<u64>>>,
        requested: Mutex<Vec<String>>,
    }

    impl ScriptedProbe {
        fn new(script: &[Option<u64>]) -> Self {
            Self {
                script: Mutex::new(script.iter().copied().collect()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpProbe for ScriptedProbe {
        async fn get(&self, url: &str) -> MonitorResult<Duration> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.script.lock().unwrap().pop_front().flatten() {
                Some(ms) => Ok(Duration::from_millis(ms)),
                None => Err(MonitorError::Timeout(5000)),
            }
        }
    }

    struct Urls(VecDeque<String>);

    #[async_trait]
    impl UrlSource for Urls {
        async fn next_url(&mut self) -> Option<String> {
            self.0.pop_front()
        }
    }

    fn fast_settings() -> MonitorSettings {
        MonitorSettings {
            delay_seconds: 0.0,
            ..MonitorSettings::default()
        }
    }

    #[tokio::test]
    async fn test_check_classifications() {
        let probe = ScriptedProbe::new(&[Some(100), Some(200), Some(750), None]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe);

        let expected = [
            (Classification::Normal, true),
            (Classification::High, true),
            (Classification::Critical, false),
            (Classification::Unreachable, true),
        ];
        for (classification, continues) in expected {
            let sample = monitor.check("example.com").await;
            assert_eq!(sample.classification, classification);
            assert_eq!(sample.continues(), continues);
        }
    }

    #[tokio::test]
    async fn test_check_normalizes_url() {
        let probe = ScriptedProbe::new(&[Some(10), Some(10)]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe);

        let sample = monitor.check("example.com").await;
        assert_eq!(sample.url, "https://example.com");
        monitor.check("http://example.com").await;

        assert_eq!(
            monitor.probe.requested(),
            vec!["https://example.com", "http://example.com"]
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_unreachable_without_request() {
        let monitor = LatencyMonitor::new(&fast_settings(), ScriptedProbe::new(&[]));
        let sample = monitor.check("not a url").await;

        assert_eq!(sample.classification, Classification::Unreachable);
        assert!(sample.error.is_some());
        assert!(monitor.probe.requested().is_empty());
    }

    #[tokio::test]
    async fn test_poll_stops_on_critical() {
        let probe = ScriptedProbe::new(&[Some(50), None, Some(300), Some(900), Some(50)]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe);

        let mut seen = Vec::new();
        let outcome = monitor
            .poll("example.com", |s| seen.push(s.classification))
            .await;

        assert_eq!(outcome, PollOutcome { checks: 4, end: PollEnd::Critical });
        assert_eq!(
            seen,
            vec![
                Classification::Normal,
                Classification::Unreachable,
                Classification::High,
                Classification::Critical,
            ]
        );
    }

    #[tokio::test]
    async fn test_poll_respects_max_checks() {
        let probe = ScriptedProbe::new(&[Some(10); 10]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe).with_max_checks(3);

        let outcome = monitor.poll("example.com", |_| {}).await;
        assert_eq!(outcome, PollOutcome { checks: 3, end: PollEnd::Exhausted });
    }

    #[tokio::test]
    async fn test_run_reprompts_after_critical() {
        let probe = ScriptedProbe::new(&[Some(10), Some(800), Some(760)]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe);
        let mut source = Urls(
            ["first.example", "", "http://second.example"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        let mut samples = Vec::new();
        monitor.run(&mut source, |s| samples.push(s.clone())).await;

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[1].classification, Classification::Critical);
        assert_eq!(samples[2].url, "http://second.example");
        assert_eq!(
            monitor.probe.requested(),
            vec![
                "https://first.example",
                "https://first.example",
                "http://second.example"
            ]
        );
    }

    #[tokio::test]
    async fn test_poll_invalid_url_ends_session() {
        let monitor = LatencyMonitor::new(&fast_settings(), ScriptedProbe::new(&[Some(10)]));

        let mut seen = Vec::new();
        let outcome = monitor
            .poll("exa mple.com", |s| seen.push(s.clone()))
            .await;

        assert_eq!(outcome, PollOutcome { checks: 0, end: PollEnd::InvalidInput });
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].classification, Classification::Unreachable);
        assert!(seen[0].error.as_deref().unwrap().contains("exa mple.com"));
        assert!(monitor.probe.requested().is_empty());
    }

    #[tokio::test]
    async fn test_run_moves_past_invalid_url() {
        let probe = ScriptedProbe::new(&[Some(900)]);
        let monitor = LatencyMonitor::new(&fast_settings(), probe);
        let mut source = Urls(
            ["exa mple.com", "good.example"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        let mut samples = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(5),
            monitor.run(&mut source, |s| samples.push(s.classification)),
        )
        .await
        .unwrap();

        assert_eq!(
            samples,
            vec![Classification::Unreachable, Classification::Critical]
        );
        assert_eq!(monitor.probe.requested(), vec!["https://good.example"]);
    }

    #[tokio::test]
    async fn test_legacy_mode_from_settings() {
        let settings = MonitorSettings {
            legacy_exact_critical: true,
            ..fast_settings()
        };
        let probe = ScriptedProbe::new(&[Some(751), Some(750)]);
        let monitor = LatencyMonitor::new(&settings, probe);

        assert_eq!(monitor.check("example.com").await.classification, Classification::High);
        assert_eq!(
            monitor.check("example.com").await.classification,
            Classification::Critical
        );
    }
}
