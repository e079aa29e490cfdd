//! Target specification types with hostname support.
//!
//! Provides flexible target parsing supporting:
//! - Single IP addresses (IPv4 and IPv6, optionally bracketed)
//! - Hostnames (example.com)
//! - Comma-separated target lists

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// A single scan target that has been resolved to an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: IpAddr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("empty target")]
    Empty,
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// A parsed, not yet resolved, target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An IP literal.
    Single(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        // "[::1]" style IPv6 literal
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            return inner
                .parse::<IpAddr>()
                .map(Self::Single)
                .map_err(|_| TargetError::InvalidFormat(s.to_string()));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve this specification to a single address.
    ///
    /// IP literals are returned unchanged. Hostnames go through forward DNS
    /// and the first returned address is used. Nothing is cached.
    pub async fn resolve(&self) -> Result<IpAddr, TargetError> {
        match self {
            Self::Single(ip) => Ok(*ip),
            Self::Hostname(hostname) => {
                // System config honours /etc/hosts and the local resolver.
                let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
                    debug!(error = %e, "no system resolver config, using defaults");
                    TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
                });

                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                let ip = response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))?;
                debug!(%hostname, %ip, "resolved hostname");
                Ok(ip)
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Normalize a user-supplied target into a connectable address.
pub async fn resolve(target: &str) -> Result<ScanTarget, TargetError> {
    let ip = TargetSpec::parse(target)?.resolve().await?;
    Ok(ScanTarget::new(target.trim(), ip))
}

/// Split a raw target list on commas, trimming each piece.
///
/// Input without a comma yields a single target. Empty pieces are kept so
/// the caller can report them.
pub fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',').map(|piece| piece.trim().to_string()).collect()
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // A single trailing dot marks a fully qualified name.
    let s = s.strip_suffix('.').unwrap_or(s);

    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if !label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_ipv4() {
        let spec = TargetSpec::parse("192.168.1.1").unwrap();
        assert_eq!(spec, TargetSpec::Single(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
    }

    #[test]
    fn test_parse_ipv6() {
        let spec = TargetSpec::parse("::1").unwrap();
        assert_eq!(spec, TargetSpec::Single(IpAddr::V6(Ipv6Addr::LOCALHOST)));

        let spec = TargetSpec::parse("[::1]").unwrap();
        assert_eq!(spec, TargetSpec::Single(IpAddr::V6(Ipv6Addr::LOCALHOST)));
    }

    #[test]
    fn test_parse_hostname() {
        let spec = TargetSpec::parse("example.com").unwrap();
        assert!(matches!(spec, TargetSpec::Hostname(_)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(TargetSpec::parse("   "), Err(TargetError::Empty));
        assert!(matches!(
            TargetSpec::parse("not a host!"),
            Err(TargetError::InvalidFormat(_))
        ));
        assert!(matches!(
            TargetSpec::parse("[nope]"),
            Err(TargetError::InvalidFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_ip_literal_unchanged() {
        for literal in ["10.0.0.1", "127.0.0.1", "255.255.255.255", "::1", "fe80::1"] {
            let target = resolve(literal).await.unwrap();
            assert_eq!(target.ip, literal.parse::<IpAddr>().unwrap());
            assert_eq!(target.original, literal);
            assert_eq!(target.to_string(), literal);
        }
    }

    #[tokio::test]
    async fn test_resolve_invalid_target_fails() {
        let err = resolve("bad_host!").await.unwrap_err();
        assert!(matches!(err, TargetError::InvalidFormat(_)));
    }

    #[test]
    fn test_split_targets() {
        assert_eq!(split_targets("10.0.0.1, 10.0.0.2"), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(split_targets("  example.com "), vec!["example.com"]);
        assert_eq!(split_targets("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("example.com"));
        assert!(is_valid_hostname("example.com."));
        assert!(is_valid_hostname("sub.example.com"));
        assert!(is_valid_hostname("my-server"));
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-invalid.com"));
        assert!(!is_valid_hostname("under_score.com"));
    }
}
