//! Service Configuration Settings
//!
//! Configuration types for the venue stream, loaded from environment
//! variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default Yelp Fusion API base URL.
pub const DEFAULT_YELP_BASE_URL: &str = "https://api.yelp.com/v3";

/// Largest page size the search endpoint accepts.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Yelp Fusion API credential.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub const fn new(api_key: String) -> Self {
        Self { api_key }
    }

    /// Get the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Search provider settings.
#[derive(Debug, Clone)]
pub struct YelpSettings {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Timeout for one search request.
    pub timeout: Duration,
    /// `limit` parameter sent with each search.
    pub search_limit: u32,
}

impl Default for YelpSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_YELP_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            search_limit: MAX_SEARCH_LIMIT,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Listen address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
}

impl ServerSettings {
    /// Socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
        }
    }
}

/// Console observer settings.
#[derive(Debug, Clone)]
pub struct ObserverSettings {
    /// One console observer is attached per label.
    pub labels: Vec<String>,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            labels: vec![
                "Observer 1".to_string(),
                "Observer 2".to_string(),
                "Observer 3".to_string(),
            ],
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct VenueStreamConfig {
    /// API credential.
    pub credentials: Credentials,
    /// Search provider settings.
    pub yelp: YelpSettings,
    /// HTTP listener settings.
    pub server: ServerSettings,
    /// Console observer settings.
    pub observers: ObserverSettings,
}

impl VenueStreamConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `YELP_API_KEY` is missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("YELP_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("YELP_API_KEY".to_string()))?;

        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyValue("YELP_API_KEY".to_string()));
        }

        let yelp_defaults = YelpSettings::default();
        let yelp = YelpSettings {
            base_url: lookup("YELP_API_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .map_or(yelp_defaults.base_url, |v| {
                    v.trim().trim_end_matches('/').to_string()
                }),
            timeout: parse_duration_secs(&lookup, "YELP_TIMEOUT_SECS", yelp_defaults.timeout),
            search_limit: parse_or(&lookup, "YELP_SEARCH_LIMIT", yelp_defaults.search_limit)
                .clamp(1, MAX_SEARCH_LIMIT),
        };

        let server_defaults = ServerSettings::default();
        let server = ServerSettings {
            host: parse_or(&lookup, "VENUE_STREAM_HOST", server_defaults.host),
            port: parse_or(&lookup, "VENUE_STREAM_PORT", server_defaults.port),
        };

        let observers = lookup("VENUE_STREAM_OBSERVERS")
            .map(|v| parse_labels(&v))
            .filter(|labels| !labels.is_empty())
            .map_or_else(ObserverSettings::default, |labels| ObserverSettings {
                labels,
            });

        Ok(Self {
            credentials: Credentials::new(api_key.trim().to_string()),
            yelp,
            server,
            observers,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_duration_secs<F>(lookup: &F, key: &str, default: Duration) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map_or(default, Duration::from_secs)
}

fn parse_labels(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = VenueStreamConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "YELP_API_KEY"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = VenueStreamConfig::from_lookup(lookup_from(&[("YELP_API_KEY", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(_)));
    }

    #[test]
    fn defaults_apply() {
        let config =
            VenueStreamConfig::from_lookup(lookup_from(&[("YELP_API_KEY", "secret")])).unwrap();

        assert_eq!(config.credentials.api_key(), "secret");
        assert_eq!(config.yelp.base_url, DEFAULT_YELP_BASE_URL);
        assert_eq!(config.yelp.timeout, Duration::from_secs(10));
        assert_eq!(config.yelp.search_limit, 50);
        assert_eq!(config.server.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(
            config.observers.labels,
            vec!["Observer 1", "Observer 2", "Observer 3"]
        );
    }

    #[test]
    fn overrides_apply() {
        let config = VenueStreamConfig::from_lookup(lookup_from(&[
            ("YELP_API_KEY", "secret"),
            ("YELP_API_BASE_URL", "http://127.0.0.1:9999/v3/"),
            ("YELP_TIMEOUT_SECS", "3"),
            ("YELP_SEARCH_LIMIT", "20"),
            ("VENUE_STREAM_HOST", "0.0.0.0"),
            ("VENUE_STREAM_PORT", "9000"),
            ("VENUE_STREAM_OBSERVERS", "left, right ,,"),
        ]))
        .unwrap();

        assert_eq!(config.yelp.base_url, "http://127.0.0.1:9999/v3");
        assert_eq!(config.yelp.timeout, Duration::from_secs(3));
        assert_eq!(config.yelp.search_limit, 20);
        assert_eq!(config.server.socket_addr().to_string(), "0.0.0.0:9000");
        assert_eq!(config.observers.labels, vec!["left", "right"]);
    }

    #[test]
    fn invalid_optional_values_fall_back() {
        let config = VenueStreamConfig::from_lookup(lookup_from(&[
            ("YELP_API_KEY", "secret"),
            ("YELP_TIMEOUT_SECS", "0"),
            ("YELP_SEARCH_LIMIT", "500"),
            ("VENUE_STREAM_PORT", "not-a-port"),
            ("VENUE_STREAM_OBSERVERS", " , "),
        ]))
        .unwrap();

        assert_eq!(config.yelp.timeout, Duration::from_secs(10));
        assert_eq!(config.yelp.search_limit, MAX_SEARCH_LIMIT);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.observers.labels.len(), 3);
    }

    #[test]
    fn credentials_redacted_debug() {
        let creds = Credentials::new("key123".to_string());
        let debug = format!("{creds:?}");
        assert!(!debug.contains("key123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
