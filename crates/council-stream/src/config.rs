use std::time::Duration;

use crate::errors::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the deliberation backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend API.
    pub base_url: String,
    /// Bearer token attached to every request, if any.
    pub token: Option<String>,
    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,
    /// Overall request timeout. `None` by default because session streams
    /// stay open for as long as the council deliberates.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builds a config from the environment.
    ///
    /// - `COUNCIL_API_URL`: base URL (default `http://localhost:8000`).
    /// - `COUNCIL_API_TOKEN`: bearer token (optional).
    /// - `COUNCIL_CONNECT_TIMEOUT_SECS`: connect timeout (default 10).
    /// - `COUNCIL_REQUEST_TIMEOUT_SECS`: overall timeout (default none).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = non_blank(lookup("COUNCIL_API_URL")) {
            config.base_url = url;
        }
        config.token = non_blank(lookup("COUNCIL_API_TOKEN"));
        if let Some(raw) = non_blank(lookup("COUNCIL_CONNECT_TIMEOUT_SECS")) {
            config.connect_timeout = parse_secs("COUNCIL_CONNECT_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = non_blank(lookup("COUNCIL_REQUEST_TIMEOUT_SECS")) {
            config.request_timeout = Some(parse_secs("COUNCIL_REQUEST_TIMEOUT_SECS", &raw)?);
        }
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "a positive number of seconds",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn reads_all_keys() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("COUNCIL_API_URL", "https://council.example/api/"),
            ("COUNCIL_API_TOKEN", " secret "),
            ("COUNCIL_CONNECT_TIMEOUT_SECS", "3"),
            ("COUNCIL_REQUEST_TIMEOUT_SECS", "600"),
        ]))
        .expect("config");
        assert_eq!(config.base_url, "https://council.example/api/");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn rejects_bad_timeouts() {
        for raw in ["abc", "0", "-1"] {
            let err = ClientConfig::from_lookup(lookup(&[("COUNCIL_CONNECT_TIMEOUT_SECS", raw)]))
                .expect_err("should reject");
            assert!(matches!(err, ConfigError::InvalidValue { key: "COUNCIL_CONNECT_TIMEOUT_SECS", .. }));
        }
    }

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        let config = ClientConfig::new("http://host:8000/");
        assert_eq!(config.endpoint("/council/run"), "http://host:8000/council/run");
        assert_eq!(
            ClientConfig::new("http://host").endpoint("superchat/chat"),
            "http://host/superchat/chat"
        );
    }
}
