use std::time::Duration;

use serde::Deserialize;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for one [`crate::ReqwestTransport`].
///
/// Header values are treated as secrets: they are marked sensitive on the
/// wire client and redacted from `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Absolute base URL. Request paths are appended to it verbatim, so any
    /// path prefix (e.g. Telegram's `/bot<token>`) is preserved.
    pub base_url: String,

    /// Headers sent with every request.
    pub headers: Vec<(String, String)>,

    /// Whole-request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,

    /// `User-Agent` header; reqwest's default applies when `None`.
    pub user_agent: Option<String>,
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: None,
        }
    }
}

impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, _)| (name.as_str(), "[REDACTED]"))
            .collect();
        f.debug_struct("TransportConfig")
            .field("base_url", &"[REDACTED]")
            .field("headers", &headers)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let config = TransportConfig::new("https://api.telegram.org/bot123:SECRET")
            .header("Authorization", "Bot SECRET");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("SECRET"));
        assert!(rendered.contains("Authorization"));
    }

    #[test]
    fn zero_timeout_disables_it() {
        assert_eq!(TransportConfig::default().timeout(), Some(DEFAULT_TIMEOUT));
        assert_eq!(TransportConfig::default().timeout_secs(0).timeout(), None);
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: TransportConfig =
            serde_json::from_value(serde_json::json!({ "base_url": "https://discord.com/api/v10" }))
                .unwrap();
        assert_eq!(config.base_url, "https://discord.com/api/v10");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.headers.is_empty());
    }
}
