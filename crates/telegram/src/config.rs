use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use transport::TransportConfig;

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Configuration for one Telegram bot account.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: Secret<String>,

    /// Bot API server; override for a self-hosted server or a test double.
    pub api_base: String,

    /// Whole-request timeout in seconds. Long-polling `getUpdates` calls need
    /// this to exceed their own `timeout` parameter.
    pub timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
            ..Self::default()
        }
    }

    /// Transport settings: every method lives under `<api_base>/bot<token>`.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(format!(
            "{}/bot{}",
            self.api_base.trim_end_matches('/'),
            self.token.expose_secret()
        ))
        .timeout_secs(self.timeout_secs)
        .user_agent(concat!("routebind-telegram/", env!("CARGO_PKG_VERSION")))
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_embeds_the_token() {
        let mut config = TelegramConfig::new("123:abc");
        config.api_base = "http://localhost:8081/".into();
        assert_eq!(
            config.transport_config().base_url,
            "http://localhost:8081/bot123:abc"
        );
    }

    #[test]
    fn debug_redacts_the_token() {
        let rendered = format!("{:?}", TelegramConfig::new("123:SECRET"));
        assert!(!rendered.contains("SECRET"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: TelegramConfig =
            serde_json::from_value(serde_json::json!({ "token": "1:x" })).unwrap();
        assert_eq!(config.token.expose_secret(), "1:x");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout_secs, 60);
    }
}
