use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use transport::TransportConfig;

/// Versioned REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Configuration for one Discord bot.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token from the developer portal, without the `Bot ` prefix.
    pub token: Secret<String>,

    pub api_base: String,

    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl DiscordConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
            ..Self::default()
        }
    }

    /// Transport settings carrying the `Authorization: Bot <token>` header.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(self.api_base.trim_end_matches('/'))
            .header(
                "Authorization",
                format!("Bot {}", self.token.expose_secret()),
            )
            .timeout_secs(self.timeout_secs)
            .user_agent(concat!(
                "DiscordBot (https://github.com/pvandervelde/routebind, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
