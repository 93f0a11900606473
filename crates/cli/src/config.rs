//! Configuration file loading.
//!
//! The file is optional. Values from it are the lowest layer: environment
//! variables and flags, resolved by clap, are applied on top in `main`.
//!
//! ```toml
//! [telegram]
//! token = "123456:ABC"
//! timeout_secs = 60
//!
//! [discord]
//! token = "MTIz..."
//! api_base = "https://discord.com/api/v10"
//! ```

use std::path::Path;

use anyhow::Context;
use discord::DiscordConfig;
use serde::Deserialize;
use telegram::TelegramConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub telegram: TelegramConfig,
    pub discord: DiscordConfig,
}

impl FileConfig {
    /// Loads `path`, or returns the defaults when no file was given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = FileConfig::load(None).unwrap();
        assert_eq!(config.telegram.api_base, telegram::DEFAULT_API_BASE);
        assert_eq!(config.discord.api_base, discord::DEFAULT_API_BASE);
        assert!(config.telegram.token.expose_secret().is_empty());
    }

    #[test]
    fn sections_are_independent() {
        let config = FileConfig::parse(
            r#"
            [discord]
            token = "d-token"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.discord.token.expose_secret(), "d-token");
        assert_eq!(config.discord.timeout_secs, 5);
        assert_eq!(config.telegram.timeout_secs, 60);
    }

    #[test]
    fn unknown_sections_are_rejected() {
        assert!(FileConfig::parse("[slack]\ntoken = \"x\"\n").is_err());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = FileConfig::load(Some(Path::new("/nonexistent/routebind.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/routebind.toml"));
    }
}
