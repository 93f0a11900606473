//! routebind CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load the optional TOML file, then let
//!    environment variables and flags override it.
//! 2. **Wire observability**: install the `tracing` subscriber (human or JSON
//!    output, plus OTLP export when configured).
//! 3. **Construct the adapter client** for the chosen platform and invoke any
//!    installed method by name, printing the normalized JSON result.
//!
//! ```text
//! routebind telegram call sendMessage --data '{"chat_id": 42, "text": "hi"}'
//! routebind discord call getChannelMessage 1234 5678
//! routebind discord call createMessage --param channel.id=1234 --data '{"content": "hi"}'
//! routebind discord methods
//! ```

mod config;
mod observability;

use std::path::PathBuf;

use anyhow::{bail, Context};
use binding::{ApiClient, CallArgs, Payload, RouteTable};
use clap::{Args, Parser, Subcommand};
use discord::{DiscordClient, DiscordConfig};
use secrecy::{ExposeSecret, Secret};
use telegram::{TelegramClient, TelegramConfig};

use crate::config::FileConfig;
use crate::observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "routebind", version, about = "Call chat-platform REST methods by name")]
struct Cli {
    /// TOML file with `[telegram]` / `[discord]` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    platform: Platform,
}

#[derive(Debug, Subcommand)]
enum Platform {
    /// Telegram Bot API.
    Telegram(TelegramArgs),
    /// Discord REST API.
    Discord(DiscordArgs),
}

#[derive(Debug, Args)]
struct TelegramArgs {
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(flatten)]
    endpoint: EndpointArgs,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Args)]
struct DiscordArgs {
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(flatten)]
    endpoint: EndpointArgs,

    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, Args)]
struct EndpointArgs {
    /// Override the API base URL.
    #[arg(long)]
    api_base: Option<String>,

    /// Whole-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Invoke a method and print its result as JSON.
    Call(CallCommand),
    /// List installed methods with their routes.
    Methods,
}

#[derive(Debug, Args)]
struct CallCommand {
    /// Method name, e.g. `sendMessage` or `getChannelMessages`.
    method: String,

    /// Path parameters, consumed in placeholder order.
    args: Vec<String>,

    /// Named path parameter, e.g. `--param channel.id=123`.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// JSON payload.
    #[arg(long)]
    data: Option<String>,
}

impl CallCommand {
    fn call_args(&self) -> anyhow::Result<CallArgs> {
        let mut args = self
            .params
            .iter()
            .fold(CallArgs::from_params(self.args.clone()), |args, (k, v)| {
                args.named(k.clone(), v.clone())
            });
        if let Some(data) = &self.data {
            let value: serde_json::Value =
                serde_json::from_str(data).context("--data is not valid JSON")?;
            args = args.payload(Payload::Json(value));
        }
        Ok(args)
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

fn apply_overrides(
    token: &mut Secret<String>,
    api_base: &mut String,
    timeout_secs: &mut u64,
    flag_token: Option<String>,
    endpoint: EndpointArgs,
) {
    if let Some(flag_token) = flag_token {
        *token = Secret::new(flag_token);
    }
    if let Some(base) = endpoint.api_base {
        *api_base = base;
    }
    if let Some(secs) = endpoint.timeout_secs {
        *timeout_secs = secs;
    }
}

fn require_token(token: &Secret<String>, env_var: &str) -> anyhow::Result<()> {
    if token.expose_secret().trim().is_empty() {
        bail!("no bot token: pass --token, set {env_var}, or add it to the config file");
    }
    Ok(())
}

fn print_methods(table: &RouteTable) {
    for route in table.iter() {
        println!(
            "{:<24} {:<6} {}",
            route.method().as_str(),
            route.verb().as_str(),
            route.template().as_str()
        );
    }
}

async fn invoke(api: &ApiClient, command: &CallCommand) -> anyhow::Result<()> {
    let args = command.call_args()?;
    tracing::info!(platform = %api.platform(), method = %command.method, "calling");
    let value = api
        .call(&command.method, args)
        .await
        .with_context(|| format!("{} failed", command.method))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = FileConfig::load(cli.config.as_deref())?;

    match cli.platform {
        Platform::Telegram(args) => {
            let mut config: TelegramConfig = file.telegram;
            apply_overrides(
                &mut config.token,
                &mut config.api_base,
                &mut config.timeout_secs,
                args.token,
                args.endpoint,
            );
            match args.action {
                Action::Methods => print_methods(&telegram::routes::route_table()?),
                Action::Call(command) => {
                    require_token(&config.token, "TELEGRAM_BOT_TOKEN")?;
                    let client = TelegramClient::new(&config)?;
                    invoke(client.api(), &command).await?;
                }
            }
        }
        Platform::Discord(args) => {
            let mut config: DiscordConfig = file.discord;
            apply_overrides(
                &mut config.token,
                &mut config.api_base,
                &mut config.timeout_secs,
                args.token,
                args.endpoint,
            );
            match args.action {
                Action::Methods => print_methods(&discord::routes::route_table()?),
                Action::Call(command) => {
                    require_token(&config.token, "DISCORD_BOT_TOKEN")?;
                    let client = DiscordClient::new(&config)?;
                    invoke(client.api(), &command).await?;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = observability::init(cli.log_format)?;
    let result = run(cli).await;
    telemetry.shutdown();
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use binding::HttpVerb;
    use clap::CommandFactory;
    use serde_json::json;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_a_discord_call_with_named_params_and_data() {
        let cli = Cli::try_parse_from([
            "routebind",
            "--log-format",
            "json",
            "discord",
            "--api-base",
            "http://localhost:9000",
            "call",
            "createMessage",
            "--param",
            "channel.id=10",
            "--data",
            r#"{"content":"hi"}"#,
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        let Platform::Discord(args) = cli.platform else {
            panic!("expected the discord subcommand");
        };
        assert_eq!(args.endpoint.api_base.as_deref(), Some("http://localhost:9000"));
        let Action::Call(command) = args.action else {
            panic!("expected call");
        };
        let call_args = command.call_args().unwrap();
        assert_eq!(
            call_args.named_params().get("channel.id").map(String::as_str),
            Some("10")
        );
        assert_eq!(
            call_args.payload_ref(),
            Some(&Payload::Json(json!({ "content": "hi" })))
        );
    }

    #[test]
    fn positional_path_args_are_kept_in_order() {
        let cli =
            Cli::try_parse_from(["routebind", "discord", "call", "pinMessage", "10", "20"])
                .unwrap();
        let Platform::Discord(DiscordArgs {
            action: Action::Call(command),
            ..
        }) = cli.platform
        else {
            panic!("expected discord call");
        };
        assert_eq!(command.call_args().unwrap().positional(), ["10", "20"]);
    }

    #[test]
    fn invalid_data_is_reported() {
        let command = CallCommand {
            method: "getMe".into(),
            args: vec![],
            params: vec![],
            data: Some("{not json".into()),
        };
        let err = command.call_args().unwrap_err();
        assert!(err.to_string().contains("--data"));
    }

    #[test]
    fn param_values_need_a_name() {
        assert_eq!(
            parse_param("message.id=5").unwrap(),
            ("message.id".to_string(), "5".to_string())
        );
        assert!(parse_param("=5").is_err());
        assert!(parse_param("message.id").is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = FileConfig::parse("[telegram]\ntoken = \"file\"\ntimeout_secs = 10\n")
            .unwrap()
            .telegram;
        apply_overrides(
            &mut config.token,
            &mut config.api_base,
            &mut config.timeout_secs,
            Some("flag".into()),
            EndpointArgs {
                api_base: None,
                timeout_secs: Some(3),
            },
        );
        assert_eq!(config.token.expose_secret(), "flag");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.api_base, telegram::DEFAULT_API_BASE);
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = require_token(&Secret::new(String::new()), "DISCORD_BOT_TOKEN").unwrap_err();
        assert!(err.to_string().contains("DISCORD_BOT_TOKEN"));
    }

    #[test]
    fn method_listing_covers_both_tables() {
        let discord = discord::routes::route_table().unwrap();
        assert_eq!(discord.get("getPinnedMessages").unwrap().verb(), HttpVerb::Get);
        let telegram = telegram::routes::route_table().unwrap();
        assert!(telegram.get("sendMessage").is_some());
    }
}
