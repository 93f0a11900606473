//! routebind adapter for the Telegram Bot API.
//!
//! Telegram answers every call with an envelope,
//! `{ "ok": true, "result": ... }` or
//! `{ "ok": false, "error_code": ..., "description": ... }`, so the
//! dispatcher runs with [`binding::ResponseStyle::Envelope`]. Failures surface
//! as `"Telegram API error <code>. <description>"`.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`routes`] | The `POST /<method>` route table |
//! | [`config`] | Bot token and endpoint settings |
//! | [`client`] | [`TelegramClient`] with typed wrappers |
//! | [`types`] | Bot API objects and parameters |

pub mod client;
pub mod config;
pub mod routes;
pub mod types;

pub use client::TelegramClient;
pub use config::{TelegramConfig, DEFAULT_API_BASE};
pub use types::{
    Chat, ChatAction, ChatId, Document, EditMessageTextParams, EditedMessage, File,
    GetUpdatesParams, InputFile, Message, ParseMode, SendMessageParams, Update, User,
};
