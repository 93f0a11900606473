//! Telegram Bot API route table.
//!
//! Every Bot API method is `POST /<methodName>` relative to the bot's base
//! URL, and installs a client method of the same name.

use binding::{ConfigurationError, HttpVerb, RouteTable};

/// Bot API methods exposed by [`crate::TelegramClient`].
pub const METHODS: &[&str] = &[
    // Updates
    "getUpdates",
    "setWebhook",
    "deleteWebhook",
    "getWebhookInfo",
    // Bot identity and commands
    "getMe",
    "setMyCommands",
    "getMyCommands",
    // Sending
    "sendMessage",
    "forwardMessage",
    "copyMessage",
    "sendPhoto",
    "sendDocument",
    "sendAudio",
    "sendVideo",
    "sendVoice",
    "sendChatAction",
    // Editing
    "editMessageText",
    "editMessageCaption",
    "editMessageReplyMarkup",
    "deleteMessage",
    // Files, chats, callbacks
    "getFile",
    "getChat",
    "getChatMember",
    "answerCallbackQuery",
];

/// Builds the Telegram route table.
pub fn route_table() -> Result<RouteTable, ConfigurationError> {
    METHODS
        .iter()
        .fold(RouteTable::builder(), |builder, method| {
            builder.route(format!("/{method}"), [(HttpVerb::Post, *method)])
        })
        .build()
}
