//! routebind adapter for the Discord REST API (channel message resource).
//!
//! Routes are declared as a JSON table with `{channel.id}` / `{message.id}`
//! placeholders. Typed methods fill them by name; untyped calls through
//! [`DiscordClient::call`] may pass them positionally, in path order.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`routes`] | Channel message route table |
//! | [`config`] | Bot token and endpoint settings |
//! | [`client`] | [`DiscordClient`] |
//! | [`types`] | Message, embed and gateway event shapes |

pub mod client;
pub mod config;
pub mod routes;
pub mod types;

pub use client::DiscordClient;
pub use config::{DiscordConfig, DEFAULT_API_BASE};
pub use types::{
    Attachment, AttachmentRef, BulkDeleteParams, ChannelMention, CreateMessageParams,
    EditMessageParams, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, EmbedProvider,
    EmbedVideo, FileUpload, GetMessagesParams, Message, MessageDeleteBulkEvent,
    MessageDeleteEvent, MessageReference, MessageType, Snowflake, User,
};
