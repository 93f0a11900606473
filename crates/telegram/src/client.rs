use std::sync::Arc;

use binding::{
    ApiClient, ArgumentError, CallArgs, CallError, CallTracer, ConfigurationError, Dispatcher,
    HttpTransport, MultipartForm, Payload, PlatformName, ResponsePolicy, TracingCallTracer,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use transport::ReqwestTransport;

use crate::{
    routes, ChatAction, ChatId, EditMessageTextParams, EditedMessage, File, GetUpdatesParams,
    InputFile, Message, SendMessageParams, TelegramConfig, Update, User,
};

/// Typed Telegram Bot API client.
///
/// Every method in [`routes::METHODS`] is callable by name through
/// [`TelegramClient::call`]; the common ones also have typed wrappers.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    api: ApiClient,
}

impl TelegramClient {
    /// Creates a client that talks to the Bot API over HTTPS.
    pub fn new(config: &TelegramConfig) -> Result<Self, ConfigurationError> {
        let transport = ReqwestTransport::new(&config.transport_config())?;
        tracing::debug!(api_base = %config.api_base, "telegram client configured");
        Self::with_transport(Arc::new(transport), Arc::new(TracingCallTracer))
    }

    /// Creates a client over any transport, e.g. a recording double in tests.
    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        tracer: Arc<dyn CallTracer>,
    ) -> Result<Self, ConfigurationError> {
        let platform = PlatformName::new("Telegram").ok_or_else(|| ConfigurationError::Invalid {
            message: "platform name is empty".into(),
        })?;
        let dispatcher =
            Dispatcher::new(transport, ResponsePolicy::envelope(platform)).with_tracer(tracer);
        Ok(Self {
            api: ApiClient::install(&routes::route_table()?, dispatcher),
        })
    }

    /// The underlying method registry.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Calls any Bot API method by name with an optional payload.
    pub async fn call(&self, method: &str, payload: Option<Payload>) -> Result<Value, CallError> {
        let mut args = CallArgs::new();
        if let Some(payload) = payload {
            args = args.payload(payload);
        }
        self.api.call(method, args).await
    }

    async fn call_json<P, T>(&self, method: &str, params: &P) -> Result<T, CallError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = Payload::json(params).map_err(|e| ArgumentError::Serialize {
            message: e.to_string(),
        })?;
        self.api
            .call_as(method, CallArgs::new().payload(payload))
            .await
    }

    pub async fn get_me(&self) -> Result<User, CallError> {
        self.api.call_as("getMe", CallArgs::new()).await
    }

    pub async fn get_updates(&self, params: &GetUpdatesParams) -> Result<Vec<Update>, CallError> {
        self.call_json("getUpdates", params).await
    }

    pub async fn send_message(&self, params: &SendMessageParams) -> Result<Message, CallError> {
        self.call_json("sendMessage", params).await
    }

    /// Uploads `document` to `chat_id` as a multipart request.
    pub async fn send_document(
        &self,
        chat_id: impl Into<ChatId>,
        document: InputFile,
        caption: Option<&str>,
    ) -> Result<Message, CallError> {
        let chat_id: ChatId = chat_id.into();
        let mut form = MultipartForm::new().text("chat_id", chat_id.to_string());
        if let Some(caption) = caption {
            form = form.text("caption", caption);
        }
        form = form.file(
            "document",
            document.data,
            Some(document.file_name),
            document.mime_type,
        );
        self.api
            .call_as("sendDocument", CallArgs::new().payload(form))
            .await
    }

    pub async fn edit_message_text(
        &self,
        params: &EditMessageTextParams,
    ) -> Result<EditedMessage, CallError> {
        self.call_json("editMessageText", params).await
    }

    pub async fn delete_message(
        &self,
        chat_id: impl Into<ChatId>,
        message_id: i64,
    ) -> Result<bool, CallError> {
        let chat_id: ChatId = chat_id.into();
        let params = serde_json::json!({ "chat_id": chat_id, "message_id": message_id });
        self.call_json("deleteMessage", &params).await
    }

    pub async fn send_chat_action(
        &self,
        chat_id: impl Into<ChatId>,
        action: ChatAction,
    ) -> Result<bool, CallError> {
        let chat_id: ChatId = chat_id.into();
        let params = serde_json::json!({ "chat_id": chat_id, "action": action });
        self.call_json("sendChatAction", &params).await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<File, CallError> {
        self.call_json("getFile", &serde_json::json!({ "file_id": file_id }))
            .await
    }
}
