use std::sync::Arc;

use binding::{
    ApiClient, ArgumentError, CallArgs, CallError, CallTracer, ConfigurationError, Dispatcher,
    ErrorShape, HttpTransport, MultipartForm, Payload, PlatformName, ResponsePolicy,
    TracingCallTracer,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use transport::ReqwestTransport;

use crate::{
    routes, AttachmentRef, BulkDeleteParams, CreateMessageParams, DiscordConfig,
    EditMessageParams, FileUpload, GetMessagesParams, Message,
};

const CHANNEL: &str = "channel.id";
const MESSAGE: &str = "message.id";

/// Typed client for the Discord channel message endpoints.
///
/// Discord returns bare resources and reports failures as
/// `{ "code": ..., "message": ... }` with a non-2xx status; those surface as
/// `"Discord API error <code>. <message>"`. Errors without that body (rate
/// limits, gateway timeouts) come back as [`binding::TransportError::Status`].
#[derive(Debug, Clone)]
pub struct DiscordClient {
    api: ApiClient,
}

impl DiscordClient {
    pub fn new(config: &DiscordConfig) -> Result<Self, ConfigurationError> {
        let transport = ReqwestTransport::new(&config.transport_config())?;
        tracing::debug!(api_base = %config.api_base, "discord client configured");
        Self::with_transport(Arc::new(transport), Arc::new(TracingCallTracer))
    }

    pub fn with_transport(
        transport: Arc<dyn HttpTransport>,
        tracer: Arc<dyn CallTracer>,
    ) -> Result<Self, ConfigurationError> {
        let platform = PlatformName::new("Discord").ok_or_else(|| ConfigurationError::Invalid {
            message: "platform name is empty".into(),
        })?;
        let policy = ResponsePolicy::bare(platform)
            .with_error_shape(ErrorShape::new("code", "message"));
        let dispatcher = Dispatcher::new(transport, policy).with_tracer(tracer);
        Ok(Self {
            api: ApiClient::install(&routes::route_table()?, dispatcher),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Calls any installed method by name.
    pub async fn call(&self, method: &str, args: CallArgs) -> Result<Value, CallError> {
        self.api.call(method, args).await
    }

    fn channel(channel_id: &str) -> CallArgs {
        CallArgs::new().named(CHANNEL, channel_id)
    }

    fn message(channel_id: &str, message_id: &str) -> CallArgs {
        Self::channel(channel_id).named(MESSAGE, message_id)
    }

    fn json<P: Serialize + ?Sized>(params: &P) -> Result<Payload, ArgumentError> {
        Payload::json(params).map_err(|e| ArgumentError::Serialize {
            message: e.to_string(),
        })
    }

    async fn call_unit(&self, method: &str, args: CallArgs) -> Result<(), CallError> {
        self.api.call(method, args).await.map(drop)
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        method: &str,
        args: CallArgs,
    ) -> Result<T, CallError> {
        self.api.call_as(method, args).await
    }

    /// Lists messages; the parameters travel as the query string.
    pub async fn get_channel_messages(
        &self,
        channel_id: &str,
        params: &GetMessagesParams,
    ) -> Result<Vec<Message>, CallError> {
        let args = Self::channel(channel_id).payload(Self::json(params)?);
        self.call_typed("getChannelMessages", args).await
    }

    pub async fn get_channel_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Message, CallError> {
        self.call_typed("getChannelMessage", Self::message(channel_id, message_id))
            .await
    }

    pub async fn create_message(
        &self,
        channel_id: &str,
        params: &CreateMessageParams,
    ) -> Result<Message, CallError> {
        let args = Self::channel(channel_id).payload(Self::json(params)?);
        self.call_typed("createMessage", args).await
    }

    /// Creates a message with uploaded files.
    ///
    /// The JSON body goes in a `payload_json` part and each file in a
    /// `files[n]` part. When `params.attachments` is empty it is filled with
    /// one entry per file so the uploads are attached in order.
    pub async fn create_message_with_files(
        &self,
        channel_id: &str,
        params: &CreateMessageParams,
        files: Vec<FileUpload>,
    ) -> Result<Message, CallError> {
        let mut params = params.clone();
        if params.attachments.is_empty() {
            params.attachments = files
                .iter()
                .zip(0_u64..)
                .map(|(file, id)| AttachmentRef {
                    id,
                    filename: file.file_name.clone(),
                    description: None,
                })
                .collect();
        }
        let payload_json =
            serde_json::to_string(&params).map_err(|e| ArgumentError::Serialize {
                message: e.to_string(),
            })?;

        let form = files.into_iter().enumerate().fold(
            MultipartForm::new().text("payload_json", payload_json),
            |form, (index, file)| {
                form.file(
                    format!("files[{index}]"),
                    file.data,
                    Some(file.file_name),
                    file.mime_type,
                )
            },
        );
        self.call_typed("createMessage", Self::channel(channel_id).payload(form))
            .await
    }

    pub async fn crosspost_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<Message, CallError> {
        self.call_typed("crosspostMessage", Self::message(channel_id, message_id))
            .await
    }

    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        params: &EditMessageParams,
    ) -> Result<Message, CallError> {
        let args = Self::message(channel_id, message_id).payload(Self::json(params)?);
        self.call_typed("editMessage", args).await
    }

    pub async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), CallError> {
        self.call_unit("deleteMessage", Self::message(channel_id, message_id))
            .await
    }

    pub async fn bulk_delete_messages(
        &self,
        channel_id: &str,
        params: &BulkDeleteParams,
    ) -> Result<(), CallError> {
        let args = Self::channel(channel_id).payload(Self::json(params)?);
        self.call_unit("bulkDeleteMessages", args).await
    }

    pub async fn get_pinned_messages(&self, channel_id: &str) -> Result<Vec<Message>, CallError> {
        self.call_typed("getPinnedMessages", Self::channel(channel_id))
            .await
    }

    pub async fn pin_message(&self, channel_id: &str, message_id: &str) -> Result<(), CallError> {
        self.call_unit("pinMessage", Self::message(channel_id, message_id))
            .await
    }

    pub async fn unpin_message(&self, channel_id: &str, message_id: &str) -> Result<(), CallError> {
        self.call_unit("unpinMessage", Self::message(channel_id, message_id))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use binding::testing::RecordingTransport;
    use binding::{HttpVerb, NoopCallTracer, PartContent, RawResponse, RequestBody, TransportError};
    use serde_json::json;

    use super::*;

    fn client() -> (DiscordClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let client =
            DiscordClient::with_transport(transport.clone(), Arc::new(NoopCallTracer)).unwrap();
        (client, transport)
    }

    fn message_json(id: &str) -> Value {
        json!({
            "id": id,
            "channel_id": "10",
            "author": { "id": "1", "username": "bot", "bot": true },
            "content": "hi",
            "timestamp": "2024-01-01T00:00:00+00:00",
            "type": 0
        })
    }

    #[tokio::test]
    async fn create_message_posts_json_to_the_channel() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(200, &message_json("77")));

        let message = client
            .create_message("10", &CreateMessageParams::text("hi"))
            .await
            .unwrap();

        assert_eq!(message.id, "77");
        assert!(message.author.bot);
        let request = transport.last_request().unwrap();
        assert_eq!(request.verb, HttpVerb::Post);
        assert_eq!(request.path, "/channels/10/messages");
        assert_eq!(request.body, RequestBody::Json(json!({ "content": "hi" })));
    }

    #[tokio::test]
    async fn get_channel_messages_sends_a_query() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(200, &json!([message_json("1")])));

        let messages = client
            .get_channel_messages(
                "10",
                &GetMessagesParams {
                    after: Some("5".into()),
                    limit: Some(2),
                    ..GetMessagesParams::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(messages.len(), 1);
        let request = transport.last_request().unwrap();
        assert_eq!(request.verb, HttpVerb::Get);
        assert_eq!(request.path, "/channels/10/messages");
        assert_eq!(request.body, RequestBody::Empty);
        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("after".to_string(), "5".to_string()),
                ("limit".to_string(), "2".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn message_routes_resolve_both_placeholders() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(200, &message_json("9")));
        transport.push_response(RawResponse::new(204, ""));
        transport.push_response(RawResponse::new(204, ""));

        client.edit_message("10", "9", &EditMessageParams::default()).await.unwrap();
        client.pin_message("10", "9").await.unwrap();
        client.unpin_message("10", "9").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].verb, HttpVerb::Patch);
        assert_eq!(requests[0].path, "/channels/10/messages/9");
        assert_eq!(requests[1].verb, HttpVerb::Put);
        assert_eq!(requests[1].path, "/channels/10/pins/9");
        assert_eq!(requests[2].verb, HttpVerb::Delete);
        assert_eq!(requests[2].path, "/channels/10/pins/9");
    }

    #[tokio::test]
    async fn bulk_delete_accepts_no_content() {
        let (client, transport) = client();
        transport.push_response(RawResponse::new(204, ""));

        client
            .bulk_delete_messages(
                "10",
                &BulkDeleteParams {
                    messages: vec!["1".into(), "2".into()],
                },
            )
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.path, "/channels/10/messages/bulk-delete");
        assert_eq!(
            request.body,
            RequestBody::Json(json!({ "messages": ["1", "2"] }))
        );
    }

    #[tokio::test]
    async fn files_go_out_as_multipart_with_payload_json() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(200, &message_json("3")));

        client
            .create_message_with_files(
                "10",
                &CreateMessageParams::text("see attached"),
                vec![
                    FileUpload::new(&b"a"[..], "a.txt"),
                    FileUpload::new(&b"\x89PNG"[..], "b.png").mime_type("image/png"),
                ],
            )
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.content_type(), Some("multipart/form-data"));
        let RequestBody::Multipart(form) = request.body else {
            panic!("expected a multipart body");
        };
        let payload: Value = serde_json::from_str(form.text_value("payload_json").unwrap()).unwrap();
        assert_eq!(
            payload,
            json!({
                "content": "see attached",
                "attachments": [
                    { "id": 0, "filename": "a.txt" },
                    { "id": 1, "filename": "b.png" }
                ]
            })
        );
        let names: Vec<&str> = form.parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["payload_json", "files[0]", "files[1]"]);
        match &form.parts()[2].content {
            PartContent::File { mime_type, .. } => {
                assert_eq!(mime_type.as_deref(), Some("image/png"))
            }
            other => panic!("unexpected part {other:?}"),
        }
    }

    #[tokio::test]
    async fn structured_errors_use_code_and_message() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(
            404,
            &json!({ "message": "Unknown Message", "code": 10008 }),
        ));

        let err = client.get_channel_message("10", "404").await.unwrap_err();

        assert_eq!(err.to_string(), "Discord API error 10008. Unknown Message");
        assert_eq!(err.platform_error().unwrap().code, 10008);
    }

    #[tokio::test]
    async fn rate_limits_keep_the_status_error() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(
            429,
            &json!({ "message": "You are being rate limited.", "retry_after": 0.5, "global": false }),
        ));

        let err = client.delete_message("10", "1").await.unwrap_err();

        assert!(matches!(
            err,
            CallError::Transport(TransportError::Status { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn untyped_call_accepts_positional_ids() {
        let (client, transport) = client();
        transport.push_response(RawResponse::json(200, &message_json("8")));

        let value = client
            .call("crosspostMessage", CallArgs::from_params(["10", "8"]))
            .await
            .unwrap();

        assert_eq!(value["id"], "8");
        assert_eq!(
            transport.last_request().unwrap().path,
            "/channels/10/messages/8/crosspost"
        );
    }

    #[tokio::test]
    async fn missing_message_id_fails_before_sending() {
        let (client, transport) = client();

        let err = client
            .call("getChannelMessage", CallArgs::from_params(["10"]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CallError::Argument(ArgumentError::MissingPathParameter { .. })
        ));
        assert!(transport.requests().is_empty());
    }
}
