//! Shared value types for route dispatch.
//!
//! Everything here is created per call (arguments, payloads, requests,
//! responses) except [`HttpVerb`], which is part of a route's identity.

use std::collections::BTreeMap;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// HTTP verbs
// ---------------------------------------------------------------------------

/// The fixed set of HTTP verbs a route may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    /// Returns the upper-case wire name (`"GET"`, `"POST"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name one of the supported verbs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP verb '{0}'")]
pub struct UnknownVerb(pub String);

impl FromStr for HttpVerb {
    type Err = UnknownVerb;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnknownVerb(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Multipart forms
// ---------------------------------------------------------------------------

/// Content of a single multipart part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    /// A plain text field.
    Text(String),
    /// An uploaded file.
    File {
        data: Bytes,
        /// File name reported in the part's `Content-Disposition`.
        file_name: Option<String>,
        /// MIME type of the part; the transport's default applies when `None`.
        mime_type: Option<String>,
    },
}

/// One named part of a [`MultipartForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub content: PartContent,
}

/// An ordered multipart/form-data payload.
///
/// Built fresh for each call and handed to the transport by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    /// Appends a file part.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        data: impl Into<Bytes>,
        file_name: Option<String>,
        mime_type: Option<String>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            content: PartContent::File {
                data: data.into(),
                file_name,
                mime_type,
            },
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<FormPart> {
        self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the text value of the first part named `name`, if it is a text part.
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.content {
            PartContent::Text(v) if p.name == name => Some(v.as_str()),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Call payloads and arguments
// ---------------------------------------------------------------------------

/// The data a caller sends with a call.
///
/// The variant decides the request encoding; nothing inspects the value to
/// guess it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Encoded as an `application/json` body (or query string on `GET`).
    Json(Value),
    /// Encoded as `multipart/form-data`.
    Multipart(MultipartForm),
}

impl Payload {
    /// Serialises `value` into a [`Payload::Json`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Arguments of one call: path parameters plus an optional payload.
///
/// Positional arguments fill placeholders left to right; a named argument
/// whose key equals a placeholder's name (e.g. `"channel.id"`) fills that
/// placeholder instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<String>,
    named: BTreeMap<String, String>,
    payload: Option<Payload>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from positional path parameters.
    pub fn from_params<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positional: params.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Appends a positional path parameter.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named path parameter.
    #[must_use]
    pub fn named(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(placeholder.into(), value.into());
        self
    }

    /// Attaches the call payload, replacing any previous one.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn named_params(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    pub fn payload_ref(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, BTreeMap<String, String>, Option<Payload>) {
        (self.positional, self.named, self.payload)
    }
}

// ---------------------------------------------------------------------------
// Wire-level request and response
// ---------------------------------------------------------------------------

/// Body of an outbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Content type matching the body. Multipart boundaries are added by the
    /// transport when it serialises the form.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Multipart(_) => Some("multipart/form-data"),
        }
    }
}

/// A fully resolved request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub verb: HttpVerb,
    /// Path relative to the transport's base URL, always starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.body.content_type()
    }
}

/// A response as delivered by the transport, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Builds a response whose body is `value` serialised as JSON.
    pub fn json(status: u16, value: &Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON. An empty (or whitespace-only) body decodes
    /// to `None`.
    pub fn json_body(&self) -> Result<Option<Value>, serde_json::Error> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body).map(Some)
    }

    /// Body as lossy UTF-8, for error reports and traces.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn verbs_parse_case_insensitively() {
        assert_eq!("get".parse::<HttpVerb>().unwrap(), HttpVerb::Get);
        assert_eq!("Patch".parse::<HttpVerb>().unwrap(), HttpVerb::Patch);
        assert_eq!(
            "TRACE".parse::<HttpVerb>().unwrap_err(),
            UnknownVerb("TRACE".into())
        );
    }

    #[test]
    fn verbs_deserialize_from_upper_case() {
        let verb: HttpVerb = serde_json::from_value(json!("DELETE")).unwrap();
        assert_eq!(verb, HttpVerb::Delete);
        assert_eq!(verb.to_string(), "DELETE");
    }

    #[test]
    fn body_content_types() {
        assert_eq!(RequestBody::Empty.content_type(), None);
        assert_eq!(
            RequestBody::Json(json!({})).content_type(),
            Some("application/json")
        );
        assert_eq!(
            RequestBody::Multipart(MultipartForm::new()).content_type(),
            Some("multipart/form-data")
        );
    }

    #[test]
    fn empty_response_body_decodes_to_none() {
        assert_eq!(RawResponse::new(204, "").json_body().unwrap(), None);
        assert_eq!(
            RawResponse::new(200, "{\"id\":1}").json_body().unwrap(),
            Some(json!({"id": 1}))
        );
        assert!(RawResponse::new(200, "<html>").json_body().is_err());
    }

    #[test]
    fn multipart_text_lookup_skips_files() {
        let form = MultipartForm::new()
            .file("caption", &b"bytes"[..], None, None)
            .text("caption", "hello");
        assert_eq!(form.text_value("caption"), Some("hello"));
        assert_eq!(form.parts().len(), 2);
    }

    #[test]
    fn call_args_builder_collects_params() {
        let args = CallArgs::from_params(["1"])
            .arg("2")
            .named("message.id", "3")
            .payload(json!({"content": "hi"}));
        assert_eq!(args.positional(), ["1".to_string(), "2".to_string()]);
        assert_eq!(args.named_params()["message.id"], "3");
        assert_eq!(
            args.payload_ref(),
            Some(&Payload::Json(json!({"content": "hi"})))
        );
    }
}
