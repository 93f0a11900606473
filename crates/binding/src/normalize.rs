//! Turns one platform response into a value or a [`CallError`].
//!
//! Two response styles exist and the adapter picks one up front:
//!
//! | Style | Success | Failure |
//! |-------|---------|---------|
//! | [`ResponseStyle::Envelope`] | `{ "ok": true, "result": ... }` | `{ "ok": false, "error_code": .., "description": .. }` |
//! | [`ResponseStyle::Bare`] | 2xx status, body is the resource | non-2xx status, optional structured error body |
//!
//! A structured error is only reported when both the code and the
//! description fields are present; otherwise the transport-level failure is
//! returned as is.

use serde_json::Value;

use crate::{CallError, PlatformApiError, PlatformName, RawResponse, TransportError};

/// How the platform signals success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    /// Explicit `ok` flag with a `result` payload.
    Envelope,
    /// Success implied by the HTTP status.
    Bare,
}

/// Field names of a platform's structured error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorShape {
    pub code_field: String,
    pub description_field: String,
}

impl ErrorShape {
    pub fn new(code_field: impl Into<String>, description_field: impl Into<String>) -> Self {
        Self {
            code_field: code_field.into(),
            description_field: description_field.into(),
        }
    }

    /// Reads `(code, description)` from `body`, looking at the top level
    /// first and then inside a nested `data` object.
    fn extract(&self, body: &Value) -> Option<(i64, String)> {
        let read = |v: &Value| {
            let code = v.get(&self.code_field)?.as_i64()?;
            let description = v.get(&self.description_field)?.as_str()?;
            Some((code, description.to_string()))
        };
        read(body).or_else(|| body.get("data").and_then(read))
    }
}

impl Default for ErrorShape {
    fn default() -> Self {
        Self::new("error_code", "description")
    }
}

/// Per-adapter normalization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePolicy {
    platform: PlatformName,
    style: ResponseStyle,
    error_shape: ErrorShape,
}

impl ResponsePolicy {
    pub fn new(platform: PlatformName, style: ResponseStyle) -> Self {
        Self {
            platform,
            style,
            error_shape: ErrorShape::default(),
        }
    }

    pub fn envelope(platform: PlatformName) -> Self {
        Self::new(platform, ResponseStyle::Envelope)
    }

    pub fn bare(platform: PlatformName) -> Self {
        Self::new(platform, ResponseStyle::Bare)
    }

    #[must_use]
    pub fn with_error_shape(mut self, shape: ErrorShape) -> Self {
        self.error_shape = shape;
        self
    }

    pub fn platform(&self) -> &PlatformName {
        &self.platform
    }

    pub fn style(&self) -> ResponseStyle {
        self.style
    }

    /// Normalizes `response` into the decoded value or a typed failure.
    pub fn normalize(&self, response: &RawResponse) -> Result<Value, CallError> {
        match self.style {
            ResponseStyle::Envelope => self.normalize_envelope(response),
            ResponseStyle::Bare => self.normalize_bare(response),
        }
    }

    fn normalize_envelope(&self, response: &RawResponse) -> Result<Value, CallError> {
        let body = match response.json_body() {
            Ok(Some(body)) => body,
            Ok(None) => return Err(unstructured(response).into()),
            Err(source) if response.is_success() => {
                return Err(TransportError::Decode {
                    status: response.status,
                    source,
                }
                .into())
            }
            Err(_) => return Err(unstructured(response).into()),
        };

        match body.get("ok").and_then(Value::as_bool) {
            Some(true) => Ok(match body {
                Value::Object(mut map) => map.remove("result").unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Some(false) => match self.platform_error(&body) {
                Some(err) => Err(err.into()),
                None => Err(unstructured(response).into()),
            },
            None => Err(unstructured(response).into()),
        }
    }

    fn normalize_bare(&self, response: &RawResponse) -> Result<Value, CallError> {
        if response.is_success() {
            return match response.json_body() {
                Ok(body) => Ok(body.unwrap_or(Value::Null)),
                Err(source) => Err(TransportError::Decode {
                    status: response.status,
                    source,
                }
                .into()),
            };
        }

        let structured = response
            .json_body()
            .ok()
            .flatten()
            .and_then(|body| self.platform_error(&body));
        match structured {
            Some(err) => Err(err.into()),
            None => Err(unstructured(response).into()),
        }
    }

    fn platform_error(&self, body: &Value) -> Option<PlatformApiError> {
        let (code, description) = self.error_shape.extract(body)?;
        Some(PlatformApiError {
            platform: self.platform.clone(),
            code,
            description,
        })
    }
}

/// The failure reported when a response carries no structured error.
fn unstructured(response: &RawResponse) -> TransportError {
    if response.is_success() {
        TransportError::MalformedEnvelope {
            status: response.status,
            body: response.body_text(),
        }
    } else {
        TransportError::Status {
            status: response.status,
            body: response.body_text(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn telegram() -> ResponsePolicy {
        ResponsePolicy::envelope(PlatformName::new("Telegram").unwrap())
    }

    fn discord() -> ResponsePolicy {
        ResponsePolicy::bare(PlatformName::new("Discord").unwrap())
            .with_error_shape(ErrorShape::new("code", "message"))
    }

    #[test]
    fn envelope_ok_returns_result_unmodified() {
        let response = RawResponse::json(200, &json!({ "ok": true, "result": { "id": 7 } }));
        assert_eq!(telegram().normalize(&response).unwrap(), json!({ "id": 7 }));
    }

    #[test]
    fn envelope_ok_without_result_is_null() {
        let response = RawResponse::json(200, &json!({ "ok": true }));
        assert_eq!(telegram().normalize(&response).unwrap(), Value::Null);
    }

    #[test]
    fn envelope_failure_nested_under_data() {
        let response = RawResponse::json(
            200,
            &json!({ "ok": false, "data": { "error_code": 400, "description": "Bad Request" } }),
        );
        let err = telegram().normalize(&response).unwrap_err();
        assert_eq!(err.to_string(), "Telegram API error 400. Bad Request");
    }

    #[test]
    fn envelope_failure_at_top_level() {
        let response = RawResponse::json(
            400,
            &json!({ "ok": false, "error_code": 400, "description": "Bad Request: chat not found" }),
        );
        let err = telegram().normalize(&response).unwrap_err();
        let platform = err.platform_error().unwrap();
        assert_eq!(platform.code, 400);
        assert_eq!(platform.description, "Bad Request: chat not found");
    }

    #[test]
    fn envelope_failure_without_fields_is_not_fabricated() {
        let response = RawResponse::json(200, &json!({ "ok": false }));
        let err = telegram().normalize(&response).unwrap_err();
        assert!(matches!(
            err,
            CallError::Transport(TransportError::MalformedEnvelope { status: 200, .. })
        ));

        let response = RawResponse::new(502, "<html>Bad Gateway</html>");
        let err = telegram().normalize(&response).unwrap_err();
        match err {
            CallError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn envelope_garbage_on_success_is_a_decode_error() {
        let response = RawResponse::new(200, "not json");
        assert!(matches!(
            telegram().normalize(&response).unwrap_err(),
            CallError::Transport(TransportError::Decode { status: 200, .. })
        ));
    }

    #[test]
    fn bare_success_returns_body() {
        let response = RawResponse::json(200, &json!([{ "id": "1" }]));
        assert_eq!(discord().normalize(&response).unwrap(), json!([{ "id": "1" }]));
        assert_eq!(
            discord().normalize(&RawResponse::new(204, "")).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn bare_failure_with_structured_body() {
        let response = RawResponse::json(404, &json!({ "code": 10008, "message": "Unknown Message" }));
        let err = discord().normalize(&response).unwrap_err();
        assert_eq!(err.to_string(), "Discord API error 10008. Unknown Message");
    }

    #[test]
    fn bare_failure_without_structured_body_keeps_transport_error() {
        let response = RawResponse::new(500, "internal error");
        match discord().normalize(&response).unwrap_err() {
            CallError::Transport(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn default_shape_reads_error_code_and_description() {
        let policy = ResponsePolicy::bare(PlatformName::new("Telegram").unwrap());
        let response =
            RawResponse::json(401, &json!({ "error_code": 401, "description": "Unauthorized" }));
        assert_eq!(
            policy.normalize(&response).unwrap_err().to_string(),
            "Telegram API error 401. Unauthorized"
        );
    }
}
