//! Diagnostic hooks around each outbound call.
//!
//! The dispatcher reports every request before it is sent and every raw
//! response before it is normalized. Tracers only observe; nothing they do
//! can change a call's outcome.

use crate::{HttpRequest, MethodName, PartContent, RawResponse, RequestBody};

/// Longest body excerpt written to the trace, for requests and responses.
const MAX_TRACED_BODY: usize = 2048;

pub trait CallTracer: Send + Sync {
    fn on_request(&self, method: &MethodName, request: &HttpRequest);

    fn on_response(&self, method: &MethodName, response: &RawResponse);
}

/// Emits `tracing` debug events for requests and responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallTracer;

impl CallTracer for TracingCallTracer {
    fn on_request(&self, method: &MethodName, request: &HttpRequest) {
        tracing::debug!(
            method = %method,
            verb = %request.verb,
            path = %request.path,
            query = ?request.query,
            body = %truncate(describe_body(&request.body)),
            "[request]"
        );
    }

    fn on_response(&self, method: &MethodName, response: &RawResponse) {
        let body = truncate(response.body_text());
        tracing::debug!(
            method = %method,
            status = response.status,
            body = %body,
            "[response]"
        );
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallTracer;

impl CallTracer for NoopCallTracer {
    fn on_request(&self, _method: &MethodName, _request: &HttpRequest) {}

    fn on_response(&self, _method: &MethodName, _response: &RawResponse) {}
}

/// Cuts `body` to [`MAX_TRACED_BODY`] bytes on a char boundary.
fn truncate(mut body: String) -> String {
    if body.len() > MAX_TRACED_BODY {
        let mut cut = MAX_TRACED_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Renders a body for the trace; file parts are summarised by size.
fn describe_body(body: &RequestBody) -> String {
    match body {
        RequestBody::Empty => "<empty>".to_string(),
        RequestBody::Json(value) => value.to_string(),
        RequestBody::Multipart(form) => {
            let parts: Vec<String> = form
                .parts()
                .iter()
                .map(|part| match &part.content {
                    PartContent::Text(text) => format!("{}={text}", part.name),
                    PartContent::File {
                        data, file_name, ..
                    } => format!(
                        "{}=<file {} ({} bytes)>",
                        part.name,
                        file_name.as_deref().unwrap_or("unnamed"),
                        data.len()
                    ),
                })
                .collect();
            format!("multipart[{}]", parts.join(", "))
        }
    }
}
