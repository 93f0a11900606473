//! Request building and the dispatcher.
//!
//! A dispatch is: resolve the path, pick the body encoding from the payload
//! variant, send exactly one request, normalize the response. Argument
//! problems are reported before anything reaches the transport.

use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;

use crate::{
    ArgumentError, CallArgs, CallError, CallId, CallTracer, HttpRequest, HttpTransport, HttpVerb,
    Payload, RequestBody, ResponsePolicy, RouteEntry, TracingCallTracer,
};

/// Builds the request for one call of `route`.
///
/// `GET` requests carry no body: a JSON object payload becomes the query
/// string (strings verbatim, other scalars and nested values as JSON text,
/// nulls dropped). Every other verb sends JSON payloads as the body.
pub fn build_request(route: &RouteEntry, args: CallArgs) -> Result<HttpRequest, ArgumentError> {
    let (positional, named, payload) = args.into_parts();
    let path = route.template().resolve(&positional, &named)?;
    let mut request = HttpRequest::new(route.verb(), path);

    match (route.verb(), payload) {
        (_, None) | (HttpVerb::Get, Some(Payload::Json(Value::Null))) => {}
        (HttpVerb::Get, Some(Payload::Json(Value::Object(fields)))) => {
            request.query = fields
                .into_iter()
                .filter_map(|(key, value)| match value {
                    Value::Null => None,
                    Value::String(s) => Some((key, s)),
                    other => Some((key, other.to_string())),
                })
                .collect();
        }
        (HttpVerb::Get, Some(Payload::Json(_))) => {
            return Err(unsupported(route, "GET payloads must be JSON objects"));
        }
        (HttpVerb::Get, Some(Payload::Multipart(_))) => {
            return Err(unsupported(route, "GET requests cannot carry a multipart body"));
        }
        (_, Some(Payload::Json(value))) => request.body = RequestBody::Json(value),
        (_, Some(Payload::Multipart(form))) => request.body = RequestBody::Multipart(form),
    }

    Ok(request)
}

fn unsupported(route: &RouteEntry, reason: &str) -> ArgumentError {
    ArgumentError::UnsupportedPayload {
        template: route.template().to_string(),
        verb: route.verb(),
        reason: reason.to_string(),
    }
}

/// Sends resolved routes through a transport and normalizes the responses.
///
/// Holds no per-call state, so one dispatcher serves any number of
/// concurrent calls.
pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    policy: ResponsePolicy,
    tracer: Arc<dyn CallTracer>,
}

impl Dispatcher {
    /// Creates a dispatcher that traces through [`TracingCallTracer`].
    pub fn new(transport: Arc<dyn HttpTransport>, policy: ResponsePolicy) -> Self {
        Self {
            transport,
            policy,
            tracer: Arc::new(TracingCallTracer),
        }
    }

    #[must_use]
    pub fn with_tracer(mut self, tracer: Arc<dyn CallTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn policy(&self) -> &ResponsePolicy {
        &self.policy
    }

    /// Performs one call of `route`.
    pub async fn dispatch(&self, route: &RouteEntry, args: CallArgs) -> Result<Value, CallError> {
        let call_id = CallId::new_random();
        let span = tracing::debug_span!(
            "api_call",
            platform = %self.policy.platform(),
            method = %route.method(),
            call_id = %call_id,
        );

        async move {
            let request = build_request(route, args)?;
            self.tracer.on_request(route.method(), &request);

            let response = self.transport.send(request).await?;
            self.tracer.on_response(route.method(), &response);

            self.policy.normalize(&response)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
