//! routebind HTTP transport adapter.
//!
//! Implements the [`binding::HttpTransport`] port with `reqwest`. Platform
//! adapters construct one [`ReqwestTransport`] per bot account and inject it
//! into their dispatcher.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection pooling, TLS, timeouts, URL assembly, and
//! body serialisation live here. The [`binding`] crate sees only
//! [`binding::HttpTransport`], and every response (whatever its status) is
//! handed back as a [`binding::RawResponse`] for normalization.

mod config;

pub use config::{TransportConfig, DEFAULT_TIMEOUT};

use async_trait::async_trait;
use binding::{
    ConfigurationError, HttpRequest, HttpTransport, HttpVerb, MultipartForm, PartContent,
    RawResponse, RequestBody, TransportError,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{multipart, Client, Method, Url};

/// [`HttpTransport`] backed by a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    /// Path of the base URL without its trailing `/`; every request stays under it.
    base_path: String,
}

impl ReqwestTransport {
    /// Builds the client described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] if the base URL is not an
    /// absolute URL, a header cannot be encoded, or the TLS backend fails to
    /// initialise.
    pub fn new(config: &TransportConfig) -> Result<Self, ConfigurationError> {
        let invalid = |message: String| ConfigurationError::Invalid { message };

        let parsed = Url::parse(&config.base_url)
            .map_err(|e| invalid(format!("base URL is not an absolute URL: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("base URL cannot carry a path".into()));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid(format!("invalid header name '{name}': {e}")))?;
            let mut value = HeaderValue::from_str(value)
                .map_err(|e| invalid(format!("invalid value for header '{name}': {e}")))?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| invalid(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            base_path: parsed.path().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let url = Url::parse(&format!("{}{path}", self.base_url)).map_err(|e| {
            TransportError::InvalidRequest {
                message: format!("cannot join path '{path}' to the base URL: {e}"),
            }
        })?;
        // Dot segments are collapsed by the parser.
        let inside = url
            .path()
            .strip_prefix(self.base_path.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if !inside {
            return Err(TransportError::InvalidRequest {
                message: format!("path '{path}' leaves the base URL"),
            });
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let url = self.url_for(&request.path)?;
        let mut builder = self.client.request(method(request.verb), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(multipart_form(form)?),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(
                verb = %request.verb,
                path = %request.path,
                error = %e,
                "request failed"
            );
            from_reqwest(e)
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(from_reqwest)?;

        Ok(RawResponse::new(status, body))
    }
}

fn method(verb: HttpVerb) -> Method {
    match verb {
        HttpVerb::Get => Method::GET,
        HttpVerb::Post => Method::POST,
        HttpVerb::Put => Method::PUT,
        HttpVerb::Patch => Method::PATCH,
        HttpVerb::Delete => Method::DELETE,
    }
}

fn multipart_form(form: MultipartForm) -> Result<multipart::Form, TransportError> {
    let mut out = multipart::Form::new();
    for part in form.into_parts() {
        out = match part.content {
            PartContent::Text(text) => out.text(part.name, text),
            PartContent::File {
                data,
                file_name,
                mime_type,
            } => {
                let mut file = multipart::Part::bytes(data.to_vec());
                if let Some(file_name) = file_name {
                    file = file.file_name(file_name);
                }
                if let Some(mime_type) = mime_type {
                    file = file.mime_str(&mime_type).map_err(|e| {
                        TransportError::InvalidRequest {
                            message: format!("invalid MIME type '{mime_type}': {e}"),
                        }
                    })?;
                }
                out.part(part.name, file)
            }
        };
    }
    Ok(out)
}

// Strips the URL from reqwest errors: Telegram carries the bot token in it.
fn from_reqwest(error: reqwest::Error) -> TransportError {
    let error = error.without_url();
    if error.is_timeout() {
        TransportError::Timeout {
            message: error.to_string(),
        }
    } else {
        TransportError::connection(error.to_string(), error)
    }
}
