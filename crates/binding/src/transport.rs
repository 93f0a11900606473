//! The HTTP capability the dispatcher sends requests through.
//!
//! Implementations own connection reuse, TLS, timeouts, and socket-level
//! retries. They must return every response they receive, whatever its
//! status; deciding what a status means is the normalizer's job.

use async_trait::async_trait;

use crate::{HttpRequest, RawResponse, TransportError};

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues exactly one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;
}
