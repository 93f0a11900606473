//! Core route binding for routebind.
//!
//! Chat-platform adapters declare a table of `(path template, verb) -> method
//! name` routes. This crate turns that table into named, callable methods:
//! each call resolves its route's path, encodes its payload, goes out through
//! an injected [`HttpTransport`], and comes back normalized into a value or a
//! [`CallError`].
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate performs no I/O itself.
//! The HTTP capability ([`HttpTransport`]) and the diagnostic sink
//! ([`CallTracer`]) are injected; the `transport` crate supplies the
//! production HTTP implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`MethodName`, `PlatformName`, `CallId`) |
//! | [`types`] | Verbs, payloads, call arguments, wire request/response |
//! | [`errors`] | Registration and call error types |
//! | [`template`] | `{object.field}` path templates |
//! | [`routes`] | Route table and its builder |
//! | [`normalize`] | Envelope / bare response normalization |
//! | [`transport`] | HTTP transport port |
//! | [`trace`] | Call tracer port and implementations |
//! | [`dispatch`] | Request building and the dispatcher |
//! | [`client`] | Method registry exposing routes as named calls |

pub mod client;
pub mod dispatch;
pub mod errors;
pub mod identifiers;
pub mod normalize;
pub mod routes;
pub mod template;
pub mod trace;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by adapter crates.
pub use client::ApiClient;
pub use dispatch::{build_request, Dispatcher};
pub use errors::{
    ArgumentError, CallError, ConfigurationError, PlatformApiError, TransportError,
};
pub use identifiers::{CallId, MethodName, PlatformName};
pub use normalize::{ErrorShape, ResponsePolicy, ResponseStyle};
pub use routes::{RouteEntry, RouteTable, RouteTableBuilder};
pub use template::PathTemplate;
pub use trace::{CallTracer, NoopCallTracer, TracingCallTracer};
pub use transport::HttpTransport;
pub use types::{
    CallArgs, FormPart, HttpRequest, HttpVerb, MultipartForm, PartContent, Payload, RawResponse,
    RequestBody, UnknownVerb,
};
