//! Synchronous client for the Screenlog media-tracking REST API.
//!
//! # Overview
//! [`ApiClient`] turns a logical call (verb, relative path, optional
//! payload) into an authenticated HTTP round trip and hands back either
//! decoded JSON, `None` for a 204, or a typed error. The status → error
//! mapping lives in [`ErrorRegistry`]; authentication is injected through
//! the [`Credential`] capability so the client stays agnostic of the
//! scheme.
//!
//! # Design
//! - Fully synchronous: each call blocks until the response arrives or
//!   the fixed transport timeout fires. No retries, no caching.
//! - Request assembly and response interpretation are pure stages around
//!   the single ureq round trip, so the contracts are unit-testable.
//! - Statuses the service documents raise a dedicated [`ApiErrorKind`]
//!   before the body is ever parsed; undocumented statuses are decoded
//!   optimistically like successes.
//!
//! ```no_run
//! use screenlog_core::{ApiClient, TokenAuth, DEFAULT_BASE_URL};
//!
//! let mut client = ApiClient::new(DEFAULT_BASE_URL);
//! client.set_auth(TokenAuth::new("my-client-id", "user-token"));
//!
//! let trending = client.get("shows/trending")?;
//! # let _ = trending;
//! # Ok::<(), screenlog_core::Error>(())
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;

pub use auth::{ApiKeyAuth, Credential, TokenAuth, HEADER_API_KEY};
pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiErrorKind, Error, ErrorRegistry, StatusError};
pub use http::{HttpMethod, HttpRequest, RawResponse};
