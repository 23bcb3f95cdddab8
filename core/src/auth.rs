//! Credential decoration for outgoing requests.
//!
//! # Design
//! The client knows nothing about authentication schemes. A [`Credential`]
//! is a pure rewrite of the plain-data request — typically appending
//! headers — applied as the last build step before the wire. Minting and
//! refreshing tokens is someone else's job and must never happen inside
//! `decorate`: the dispatch path performs exactly one network round trip.

use std::fmt;

use crate::http::HttpRequest;

/// Header naming the registered application, sent on every authenticated
/// call.
pub const HEADER_API_KEY: &str = "screenlog-api-key";

/// Capability to apply authentication material to an outgoing request.
///
/// Implementations must be pure: no I/O, no token refresh. The input
/// request is returned decorated (or unchanged, if the scheme decides
/// the call needs nothing).
pub trait Credential: fmt::Debug + Send + Sync {
    fn decorate(&self, request: HttpRequest) -> HttpRequest;
}

/// OAuth bearer-token credential: identifies the application via
/// [`HEADER_API_KEY`] and the user via an `Authorization` header.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    client_id: String,
    token: String,
}

impl TokenAuth {
    pub fn new(client_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            token: token.into(),
        }
    }
}

impl Credential for TokenAuth {
    fn decorate(&self, mut request: HttpRequest) -> HttpRequest {
        request
            .headers
            .push((HEADER_API_KEY.to_string(), self.client_id.clone()));
        request
            .headers
            .push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        request
    }
}

/// Application-only credential for endpoints that need a registered app
/// but no user: sends [`HEADER_API_KEY`] alone.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    client_id: String,
}

impl ApiKeyAuth {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }
}

impl Credential for ApiKeyAuth {
    fn decorate(&self, mut request: HttpRequest) -> HttpRequest {
        request
            .headers
            .push((HEADER_API_KEY.to_string(), self.client_id.clone()));
        request
    }
}
