//! Error types for the Screenlog API client.
//!
//! # Design
//! Failures are split by cause. Transport problems (DNS, refused
//! connections, timeouts) pass through from ureq untouched. Statuses the
//! service documents get one [`ApiErrorKind`] each, resolved through an
//! [`ErrorRegistry`] that is built once, in code, from a static list —
//! duplicate registrations are a construction-time panic, not something
//! discovered at lookup time. A success status whose body fails to parse
//! is the only case [`Error::BadResponse`] covers; valid-but-unexpected
//! JSON shapes are the caller's concern.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::http::RawResponse;

/// Errors returned by [`ApiClient`](crate::client::ApiClient) calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport layer failed before a response arrived (connection
    /// refused, DNS failure, timeout). Propagated unwrapped.
    #[error(transparent)]
    Transport(#[from] ureq::Error),

    /// The service answered with a status code that maps to a documented
    /// error kind.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// The service answered with a success status but the body was not
    /// valid JSON after lenient UTF-8 recovery.
    #[error("unable to parse response body as JSON: {0}")]
    BadResponse(#[source] serde_json::Error),

    /// The request payload could not be converted to JSON.
    #[error("unable to serialize request payload: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Semantic classification of a failed call, one per documented HTTP
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    PreconditionFailed,
    UnprocessableEntity,
    AccountLocked,
    RateLimited,
    ServerError,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
}

impl ApiErrorKind {
    /// Every kind the registry maps. Order is irrelevant; codes must be
    /// unique, which `ErrorRegistry::new` asserts.
    pub const ALL: [ApiErrorKind; 14] = [
        ApiErrorKind::BadRequest,
        ApiErrorKind::Unauthorized,
        ApiErrorKind::Forbidden,
        ApiErrorKind::NotFound,
        ApiErrorKind::MethodNotAllowed,
        ApiErrorKind::Conflict,
        ApiErrorKind::PreconditionFailed,
        ApiErrorKind::UnprocessableEntity,
        ApiErrorKind::AccountLocked,
        ApiErrorKind::RateLimited,
        ApiErrorKind::ServerError,
        ApiErrorKind::BadGateway,
        ApiErrorKind::ServiceUnavailable,
        ApiErrorKind::GatewayTimeout,
    ];

    /// The HTTP status code that triggers this kind.
    pub const fn http_code(self) -> u16 {
        match self {
            ApiErrorKind::BadRequest => 400,
            ApiErrorKind::Unauthorized => 401,
            ApiErrorKind::Forbidden => 403,
            ApiErrorKind::NotFound => 404,
            ApiErrorKind::MethodNotAllowed => 405,
            ApiErrorKind::Conflict => 409,
            ApiErrorKind::PreconditionFailed => 412,
            ApiErrorKind::UnprocessableEntity => 422,
            ApiErrorKind::AccountLocked => 423,
            ApiErrorKind::RateLimited => 429,
            ApiErrorKind::ServerError => 500,
            ApiErrorKind::BadGateway => 502,
            ApiErrorKind::ServiceUnavailable => 503,
            ApiErrorKind::GatewayTimeout => 504,
        }
    }

    /// Human-readable description, taken from the service's API docs.
    pub const fn description(self) -> &'static str {
        match self {
            ApiErrorKind::BadRequest => "bad request - request couldn't be parsed",
            ApiErrorKind::Unauthorized => "unauthorized - OAuth must be provided",
            ApiErrorKind::Forbidden => "forbidden - invalid API key or unapproved app",
            ApiErrorKind::NotFound => "not found - method exists, but no record found",
            ApiErrorKind::MethodNotAllowed => "method not allowed for this resource",
            ApiErrorKind::Conflict => "conflict - resource already created",
            ApiErrorKind::PreconditionFailed => "precondition failed - use application/json",
            ApiErrorKind::UnprocessableEntity => "unprocessable entity - validation errors",
            ApiErrorKind::AccountLocked => "locked user account - have the user contact support",
            ApiErrorKind::RateLimited => "rate limit exceeded",
            ApiErrorKind::ServerError => "server error",
            ApiErrorKind::BadGateway => "bad gateway",
            ApiErrorKind::ServiceUnavailable => "service unavailable - server overloaded",
            ApiErrorKind::GatewayTimeout => "gateway timeout",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A call that completed at the HTTP level but landed on a status code
/// the service documents as an error. Carries the raw response so callers
/// can inspect the body the server sent alongside the failure.
#[derive(Debug, Error)]
#[error("{kind} (http status {})", .response.status)]
pub struct StatusError {
    pub kind: ApiErrorKind,
    pub response: RawResponse,
}

impl StatusError {
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

/// Immutable status-code → error-kind table.
///
/// Built once per client from [`ApiErrorKind::ALL`] and consulted on
/// every response before any body decoding happens.
#[derive(Debug, Clone)]
pub struct ErrorRegistry {
    map: HashMap<u16, ApiErrorKind>,
}

impl ErrorRegistry {
    /// Build the table. Panics if two kinds declare the same status code;
    /// that is a defect in the declaration list, not a runtime condition.
    pub fn new() -> Self {
        let mut map = HashMap::with_capacity(ApiErrorKind::ALL.len());
        for kind in ApiErrorKind::ALL {
            let previous = map.insert(kind.http_code(), kind);
            assert!(
                previous.is_none(),
                "status {} registered by two error kinds",
                kind.http_code()
            );
        }
        Self { map }
    }

    /// Look up the error kind for a status code, if the service documents
    /// one. Total over all integers: unknown codes simply return `None`.
    pub fn resolve(&self, status: u16) -> Option<ApiErrorKind> {
        self.map.get(&status).copied()
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
