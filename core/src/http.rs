//! Plain-data HTTP types shared by the dispatcher and the credential layer.
//!
//! # Design
//! Requests are described as plain data so that every stage before the
//! actual round-trip — default headers, payload placement, credential
//! decoration — is a pure transformation that can be inspected in tests.
//! Query parameters get their own field because GET payloads travel as
//! query strings while POST/PUT payloads travel as JSON bodies; the
//! placement must be visible in the request value, not buried in a URL.
//!
//! All fields use owned types (`String`, `Vec`) so values can be passed
//! through `Credential::decorate` without lifetime concerns.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// An outgoing API request described as plain data.
///
/// Built by `ApiClient` from a logical call, optionally rewritten by a
/// [`Credential`](crate::auth::Credential), then executed over the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Fully resolved URL: base URL + relative path, joined verbatim.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Query parameters; only populated for GET payloads.
    pub query: Vec<(String, String)>,
    /// JSON request body; only populated for POST/PUT payloads.
    pub body: Option<String>,
}

/// A raw response as it came off the wire: status code plus body bytes.
///
/// Kept in byte form until the decoder runs so that error kinds can carry
/// the untouched body for diagnostics.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Best-effort text recovery of the body: invalid UTF-8 sequences are
    /// dropped rather than substituted or treated as fatal. Partial data
    /// beats a hard failure at this layer; strict validation belongs to
    /// whoever interprets the decoded value.
    pub fn text_lossy(&self) -> String {
        let mut text = String::with_capacity(self.body.len());
        for chunk in self.body.utf8_chunks() {
            text.push_str(chunk.valid());
        }
        text
    }
}
