//! Request dispatch and response interpretation for the Screenlog API.
//!
//! # Design
//! Every public verb funnels into one `dispatch` pipeline made of three
//! stages: `build_request` (pure — URL join, default headers, payload
//! placement, credential decoration), `execute` (the single blocking ureq
//! round trip), and `interpret` (pure — no-content short-circuit, error
//! taxonomy lookup, lenient JSON decode). Keeping the first and last
//! stages free of I/O means the interesting contracts are testable
//! without a network.
//!
//! URL resolution is a verbatim string join: `base_url + path`. Callers
//! supply a base URL with a trailing slash and paths without a leading
//! one. No normalization happens here; that is the contract.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use ureq::Agent;

use crate::auth::Credential;
use crate::error::{Error, ErrorRegistry, StatusError};
use crate::http::{HttpMethod, HttpRequest, RawResponse};

/// Production endpoint of the Screenlog API.
pub const DEFAULT_BASE_URL: &str = "https://api.screenlog.tv/";

/// Fixed bound on every transport round trip. Exceeding it surfaces as a
/// transport error, never as a semantic HTTP failure.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API revision sent with every request.
const API_VERSION: &str = "2";
const HEADER_API_VERSION: &str = "screenlog-api-version";

/// Synchronous client for the Screenlog REST API.
///
/// Holds the shared transport agent, the resolved base URL, the error
/// taxonomy and an optional credential. Calls block the current thread
/// for the duration of the round trip; concurrent use from several
/// threads is safe exactly insofar as the agent's connection pool makes
/// it so — the client adds no locking of its own.
pub struct ApiClient {
    agent: Agent,
    base_url: String,
    auth: Option<Box<dyn Credential>>,
    errors: ErrorRegistry,
}

impl ApiClient {
    /// Client against `base_url` with the default agent: fixed global
    /// timeout, and 4xx/5xx statuses reported as data rather than
    /// transport errors so the taxonomy here stays in charge of them.
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .build()
            .new_agent();
        Self::with_agent(agent, base_url)
    }

    /// Client with a caller-configured agent, for custom timeouts, proxy
    /// setups, or TLS configuration. The agent must be built with
    /// `http_status_as_error(false)`; otherwise ureq reports mapped
    /// statuses as transport failures before this client sees them.
    pub fn with_agent(agent: Agent, base_url: impl Into<String>) -> Self {
        Self {
            agent,
            base_url: base_url.into(),
            auth: None,
            errors: ErrorRegistry::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install the credential decorating every subsequent request.
    /// In-flight calls keep whatever decoration they captured at build
    /// time; replacement is last-writer-wins for calls that follow.
    pub fn set_auth(&mut self, auth: impl Credential + 'static) {
        self.auth = Some(Box::new(auth));
    }

    /// Return to unauthenticated calls.
    pub fn clear_auth(&mut self) {
        self.auth = None;
    }

    /// GET `path`. Returns the decoded JSON body, or `None` on 204.
    pub fn get(&self, path: &str) -> Result<Option<Value>, Error> {
        self.dispatch(HttpMethod::Get, path, None)
    }

    /// POST `payload` to `path` as a JSON body. Returns the decoded JSON
    /// response, or `None` on 204.
    pub fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Option<Value>, Error> {
        let payload = serde_json::to_value(payload).map_err(Error::Serialize)?;
        self.dispatch(HttpMethod::Post, path, Some(&payload))
    }

    /// PUT `payload` to `path` as a JSON body. Returns the decoded JSON
    /// response, or `None` on 204.
    pub fn put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<Option<Value>, Error> {
        let payload = serde_json::to_value(payload).map_err(Error::Serialize)?;
        self.dispatch(HttpMethod::Put, path, Some(&payload))
    }

    /// DELETE `path`. Any response body is discarded by contract.
    pub fn delete(&self, path: &str) -> Result<(), Error> {
        self.dispatch(HttpMethod::Delete, path, None).map(|_| ())
    }

    /// The unified pipeline behind every verb.
    fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Option<Value>, Error> {
        let request = self.build_request(method, path, payload);
        debug!("request [{}] ({})", request.method, request.url);
        let response = self.execute(&request)?;
        debug!(
            "response [{}] ({}): {}",
            request.method, request.url, response.status
        );
        self.interpret(response)
    }

    /// Pure request assembly: URL join, the fixed default header set,
    /// payload placement (GET → query parameters, POST/PUT → JSON body),
    /// and finally credential decoration.
    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> HttpRequest {
        let mut request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (HEADER_API_VERSION.to_string(), API_VERSION.to_string()),
            ],
            query: Vec::new(),
            body: None,
        };
        match (method, payload) {
            (HttpMethod::Get, Some(payload)) => request.query = query_pairs(payload),
            (HttpMethod::Post | HttpMethod::Put, Some(payload)) => {
                request.body = Some(payload.to_string());
            }
            _ => {}
        }
        match &self.auth {
            Some(auth) => auth.decorate(request),
            None => request,
        }
    }

    /// The one blocking round trip. Transport failures bubble out as
    /// `ureq::Error` and are never reclassified here.
    fn execute(&self, request: &HttpRequest) -> Result<RawResponse, ureq::Error> {
        let mut response = match request.method {
            HttpMethod::Get | HttpMethod::Delete => {
                let mut call = match request.method {
                    HttpMethod::Get => self.agent.get(&request.url),
                    _ => self.agent.delete(&request.url),
                };
                for (name, value) in &request.headers {
                    call = call.header(name.as_str(), value.as_str());
                }
                for (name, value) in &request.query {
                    call = call.query(name.as_str(), value.as_str());
                }
                call.call()?
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut call = match request.method {
                    HttpMethod::Post => self.agent.post(&request.url),
                    _ => self.agent.put(&request.url),
                };
                for (name, value) in &request.headers {
                    call = call.header(name.as_str(), value.as_str());
                }
                call.send(request.body.as_deref().unwrap_or(""))?
            }
        };
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;
        Ok(RawResponse { status, body })
    }

    /// Pure response interpretation, in contract order: 204 means no
    /// content regardless of body bytes; a status in the taxonomy raises
    /// its kind before any decode attempt; everything else — including
    /// unmapped non-2xx statuses, deliberately — goes to the decoder.
    fn interpret(&self, response: RawResponse) -> Result<Option<Value>, Error> {
        if response.status == 204 {
            return Ok(None);
        }
        if let Some(kind) = self.errors.resolve(response.status) {
            return Err(StatusError { kind, response }.into());
        }
        decode_response(&response).map(Some)
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Parse a response body as JSON after best-effort UTF-8 recovery.
fn decode_response(response: &RawResponse) -> Result<Value, Error> {
    serde_json::from_str(&response.text_lossy()).map_err(Error::BadResponse)
}

/// Flatten a JSON object into query pairs. Strings go in bare (no JSON
/// quoting); every other value keeps its JSON rendering. Non-object
/// payloads have no query representation and yield nothing.
fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    match payload.as_object() {
        Some(map) => map
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenAuth, HEADER_API_KEY};
    use crate::error::ApiErrorKind;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000/")
    }

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    // --- build_request ---

    #[test]
    fn url_is_a_verbatim_join_of_base_and_path() {
        let request = client().build_request(HttpMethod::Get, "shows/trending", None);
        assert_eq!(request.url, "http://localhost:3000/shows/trending");
    }

    #[test]
    fn no_separator_is_inserted_between_base_and_path() {
        // Deliberate: a missing slash stays missing. The join is the
        // caller's responsibility.
        let c = ApiClient::new("http://localhost:3000");
        let request = c.build_request(HttpMethod::Get, "shows/trending", None);
        assert_eq!(request.url, "http://localhost:3000shows/trending");
    }

    #[test]
    fn default_headers_are_always_present() {
        let request = client().build_request(HttpMethod::Delete, "sync/watchlist/1", None);
        assert_eq!(header(&request, "Content-Type"), Some("application/json"));
        assert_eq!(header(&request, HEADER_API_VERSION), Some("2"));
    }

    #[test]
    fn get_payload_becomes_query_parameters_not_a_body() {
        let payload = json!({"page": 2});
        let request = client().build_request(HttpMethod::Get, "shows/trending", Some(&payload));
        assert_eq!(
            request.query,
            vec![("page".to_string(), "2".to_string())]
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn post_payload_becomes_a_json_body_not_query_parameters() {
        let payload = json!({"page": 2});
        let request = client().build_request(HttpMethod::Post, "sync/watchlist", Some(&payload));
        assert!(request.query.is_empty());
        let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"page": 2}));
    }

    #[test]
    fn delete_carries_no_payload() {
        let request = client().build_request(HttpMethod::Delete, "sync/watchlist/1", None);
        assert!(request.body.is_none());
        assert!(request.query.is_empty());
    }

    #[test]
    fn credential_decoration_applies_only_when_set() {
        let mut c = client();
        let bare = c.build_request(HttpMethod::Get, "users/me", None);
        assert_eq!(header(&bare, "Authorization"), None);

        c.set_auth(TokenAuth::new("client-1", "tok-abc"));
        let decorated = c.build_request(HttpMethod::Get, "users/me", None);
        assert_eq!(header(&decorated, "Authorization"), Some("Bearer tok-abc"));
        assert_eq!(header(&decorated, HEADER_API_KEY), Some("client-1"));

        c.clear_auth();
        let bare_again = c.build_request(HttpMethod::Get, "users/me", None);
        assert_eq!(header(&bare_again, "Authorization"), None);
    }

    #[test]
    fn replacing_the_credential_changes_later_requests_only() {
        let mut c = client();
        c.set_auth(TokenAuth::new("client-1", "first"));
        let first = c.build_request(HttpMethod::Get, "users/me", None);

        c.set_auth(TokenAuth::new("client-1", "second"));
        let second = c.build_request(HttpMethod::Get, "users/me", None);

        assert_eq!(header(&first, "Authorization"), Some("Bearer first"));
        assert_eq!(header(&second, "Authorization"), Some("Bearer second"));
    }

    // --- query_pairs ---

    #[test]
    fn query_strings_are_not_json_quoted() {
        let pairs = query_pairs(&json!({"query": "the wire", "page": 3, "extended": true}));
        assert!(pairs.contains(&("query".to_string(), "the wire".to_string())));
        assert!(pairs.contains(&("page".to_string(), "3".to_string())));
        assert!(pairs.contains(&("extended".to_string(), "true".to_string())));
    }

    #[test]
    fn non_object_payload_yields_no_query() {
        assert!(query_pairs(&json!([1, 2, 3])).is_empty());
        assert!(query_pairs(&json!("bare")).is_empty());
    }

    // --- interpret ---

    fn raw(status: u16, body: &[u8]) -> RawResponse {
        RawResponse {
            status,
            body: body.to_vec(),
        }
    }

    #[test]
    fn no_content_yields_none_even_with_a_body() {
        // A 204 body is a protocol violation the server may commit; the
        // contract says ignore it, never decode it.
        let decoded = client().interpret(raw(204, b"surprise body")).unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn mapped_status_raises_its_kind_without_decoding_the_body() {
        // Body is intentionally invalid JSON: if the decoder ran first,
        // this would surface as BadResponse instead.
        let err = client().interpret(raw(404, b"not json at all")).unwrap_err();
        match err {
            Error::Status(status) => {
                assert_eq!(status.kind, ApiErrorKind::NotFound);
                assert_eq!(status.status(), 404);
                assert_eq!(status.response.text_lossy(), "not json at all");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[test]
    fn every_registered_status_maps_to_its_kind() {
        let c = client();
        for kind in ApiErrorKind::ALL {
            let err = c.interpret(raw(kind.http_code(), b"{}")).unwrap_err();
            match err {
                Error::Status(status) => assert_eq!(status.kind, kind),
                other => panic!("status {}: expected Status, got {other:?}", kind.http_code()),
            }
        }
    }

    #[test]
    fn success_body_decodes_to_its_json_value() {
        let decoded = client().interpret(raw(200, b"{\"a\": 1}")).unwrap();
        assert_eq!(decoded, Some(json!({"a": 1})));
    }

    #[test]
    fn unmapped_error_status_falls_through_to_decoding() {
        // 418 is not in the taxonomy; by contract it is treated
        // optimistically and decoded like a success.
        let decoded = client().interpret(raw(418, b"{\"status\": 418}")).unwrap();
        assert_eq!(decoded, Some(json!({"status": 418})));

        let err = client().interpret(raw(418, b"short and stout")).unwrap_err();
        assert!(matches!(err, Error::BadResponse(_)));
    }

    #[test]
    fn invalid_json_surfaces_as_bad_response_with_a_diagnostic() {
        let err = client().interpret(raw(200, b"not json")).unwrap_err();
        match err {
            Error::BadResponse(source) => {
                assert!(!source.to_string().is_empty());
            }
            other => panic!("expected BadResponse, got {other:?}"),
        }
    }

    #[test]
    fn interleaved_invalid_utf8_does_not_break_decoding() {
        let decoded = client()
            .interpret(raw(200, b"{\"title\": \"Night \xff\xfe Shift\"}"))
            .unwrap();
        assert_eq!(decoded, Some(json!({"title": "Night  Shift"})));
    }
}
