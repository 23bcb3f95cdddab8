//! In-process stand-in for the Screenlog API, used by the core client's
//! integration tests (and runnable standalone via `main.rs`).
//!
//! # Design
//! Two groups of routes. The `/shows` and `/sync/watchlist` handlers act
//! like a tiny slice of the real service, backed by an in-memory map.
//! The `/status` and `/debug` probes exist purely so the client's wire
//! contracts — status mapping, no-content handling, payload placement,
//! header decoration, malformed bodies — can be observed over real HTTP.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub title: String,
    pub year: u16,
}

#[derive(Deserialize)]
pub struct AddEntry {
    pub title: String,
    pub year: u16,
}

pub type Db = Arc<RwLock<HashMap<Uuid, WatchlistEntry>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/shows/trending", get(trending))
        .route("/sync/watchlist", get(list_watchlist).post(add_entry))
        .route(
            "/sync/watchlist/{id}",
            get(get_entry).delete(remove_entry),
        )
        .route("/status/{code}", get(status_probe))
        .route("/debug/query", get(echo_query))
        .route("/debug/body", post(echo_body).put(echo_body))
        .route("/debug/headers", get(echo_headers))
        .route("/debug/no-content", get(no_content))
        .route("/debug/bad-json", get(bad_json))
        .route("/debug/mixed-bytes", get(mixed_bytes))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn trending() -> Json<Value> {
    Json(json!([
        {"watchers": 204, "show": {"title": "Orbital Decay", "year": 2024}},
        {"watchers": 131, "show": {"title": "The Long Static", "year": 2023}},
        {"watchers": 97, "show": {"title": "Harbour Lights", "year": 2025}},
    ]))
}

async fn list_watchlist(State(db): State<Db>) -> Json<Vec<WatchlistEntry>> {
    let entries = db.read().await;
    Json(entries.values().cloned().collect())
}

async fn add_entry(
    State(db): State<Db>,
    Json(input): Json<AddEntry>,
) -> (StatusCode, Json<WatchlistEntry>) {
    let entry = WatchlistEntry {
        id: Uuid::new_v4(),
        title: input.title,
        year: input.year,
    };
    db.write().await.insert(entry.id, entry.clone());
    (StatusCode::CREATED, Json(entry))
}

async fn get_entry(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<WatchlistEntry>, StatusCode> {
    let entries = db.read().await;
    entries.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn remove_entry(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let mut entries = db.write().await;
    entries
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Respond with the requested status code and a small JSON body, so
/// tests can drive both mapped and unmapped status handling.
async fn status_probe(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"status": code})))
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Json<HashMap<String, String>> {
    Json(params)
}

/// Echo where the request actually put things: parsed body, query
/// parameters, and the content type it arrived with.
async fn echo_body(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    let parsed: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    Json(json!({
        "body": parsed,
        "query": params,
        "content_type": content_type,
    }))
}

/// Echo the headers the client is expected to decorate requests with.
async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    let pick = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    Json(json!({
        "authorization": pick("authorization"),
        "api_key": pick("screenlog-api-key"),
        "api_version": pick("screenlog-api-version"),
        "content_type": pick("content-type"),
    }))
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Success status, body that is not JSON.
async fn bad_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not json")
}

/// Success status, JSON body with invalid UTF-8 sequences spliced in.
/// Dropping the bad bytes leaves valid JSON.
async fn mixed_bytes() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Bytes::from_static(b"{\"title\": \"Night \xff\xfe Shift\", \"year\": 2021}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchlist_entry_serializes_to_json() {
        let entry = WatchlistEntry {
            id: Uuid::nil(),
            title: "Orbital Decay".to_string(),
            year: 2024,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["title"], "Orbital Decay");
        assert_eq!(json["year"], 2024);
    }

    #[test]
    fn add_entry_rejects_missing_title() {
        let result: Result<AddEntry, _> = serde_json::from_str(r#"{"year": 2024}"#);
        assert!(result.is_err());
    }

    #[test]
    fn mixed_bytes_fixture_is_invalid_utf8() {
        let bytes: &[u8] = b"{\"title\": \"Night \xff\xfe Shift\", \"year\": 2021}";
        assert!(std::str::from_utf8(bytes).is_err());
    }
}
