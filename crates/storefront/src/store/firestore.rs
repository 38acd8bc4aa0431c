//! Firestore REST API client.
//!
//! Uses `reqwest` against the v1 REST surface:
//! - `GET  {database}/documents/{collection}/{id}` for key lookups
//! - `POST {database}/documents:runQuery` with a `structuredQuery`
//! - `POST {database}/documents:commit` for writes, with a `REQUEST_TIME`
//!   transform for server timestamps
//!
//! Document fields come back as typed value envelopes and are passed to
//! callers untouched. Bare JSON written by callers is encoded into
//! envelopes here.

use std::sync::Arc;

use reqwest::StatusCode;
use safeguard_core::DocumentId;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};
use url::Url;

use super::{Document, DocumentStore, Fields, NewDocument, Query, StoreError, generate_document_id};
use crate::config::FirestoreConfig;

/// Client for the Firestore REST API.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    base_url: String,
    /// `projects/{project}/databases/{database}`
    database_path: String,
    api_key: Option<SecretString>,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Fields,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RawDocument>,
    error: Option<ErrorStatus>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    #[must_use]
    pub fn new(config: &FirestoreConfig) -> Self {
        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_string(),
                database_path: format!(
                    "projects/{}/databases/{}",
                    config.project_id, config.database
                ),
                api_key: config.api_key.clone(),
            }),
        }
    }

    /// Full resource name of a document.
    fn document_name(&self, collection: &str, id: &DocumentId) -> String {
        format!(
            "{}/documents/{collection}/{}",
            self.inner.database_path,
            id.as_str()
        )
    }

    /// Build a request URL for a path under the database, with the API key.
    fn url(&self, suffix: &str) -> Result<Url, StoreError> {
        let raw = format!(
            "{}/{}/documents{suffix}",
            self.inner.base_url, self.inner.database_path
        );
        let mut url = Url::parse(&raw).map_err(|e| StoreError::Backend {
            status: "INVALID_URL".to_string(),
            message: format!("{raw}: {e}"),
        })?;
        if let Some(key) = &self.inner.api_key {
            url.query_pairs_mut().append_pair("key", key.expose_secret());
        }
        Ok(url)
    }

    /// Send a request and return its status and body.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Fail with a classified error unless the status is a success.
    fn check(status: StatusCode, body: &str) -> Result<(), StoreError> {
        if status.is_success() {
            return Ok(());
        }

        tracing::debug!(
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Firestore returned non-success status"
        );

        Err(classify_error(status, body))
    }
}

impl DocumentStore for FirestoreClient {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &DocumentId) -> Result<Option<Document>, StoreError> {
        let url = self.url(&format!(
            "/{collection}/{}",
            urlencoding::encode(id.as_str())
        ))?;
        let (status, body) = self.send(self.inner.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            debug!("Document not found");
            return Ok(None);
        }
        Self::check(status, &body)?;

        let raw: RawDocument = serde_json::from_str(&body)?;
        Ok(Some(into_document(raw)))
    }

    #[instrument(skip(self, query), fields(collection = %query.collection))]
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let body = json!({ "structuredQuery": self.structured_query(query) });
        let url = self.url(":runQuery")?;
        let (status, text) = self.send(self.inner.client.post(url).json(&body)).await?;
        Self::check(status, &text)?;

        let items: Vec<RunQueryItem> = serde_json::from_str(&text)?;
        let mut documents = Vec::with_capacity(items.len());
        for item in items {
            if let Some(error) = item.error {
                return Err(classify_status(error));
            }
            if let Some(raw) = item.document {
                documents.push(into_document(raw));
            }
        }

        debug!(count = documents.len(), "Query returned documents");
        Ok(documents)
    }

    #[instrument(skip(self, document))]
    async fn create(&self, collection: &str, document: NewDocument) -> Result<DocumentId, StoreError> {
        let id = generate_document_id();

        let mut write = Map::new();
        write.insert(
            "update".to_string(),
            json!({
                "name": self.document_name(collection, &id),
                "fields": encode_fields(&document.fields),
            }),
        );
        write.insert("currentDocument".to_string(), json!({ "exists": false }));
        if let Some(field) = document.server_timestamp {
            write.insert(
                "updateTransforms".to_string(),
                json!([{ "fieldPath": field, "setToServerValue": "REQUEST_TIME" }]),
            );
        }

        self.commit(Value::Object(write)).await?;
        Ok(id)
    }

    #[instrument(skip(self, fields))]
    async fn put(&self, collection: &str, id: &DocumentId, fields: Fields) -> Result<(), StoreError> {
        let write = json!({
            "update": {
                "name": self.document_name(collection, id),
                "fields": encode_fields(&fields),
            }
        });
        self.commit(write).await
    }
}

impl FirestoreClient {
    fn structured_query(&self, query: &Query) -> Value {
        let mut structured = Map::new();
        structured.insert(
            "from".to_string(),
            json!([{ "collectionId": query.collection }]),
        );

        if let Some(filter) = &query.filter {
            structured.insert(
                "where".to_string(),
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": filter.field },
                        "op": "EQUAL",
                        "value": encode_value(&filter.value),
                    }
                }),
            );
        }

        if query.order_by_key {
            structured.insert(
                "orderBy".to_string(),
                json!([{ "field": { "fieldPath": "__name__" }, "direction": "ASCENDING" }]),
            );
        }

        if let Some(after) = &query.start_after {
            structured.insert(
                "startAt".to_string(),
                json!({
                    "values": [{ "referenceValue": self.document_name(&query.collection, after) }],
                    "before": false,
                }),
            );
        }

        if let Some(limit) = query.limit {
            structured.insert("limit".to_string(), json!(limit));
        }

        Value::Object(structured)
    }

    async fn commit(&self, write: Value) -> Result<(), StoreError> {
        let url = self.url(":commit")?;
        let body = json!({ "writes": [write] });
        let (status, text) = self.send(self.inner.client.post(url).json(&body)).await?;
        Self::check(status, &text)
    }
}

fn into_document(raw: RawDocument) -> Document {
    let id = raw.name.rsplit('/').next().unwrap_or_default().to_owned();
    Document::new(id, raw.fields)
}

/// Classify an HTTP error response.
fn classify_error(status: StatusCode, body: &str) -> StoreError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .or_else(|_| {
            serde_json::from_str::<Vec<ErrorEnvelope>>(body)
                .map_err(|_| ())
                .and_then(|v| v.into_iter().next().map(|e| e.error).ok_or(()))
        });

    match parsed {
        Ok(error) => classify_status(error),
        Err(()) if status == StatusCode::TOO_MANY_REQUESTS => {
            StoreError::QuotaExceeded(format!("HTTP {status}"))
        }
        Err(()) => StoreError::Backend {
            status: status.as_u16().to_string(),
            message: body.chars().take(200).collect(),
        },
    }
}

/// Map a Google API status name to a [`StoreError`].
fn classify_status(error: ErrorStatus) -> StoreError {
    match error.status.as_str() {
        "FAILED_PRECONDITION" => StoreError::MissingIndex(error.message),
        "PERMISSION_DENIED" | "UNAUTHENTICATED" => StoreError::PermissionDenied(error.message),
        "RESOURCE_EXHAUSTED" => StoreError::QuotaExceeded(error.message),
        "" => StoreError::Backend {
            status: error.code.to_string(),
            message: error.message,
        },
        other => StoreError::Backend {
            status: other.to_string(),
            message: error.message,
        },
    }
}

/// Encode bare JSON into a Firestore typed value.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => n.as_i64().map_or_else(
            || json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
            // integerValue is a string on the wire (int64 in JSON)
            |i| json!({ "integerValue": i.to_string() }),
        ),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_fields(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}
