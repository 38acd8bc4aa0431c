//! Image reference resolution.
//!
//! Product documents reference images three ways: absolute URLs, paths
//! served by the app itself (`/images/...`), and object paths inside the
//! Firebase Storage bucket (`products/helmet.jpg` or `gs://bucket/...`).
//! Only the last kind needs a lookup, which turns it into a tokenized
//! download URL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::config::StorageConfig;

/// Object metadata returned by the Storage REST API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Resolves image references into browser-loadable URLs.
///
/// Cheaply cloneable via `Arc`. Successful lookups are cached for an hour.
#[derive(Clone)]
pub struct ImageResolver {
    inner: Arc<ImageResolverInner>,
}

struct ImageResolverInner {
    client: reqwest::Client,
    storage: Option<StorageConfig>,
    cache: Cache<String, String>,
}

impl ImageResolver {
    /// Create a resolver. Without storage configuration every reference is
    /// returned as is.
    #[must_use]
    pub fn new(storage: Option<StorageConfig>) -> Self {
        Self {
            inner: Arc::new(ImageResolverInner {
                client: reqwest::Client::new(),
                storage,
                cache: Cache::builder()
                    .max_capacity(10_000)
                    .time_to_live(Duration::from_secs(3600))
                    .build(),
            }),
        }
    }

    /// Resolve one reference. Never fails: on any error the original
    /// reference is returned.
    #[instrument(skip(self))]
    pub async fn resolve(&self, reference: &str) -> String {
        let reference = reference.trim();
        if is_direct(reference) {
            return reference.to_string();
        }
        let Some(storage) = &self.inner.storage else {
            return reference.to_string();
        };

        if let Some(url) = self.inner.cache.get(reference).await {
            return url;
        }

        let object_path = object_path(reference, &storage.bucket);
        match self.lookup(storage, object_path).await {
            Ok(url) => {
                self.inner
                    .cache
                    .insert(reference.to_string(), url.clone())
                    .await;
                url
            }
            Err(e) => {
                warn!(error = %e, "Image lookup failed, using reference as is");
                reference.to_string()
            }
        }
    }

    async fn lookup(&self, storage: &StorageConfig, object_path: &str) -> Result<String, reqwest::Error> {
        let object_url = format!(
            "{}/v0/b/{}/o/{}",
            storage.base_url,
            storage.bucket,
            urlencoding::encode(object_path)
        );

        let metadata: ObjectMetadata = self
            .inner
            .client
            .get(&object_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').map(str::trim).find(|t| !t.is_empty()));

        debug!(has_token = token.is_some(), "Resolved storage object");
        Ok(match token {
            Some(token) => format!("{object_url}?alt=media&token={}", urlencoding::encode(token)),
            None => format!("{object_url}?alt=media"),
        })
    }
}

/// References the browser can load without a lookup.
fn is_direct(reference: &str) -> bool {
    reference.is_empty()
        || reference.starts_with('/')
        || reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("data:")
}

/// Object path inside the bucket, with any `gs://bucket/` prefix removed.
fn object_path<'a>(reference: &'a str, bucket: &str) -> &'a str {
    reference
        .strip_prefix("gs://")
        .map_or(reference, |rest| {
            rest.strip_prefix(bucket)
                .map_or(rest, |path| path.trim_start_matches('/'))
        })
}
