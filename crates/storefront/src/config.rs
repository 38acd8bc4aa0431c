//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Document store
//! - `STORE_BACKEND` - `firestore` or `memory` (default: `firestore` when
//!   `FIRESTORE_PROJECT_ID` is set, otherwise no store is configured)
//! - `FIRESTORE_PROJECT_ID` - Firebase project ID
//! - `FIRESTORE_DATABASE` - Database ID (default: `(default)`)
//! - `FIRESTORE_API_KEY` - Web API key (optional)
//! - `FIRESTORE_BASE_URL` - REST endpoint override, e.g. for the emulator
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `FIREBASE_STORAGE_BUCKET` - Bucket used to resolve image references
//! - `FIREBASE_STORAGE_BASE_URL` - Storage endpoint override
//! - `CATALOG_CACHE_TTL_SECS` - Catalog cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document store selection
    pub backend: BackendConfig,
    /// Blob storage used for image references
    pub storage: Option<StorageConfig>,
    /// How long catalog reads stay cached
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Which document store to talk to.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Firestore over REST.
    Firestore(FirestoreConfig),
    /// In-process store seeded with sample data.
    Memory,
    /// No store: reads are empty and writes fail.
    Unconfigured,
}

/// Firestore REST API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirestoreConfig {
    /// Firebase project ID
    pub project_id: String,
    /// Database ID, usually `(default)`
    pub database: String,
    /// Web API key appended as `?key=`
    pub api_key: Option<SecretString>,
    /// REST endpoint without trailing slash
    pub base_url: String,
}

impl std::fmt::Debug for FirestoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Firebase Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name, e.g. `my-project.appspot.com`
    pub bucket: String,
    /// Storage endpoint without trailing slash
    pub base_url: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if variables are invalid or the API key looks
    /// like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let ttl_secs = env
            .or_default("CATALOG_CACHE_TTL_SECS", &DEFAULT_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CATALOG_CACHE_TTL_SECS".to_string(), e.to_string())
            })?;

        let backend = BackendConfig::from_env(&env)?;
        let storage = env.optional("FIREBASE_STORAGE_BUCKET").map(|bucket| StorageConfig {
            bucket,
            base_url: env
                .or_default("FIREBASE_STORAGE_BASE_URL", DEFAULT_STORAGE_URL)
                .trim_end_matches('/')
                .to_string(),
        });

        Ok(Self {
            host,
            port,
            backend,
            storage,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let project_id = env.optional("FIRESTORE_PROJECT_ID");

        let selected = env
            .optional("STORE_BACKEND")
            .map(|s| s.trim().to_ascii_lowercase());
        match (selected.as_deref(), project_id) {
            (Some("memory"), _) => Ok(Self::Memory),
            (Some("firestore") | None, Some(project_id)) => {
                Ok(Self::Firestore(FirestoreConfig::from_env(env, project_id)?))
            }
            (Some("firestore"), None) => {
                Err(ConfigError::MissingEnvVar("FIRESTORE_PROJECT_ID".to_string()))
            }
            (None, None) => Ok(Self::Unconfigured),
            (Some(other), _) => Err(ConfigError::InvalidEnvVar(
                "STORE_BACKEND".to_string(),
                format!("expected 'firestore' or 'memory', got '{other}'"),
            )),
        }
    }
}

impl FirestoreConfig {
    fn from_env(env: &Env<'_>, project_id: String) -> Result<Self, ConfigError> {
        let api_key = match env.optional("FIRESTORE_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "FIRESTORE_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            project_id,
            database: env.or_default("FIRESTORE_DATABASE", "(default)"),
            api_key,
            base_url: env
                .or_default("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Environment lookup that treats blank values as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
