//! JWKS document types and the HTTP fetcher for the identity provider's key set.
//!
//! The fetcher makes exactly one attempt per call. Callers needing retries
//! wrap it themselves; `key_cache::CachedKeySet` is the only wrapper we ship.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::services::auth::error::AuthError;

/// Path of the key-set document below the provider base URL.
pub const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

/// Header carrying the provider API key.
pub const API_KEY_HEADER: &str = "apikey";

/// One JSON Web Key. Only the members we read are modelled; the rest are ignored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Jwk {
    pub kty: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    // EC
    #[serde(default)]
    pub crv: Option<String>,
    #[serde(default)]
    pub x: Option<String>,
    #[serde(default)]
    pub y: Option<String>,

    // RSA
    #[serde(default)]
    pub n: Option<String>,
    #[serde(default)]
    pub e: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// First entry whose `kid` equals `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid.as_deref() == Some(kid))
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, AuthError> {
        serde_json::from_slice(body).map_err(AuthError::KeySetMalformed)
    }
}

/// Anything that can hand out the provider's current key set.
#[async_trait]
pub trait KeySetSource: Send + Sync + 'static {
    // URL the key set is published at (used as the cache key and in logs).
    fn source_url(&self) -> &str;

    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError>;
}

/// HTTP fetcher for `{base_url}/auth/v1/.well-known/jwks.json`.
///
/// Request configuration is immutable: the API key is attached per request and
/// the shared `reqwest::Client` never carries default auth headers.
#[derive(Clone)]
pub struct JwksFetcher {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl std::fmt::Debug for JwksFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the api key
        f.debug_struct("JwksFetcher")
            .field("url", &self.url)
            .finish()
    }
}

impl JwksFetcher {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: jwks_url(base_url),
            api_key: api_key.into(),
        })
    }
}

/// `{base_url}/auth/v1/.well-known/jwks.json`, tolerating a trailing slash on the base.
pub fn jwks_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), JWKS_PATH)
}

#[async_trait]
impl KeySetSource for JwksFetcher {
    fn source_url(&self) -> &str {
        &self.url
    }

    async fn key_set(&self) -> Result<Arc<JwkSet>, AuthError> {
        let response = self
            .client
            .get(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "jwks request failed");
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(url = %self.url, %status, "jwks endpoint returned non-200");
            return Err(AuthError::KeySetUnavailable(format!("status {status}")));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "failed to read jwks body");
            AuthError::KeySetUnavailable(e.to_string())
        })?;

        let set = JwkSet::from_slice(&body)?;
        debug!(url = %self.url, keys = set.keys.len(), "jwks fetched");

        Ok(Arc::new(set))
    }
}
