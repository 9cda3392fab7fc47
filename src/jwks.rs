//! # JWKS (JSON Web Key Set) retrieval and key cache
//!
//! Fetches the user pool's published signing keys and keeps them for the life
//! of the process.
//!
//! ## Caching Strategy
//! 1. The first verification fetches `<issuer>/.well-known/jwks.json`
//! 2. Every key is converted into a [`DecodingKey`] and the whole map is stored
//! 3. Later verifications use the stored map, with no network access
//!
//! The cache is never refreshed. A key rotated in by the provider after the
//! first fetch stays unknown until the process restarts.

use crate::error::AuthError;
use crate::parser::JwtParser;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Path of the key set document, relative to the issuer.
const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Represents a JSON Web Key (JWK) as published by the user pool.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Jwk {
    /// Key ID.
    pub kid: String,
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Algorithm (e.g., "RS256").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Key usage (e.g., "sig").
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Curve (for EC keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// X coordinate (for EC keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Y coordinate (for EC keys).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Represents the response from a JWKS endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JwksResponse {
    /// A list of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// A published key together with its converted verification key.
#[derive(Clone)]
pub struct PublicKeyMaterial {
    /// The key as published.
    pub record: Jwk,
    /// The key in the form the signature verifier consumes.
    pub decoding_key: DecodingKey,
}

impl PublicKeyMaterial {
    /// Converts a published key.
    pub fn from_jwk(record: Jwk) -> Result<Self, AuthError> {
        let decoding_key = JwtParser::create_decoding_key(&record)?;
        Ok(Self {
            record,
            decoding_key,
        })
    }
}

impl std::fmt::Debug for PublicKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKeyMaterial")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Converted keys indexed by key ID.
pub type KeyMap = HashMap<String, PublicKeyMaterial>;

/// Builds the key set URL for an issuer.
pub fn jwks_url(issuer: &str) -> String {
    format!("{}{JWKS_PATH}", issuer.trim_end_matches('/'))
}

/// HTTP client for the user pool's key set endpoint.
///
/// Performs exactly one request per [`fetch_keys`](Self::fetch_keys) call and
/// keeps nothing between calls.
#[derive(Debug, Clone)]
pub struct JwksClient {
    http: reqwest::Client,
}

impl JwksClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }

    /// Fetches the key set published under `issuer`.
    pub async fn fetch_keys(&self, issuer: &str) -> Result<JwksResponse, AuthError> {
        let url = jwks_url(issuer);
        tracing::info!("Fetching JWKS from: {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| {
            let error_msg = format!("failed to fetch JWKS: {e}");
            tracing::error!("{}", error_msg);
            AuthError::Network(error_msg)
        })?;

        if !response.status().is_success() {
            let error_msg = format!("JWKS endpoint returned status: {}", response.status());
            tracing::error!("{}", error_msg);
            return Err(AuthError::Network(error_msg));
        }

        let body = response.bytes().await.map_err(|e| {
            let error_msg = format!("failed to read JWKS response: {e}");
            tracing::error!("{}", error_msg);
            AuthError::Network(error_msg)
        })?;

        serde_json::from_slice::<JwksResponse>(&body).map_err(|e| {
            let error_msg = format!("failed to parse JWKS response: {e}");
            tracing::error!("{}", error_msg);
            AuthError::MalformedResponse(error_msg)
        })
    }
}

/// Process-wide map from key ID to converted key.
///
/// Populated on first use and never invalidated. Share it between verifiers
/// with an `Arc`.
#[derive(Debug)]
pub struct JwksCache {
    /// The stored key map. Replaced as a whole, never merged into.
    keys: RwLock<Option<Arc<KeyMap>>>,
    client: JwksClient,
    fetches: AtomicU64,
}

impl JwksCache {
    /// Creates an empty cache that loads through `client`.
    pub fn new(client: JwksClient) -> Self {
        Self {
            keys: RwLock::new(None),
            client,
            fetches: AtomicU64::new(0),
        }
    }

    /// Creates a cache already holding `keys`; it will never fetch.
    pub fn preloaded(client: JwksClient, keys: Vec<Jwk>) -> Result<Self, AuthError> {
        let keys = Self::convert(JwksResponse { keys })?;
        Ok(Self {
            keys: RwLock::new(Some(Arc::new(keys))),
            client,
            fetches: AtomicU64::new(0),
        })
    }

    /// Returns the key map, fetching it from `issuer` if nothing is stored.
    ///
    /// The stored map is returned as-is on later calls, even when empty.
    pub async fn get_or_load(&self, issuer: &str) -> Result<Arc<KeyMap>, AuthError> {
        if let Some(keys) = self.keys.read().await.as_ref() {
            tracing::debug!("Using cached JWKS ({} keys)", keys.len());
            return Ok(Arc::clone(keys));
        }

        // Concurrent misses may each fetch; only the first completed map is kept.
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let response = self.client.fetch_keys(issuer).await?;
        let fetched = Arc::new(Self::convert(response)?);

        let mut slot = self.keys.write().await;
        if let Some(existing) = slot.as_ref() {
            tracing::debug!("JWKS cache was populated by a concurrent fetch");
            return Ok(Arc::clone(existing));
        }
        *slot = Some(Arc::clone(&fetched));

        tracing::info!("JWKS cache populated with {} keys", fetched.len());
        Ok(fetched)
    }

    /// Number of key set fetches this cache has started.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn convert(response: JwksResponse) -> Result<KeyMap, AuthError> {
        let mut keys = KeyMap::with_capacity(response.keys.len());
        for jwk in response.keys {
            let material = PublicKeyMaterial::from_jwk(jwk).map_err(|e| {
                tracing::error!("Unusable key in JWKS: {}", e);
                e
            })?;
            keys.insert(material.record.kid.clone(), material);
        }
        Ok(keys)
    }
}
