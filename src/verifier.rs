//! # Verification façade
//!
//! [`TokenVerifier::verify_claim`] is the single entry point. It never returns
//! an error: every failure is folded into a [`ClaimVerifyResult`] with
//! `is_valid == false`, so callers only branch on the flag.

use crate::claims::{current_timestamp, ClaimVerifier, Claims};
use crate::config::VerifierConfig;
use crate::error::AuthError;
use crate::jwks::{JwksCache, JwksClient};
use crate::parser::JwtParser;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;

/// A token to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimVerifyRequest {
    /// Compact JWT (`header.payload.signature`).
    pub token: String,
}

impl ClaimVerifyRequest {
    /// Wraps a compact token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Builds a request from an `Authorization` header value.
    pub fn from_bearer(header_value: &str) -> Self {
        let token = header_value
            .strip_prefix("Bearer ")
            .unwrap_or(header_value)
            .trim();
        Self::new(token)
    }
}

/// Outcome of a verification.
///
/// `user_name` and `client_id` are always present and empty when the token
/// was rejected; `error` is present exactly when `is_valid` is false.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVerifyResult {
    pub user_name: String,
    pub client_id: String,
    pub is_valid: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<AuthError>,
}

impl ClaimVerifyResult {
    fn valid(claims: &Claims) -> Self {
        Self {
            user_name: claims.user_name().to_string(),
            client_id: claims.client_id().to_string(),
            is_valid: true,
            error: None,
        }
    }

    fn invalid(error: AuthError) -> Self {
        Self {
            user_name: String::new(),
            client_id: String::new(),
            is_valid: false,
            error: Some(error),
        }
    }
}

fn serialize_error<S: Serializer>(error: &Option<AuthError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.collect_str(error),
        None => serializer.serialize_none(),
    }
}

/// Verifies Cognito tokens against a shared key cache.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: String,
    cache: Arc<JwksCache>,
    claims: ClaimVerifier,
}

impl TokenVerifier {
    /// Creates a verifier with its own empty key cache.
    pub fn new(config: VerifierConfig) -> Result<Self, AuthError> {
        let client = JwksClient::new(config.fetch_timeout)?;
        Ok(Self::with_cache(config, Arc::new(JwksCache::new(client))))
    }

    /// Creates a verifier on top of an existing cache.
    pub fn with_cache(config: VerifierConfig, cache: Arc<JwksCache>) -> Self {
        let claims = ClaimVerifier::new(config.issuer.clone())
            .with_required_token_use(config.required_token_use);
        Self {
            issuer: config.issuer,
            cache,
            claims,
        }
    }

    /// The key cache this verifier reads from.
    pub fn cache(&self) -> &Arc<JwksCache> {
        &self.cache
    }

    /// Verifies a token, folding every failure into the result.
    pub async fn verify_claim(&self, request: &ClaimVerifyRequest) -> ClaimVerifyResult {
        tracing::debug!("User claim verify invoked (token length {})", request.token.len());

        match self.verify_token(&request.token).await {
            Ok(claims) => {
                tracing::info!("Claim confirmed for {}", claims.user_name());
                ClaimVerifyResult::valid(&claims)
            }
            Err(e) => {
                tracing::warn!("Claim rejected: {}", e);
                ClaimVerifyResult::invalid(e)
            }
        }
    }

    /// Verifies a token and returns its claims.
    pub async fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = JwtParser::decode_header(token)?;
        let keys = self.cache.get_or_load(&self.issuer).await?;
        self.claims
            .verify(token, &header, &keys, current_timestamp())
    }
}
