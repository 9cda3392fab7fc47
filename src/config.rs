//! Verifier configuration.
//!
//! The verifier only needs the fully composed issuer URL; how that URL is
//! assembled (region and user pool id, an explicit override, ...) is up to the
//! host. [`VerifierConfig::for_user_pool`] covers the common Cognito case.

use crate::claims::TokenUse;
use std::time::Duration;

/// Configuration consumed by [`TokenVerifier`](crate::TokenVerifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Issuer every accepted token must carry in `iss`, matched exactly.
    pub issuer: String,
    /// Timeout applied to the JWKS request.
    pub fetch_timeout: Duration,
    /// When set, tokens with a different `token_use` are rejected.
    pub required_token_use: Option<TokenUse>,
}

impl VerifierConfig {
    /// Default timeout for the JWKS request.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for an explicit issuer URL.
    pub fn new(issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        if !issuer.starts_with("https://") {
            tracing::warn!("Issuer URL should use HTTPS: {}", issuer);
        }

        Self {
            issuer,
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            required_token_use: None,
        }
    }

    /// Creates a configuration for a Cognito user pool.
    ///
    /// The issuer is `https://cognito-idp.<region>.amazonaws.com/<pool_id>`.
    pub fn for_user_pool(region: &str, pool_id: &str) -> Self {
        Self::new(user_pool_issuer(region, pool_id))
    }

    /// Overrides the JWKS request timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Restricts accepted tokens to one `token_use`.
    pub fn with_required_token_use(mut self, token_use: TokenUse) -> Self {
        self.required_token_use = Some(token_use);
        self
    }
}

/// Composes the issuer URL of a Cognito user pool.
pub fn user_pool_issuer(region: &str, pool_id: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com/{pool_id}")
}
