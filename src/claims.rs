//! # Claims and claim verification
//!
//! [`Claims`] is the decoded payload of a Cognito token. [`ClaimVerifier`]
//! checks, in order and stopping at the first failure:
//!
//! 1. the token's `kid` is in the key set
//! 2. the signature verifies against that key
//! 3. the payload decodes into [`Claims`]
//! 4. `max(auth_time, nbf) <= now <= exp` (all bounds inclusive)
//! 5. `iss` equals the configured issuer
//! 6. `token_use` matches policy, when a policy is configured

use crate::error::AuthError;
use crate::jwks::KeyMap;
use crate::parser::{JwtParser, TokenHeader};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// The category of a Cognito token, carried in the `token_use` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Access token.
    Access,
    /// ID token.
    Id,
}

impl TokenUse {
    /// The claim value for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenUse::Access => "access",
            TokenUse::Id => "id",
        }
    }
}

impl fmt::Display for TokenUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenUse {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenUse::Access),
            "id" => Ok(TokenUse::Id),
            other => Err(AuthError::Config(format!(
                "unknown token use '{other}', expected 'access' or 'id'"
            ))),
        }
    }
}

/// Decoded token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Token category ("access" or "id").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_use: Option<String>,
    /// Time of authentication, epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<u64>,
    /// Issuer.
    pub iss: String,
    /// Expiration time, epoch seconds.
    pub exp: u64,
    /// Not before, epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// User name. Access tokens carry `username`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// App client ID. Access tokens carry `client_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Subject (user ID).
    #[serde(default)]
    pub sub: String,
    /// Every other claim, e.g. `cognito:username`, `aud`, `email`.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// The user name: `username`, or `cognito:username` for ID tokens.
    pub fn user_name(&self) -> &str {
        self.username
            .as_deref()
            .or_else(|| self.extra_str("cognito:username"))
            .unwrap_or_default()
    }

    /// The app client ID: `client_id`, or `aud` for ID tokens.
    pub fn client_id(&self) -> &str {
        self.client_id
            .as_deref()
            .or_else(|| self.extra_str("aud"))
            .unwrap_or_default()
    }

    /// Looks up a claim not modelled as a field.
    pub fn get_claim<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.extra
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether `now` lies inside `auth_time..=exp` and is not before `nbf`.
    pub fn is_current(&self, now: u64) -> bool {
        now <= self.exp
            && self.auth_time.map_or(true, |auth_time| now >= auth_time)
            && self.nbf.map_or(true, |nbf| now >= nbf)
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// Current time in epoch seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Verifies a token's signature and claims against a key set.
#[derive(Debug, Clone)]
pub struct ClaimVerifier {
    expected_issuer: String,
    required_token_use: Option<TokenUse>,
}

impl ClaimVerifier {
    /// Creates a verifier accepting tokens from `expected_issuer`.
    pub fn new(expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            required_token_use: None,
        }
    }

    /// Rejects tokens whose `token_use` differs from `token_use`, when set.
    pub fn with_required_token_use(mut self, token_use: Option<TokenUse>) -> Self {
        self.required_token_use = token_use;
        self
    }

    /// The issuer accepted tokens must carry.
    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// Verifies `token` and returns its claims.
    ///
    /// # Arguments
    ///
    /// * `token` - JWT token string
    /// * `header` - the token's decoded header
    /// * `keys` - the key set to look the signing key up in
    /// * `now` - current time, epoch seconds
    pub fn verify(
        &self,
        token: &str,
        header: &TokenHeader,
        keys: &KeyMap,
        now: u64,
    ) -> Result<Claims, AuthError> {
        let kid = header.kid.as_deref().unwrap_or_default();
        let key = keys.get(kid).ok_or_else(|| {
            tracing::warn!("Key with kid '{}' not found in JWKS", kid);
            AuthError::UnknownKey(kid.to_string())
        })?;

        let algorithm = JwtParser::parse_algorithm(&header.alg)?;
        if let Some(key_alg) = key.record.alg.as_deref() {
            if key_alg != header.alg {
                return Err(AuthError::SignatureInvalid(format!(
                    "token algorithm {} does not match key algorithm {key_alg}",
                    header.alg
                )));
            }
        }

        // Signature only; time and issuer are checked below with exact bounds.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &key.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                    tracing::warn!("JWT payload could not be decoded: {:?}", e);
                    AuthError::MalformedToken(format!("payload is not a claim set: {e}"))
                }
                _ => {
                    tracing::warn!("JWT signature verification failed: {:?}", e);
                    AuthError::SignatureInvalid(e.to_string())
                }
            })?
            .claims;

        if !claims.is_current(now) {
            tracing::warn!(
                "Claim outside validity window: now={}, auth_time={:?}, nbf={:?}, exp={}",
                now,
                claims.auth_time,
                claims.nbf,
                claims.exp
            );
            return Err(AuthError::ExpiredOrNotYetValid);
        }

        if claims.iss != self.expected_issuer {
            return Err(AuthError::IssuerMismatch {
                expected: self.expected_issuer.clone(),
                actual: claims.iss,
            });
        }

        if let Some(required) = self.required_token_use {
            let actual = claims.token_use.as_deref().unwrap_or_default();
            if actual != required.as_str() {
                return Err(AuthError::TokenUseMismatch {
                    expected: required.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        tracing::debug!("JWT validation successful for subject: {}", claims.sub);
        Ok(claims)
    }
}
