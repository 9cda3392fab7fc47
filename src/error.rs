//! Defines the error types that can occur while verifying a Cognito token.
//!
//! Every failure in the verification pipeline maps onto one of these
//! variants. The façade never propagates them to callers directly; they are
//! carried as data inside [`ClaimVerifyResult`](crate::ClaimVerifyResult).

use thiserror::Error;

/// Represents errors that can occur during claim verification.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// The token is not a compact JWT or its header cannot be decoded.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The key set could not be retrieved from the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered, but not with a usable key set.
    #[error("malformed JWKS response: {0}")]
    MalformedResponse(String),

    /// No key with the token's `kid` is present in the key set.
    #[error("claim made for unknown kid: {0}")]
    UnknownKey(String),

    /// Signature mismatch, corrupt signature, or unsupported algorithm.
    #[error("token signature is invalid: {0}")]
    SignatureInvalid(String),

    /// The token is outside its `auth_time..=exp` window.
    #[error("claim is expired or not yet valid")]
    ExpiredOrNotYetValid,

    /// The `iss` claim does not match the configured issuer.
    #[error("claim issuer is invalid: expected {expected}, got {actual}")]
    IssuerMismatch { expected: String, actual: String },

    /// The `token_use` claim is not the one required by policy.
    #[error("claim use is not {expected}: got {actual}")]
    TokenUseMismatch { expected: String, actual: String },

    /// The verifier could not be constructed.
    #[error("configuration error: {0}")]
    Config(String),
}
