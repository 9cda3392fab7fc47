//! # JWT structure parsing
//!
//! Structural handling of compact tokens and published keys.
//!
//! ## Features
//! - **Header Decoding**: extracts `kid` and `alg` without touching payload or signature
//! - **Key Conversion**: turns RSA and EC JWKs into verification keys
//! - **Algorithm Mapping**: accepts only asymmetric algorithms

use crate::error::AuthError;
use crate::jwks::Jwk;
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// JWT Header structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenHeader {
    /// Key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Algorithm
    pub alg: String,
    /// Token type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

/// JWT Parser.
pub struct JwtParser;

impl JwtParser {
    /// Decodes the JWT header to extract Key ID and algorithm.
    ///
    /// Purely structural: the payload and signature are not inspected.
    ///
    /// # Arguments
    ///
    /// * `token` - JWT token string
    pub fn decode_header(token: &str) -> Result<TokenHeader, AuthError> {
        let mut parts = token.split('.');
        let header_part = parts.next().unwrap_or_default();
        if parts.next().is_none() {
            return Err(AuthError::MalformedToken(
                "requested token is invalid".to_string(),
            ));
        }
        if header_part.is_empty() {
            return Err(AuthError::MalformedToken("empty header segment".to_string()));
        }

        tracing::debug!("JWT header segment length: {}", header_part.len());

        // Some encoders keep the '=' padding.
        let header_bytes = general_purpose::URL_SAFE_NO_PAD
            .decode(header_part)
            .or_else(|_| general_purpose::URL_SAFE.decode(header_part))
            .map_err(|e| AuthError::MalformedToken(format!("header is not base64url: {e}")))?;

        serde_json::from_slice(&header_bytes)
            .map_err(|e| AuthError::MalformedToken(format!("header is not valid JSON: {e}")))
    }

    /// Creates a decoding key from a JWK.
    ///
    /// # Arguments
    ///
    /// * `jwk` - JSON Web Key
    pub fn create_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
        match jwk.kty.as_str() {
            "RSA" => {
                let n = Self::component(jwk, "n", jwk.n.as_deref())?;
                let e = Self::component(jwk, "e", jwk.e.as_deref())?;
                DecodingKey::from_rsa_components(n, e).map_err(|e| {
                    AuthError::MalformedResponse(format!(
                        "key '{}': invalid RSA components: {e}",
                        jwk.kid
                    ))
                })
            }
            "EC" => {
                let crv = Self::component(jwk, "crv", jwk.crv.as_deref())?;
                if crv != "P-256" && crv != "P-384" {
                    return Err(AuthError::MalformedResponse(format!(
                        "key '{}': unsupported curve {crv}",
                        jwk.kid
                    )));
                }
                let x = Self::component(jwk, "x", jwk.x.as_deref())?;
                let y = Self::component(jwk, "y", jwk.y.as_deref())?;
                DecodingKey::from_ec_components(x, y).map_err(|e| {
                    AuthError::MalformedResponse(format!(
                        "key '{}': invalid EC components: {e}",
                        jwk.kid
                    ))
                })
            }
            unsupported_kty => Err(AuthError::MalformedResponse(format!(
                "key '{}': unsupported key type {unsupported_kty}",
                jwk.kid
            ))),
        }
    }

    /// Maps a header `alg` onto a verification algorithm.
    ///
    /// Symmetric (`HS*`) algorithms cannot be verified with published keys
    /// and are rejected.
    ///
    /// # Arguments
    ///
    /// * `alg` - Algorithm string (e.g. "RS256")
    pub fn parse_algorithm(alg: &str) -> Result<Algorithm, AuthError> {
        match Algorithm::from_str(alg) {
            Ok(
                algorithm @ (Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
                | Algorithm::ES256
                | Algorithm::ES384),
            ) => Ok(algorithm),
            _ => {
                tracing::warn!("Unsupported JWT algorithm: {}", alg);
                Err(AuthError::SignatureInvalid(format!(
                    "unsupported algorithm {alg}"
                )))
            }
        }
    }

    fn component<'a>(jwk: &Jwk, name: &str, value: Option<&'a str>) -> Result<&'a str, AuthError> {
        value.ok_or_else(|| {
            AuthError::MalformedResponse(format!("key '{}': missing {name}", jwk.kid))
        })
    }
}
