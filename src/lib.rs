//! # cognito-jwt
//!
//! Verifies JWTs issued by an AWS Cognito user pool against the pool's
//! published JWKS, with a process-wide key cache.
//!
//! ## Features
//! - **Uniform Result**: verification never returns an error, only a result to branch on.
//! - **JWKS-based**: fetches the pool's signing keys once and keeps them.
//! - **Injectable Cache**: the key cache is an explicit, shareable object.
//! - **Strict Claims**: signature, `auth_time..=exp` window and exact issuer match.
//!
//! ## Known limitation
//! The key cache is never refreshed. Keys the pool rotates in after the first
//! fetch are reported as unknown until the process restarts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cognito_jwt::{ClaimVerifyRequest, TokenVerifier, VerifierConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Point the verifier at the user pool
//!     let config = VerifierConfig::for_user_pool("ap-northeast-2", "ap-northeast-2_8WMH5DCrb");
//!     let verifier = TokenVerifier::new(config)?;
//!
//!     // 2. Verify the token taken from the request
//!     let request = ClaimVerifyRequest::from_bearer("Bearer eyJraWQiOi...");
//!     let result = verifier.verify_claim(&request).await;
//!
//!     // 3. Branch on the flag
//!     if result.is_valid {
//!         println!("Authenticated {} via client {}", result.user_name, result.client_id);
//!     } else if let Some(e) = result.error {
//!         eprintln!("Authentication failed: {}", e);
//!     }
//!
//!     Ok(())
//! }
//! ```
/// Claims and the claim verifier.
mod claims;
/// Verifier configuration.
mod config;
/// Defines error types for the library.
mod error;
/// JWKS fetching and the key cache.
mod jwks;
/// Token header and key parsing.
mod parser;
/// The verification entry point.
mod verifier;


pub use claims::{current_timestamp, ClaimVerifier, Claims, TokenUse};
pub use config::{user_pool_issuer, VerifierConfig};
pub use error::AuthError;
pub use jwks::{jwks_url, Jwk, JwksCache, JwksClient, JwksResponse, KeyMap, PublicKeyMaterial};
pub use parser::{JwtParser, TokenHeader};
pub use verifier::{ClaimVerifyRequest, ClaimVerifyResult, TokenVerifier};
