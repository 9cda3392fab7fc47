//! JWT 结构解析测试
//!
//! ## 测试重点
//! - **Header 解码**：只做结构检查，不涉及 payload 与签名
//! - **快速失败**：少于两段、非 base64url、非 JSON 的 token 一律拒绝
//! - **密钥转换**：RSA 与 EC JWK 转换为验证密钥
//! - **算法映射**：仅接受非对称算法

use super::test_helpers::*;
use crate::parser::JwtParser;
use crate::{AuthError, Jwk};
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::Algorithm;

fn encode_header(json: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header_valid() {
        let token = format!(
            "{}.payload.signature",
            encode_header(r#"{"kid":"test-key-id","alg":"RS256","typ":"JWT"}"#)
        );

        let header = JwtParser::decode_header(&token).expect("Should decode valid JWT header");
        assert_eq!(header.kid.as_deref(), Some(TEST_KID), "Key ID should match test key ID");
        assert_eq!(header.alg, "RS256", "Algorithm should be RS256");
        assert_eq!(header.typ.as_deref(), Some("JWT"), "Token type should be JWT");
    }

    #[test]
    fn test_decode_header_of_user_pool_token() {
        let header = JwtParser::decode_header(SAMPLE_POOL_TOKEN)
            .expect("User pool token header should decode");

        assert_eq!(
            header.kid.as_deref(),
            Some("hPyFolWJBbjrWskzNyYjlwHV7D+8meZypiNRWGPGPOs=")
        );
        assert_eq!(header.alg, "RS256");
        assert_eq!(header.typ, None);
    }

    #[test]
    fn test_decode_header_rejects_fewer_than_two_segments() {
        for token in ["", "   ", "single_part", "no_dots_at_all", &"a".repeat(10000)] {
            let result = JwtParser::decode_header(token);
            assert!(
                matches!(result, Err(AuthError::MalformedToken(_))),
                "Token {:?} should be rejected as malformed, got {:?}",
                &token[..token.len().min(20)],
                result
            );
        }
    }

    #[test]
    fn test_decode_header_accepts_two_segments() {
        // 结构检查只要求至少两段
        let token = format!("{}.payload", encode_header(r#"{"kid":"k","alg":"RS256"}"#));
        let header = JwtParser::decode_header(&token).expect("Two-part token header should decode");
        assert_eq!(header.kid.as_deref(), Some("k"));
    }

    #[test]
    fn test_decode_header_without_kid() {
        // 缺少 kid 仍是合法的 header，由验证器报告未知密钥
        let token = format!("{}.payload.signature", encode_header(r#"{"alg":"RS256"}"#));

        let header = JwtParser::decode_header(&token).expect("Header without kid should decode");
        assert_eq!(header.kid, None);
        assert_eq!(header.alg, "RS256");
    }

    #[test]
    fn test_decode_header_accepts_padded_base64() {
        let padded = general_purpose::URL_SAFE.encode(r#"{"kid":"ab","alg":"RS256"}"#);
        assert!(padded.ends_with('='), "Fixture should carry padding");

        let header = JwtParser::decode_header(&format!("{padded}.payload.signature"))
            .expect("Padded header should decode");
        assert_eq!(header.kid.as_deref(), Some("ab"));
    }

    #[test]
    fn test_decode_header_invalid_segments() {
        let cases = [
            ".payload.signature".to_string(),
            "header..signature".to_string(),
            "!!!.payload.signature".to_string(),
            format!("{}.payload.signature", encode_header("not json")),
            format!("{}.payload.signature", encode_header(r#"{"kid":42,"alg":"RS256"}"#)),
        ];

        for token in &cases {
            assert!(
                matches!(
                    JwtParser::decode_header(token),
                    Err(AuthError::MalformedToken(_))
                ),
                "Token {token:?} should be rejected as malformed"
            );
        }
    }

    #[test]
    fn test_create_decoding_key_rsa() {
        let jwk = primary_key().jwk();
        assert!(JwtParser::create_decoding_key(&jwk).is_ok());
    }

    #[test]
    fn test_create_decoding_key_ec() {
        let jwk = Jwk {
            kid: "ec-key".to_string(),
            kty: "EC".to_string(),
            alg: Some("ES256".to_string()),
            key_use: Some("sig".to_string()),
            n: None,
            e: None,
            crv: Some("P-256".to_string()),
            x: Some("ykCi3ZomyYBFS21ZKk6ajc56O1SUFzhCNp0ziDYd6mw".to_string()),
            y: Some("okXySUHOrPVxWBr0HlCw4yWY_TMq8EyhKhTugGoRCQU".to_string()),
        };
        assert!(JwtParser::create_decoding_key(&jwk).is_ok());

        let mut unsupported_curve = jwk.clone();
        unsupported_curve.crv = Some("secp256k1".to_string());
        assert!(matches!(
            JwtParser::create_decoding_key(&unsupported_curve),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_create_decoding_key_rejects_incomplete_keys() {
        let mut missing_modulus = primary_key().jwk();
        missing_modulus.n = None;
        let err = JwtParser::create_decoding_key(&missing_modulus)
            .err()
            .expect("Key without modulus should be rejected");
        assert!(
            matches!(&err, AuthError::MalformedResponse(msg) if msg.contains("missing n")),
            "Unexpected error: {err:?}"
        );

        let mut bad_exponent = primary_key().jwk();
        bad_exponent.e = Some("not base64!".to_string());
        assert!(matches!(
            JwtParser::create_decoding_key(&bad_exponent),
            Err(AuthError::MalformedResponse(_))
        ));

        let mut symmetric = primary_key().jwk();
        symmetric.kty = "oct".to_string();
        let err = JwtParser::create_decoding_key(&symmetric)
            .err()
            .expect("Symmetric key should be rejected");
        assert!(
            matches!(&err, AuthError::MalformedResponse(msg) if msg.contains("unsupported key type oct")),
            "Unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(JwtParser::parse_algorithm("RS256"), Ok(Algorithm::RS256));
        assert_eq!(JwtParser::parse_algorithm("RS512"), Ok(Algorithm::RS512));
        assert_eq!(JwtParser::parse_algorithm("PS256"), Ok(Algorithm::PS256));
        assert_eq!(JwtParser::parse_algorithm("ES256"), Ok(Algorithm::ES256));

        for alg in ["HS256", "HS512", "none", "rs256", "", "EdDSA"] {
            assert!(
                matches!(
                    JwtParser::parse_algorithm(alg),
                    Err(AuthError::SignatureInvalid(_))
                ),
                "Algorithm {alg:?} should be rejected"
            );
        }
    }
}
