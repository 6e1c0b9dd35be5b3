use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::Claims;
use super::claims::TokenType;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Signed token together with its expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and decodes the service's access and refresh tokens.
///
/// Stateless: the result depends only on the token, the secret and the clock.
pub struct TokenCodec {
    handler: JwtHandler,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            handler: JwtHandler::new(secret),
        }
    }

    /// Sign a new token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed
    pub fn issue(
        &self,
        subject: i64,
        role: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, JwtError> {
        let claims = Claims::issue(subject, role, token_type, ttl);
        let token = self.handler.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Verify a token and check it was issued for the `expected` purpose.
    ///
    /// # Errors
    /// * `InvalidSignature`, `InvalidAlgorithm`, `TokenExpired`, `Malformed` - see [`JwtHandler::decode`]
    /// * `WrongTokenType` - Token is valid but of the other type
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims: Claims = self.handler.decode(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"codec_secret_key_at_least_32_bytes!";

    #[test]
    fn test_round_trip_preserves_subject_role_and_type() {
        let codec = TokenCodec::new(SECRET);

        for (subject, role, ttl) in [
            (1, "user", Duration::seconds(1)),
            (42, "admin", Duration::minutes(15)),
            (i64::from(i32::MAX), "auditor", Duration::days(7)),
        ] {
            let issued = codec.issue(subject, role, TokenType::Access, ttl).unwrap();
            let claims = codec.decode(&issued.token, TokenType::Access).unwrap();

            assert_eq!(claims.sub, subject);
            assert_eq!(claims.role, role);
            assert_eq!(claims.token_type, TokenType::Access);
            assert_eq!(claims.exp, issued.expires_at.timestamp());
        }
    }

    #[test]
    fn test_type_mismatch_is_distinct_error() {
        let codec = TokenCodec::new(SECRET);

        let access = codec
            .issue(1, "user", TokenType::Access, Duration::minutes(5))
            .unwrap();
        let refresh = codec
            .issue(1, "user", TokenType::Refresh, Duration::hours(1))
            .unwrap();

        assert_eq!(
            codec.decode(&access.token, TokenType::Refresh),
            Err(JwtError::WrongTokenType {
                expected: TokenType::Refresh,
                actual: TokenType::Access,
            })
        );
        assert_eq!(
            codec.decode(&refresh.token, TokenType::Access),
            Err(JwtError::WrongTokenType {
                expected: TokenType::Access,
                actual: TokenType::Refresh,
            })
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new(SECRET);
        let issued = codec
            .issue(1, "user", TokenType::Access, Duration::seconds(-10))
            .unwrap();

        assert_eq!(
            codec.decode(&issued.token, TokenType::Access),
            Err(JwtError::TokenExpired)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = TokenCodec::new(SECRET);
        let issued = codec
            .issue(1, "user", TokenType::Access, Duration::minutes(5))
            .unwrap();

        let forged = codec
            .issue(2, "admin", TokenType::Access, Duration::minutes(5))
            .unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = forged.token.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        let tampered = parts.join(".");

        assert_eq!(
            codec.decode(&tampered, TokenType::Access),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_consecutive_issuances_differ() {
        let codec = TokenCodec::new(SECRET);

        let first = codec
            .issue(1, "user", TokenType::Refresh, Duration::hours(1))
            .unwrap();
        let second = codec
            .issue(1, "user", TokenType::Refresh, Duration::hours(1))
            .unwrap();

        assert_ne!(first.token, second.token);
    }
}
