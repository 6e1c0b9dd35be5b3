use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenType;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and token issuance.
///
/// Holds the deployment secret and token lifetimes; constructed once at
/// startup and shared behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: TokenCodec,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

/// Freshly issued access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiration
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration, used as the session expiry
    pub refresh_expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `access_token_ttl` - Lifetime of access tokens
    /// * `refresh_token_ttl` - Lifetime of refresh tokens
    pub fn new(jwt_secret: &[u8], access_token_ttl: Duration, refresh_token_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            codec: TokenCodec::new(jwt_secret),
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    /// Replace the password hasher (e.g. with a configured cost factor).
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }

    /// Hash a password for storage.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthenticationError> {
        if self.password_hasher.verify(password, stored_hash)? {
            Ok(())
        } else {
            Err(AuthenticationError::InvalidCredentials)
        }
    }

    /// Issue an access/refresh pair for `subject` carrying `role`.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_pair(&self, subject: i64, role: &str) -> Result<TokenPair, JwtError> {
        let access = self
            .codec
            .issue(subject, role, TokenType::Access, self.access_token_ttl)?;
        let refresh = self
            .codec
            .issue(subject, role, TokenType::Refresh, self.refresh_token_ttl)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    /// Validate a token of the given type and return its claims.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed, or type mismatch
    pub fn validate_token(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        self.codec.decode(token, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(
            b"test_secret_key_at_least_32_bytes!",
            Duration::minutes(15),
            Duration::days(7),
        )
        .with_password_hasher(PasswordHasher::with_cost(1024, 1, 1).unwrap())
    }

    #[test]
    fn test_verify_password_success() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash).is_ok());
    }

    #[test]
    fn test_verify_password_mismatch() {
        let authenticator = authenticator();
        let hash = authenticator.hash_password("my_password").unwrap();

        let result = authenticator.verify_password("wrong_password", &hash);
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_password_corrupt_hash() {
        let result = authenticator().verify_password("my_password", "not-a-phc-string");
        assert!(matches!(result, Err(AuthenticationError::PasswordError(_))));
    }

    #[test]
    fn test_issue_pair() {
        let authenticator = authenticator();

        let pair = authenticator.issue_pair(7, "admin").expect("Failed to issue");

        let access = authenticator
            .validate_token(&pair.access_token, TokenType::Access)
            .unwrap();
        let refresh = authenticator
            .validate_token(&pair.refresh_token, TokenType::Refresh)
            .unwrap();

        assert_eq!(access.sub, 7);
        assert_eq!(access.role, "admin");
        assert_eq!(refresh.sub, 7);
        assert_eq!(access.exp, pair.access_expires_at.timestamp());
        assert_eq!(refresh.exp, pair.refresh_expires_at.timestamp());
        assert!(pair.refresh_expires_at > pair.access_expires_at);
    }

    #[test]
    fn test_validate_invalid_token() {
        let result = authenticator().validate_token("invalid.token.here", TokenType::Access);
        assert!(result.is_err());
    }
}
