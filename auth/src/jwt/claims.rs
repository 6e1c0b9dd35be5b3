use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Role assumed for tokens issued before the `role` claim existed.
pub const DEFAULT_ROLE: &str = "user";

/// Purpose of a signed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set carried by access and refresh tokens.
///
/// `role` is the subject's role at issuance time and may lag behind the
/// directory until the next issuance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (user id)
    pub sub: i64,

    /// Role of the subject when the token was issued
    #[serde(default = "default_role")]
    pub role: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl Claims {
    /// Build claims issued now and expiring after `ttl`.
    ///
    /// A random `jti` is always attached so two tokens for the same subject
    /// issued within the same second are still distinct strings.
    pub fn issue(
        subject: i64,
        role: impl Into<String>,
        token_type: TokenType,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: subject,
            role: role.into(),
            token_type,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
        }
    }

    /// Expiration as a UTC timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Check if token is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
