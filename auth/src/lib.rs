//! Authentication primitives
//!
//! Pure, I/O-free building blocks for the authentication service:
//! - Password hashing (Argon2id) and password strength policy
//! - Signed access/refresh tokens (HS256 JWT) with typed claims
//! - An `Authenticator` coordinating both
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::with_cost(1024, 1, 1).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenType};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let issued = codec.issue(42, "user", TokenType::Access, Duration::minutes(15)).unwrap();
//! let claims = codec.decode(&issued.token, TokenType::Access).unwrap();
//! assert_eq!(claims.sub, 42);
//! assert!(codec.decode(&issued.token, TokenType::Refresh).is_err());
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{Authenticator, TokenType};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::minutes(15),
//!     Duration::days(7),
//! );
//! let pair = auth.issue_pair(42, "admin").unwrap();
//! let claims = auth.validate_token(&pair.refresh_token, TokenType::Refresh).unwrap();
//! assert_eq!(claims.role, "admin");
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenCodec;
pub use jwt::TokenType;
pub use jwt::DEFAULT_ROLE;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use password::PasswordPolicyError;
