pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

// Re-export commonly used types
pub use domain::auth::models::*;
pub use domain::auth::service::AuthService;
