pub mod memory;
pub mod service_key;
pub mod session;
pub mod user;

pub use memory::InMemoryServiceKeyStore;
pub use memory::InMemorySessionStore;
pub use memory::InMemoryUserDirectory;
pub use service_key::PostgresServiceKeyStore;
pub use session::PostgresSessionStore;
pub use user::PostgresUserDirectory;
