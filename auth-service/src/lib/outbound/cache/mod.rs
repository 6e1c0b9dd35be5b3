pub mod memory;
pub mod noop;
pub mod redis_cache;

pub use memory::InMemoryDirectoryCache;
pub use noop::NoopDirectoryCache;
pub use redis_cache::RedisDirectoryCache;
