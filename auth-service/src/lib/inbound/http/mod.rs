pub mod handlers;
pub mod middleware;
pub mod provenance;
pub mod router;
