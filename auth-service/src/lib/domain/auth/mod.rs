pub mod cache;
pub mod directory;
pub mod errors;
pub mod events;
pub mod models;
pub mod ports;
pub mod service;
