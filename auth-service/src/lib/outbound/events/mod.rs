pub mod messages;
pub mod noop;
pub mod producer;

pub use noop::NoopEventNotifier;
pub use producer::KafkaEventNotifier;
