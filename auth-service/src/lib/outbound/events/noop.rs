use async_trait::async_trait;

use crate::domain::auth::errors::NotifierError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::ports::EventNotifier;

/// Notifier used when no broker is configured. Events are only traced.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventNotifier;

#[async_trait]
impl EventNotifier for NoopEventNotifier {
    async fn notify(&self, event: &AuthEvent) -> Result<(), NotifierError> {
        tracing::debug!(
            "Dropping {} event {} for user {}",
            event.event_type(),
            event.event_id(),
            event.user_id()
        );
        Ok(())
    }
}
