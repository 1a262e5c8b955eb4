use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use application::ports::out_::{EventNotifier, Outbox};
use domain::{ServerEvent, UserId};

/// Routes events to the outbox of each user's live socket. Pushing into an
/// outbox never waits on the network; the socket's writer task drains it.
pub struct WebSocketNotifier {
    outboxes: DashMap<UserId, Outbox>,
}

impl WebSocketNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            outboxes: DashMap::new(),
        }
    }

    pub fn is_attached(
        &self,
        user_id: &UserId,
    ) -> bool {
        self.outboxes.contains_key(user_id)
    }
}

impl Default for WebSocketNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventNotifier for WebSocketNotifier {
    async fn attach(
        &self,
        user_id: &UserId,
        outbox: Outbox,
    ) {
        self.outboxes.insert(user_id.clone(), outbox);
    }

    async fn detach(
        &self,
        user_id: &UserId,
    ) {
        self.outboxes.remove(user_id);
    }

    async fn notify(
        &self,
        user_id: &UserId,
        event: ServerEvent,
    ) {
        let Some(outbox) = self.outboxes.get(user_id) else {
            debug!(user_id = %user_id, event = event.name(), "Dropped event for detached user");
            return;
        };
        debug!(user_id = %user_id, event = event.name(), "-> Sending");
        if outbox.send(event).is_err() {
            debug!(user_id = %user_id, "Outbox closed");
        }
    }
}
