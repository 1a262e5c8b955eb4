use async_trait::async_trait;
use tokio::sync::mpsc;

use domain::{Notification, ServerEvent, UserId};

/// Per-connection outbound queue. Sending never waits on the peer.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Addresses events to individual connected users.
///
/// Implementations are called from inside queue and room critical sections
/// and must hand the event off without waiting on network I/O.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn attach(
        &self,
        user_id: &UserId,
        outbox: Outbox,
    );

    async fn detach(
        &self,
        user_id: &UserId,
    );

    async fn notify(
        &self,
        user_id: &UserId,
        event: ServerEvent,
    );
}

pub async fn deliver(
    notifier: &dyn EventNotifier,
    notifications: Vec<Notification>,
) {
    for Notification { user_id, event } in notifications {
        notifier.notify(&user_id, event).await;
    }
}
