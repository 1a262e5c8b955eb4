mod auth;
mod notifier;
mod scheduler;

pub use auth::{Authenticator, Credentials};
pub use notifier::{EventNotifier, Outbox, deliver};
pub use scheduler::{ScheduledTask, TimeoutScheduler};
