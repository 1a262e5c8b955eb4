mod handler;
mod notifier;

pub use handler::{ConnectParams, handle_connection};
pub use notifier::WebSocketNotifier;
