use std::sync::Arc;

use application::ports::in_::Dispatcher;
use application::ports::out_::{Authenticator, EventNotifier, TimeoutScheduler};
use domain::MatchmakingConfig;

use super::websocket::WebSocketNotifier;
use crate::auth::QueryAuthenticator;
use crate::tokio_scheduler::TokioTimeoutScheduler;

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            dispatcher,
            authenticator,
        }
    }
}

/// Wires the dispatcher to the websocket notifier and the tokio scheduler.
pub fn create_app_state(config: MatchmakingConfig) -> Arc<AppState> {
    let notifier: Arc<dyn EventNotifier> = Arc::new(WebSocketNotifier::new());
    let scheduler: Arc<dyn TimeoutScheduler> = Arc::new(TokioTimeoutScheduler::new());
    let dispatcher = Dispatcher::new(notifier, scheduler, config);

    Arc::new(AppState::new(Arc::new(dispatcher), Arc::new(QueryAuthenticator)))
}
