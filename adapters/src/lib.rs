mod auth;
mod tokio_scheduler;
mod web;

pub use auth::QueryAuthenticator;
pub use tokio_scheduler::TokioTimeoutScheduler;
pub use web::{
    AppState, ConnectParams, RoomsQuery, RoomsResponse, StatsResponse, WebSocketNotifier, create_app_state, get_rooms,
    get_stats, handle_connection,
};
