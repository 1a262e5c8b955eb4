mod http;
mod state;
mod websocket;

pub use http::{RoomsQuery, RoomsResponse, StatsResponse, get_rooms, get_stats};
pub use state::{AppState, create_app_state};
pub use websocket::{ConnectParams, WebSocketNotifier, handle_connection};
