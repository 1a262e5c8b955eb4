mod connection_registry;
mod dispatcher;
mod matchmaking_service;
mod room_registry;


pub use connection_registry::ConnectionRegistry;
pub use dispatcher::{Dispatcher, LobbyStats};
pub use matchmaking_service::{JoinOutcome, MatchmakingService};
pub use room_registry::RoomRegistry;
