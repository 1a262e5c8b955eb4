mod config;
mod error;
mod event;
mod queue;
mod room;
mod session;
mod types;

pub use config::MatchmakingConfig;
pub use error::{CoordinationError, ErrorKind};
pub use event::{ClientCommand, Notification, RoomSummary, ServerEvent};
pub use queue::{MatchingCommand, MatchingOutcome, MatchingQueue, QueueEntry, QueueTicket};
pub use room::{Player, RoomState, RoomStatus};
pub use session::{Session, UserSession};
pub use types::{GameType, Identity, RoomId, SessionId, Timestamp, UserId};
