use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GameType, RoomId, UserId};

/// Wire-level classification carried by the `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthenticated,
    AlreadyConnected,
    AlreadyQueued,
    AlreadyInRoom,
    RoomNotFound,
    RoomFull,
    AlreadyMember,
    NotInRoom,
    Forbidden,
    NotReady,
    GameAlreadyStarted,
    InvalidMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error("not logged in")]
    Unauthenticated,

    #[error("user {0} already has a live connection")]
    AlreadyConnected(UserId),

    #[error("already waiting in the {0} matching queue")]
    AlreadyQueued(GameType),

    #[error("already in room {0}")]
    AlreadyInRoom(RoomId),

    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    #[error("room {room_id} is full ({capacity} players)")]
    RoomFull { room_id: RoomId, capacity: usize },

    #[error("user {user_id} is already a member of room {room_id}")]
    AlreadyMember { room_id: RoomId, user_id: UserId },

    #[error("not in a room")]
    NotInRoom,

    #[error("only the room owner may {action}")]
    Forbidden { action: &'static str },

    #[error("room {0} is not ready to start")]
    NotReady(RoomId),

    #[error("game in room {0} has already started")]
    GameAlreadyStarted(RoomId),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl CoordinationError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinationError::Unauthenticated => ErrorKind::Unauthenticated,
            CoordinationError::AlreadyConnected(_) => ErrorKind::AlreadyConnected,
            CoordinationError::AlreadyQueued(_) => ErrorKind::AlreadyQueued,
            CoordinationError::AlreadyInRoom(_) => ErrorKind::AlreadyInRoom,
            CoordinationError::RoomNotFound(_) => ErrorKind::RoomNotFound,
            CoordinationError::RoomFull { .. } => ErrorKind::RoomFull,
            CoordinationError::AlreadyMember { .. } => ErrorKind::AlreadyMember,
            CoordinationError::NotInRoom => ErrorKind::NotInRoom,
            CoordinationError::Forbidden { .. } => ErrorKind::Forbidden,
            CoordinationError::NotReady(_) => ErrorKind::NotReady,
            CoordinationError::GameAlreadyStarted(_) => ErrorKind::GameAlreadyStarted,
            CoordinationError::InvalidMessage(_) => ErrorKind::InvalidMessage,
        }
    }
}
