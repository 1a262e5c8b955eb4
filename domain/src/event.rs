use serde::{Deserialize, Serialize};

use crate::{ErrorKind, GameType, Player, RoomId, UserId};

/// Inbound protocol events, decoded at the socket boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    JoinMatching { game_type: GameType },
    LeaveMatching,
    JoinRoom { room_id: RoomId },
    LeaveRoom,
    ToggleReady,
    StartGame,
    EndGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub player_count: usize,
    pub max_players: usize,
}

/// Outbound protocol events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        message: String,
    },
    Error {
        message: String,
        kind: ErrorKind,
    },
    LeftMatching {
        message: String,
    },
    JoinedRoom {
        room_id: RoomId,
        players: Vec<Player>,
        owner: Option<UserId>,
    },
    LeftRoom {
        message: String,
    },
    PlayerJoined {
        user_id: UserId,
        username: String,
        players: Vec<Player>,
    },
    PlayerLeft {
        user_id: UserId,
        username: String,
        players: Vec<Player>,
    },
    PlayerReadyChanged {
        user_id: UserId,
        ready: bool,
        players: Vec<Player>,
        can_start: bool,
    },
    MatchFound {
        room_id: RoomId,
        players: Vec<Player>,
        owner: Option<UserId>,
    },
    MatchTimeout {
        message: String,
        available_rooms: Vec<RoomSummary>,
    },
    GameStarted {
        room_id: RoomId,
        game_type: GameType,
        players: Vec<Player>,
    },
    GameEnded {
        room_id: RoomId,
    },
}

impl ServerEvent {
    #[must_use]
    pub fn error(err: &crate::CoordinationError) -> Self {
        ServerEvent::Error {
            message: err.to_string(),
            kind: err.kind(),
        }
    }

    /// Protocol name, as it appears in the `type` tag.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::Error { .. } => "error",
            ServerEvent::LeftMatching { .. } => "left_matching",
            ServerEvent::JoinedRoom { .. } => "joined_room",
            ServerEvent::LeftRoom { .. } => "left_room",
            ServerEvent::PlayerJoined { .. } => "player_joined",
            ServerEvent::PlayerLeft { .. } => "player_left",
            ServerEvent::PlayerReadyChanged { .. } => "player_ready_changed",
            ServerEvent::MatchFound { .. } => "match_found",
            ServerEvent::MatchTimeout { .. } => "match_timeout",
            ServerEvent::GameStarted { .. } => "game_started",
            ServerEvent::GameEnded { .. } => "game_ended",
        }
    }
}

/// An event addressed to exactly one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub user_id: UserId,
    pub event: ServerEvent,
}
