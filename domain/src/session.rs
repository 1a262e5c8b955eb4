use crate::{GameType, Identity, RoomId, SessionId, Timestamp, UserId};

/// The handle a connection keeps for its whole lifetime and passes into every
/// dispatcher call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub display_name: String,
}

/// Registry-side record of a connected user.
///
/// `current_room` and `queued_for` are routing hints for cleanup. They are
/// never consulted for authorization; rooms and queues own the truth.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub display_name: String,
    pub connected_at: Timestamp,
    pub current_room: Option<RoomId>,
    pub queued_for: Option<GameType>,
}

impl UserSession {
    #[must_use]
    pub fn open(identity: Identity) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id: identity.user_id,
            display_name: identity.display_name,
            connected_at: Timestamp::now(),
            current_room: None,
            queued_for: None,
        }
    }

    #[must_use]
    pub fn handle(&self) -> Session {
        Session {
            session_id: self.session_id,
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current_room.is_none() && self.queued_for.is_none()
    }
}
