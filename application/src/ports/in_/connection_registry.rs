use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use domain::{CoordinationError, GameType, Identity, RoomId, Session, UserId, UserSession};

/// One live session per connected identity.
pub struct ConnectionRegistry {
    sessions: DashMap<UserId, UserSession>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn connect(
        &self,
        identity: Option<Identity>,
    ) -> Result<Session, CoordinationError> {
        let identity = identity.ok_or(CoordinationError::Unauthenticated)?;
        match self.sessions.entry(identity.user_id.clone()) {
            Entry::Occupied(_) => Err(CoordinationError::AlreadyConnected(identity.user_id)),
            Entry::Vacant(slot) => {
                let record = UserSession::open(identity);
                let session = record.handle();
                slot.insert(record);
                Ok(session)
            }
        }
    }

    /// Current record behind `session`. A handle whose session has been
    /// closed, or replaced, no longer resolves.
    pub fn resolve(
        &self,
        session: &Session,
    ) -> Result<UserSession, CoordinationError> {
        self.sessions
            .get(&session.user_id)
            .filter(|record| record.session_id == session.session_id)
            .map(|record| record.value().clone())
            .ok_or(CoordinationError::Unauthenticated)
    }

    /// Removes the record if it still belongs to `session`.
    pub fn close(
        &self,
        session: &Session,
    ) -> Option<UserSession> {
        self.sessions
            .remove_if(&session.user_id, |_, record| record.session_id == session.session_id)
            .map(|(_, record)| record)
    }

    #[must_use]
    pub fn is_live(
        &self,
        user_id: &UserId,
    ) -> bool {
        self.sessions.contains_key(user_id)
    }

    pub fn set_current_room(
        &self,
        user_id: &UserId,
        room_id: Option<RoomId>,
    ) {
        if let Some(mut record) = self.sessions.get_mut(user_id) {
            record.current_room = room_id;
        }
    }

    /// Clears the room pointer only if it still names `room_id`.
    pub fn clear_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
    ) {
        if let Some(mut record) = self.sessions.get_mut(user_id)
            && record.current_room == Some(room_id)
        {
            record.current_room = None;
        }
    }

    pub fn set_queued_for(
        &self,
        user_id: &UserId,
        game_type: Option<GameType>,
    ) {
        if let Some(mut record) = self.sessions.get_mut(user_id) {
            record.queued_for = game_type;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_without_identity_is_unauthenticated() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.connect(None), Err(CoordinationError::Unauthenticated));
        assert!(registry.is_empty());
    }

    #[test]
    fn second_connection_for_same_identity_is_refused() {
        let registry = ConnectionRegistry::new();
        let first = registry.connect(Some(Identity::new("a", "Alice"))).unwrap();
        let second = registry.connect(Some(Identity::new("a", "Alice")));
        assert_eq!(second, Err(CoordinationError::AlreadyConnected(UserId::new("a"))));
        assert!(registry.resolve(&first).is_ok());
    }

    #[test]
    fn closed_handle_no_longer_resolves_and_close_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let session = registry.connect(Some(Identity::new("a", "Alice"))).unwrap();
        assert!(registry.close(&session).is_some());
        assert!(registry.close(&session).is_none());
        assert_eq!(registry.resolve(&session).unwrap_err(), CoordinationError::Unauthenticated);
    }

    #[test]
    fn stale_handle_cannot_close_newer_session() {
        let registry = ConnectionRegistry::new();
        let old = registry.connect(Some(Identity::new("a", "Alice"))).unwrap();
        registry.close(&old);
        let new = registry.connect(Some(Identity::new("a", "Alice"))).unwrap();

        assert!(registry.close(&old).is_none());
        assert!(registry.resolve(&new).is_ok());
    }

    #[test]
    fn clear_room_ignores_other_rooms() {
        let registry = ConnectionRegistry::new();
        let session = registry.connect(Some(Identity::new("a", "Alice"))).unwrap();
        let room = RoomId::new();
        registry.set_current_room(&session.user_id, Some(room));

        registry.clear_room(&session.user_id, RoomId::new());
        assert_eq!(registry.resolve(&session).unwrap().current_room, Some(room));

        registry.clear_room(&session.user_id, room);
        assert!(registry.resolve(&session).unwrap().is_idle());
    }
}
