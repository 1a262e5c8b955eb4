use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::ports::out_::{EventNotifier, deliver};
use domain::{CoordinationError, GameType, RoomId, RoomState, RoomSummary, UserId, UserSession};

use super::ConnectionRegistry;

type RoomHandle = Arc<Mutex<RoomState>>;

/// Sole owner of every live room. Each room sits behind its own lock, so
/// traffic in one room never waits on another.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
    connections: Arc<ConnectionRegistry>,
    notifier: Arc<dyn EventNotifier>,
}

impl RoomRegistry {
    pub fn new(
        connections: Arc<ConnectionRegistry>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            rooms: DashMap::new(),
            connections,
            notifier,
        }
    }

    /// Registers an already populated room and points each member's session
    /// at it.
    pub fn insert(
        &self,
        room: RoomState,
    ) -> RoomId {
        let room_id = room.room_id();
        for player in room.players() {
            self.connections.set_current_room(&player.user_id, Some(room_id));
        }
        info!(room_id = %room_id, game_type = %room.game_type(), players = room.players().len(), "Room created");
        self.rooms.insert(room_id, Arc::new(Mutex::new(room)));
        room_id
    }

    pub(super) fn handle(
        &self,
        room_id: RoomId,
    ) -> Result<RoomHandle, CoordinationError> {
        self.rooms
            .get(&room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(CoordinationError::RoomNotFound(room_id))
    }

    fn current_room(user: &UserSession) -> Result<RoomId, CoordinationError> {
        user.current_room.ok_or(CoordinationError::NotInRoom)
    }

    pub async fn join_room(
        &self,
        user: &UserSession,
        room_id: RoomId,
    ) -> Result<(), CoordinationError> {
        if let Some(game_type) = &user.queued_for {
            return Err(CoordinationError::AlreadyQueued(game_type.clone()));
        }
        match user.current_room {
            Some(current) if current == room_id => {
                return Err(CoordinationError::AlreadyMember {
                    room_id,
                    user_id: user.user_id.clone(),
                });
            }
            Some(current) => return Err(CoordinationError::AlreadyInRoom(current)),
            None => {}
        }

        let handle = self.handle(room_id)?;
        let mut room = handle.lock().await;
        let notifications = room.join(user.user_id.clone(), user.display_name.clone())?;
        self.connections.set_current_room(&user.user_id, Some(room_id));
        debug!(room_id = %room_id, user_id = %user.user_id, players = room.players().len(), "Player joined room");
        deliver(self.notifier.as_ref(), notifications).await;
        Ok(())
    }

    /// Takes `user_id` out of `room_id`. Leaving a room one is not in, or one
    /// that no longer exists, does nothing. Returns whether a seat was freed.
    pub async fn leave_room(
        &self,
        user_id: &UserId,
        room_id: RoomId,
    ) -> bool {
        let Ok(handle) = self.handle(room_id) else {
            self.connections.clear_room(user_id, room_id);
            return false;
        };
        let mut room = handle.lock().await;
        self.connections.clear_room(user_id, room_id);
        let Some(notifications) = room.leave(user_id) else {
            return false;
        };

        debug!(room_id = %room_id, user_id = %user_id, players = room.players().len(), "Player left room");
        if room.is_closed() {
            self.rooms.remove(&room_id);
            info!(room_id = %room_id, "Room closed");
        }
        deliver(self.notifier.as_ref(), notifications).await;
        true
    }

    pub async fn toggle_ready(
        &self,
        user: &UserSession,
    ) -> Result<(), CoordinationError> {
        let room_id = Self::current_room(user)?;
        let handle = self.handle(room_id)?;
        let mut room = handle.lock().await;
        let notifications = room.toggle_ready(&user.user_id)?;
        deliver(self.notifier.as_ref(), notifications).await;
        Ok(())
    }

    pub async fn start_game(
        &self,
        user: &UserSession,
    ) -> Result<(), CoordinationError> {
        let room_id = Self::current_room(user)?;
        let handle = self.handle(room_id)?;
        let mut room = handle.lock().await;
        let notifications = room.start(&user.user_id)?;
        info!(room_id = %room_id, game_type = %room.game_type(), players = room.players().len(), "Game started");
        deliver(self.notifier.as_ref(), notifications).await;
        Ok(())
    }

    pub async fn end_game(
        &self,
        user: &UserSession,
    ) -> Result<(), CoordinationError> {
        let room_id = Self::current_room(user)?;
        let handle = self.handle(room_id)?;
        let mut room = handle.lock().await;
        let notifications = room.finish(&user.user_id)?;
        info!(room_id = %room_id, "Game ended");
        deliver(self.notifier.as_ref(), notifications).await;
        Ok(())
    }

    /// Waiting rooms of `game_type` with a free seat, oldest first.
    pub async fn joinable_rooms(
        &self,
        game_type: &GameType,
    ) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|entry| Arc::clone(entry.value())).collect();

        let mut open = Vec::new();
        for handle in handles {
            let room = handle.lock().await;
            if room.game_type() == game_type && room.is_joinable() {
                open.push((room.created_at(), room.summary()));
            }
        }
        open.sort_by_key(|(created_at, _)| *created_at);
        open.into_iter().map(|(_, summary)| summary).collect()
    }

    /// Point-in-time copy of a room.
    pub async fn snapshot(
        &self,
        room_id: RoomId,
    ) -> Option<RoomState> {
        let handle = self.handle(room_id).ok()?;
        let room = handle.lock().await;
        Some(room.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
