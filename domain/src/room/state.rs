use serde::{Deserialize, Serialize};

use crate::{
    CoordinationError, GameType, Notification, QueueEntry, RoomId, RoomSummary, ServerEvent, Timestamp, UserId,
};

use super::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// A bounded group of users coordinating the start of one game.
///
/// `players` is kept in join order. `owner` is `None` only while the room is
/// empty, and an emptied room is closed for good: the registry drops it and
/// late callers holding a handle see it as missing.
#[derive(Clone, Debug)]
pub struct RoomState {
    room_id: RoomId,
    game_type: GameType,
    capacity: usize,
    players: Vec<Player>,
    owner: Option<UserId>,
    status: RoomStatus,
    created_at: Timestamp,
    closed: bool,
}

impl RoomState {
    #[must_use]
    pub fn new(
        game_type: GameType,
        capacity: usize,
    ) -> Self {
        Self {
            room_id: RoomId::new(),
            game_type,
            capacity,
            players: Vec::new(),
            owner: None,
            status: RoomStatus::Waiting,
            created_at: Timestamp::now(),
            closed: false,
        }
    }

    /// Builds the room for a successful match. Seats follow the order of
    /// `entries`; anyone past capacity is left out. Every seated user gets
    /// their own `match_found`.
    #[must_use]
    pub fn matched(
        game_type: GameType,
        capacity: usize,
        entries: &[QueueEntry],
    ) -> (Self, Vec<Notification>) {
        let mut room = Self::new(game_type, capacity);
        for entry in entries {
            if room.is_full() {
                break;
            }
            room.seat(entry.user_id.clone(), entry.display_name.clone());
        }

        let event = ServerEvent::MatchFound {
            room_id: room.room_id,
            players: room.players.clone(),
            owner: room.owner.clone(),
        };
        let notifications = room.notify_members(&event);
        (room, notifications)
    }

    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    #[must_use]
    pub fn game_type(&self) -> &GameType {
        &self.game_type
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    #[must_use]
    pub fn is_member(
        &self,
        user_id: &UserId,
    ) -> bool {
        self.players.iter().any(|p| &p.user_id == user_id)
    }

    #[must_use]
    pub fn is_joinable(&self) -> bool {
        !self.closed && self.status == RoomStatus::Waiting && !self.is_full()
    }

    #[must_use]
    pub fn can_start(&self) -> bool {
        self.players.len() >= 2 && self.players.iter().all(|p| p.ready)
    }

    #[must_use]
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.room_id,
            player_count: self.players.len(),
            max_players: self.capacity,
        }
    }

    pub fn join(
        &mut self,
        user_id: UserId,
        display_name: String,
    ) -> Result<Vec<Notification>, CoordinationError> {
        if self.closed {
            return Err(CoordinationError::RoomNotFound(self.room_id));
        }
        if self.is_full() {
            return Err(CoordinationError::RoomFull {
                room_id: self.room_id,
                capacity: self.capacity,
            });
        }
        if self.is_member(&user_id) {
            return Err(CoordinationError::AlreadyMember {
                room_id: self.room_id,
                user_id,
            });
        }
        if self.status != RoomStatus::Waiting {
            return Err(CoordinationError::GameAlreadyStarted(self.room_id));
        }

        self.seat(user_id.clone(), display_name.clone());

        let joined = Notification {
            user_id: user_id.clone(),
            event: ServerEvent::JoinedRoom {
                room_id: self.room_id,
                players: self.players.clone(),
                owner: self.owner.clone(),
            },
        };
        let announce = ServerEvent::PlayerJoined {
            user_id,
            username: display_name,
            players: self.players.clone(),
        };
        Ok(std::iter::once(joined).chain(self.notify_members(&announce)).collect())
    }

    /// Removes `user_id` if seated. Returns `None` when there was nothing to
    /// do, which callers treat as success.
    pub fn leave(
        &mut self,
        user_id: &UserId,
    ) -> Option<Vec<Notification>> {
        let pos = self.players.iter().position(|p| &p.user_id == user_id)?;
        let departed = self.players.remove(pos);

        if self.owner.as_ref() == Some(user_id) {
            self.owner = self.players.iter().min_by_key(|p| p.joined_at).map(|p| p.user_id.clone());
        }
        if self.players.is_empty() {
            self.owner = None;
            self.closed = true;
        }

        let ack = Notification {
            user_id: departed.user_id.clone(),
            event: ServerEvent::LeftRoom {
                message: "left the room".to_string(),
            },
        };
        let announce = ServerEvent::PlayerLeft {
            user_id: departed.user_id,
            username: departed.display_name,
            players: self.players.clone(),
        };
        Some(std::iter::once(ack).chain(self.notify_members(&announce)).collect())
    }

    pub fn toggle_ready(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, CoordinationError> {
        if self.status != RoomStatus::Waiting {
            return Err(CoordinationError::GameAlreadyStarted(self.room_id));
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.user_id == user_id)
            .ok_or(CoordinationError::NotInRoom)?;
        player.ready = !player.ready;
        let ready = player.ready;

        let event = ServerEvent::PlayerReadyChanged {
            user_id: user_id.clone(),
            ready,
            players: self.players.clone(),
            can_start: self.can_start(),
        };
        Ok(self.notify_members(&event))
    }

    pub fn start(
        &mut self,
        requester: &UserId,
    ) -> Result<Vec<Notification>, CoordinationError> {
        self.require_owner(requester, "start the game")?;
        if self.status != RoomStatus::Waiting {
            return Err(CoordinationError::GameAlreadyStarted(self.room_id));
        }
        if !self.can_start() {
            return Err(CoordinationError::NotReady(self.room_id));
        }

        self.status = RoomStatus::Playing;

        let event = ServerEvent::GameStarted {
            room_id: self.room_id,
            game_type: self.game_type.clone(),
            players: self.players.clone(),
        };
        Ok(self.notify_members(&event))
    }

    pub fn finish(
        &mut self,
        requester: &UserId,
    ) -> Result<Vec<Notification>, CoordinationError> {
        self.require_owner(requester, "end the game")?;
        if self.status != RoomStatus::Playing {
            return Err(CoordinationError::NotReady(self.room_id));
        }

        self.status = RoomStatus::Finished;
        Ok(self.notify_members(&ServerEvent::GameEnded { room_id: self.room_id }))
    }

    fn require_owner(
        &self,
        requester: &UserId,
        action: &'static str,
    ) -> Result<(), CoordinationError> {
        if self.closed {
            return Err(CoordinationError::RoomNotFound(self.room_id));
        }
        if self.owner.as_ref() != Some(requester) {
            return Err(CoordinationError::Forbidden { action });
        }
        Ok(())
    }

    fn seat(
        &mut self,
        user_id: UserId,
        display_name: String,
    ) {
        if self.owner.is_none() {
            self.owner = Some(user_id.clone());
        }
        self.players.push(Player::new(user_id, display_name));
    }

    fn notify_members(
        &self,
        event: &ServerEvent,
    ) -> Vec<Notification> {
        self.players
            .iter()
            .map(|p| Notification {
                user_id: p.user_id.clone(),
                event: event.clone(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(super) fn player(
        &self,
        user_id: &UserId,
    ) -> Option<&Player> {
        self.players.iter().find(|p| &p.user_id == user_id)
    }
}
