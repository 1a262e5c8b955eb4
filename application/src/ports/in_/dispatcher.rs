use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ports::out_::{EventNotifier, Outbox, TimeoutScheduler};
use domain::{
    ClientCommand, CoordinationError, GameType, Identity, MatchmakingConfig, RoomSummary, ServerEvent, Session,
};

use super::{ConnectionRegistry, MatchmakingService, RoomRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStats {
    pub connections: usize,
    pub queued: usize,
    pub rooms: usize,
}

/// Entry point for every protocol event.
///
/// The caller's identity always comes from the registry record behind the
/// connection's `Session`, never from anything inside a command payload.
pub struct Dispatcher {
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    matchmaking: MatchmakingService,
    notifier: Arc<dyn EventNotifier>,
}

impl Dispatcher {
    pub fn new(
        notifier: Arc<dyn EventNotifier>,
        scheduler: Arc<dyn TimeoutScheduler>,
        config: MatchmakingConfig,
    ) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomRegistry::new(Arc::clone(&connections), Arc::clone(&notifier)));
        let matchmaking = MatchmakingService::new(
            Arc::clone(&connections),
            Arc::clone(&rooms),
            Arc::clone(&notifier),
            scheduler,
            config,
        );
        Self {
            connections,
            rooms,
            matchmaking,
            notifier,
        }
    }

    /// Opens a session for `identity` and routes its events to `outbox`.
    /// On failure the error is pushed to `outbox` and nothing is registered.
    pub async fn connect(
        &self,
        identity: Option<Identity>,
        outbox: Outbox,
    ) -> Result<Session, CoordinationError> {
        let session = match self.connections.connect(identity) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "Connection refused");
                let _ = outbox.send(ServerEvent::error(&err));
                return Err(err);
            }
        };

        self.notifier.attach(&session.user_id, outbox).await;
        info!(user_id = %session.user_id, username = %session.display_name, "User connected");
        self.notifier
            .notify(
                &session.user_id,
                ServerEvent::Connected {
                    message: "connected".to_string(),
                },
            )
            .await;
        Ok(session)
    }

    pub async fn handle(
        &self,
        session: &Session,
        command: ClientCommand,
    ) {
        debug!(user_id = %session.user_id, command = ?command, "<- Dispatching");
        if let Err(err) = self.route(session, command).await {
            self.reject(session, err).await;
        }
    }

    /// Reports a failure to the originating user only.
    pub async fn reject(
        &self,
        session: &Session,
        err: CoordinationError,
    ) {
        warn!(user_id = %session.user_id, error = %err, "Rejected");
        self.notifier.notify(&session.user_id, ServerEvent::error(&err)).await;
    }

    async fn route(
        &self,
        session: &Session,
        command: ClientCommand,
    ) -> Result<(), CoordinationError> {
        let user = self.connections.resolve(session)?;
        match command {
            ClientCommand::JoinMatching { game_type } => {
                if game_type.as_str().trim().is_empty() {
                    return Err(CoordinationError::InvalidMessage("game_type must not be empty".to_string()));
                }
                self.matchmaking.join_matching(&user, game_type).await.map(|_| ())
            }
            ClientCommand::LeaveMatching => {
                if self.matchmaking.leave_matching(&user).await {
                    self.notifier
                        .notify(
                            &user.user_id,
                            ServerEvent::LeftMatching {
                                message: "left the matching queue".to_string(),
                            },
                        )
                        .await;
                }
                Ok(())
            }
            ClientCommand::JoinRoom { room_id } => self.rooms.join_room(&user, room_id).await,
            ClientCommand::LeaveRoom => {
                if let Some(room_id) = user.current_room {
                    self.rooms.leave_room(&user.user_id, room_id).await;
                }
                Ok(())
            }
            ClientCommand::ToggleReady => self.rooms.toggle_ready(&user).await,
            ClientCommand::StartGame => self.rooms.start_game(&user).await,
            ClientCommand::EndGame => self.rooms.end_game(&user).await,
        }
    }

    /// Tears a session down. Queue entry first, then the room seat, then the
    /// session itself. Safe to call any number of times.
    pub async fn disconnect(
        &self,
        session: &Session,
    ) {
        let Ok(user) = self.connections.resolve(session) else {
            return;
        };

        self.matchmaking.leave_matching(&user).await;

        // A match that ran while we were waiting for the queue lock may have
        // seated the user somewhere, so read the room pointer again.
        if let Ok(user) = self.connections.resolve(session)
            && let Some(room_id) = user.current_room
        {
            self.rooms.leave_room(&user.user_id, room_id).await;
        }

        // Detach while the record still blocks a reconnect, so a new
        // connection's outbox can never be the one removed.
        self.notifier.detach(&session.user_id).await;
        self.connections.close(session);
        info!(user_id = %session.user_id, "User disconnected");
    }

    pub async fn joinable_rooms(
        &self,
        game_type: &GameType,
    ) -> Vec<RoomSummary> {
        self.rooms.joinable_rooms(game_type).await
    }

    pub async fn stats(&self) -> LobbyStats {
        LobbyStats {
            connections: self.connections.len(),
            queued: self.matchmaking.queued().await,
            rooms: self.rooms.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    #[cfg(test)]
    pub(crate) fn matchmaking(&self) -> &MatchmakingService {
        &self.matchmaking
    }

    #[cfg(test)]
    pub(crate) fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }
}
