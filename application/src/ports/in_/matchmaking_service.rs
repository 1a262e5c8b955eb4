use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::ports::out_::{EventNotifier, TimeoutScheduler, deliver};
use domain::{
    CoordinationError, GameType, MatchingCommand, MatchingOutcome, MatchingQueue, MatchmakingConfig, QueueEntry,
    QueueTicket, RoomId, RoomState, ServerEvent, UserSession,
};

use super::{ConnectionRegistry, RoomRegistry};

type QueueHandle = Arc<Mutex<MatchingQueue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Queued(QueueTicket),
    Matched(RoomId),
}

/// Per-game-type matching queues and the matchmaker that drains them.
///
/// Scanning a queue, pulling the matched entries out of it and registering
/// the new room all happen while that game type's queue lock is held, so two
/// joiners racing on the same game type can never claim the same waiter.
pub struct MatchmakingService {
    queues: DashMap<GameType, QueueHandle>,
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    notifier: Arc<dyn EventNotifier>,
    scheduler: Arc<dyn TimeoutScheduler>,
    config: MatchmakingConfig,
}

impl MatchmakingService {
    pub fn new(
        connections: Arc<ConnectionRegistry>,
        rooms: Arc<RoomRegistry>,
        notifier: Arc<dyn EventNotifier>,
        scheduler: Arc<dyn TimeoutScheduler>,
        config: MatchmakingConfig,
    ) -> Self {
        Self {
            queues: DashMap::new(),
            connections,
            rooms,
            notifier,
            scheduler,
            config,
        }
    }

    /// Locks the live queue for `game_type`, creating it if needed. A handle
    /// dropped from the map while we waited for its lock is retried, so every
    /// waiter of a game type ends up in the same queue.
    async fn lock_queue(
        &self,
        game_type: &GameType,
    ) -> (QueueHandle, OwnedMutexGuard<MatchingQueue>) {
        loop {
            let handle = Arc::clone(
                self.queues
                    .entry(game_type.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(MatchingQueue::new(game_type.clone()))))
                    .value(),
            );
            let guard = Arc::clone(&handle).lock_owned().await;
            let current = self
                .queues
                .get(game_type)
                .is_some_and(|entry| Arc::ptr_eq(entry.value(), &handle));
            if current {
                return (handle, guard);
            }
        }
    }

    /// Forgets an emptied queue. Must be called with its lock held.
    fn release_if_empty(
        &self,
        handle: &QueueHandle,
        queue: &MatchingQueue,
    ) {
        if queue.is_empty() {
            self.queues
                .remove_if(queue.game_type(), |_, current| Arc::ptr_eq(current, handle));
        }
    }

    pub async fn join_matching(
        &self,
        user: &UserSession,
        game_type: GameType,
    ) -> Result<JoinOutcome, CoordinationError> {
        if let Some(room_id) = user.current_room {
            return Err(CoordinationError::AlreadyInRoom(room_id));
        }
        if let Some(queued) = &user.queued_for {
            return Err(CoordinationError::AlreadyQueued(queued.clone()));
        }

        let (handle, mut queue) = self.lock_queue(&game_type).await;

        // Waiters whose connection is gone are not candidates.
        for stale in queue.purge(|e| !self.connections.is_live(&e.user_id)) {
            self.scheduler.cancel(&stale.user_id);
            debug!(user_id = %stale.user_id, game_type = %game_type, "Dropped stale queue entry");
        }

        let entry = match queue.handle_command(MatchingCommand::Enqueue {
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
        }) {
            MatchingOutcome::Enqueued(entry) => entry,
            _ => {
                self.release_if_empty(&handle, &queue);
                return Err(CoordinationError::AlreadyQueued(game_type));
            }
        };

        let outcome = queue.handle_command(MatchingCommand::TryMatch {
            entrant: user.user_id.clone(),
            capacity: self.config.room_capacity,
        });

        match outcome {
            MatchingOutcome::Matched(entries) => {
                let (room, notifications) = RoomState::matched(game_type.clone(), self.config.room_capacity, &entries);
                for seated in room.players() {
                    self.scheduler.cancel(&seated.user_id);
                    self.connections.set_queued_for(&seated.user_id, None);
                }
                let room_id = self.rooms.insert(room);
                self.release_if_empty(&handle, &queue);
                info!(room_id = %room_id, game_type = %game_type, players = entries.len(), "Match found");
                deliver(self.notifier.as_ref(), notifications).await;
                Ok(JoinOutcome::Matched(room_id))
            }
            _ => {
                self.connections.set_queued_for(&user.user_id, Some(game_type.clone()));
                self.arm_timeout(Arc::clone(&handle), &entry);
                debug!(user_id = %user.user_id, game_type = %game_type, waiting = queue.len(), "Queued for matching");
                Ok(JoinOutcome::Queued(entry.ticket))
            }
        }
    }

    /// Drops the user's queue entry. Returns whether there was one; a user
    /// already pulled into a room by a concurrent match simply has none.
    pub async fn leave_matching(
        &self,
        user: &UserSession,
    ) -> bool {
        let Some(game_type) = &user.queued_for else {
            return false;
        };
        let (handle, mut queue) = self.lock_queue(game_type).await;

        let removed = match queue.handle_command(MatchingCommand::Leave(user.user_id.clone())) {
            MatchingOutcome::Dequeued(_) => {
                self.scheduler.cancel(&user.user_id);
                self.connections.set_queued_for(&user.user_id, None);
                debug!(user_id = %user.user_id, game_type = %game_type, "Left matching queue");
                true
            }
            _ => false,
        };
        self.release_if_empty(&handle, &queue);
        removed
    }

    /// Arms the one-shot fallback offer. When it fires it only looks: the
    /// entry must still be the same stay in the queue, and nothing is removed.
    /// The queue lock is held until the offer is handed off, so a match can
    /// only land before the check or after the notification.
    fn arm_timeout(
        &self,
        queue: QueueHandle,
        entry: &QueueEntry,
    ) {
        let rooms = Arc::clone(&self.rooms);
        let notifier = Arc::clone(&self.notifier);
        let ticket = entry.ticket;
        let user_id = entry.user_id.clone();
        let game_type = entry.game_type.clone();

        let task = async move {
            let waiting = queue.lock().await;
            if !waiting.holds_ticket(ticket) {
                return;
            }
            let available_rooms = rooms.joinable_rooms(&game_type).await;
            info!(user_id = %user_id, game_type = %game_type, open_rooms = available_rooms.len(), "Match timed out");
            notifier
                .notify(
                    &user_id,
                    ServerEvent::MatchTimeout {
                        message: "No match found yet. Join an open room or keep waiting.".to_string(),
                        available_rooms,
                    },
                )
                .await;
            drop(waiting);
        };

        self.scheduler.schedule(entry.user_id.clone(), self.config.match_timeout, Box::pin(task));
    }

    /// Number of users waiting across all game types.
    pub async fn queued(&self) -> usize {
        let handles: Vec<QueueHandle> = self.queues.iter().map(|entry| Arc::clone(entry.value())).collect();
        let mut total = 0;
        for handle in handles {
            total += handle.lock().await.len();
        }
        total
    }

    /// Game types that currently have a queue.
    #[must_use]
    pub fn open_queues(&self) -> usize {
        self.queues.len()
    }
}
