use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::in_::Dispatcher;
use crate::ports::out_::{EventNotifier, Outbox, ScheduledTask, TimeoutScheduler};
use domain::{ClientCommand, Identity, MatchmakingConfig, Notification, RoomId, ServerEvent, Session, UserId};

/// Records every notification instead of delivering it.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    attached: Mutex<HashSet<UserId>>,
}

impl RecordingNotifier {
    pub(crate) fn events_for(
        &self,
        user: &str,
    ) -> Vec<ServerEvent> {
        let user_id = UserId::new(user);
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.event.clone())
            .collect()
    }

    pub(crate) fn names_for(
        &self,
        user: &str,
    ) -> Vec<&'static str> {
        self.events_for(user).iter().map(ServerEvent::name).collect()
    }

    pub(crate) fn is_attached(
        &self,
        user: &str,
    ) -> bool {
        self.attached.lock().unwrap().contains(&UserId::new(user))
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn attach(
        &self,
        user_id: &UserId,
        _outbox: Outbox,
    ) {
        self.attached.lock().unwrap().insert(user_id.clone());
    }

    async fn detach(
        &self,
        user_id: &UserId,
    ) {
        self.attached.lock().unwrap().remove(user_id);
    }

    async fn notify(
        &self,
        user_id: &UserId,
        event: ServerEvent,
    ) {
        self.sent.lock().unwrap().push(Notification {
            user_id: user_id.clone(),
            event,
        });
    }
}

/// Holds scheduled tasks until a test fires them by hand.
#[derive(Default)]
pub(crate) struct ManualScheduler {
    pending: Mutex<HashMap<UserId, (Duration, ScheduledTask)>>,
}

impl ManualScheduler {
    pub(crate) fn delay_for(
        &self,
        user: &str,
    ) -> Option<Duration> {
        self.pending.lock().unwrap().get(&UserId::new(user)).map(|(delay, _)| *delay)
    }

    pub(crate) fn is_pending(
        &self,
        user: &str,
    ) -> bool {
        self.delay_for(user).is_some()
    }

    /// Runs the task armed for `user`. Returns false if none was pending.
    pub(crate) async fn fire(
        &self,
        user: &str,
    ) -> bool {
        let task = self.pending.lock().unwrap().remove(&UserId::new(user));
        match task {
            Some((_, task)) => {
                task.await;
                true
            }
            None => false,
        }
    }
}

impl TimeoutScheduler for ManualScheduler {
    fn schedule(
        &self,
        key: UserId,
        delay: Duration,
        task: ScheduledTask,
    ) {
        self.pending.lock().unwrap().insert(key, (delay, task));
    }

    fn cancel(
        &self,
        key: &UserId,
    ) {
        self.pending.lock().unwrap().remove(key);
    }
}

/// A dispatcher wired to recording doubles.
pub(crate) struct Lobby {
    pub(crate) dispatcher: Dispatcher,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) scheduler: Arc<ManualScheduler>,
}

impl Lobby {
    pub(crate) fn new() -> Self {
        Self::with_capacity(4)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ManualScheduler::default());
        let config = MatchmakingConfig {
            room_capacity: capacity,
            ..MatchmakingConfig::default()
        };
        let dispatcher = Dispatcher::new(notifier.clone(), scheduler.clone(), config);
        Self {
            dispatcher,
            notifier,
            scheduler,
        }
    }

    pub(crate) async fn connect(
        &self,
        user: &str,
    ) -> Session {
        let (outbox, _) = mpsc::unbounded_channel();
        self.dispatcher
            .connect(Some(Identity::new(user, user.to_uppercase())), outbox)
            .await
            .expect("connect")
    }

    pub(crate) async fn send(
        &self,
        session: &Session,
        command: ClientCommand,
    ) {
        self.dispatcher.handle(session, command).await;
    }

    pub(crate) async fn queue(
        &self,
        session: &Session,
        game_type: &str,
    ) {
        self.send(
            session,
            ClientCommand::JoinMatching {
                game_type: domain::GameType::new(game_type),
            },
        )
        .await;
    }

    pub(crate) fn room_of(
        &self,
        session: &Session,
    ) -> Option<RoomId> {
        self.dispatcher.connections().resolve(session).ok().and_then(|u| u.current_room)
    }

    /// Last `error` kind delivered to `user`, if any.
    pub(crate) fn last_error(
        &self,
        user: &str,
    ) -> Option<domain::ErrorKind> {
        self.notifier.events_for(user).into_iter().rev().find_map(|event| match event {
            ServerEvent::Error { kind, .. } => Some(kind),
            _ => None,
        })
    }
}
