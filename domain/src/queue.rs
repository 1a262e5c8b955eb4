use crate::{GameType, Timestamp, UserId};

/// Identifies one stay in the queue. A user who leaves and re-joins gets a
/// fresh ticket, so a timer armed for the old stay can tell it is stale.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct QueueTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub game_type: GameType,
    pub enqueued_at: Timestamp,
    pub ticket: QueueTicket,
}

/// FIFO of users waiting for a room of one game type.
#[derive(Debug, Clone)]
pub struct MatchingQueue {
    game_type: GameType,
    entries: Vec<QueueEntry>,
    next_ticket: u64,
}

pub enum MatchingCommand {
    Enqueue { user_id: UserId, display_name: String },
    Leave(UserId),
    TryMatch { entrant: UserId, capacity: usize },
}

#[derive(Debug, PartialEq, Eq)]
pub enum MatchingOutcome {
    Enqueued(QueueEntry),
    Dequeued(QueueEntry),
    /// Oldest waiter first, the entrant last.
    Matched(Vec<QueueEntry>),
    NoMatch,
    NotQueued,
    AlreadyQueued,
}

impl MatchingQueue {
    #[must_use]
    pub fn new(game_type: GameType) -> Self {
        Self {
            game_type,
            entries: Vec::new(),
            next_ticket: 0,
        }
    }

    #[must_use]
    pub fn game_type(&self) -> &GameType {
        &self.game_type
    }

    #[must_use]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(
        &self,
        user_id: &UserId,
    ) -> bool {
        self.entries.iter().any(|e| &e.user_id == user_id)
    }

    #[must_use]
    pub fn holds_ticket(
        &self,
        ticket: QueueTicket,
    ) -> bool {
        self.entries.iter().any(|e| e.ticket == ticket)
    }

    /// Drops entries the caller no longer considers available and returns them.
    pub fn purge(
        &mut self,
        mut is_stale: impl FnMut(&QueueEntry) -> bool,
    ) -> Vec<QueueEntry> {
        let (stale, kept): (Vec<_>, Vec<_>) = self.entries.drain(..).partition(|e| is_stale(e));
        self.entries = kept;
        stale
    }

    pub fn handle_command(
        &mut self,
        command: MatchingCommand,
    ) -> MatchingOutcome {
        match command {
            MatchingCommand::Enqueue { user_id, display_name } => {
                if self.contains(&user_id) {
                    return MatchingOutcome::AlreadyQueued;
                }
                let entry = QueueEntry {
                    user_id,
                    display_name,
                    game_type: self.game_type.clone(),
                    enqueued_at: Timestamp::now(),
                    ticket: QueueTicket(self.next_ticket),
                };
                self.next_ticket += 1;
                self.entries.push(entry.clone());
                MatchingOutcome::Enqueued(entry)
            }
            MatchingCommand::Leave(user_id) => match self.entries.iter().position(|e| e.user_id == user_id) {
                Some(pos) => MatchingOutcome::Dequeued(self.entries.remove(pos)),
                None => MatchingOutcome::NotQueued,
            },
            MatchingCommand::TryMatch { entrant, capacity } => self.try_match(&entrant, capacity),
        }
    }

    fn try_match(
        &mut self,
        entrant: &UserId,
        capacity: usize,
    ) -> MatchingOutcome {
        let Some(entrant_pos) = self.entries.iter().position(|e| &e.user_id == entrant) else {
            return MatchingOutcome::NotQueued;
        };
        let game_type = self.entries[entrant_pos].game_type.clone();

        // Entries are kept in arrival order, so the first hits are the oldest.
        let picked: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, e)| *i != entrant_pos && e.game_type == game_type)
            .map(|(i, _)| i)
            .take(capacity.saturating_sub(1))
            .collect();

        if picked.is_empty() {
            return MatchingOutcome::NoMatch;
        }

        let mut taken = Vec::with_capacity(picked.len() + 1);
        let mut remaining = Vec::with_capacity(self.entries.len());
        let mut entrant_entry = None;
        for (i, entry) in self.entries.drain(..).enumerate() {
            if i == entrant_pos {
                entrant_entry = Some(entry);
            } else if picked.contains(&i) {
                taken.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        taken.extend(entrant_entry);
        MatchingOutcome::Matched(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_with(users: &[&str]) -> MatchingQueue {
        let mut queue = MatchingQueue::new(GameType::new("tank"));
        for user in users {
            queue.handle_command(MatchingCommand::Enqueue {
                user_id: UserId::new(*user),
                display_name: user.to_uppercase(),
            });
        }
        queue
    }

    fn ids(entries: &[QueueEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.user_id.as_str()).collect()
    }

    fn try_match(
        queue: &mut MatchingQueue,
        entrant: &str,
        capacity: usize,
    ) -> MatchingOutcome {
        queue.handle_command(MatchingCommand::TryMatch {
            entrant: UserId::new(entrant),
            capacity,
        })
    }

    #[test]
    fn rejects_second_entry_for_same_user() {
        let mut queue = queue_with(&["a"]);
        let outcome = queue.handle_command(MatchingCommand::Enqueue {
            user_id: UserId::new("a"),
            display_name: "A".into(),
        });
        assert_eq!(outcome, MatchingOutcome::AlreadyQueued);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn lone_entrant_stays_queued() {
        let mut queue = queue_with(&["a"]);
        assert_eq!(try_match(&mut queue, "a", 4), MatchingOutcome::NoMatch);
        assert!(queue.contains(&UserId::new("a")));
    }

    #[test]
    fn match_orders_oldest_first_and_entrant_last() {
        let mut queue = queue_with(&["a", "b", "c"]);
        let MatchingOutcome::Matched(matched) = try_match(&mut queue, "c", 4) else {
            panic!("expected a match");
        };
        assert_eq!(ids(&matched), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn match_respects_capacity_and_leaves_newest_waiting() {
        let mut queue = queue_with(&["a", "b", "c", "d", "e"]);
        let MatchingOutcome::Matched(matched) = try_match(&mut queue, "e", 3) else {
            panic!("expected a match");
        };
        assert_eq!(ids(&matched), vec!["a", "b", "e"]);
        assert_eq!(ids(queue.entries()), vec!["c", "d"]);
    }

    #[test]
    fn match_for_removed_entrant_is_not_queued() {
        let mut queue = queue_with(&["a", "b"]);
        queue.handle_command(MatchingCommand::Leave(UserId::new("b")));
        assert_eq!(try_match(&mut queue, "b", 4), MatchingOutcome::NotQueued);
        assert_eq!(ids(queue.entries()), vec!["a"]);
    }

    #[test]
    fn leave_is_idempotent() {
        let mut queue = queue_with(&["a"]);
        assert!(matches!(
            queue.handle_command(MatchingCommand::Leave(UserId::new("a"))),
            MatchingOutcome::Dequeued(_)
        ));
        assert_eq!(
            queue.handle_command(MatchingCommand::Leave(UserId::new("a"))),
            MatchingOutcome::NotQueued
        );
    }

    #[test]
    fn rejoin_gets_fresh_ticket() {
        let mut queue = queue_with(&["a"]);
        let first = queue.entries()[0].ticket;
        queue.handle_command(MatchingCommand::Leave(UserId::new("a")));
        queue.handle_command(MatchingCommand::Enqueue {
            user_id: UserId::new("a"),
            display_name: "A".into(),
        });
        assert!(!queue.holds_ticket(first));
        assert_ne!(queue.entries()[0].ticket, first);
    }

    #[test]
    fn purge_removes_only_stale_entries() {
        let mut queue = queue_with(&["a", "b", "c"]);
        let stale = queue.purge(|e| e.user_id.as_str() == "b");
        assert_eq!(ids(&stale), vec!["b"]);
        assert_eq!(ids(queue.entries()), vec!["a", "c"]);
    }
}
