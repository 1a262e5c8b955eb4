use std::time::Duration;

#[derive(Clone, Debug)]
pub struct MatchmakingConfig {
    /// Seats per room created by the matchmaker.
    pub room_capacity: usize,
    /// How long a lone queue entry waits before it is offered open rooms.
    pub match_timeout: Duration,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            room_capacity: 4,
            match_timeout: Duration::from_secs(30),
        }
    }
}
