use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use domain::{GameType, RoomSummary};

use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoomsQuery {
    pub game_type: GameType,
}

#[derive(Debug, Serialize)]
pub struct RoomsResponse {
    pub rooms: Vec<RoomSummary>,
    pub count: usize,
}

/// Open rooms of one game type, oldest first.
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoomsQuery>,
) -> Json<RoomsResponse> {
    let rooms = state.dispatcher.joinable_rooms(&query.game_type).await;
    let count = rooms.len();
    Json(RoomsResponse { rooms, count })
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub connections: usize,
    pub queued: usize,
    pub rooms: usize,
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.dispatcher.stats().await;
    Json(StatsResponse {
        connections: stats.connections,
        queued: stats.queued,
        rooms: stats.rooms,
    })
}
