use std::io;
use std::time::Duration;

use axum::{Router, routing::get};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing::info;

use adapters::{create_app_state, get_rooms, get_stats, handle_connection};
use domain::MatchmakingConfig;

#[derive(Parser)]
#[command(name = "lobby-server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "LOBBY_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// Seats in a room created by the matchmaker
    #[arg(long, env = "LOBBY_ROOM_CAPACITY", default_value_t = 4, value_parser = clap::value_parser!(u16).range(2..))]
    room_capacity: u16,

    /// Seconds a lone waiter sits in the queue before open rooms are offered
    #[arg(long, env = "LOBBY_MATCH_TIMEOUT_SECS", default_value_t = 30)]
    match_timeout_secs: u64,
}

impl Args {
    fn matchmaking(&self) -> MatchmakingConfig {
        MatchmakingConfig {
            room_capacity: usize::from(self.room_capacity),
            match_timeout: Duration::from_secs(self.match_timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = args.matchmaking();
    info!(room_capacity = config.room_capacity, match_timeout = ?config.match_timeout, "Matchmaking configured");

    let app_state = create_app_state(config);

    let app = Router::new()
        .route("/ws", get(handle_connection))
        .route("/rooms", get(get_rooms))
        .route("/stats", get(get_stats))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("Server listening on {}", args.bind);
    axum::serve(listener, app).await?;
    info!("Server shut down");
    Ok(())
}
