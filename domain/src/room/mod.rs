mod player;
mod state;


pub use player::Player;
pub use state::{RoomState, RoomStatus};
