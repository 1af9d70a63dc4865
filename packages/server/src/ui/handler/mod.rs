//! Request handlers.

mod http;
mod websocket;

pub use http::{get_presence, get_room_summary, health_check, publish};
pub use websocket::websocket_handler;
