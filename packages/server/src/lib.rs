//! Realtime presence-and-broadcast relay.
//!
//! Tracks which identity is online on which WebSocket connection, groups
//! connections into per-conversation rooms, relays content events to them and
//! keeps the unread/seen counters of the external conversation store in sync.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod config;
