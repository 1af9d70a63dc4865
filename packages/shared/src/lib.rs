//! Utilities shared by the Dengon relay crates.

pub mod logger;
pub mod time;
