//! Presence domain - "last seen" tracking for generic online-status queries.

pub mod tracker;

pub use tracker::{PresenceTracker, DEFAULT_PRESENCE_WINDOW_SECS};
