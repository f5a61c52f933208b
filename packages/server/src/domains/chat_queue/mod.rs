//! Chat queue domain - per-organization waiting lines pairing students with enrollees.

pub mod models;
pub mod queue;

pub use models::*;
pub use queue::ChatQueue;
