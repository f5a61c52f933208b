// University Admissions Platform - API Core
//
// Matchmaking chat between prospective students (enrollees) and current
// students: an in-memory queue pairs them per organization and the dialogs
// domain persists the resulting conversations.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
