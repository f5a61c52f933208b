//! Member domain - accounts and student approval records.

pub mod models;

pub use models::*;
