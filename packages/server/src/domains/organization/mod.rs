//! Organization domain - universities and faculties that own queues and dialogs.

pub mod models;

pub use models::*;
