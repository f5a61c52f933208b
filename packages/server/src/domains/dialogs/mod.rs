//! Dialogs domain - persisted conversations between a matched student and enrollee.

pub mod errors;
pub mod lifecycle;
pub mod models;

pub use errors::{DialogError, DialogStoreError};
pub use lifecycle::DialogLifecycle;
pub use models::*;
