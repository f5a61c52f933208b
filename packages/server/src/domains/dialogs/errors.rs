use thiserror::Error;

use crate::common::DialogId;

/// Errors surfaced by the dialog lifecycle
#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Dialog not found: {0}")]
    NotFound(DialogId),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Errors from the dialog store seam
#[derive(Error, Debug)]
pub enum DialogStoreError {
    /// An open dialog already exists for the same organization/student/enrollee.
    #[error("An open dialog already exists for this pair")]
    Conflict,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
