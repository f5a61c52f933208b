//! Server dependencies (using traits for testability)
//!
//! `ServerDeps` is the composition root: it is built once at startup, owns the
//! single in-memory queue and presence tracker, and is shared with every
//! request handler.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;

use crate::common::{DialogId, MemberId};
use crate::domains::chat_queue::{ChatQueue, DialogPair, QueueSettings};
use crate::domains::dialogs::{Dialog, DialogLifecycle, DialogStoreError, Message};
use crate::domains::presence::PresenceTracker;
use crate::kernel::{BaseClock, BaseDialogStore, BaseDirectory, PgDirectory, SystemClock};

// =============================================================================
// PgDialogStore (implements BaseDialogStore on Postgres)
// =============================================================================

/// Dialog persistence backed by the `dialogs` / `dialog_messages` tables
pub struct PgDialogStore {
    pool: PgPool,
}

impl PgDialogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseDialogStore for PgDialogStore {
    async fn find_open(&self, pair: &DialogPair) -> Result<Option<Dialog>> {
        Dialog::find_open(pair, &self.pool).await
    }

    async fn insert(&self, dialog: &Dialog) -> Result<(), DialogStoreError> {
        dialog.insert(&self.pool).await
    }

    async fn find_by_id(&self, dialog_id: DialogId) -> Result<Option<Dialog>> {
        Dialog::find_by_id(dialog_id, &self.pool).await
    }

    async fn find_for_member(&self, member_id: MemberId) -> Result<Vec<Dialog>> {
        Dialog::find_for_member(member_id, &self.pool).await
    }

    async fn push_message(&self, dialog_id: DialogId, message: &Message) -> Result<bool> {
        message.append(dialog_id, &self.pool).await
    }

    async fn close(&self, dialog_id: DialogId) -> Result<bool> {
        Dialog::close(dialog_id, &self.pool).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

#[derive(Clone)]
pub struct ServerDeps {
    pub clock: Arc<dyn BaseClock>,
    pub directory: Arc<dyn BaseDirectory>,
    pub chat_queue: Arc<ChatQueue>,
    pub presence: Arc<PresenceTracker>,
    pub dialogs: Arc<DialogLifecycle>,
}

impl ServerDeps {
    pub fn new(
        clock: Arc<dyn BaseClock>,
        directory: Arc<dyn BaseDirectory>,
        dialog_store: Arc<dyn BaseDialogStore>,
        queue_settings: QueueSettings,
        presence_window: Duration,
    ) -> Self {
        Self {
            chat_queue: Arc::new(ChatQueue::new(clock.clone(), queue_settings)),
            presence: Arc::new(PresenceTracker::new(clock.clone(), presence_window)),
            dialogs: Arc::new(DialogLifecycle::new(
                dialog_store,
                directory.clone(),
                clock.clone(),
            )),
            directory,
            clock,
        }
    }

    /// Production wiring: wall clock and Postgres-backed collaborators.
    pub fn postgres(pool: PgPool, queue_settings: QueueSettings, presence_window: Duration) -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(PgDirectory::new(pool.clone())),
            Arc::new(PgDialogStore::new(pool)),
            queue_settings,
            presence_window,
        )
    }
}
