//! Dialog lifecycle: (none) -> open -> closed.
//!
//! Identity checks are the caller's job; nothing here looks at who is asking.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{Dialog, DialogError, DialogStoreError, Message};
use crate::common::{DialogId, MemberId};
use crate::domains::anonymize::Anonymizer;
use crate::domains::chat_queue::DialogPair;
use crate::kernel::{BaseClock, BaseDialogStore, BaseDirectory};

pub struct DialogLifecycle {
    store: Arc<dyn BaseDialogStore>,
    directory: Arc<dyn BaseDirectory>,
    clock: Arc<dyn BaseClock>,
    anonymizer: Anonymizer,
}

impl DialogLifecycle {
    pub fn new(
        store: Arc<dyn BaseDialogStore>,
        directory: Arc<dyn BaseDirectory>,
        clock: Arc<dyn BaseClock>,
    ) -> Self {
        Self {
            store,
            directory,
            clock,
            anonymizer: Anonymizer,
        }
    }

    /// Return the open dialog for the pair, creating it if there is none.
    ///
    /// Two racing callers may both miss the lookup; the store rejects the
    /// second insert with `Conflict` and that caller re-reads the winner.
    pub async fn create_or_reuse(
        &self,
        pair: &DialogPair,
        title: Option<String>,
    ) -> Result<Dialog, DialogError> {
        if let Some(existing) = self.store.find_open(pair).await? {
            debug!(dialog_id = %existing.id, "reusing open dialog");
            return Ok(existing);
        }

        let title = match title {
            Some(title) => title,
            None => self.default_title(pair).await?,
        };
        let dialog = Dialog::open(pair, Some(title), self.clock.now());

        match self.store.insert(&dialog).await {
            Ok(()) => {
                info!(
                    dialog_id = %dialog.id,
                    organization_id = %pair.organization_id,
                    "dialog created"
                );
                Ok(dialog)
            }
            Err(DialogStoreError::Conflict) => {
                debug!(
                    organization_id = %pair.organization_id,
                    "lost dialog creation race, re-reading open dialog"
                );
                self.store.find_open(pair).await?.ok_or_else(|| {
                    DialogError::Storage(anyhow!(
                        "dialog insert conflicted but no open dialog was found"
                    ))
                })
            }
            Err(DialogStoreError::Other(e)) => Err(DialogError::Storage(e)),
        }
    }

    pub async fn get(&self, dialog_id: DialogId) -> Result<Option<Dialog>, DialogError> {
        Ok(self.store.find_by_id(dialog_id).await?)
    }

    pub async fn list_for_member(&self, member_id: MemberId) -> Result<Vec<Dialog>, DialogError> {
        Ok(self.store.find_for_member(member_id).await?)
    }

    /// Append a message. A missing dialog is `NotFound`.
    pub async fn append_message(
        &self,
        dialog_id: DialogId,
        author_id: MemberId,
        text: String,
        at: DateTime<Utc>,
    ) -> Result<Message, DialogError> {
        let message = Message::new(author_id, text, at);
        if !self.store.push_message(dialog_id, &message).await? {
            return Err(DialogError::NotFound(dialog_id));
        }
        Ok(message)
    }

    /// Close a dialog. Closing twice is fine; a missing dialog is `NotFound`.
    pub async fn close(&self, dialog_id: DialogId) -> Result<(), DialogError> {
        if !self.store.close(dialog_id).await? {
            return Err(DialogError::NotFound(dialog_id));
        }
        info!(dialog_id = %dialog_id, "dialog closed");
        Ok(())
    }

    async fn default_title(&self, pair: &DialogPair) -> Result<String, DialogError> {
        let caption = self.anonymizer.caption_for(pair.student_id);
        let title = match self.directory.organization_name(pair.organization_id).await? {
            Some(name) => format!("{} - Student [{}]", name, caption),
            None => format!("Student [{}]", caption),
        };
        Ok(title)
    }
}
