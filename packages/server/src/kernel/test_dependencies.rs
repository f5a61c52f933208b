// Test dependencies - in-memory implementations of the kernel seams
//
// Used by unit tests and by the HTTP tests under tests/ so neither needs a
// database or real time.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{BaseClock, BaseDialogStore, BaseDirectory};
use crate::common::{DialogId, MemberId, OrganizationId};
use crate::domains::chat_queue::DialogPair;
use crate::domains::dialogs::{Dialog, DialogStoreError, Message};
use crate::domains::member::StudentApproval;

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseClock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// In-Memory Directory
// =============================================================================

#[derive(Default)]
pub struct InMemoryDirectory {
    organizations: Mutex<HashMap<OrganizationId, String>>,
    approvals: Mutex<HashMap<MemberId, StudentApproval>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_organization(&self, organization_id: OrganizationId, name: &str) {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization_id, name.to_string());
    }

    pub fn set_approval(&self, member_id: MemberId, approval: StudentApproval) {
        self.approvals.lock().unwrap().insert(member_id, approval);
    }
}

#[async_trait]
impl BaseDirectory for InMemoryDirectory {
    async fn organization_name(&self, organization_id: OrganizationId) -> Result<Option<String>> {
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .get(&organization_id)
            .cloned())
    }

    async fn student_approval(&self, member_id: MemberId) -> Result<Option<StudentApproval>> {
        Ok(self.approvals.lock().unwrap().get(&member_id).cloned())
    }

    async fn members_of_organization(
        &self,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> Result<Vec<MemberId>> {
        let approvals = self.approvals.lock().unwrap();
        Ok(member_ids
            .iter()
            .filter(|id| {
                approvals
                    .get(*id)
                    .is_some_and(|a| a.organization_id() == organization_id)
            })
            .copied()
            .collect())
    }
}

// =============================================================================
// In-Memory Dialog Store
// =============================================================================

/// Dialog store with the same open-triple uniqueness rule as the database.
#[derive(Default)]
pub struct InMemoryDialogStore {
    dialogs: Mutex<Vec<Dialog>>,
    skipped_lookups: Mutex<usize>,
    failing_lookups: Mutex<usize>,
}

impl InMemoryDialogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored dialogs, open or closed.
    pub fn len(&self) -> usize {
        self.dialogs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `dialog` but let the next `find_open` miss it, the way a
    /// concurrent request's insert lands between our lookup and our insert.
    pub fn hide_from_next_lookup(&self, dialog: Dialog) {
        self.dialogs.lock().unwrap().push(dialog);
        *self.skipped_lookups.lock().unwrap() += 1;
    }

    /// Make the next `count` calls to `find_open` fail like a lost connection.
    pub fn fail_next_lookups(&self, count: usize) {
        *self.failing_lookups.lock().unwrap() = count;
    }
}

#[async_trait]
impl BaseDialogStore for InMemoryDialogStore {
    async fn find_open(&self, pair: &DialogPair) -> Result<Option<Dialog>> {
        {
            let mut failing = self.failing_lookups.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(anyhow!("dialog store unavailable"));
            }
        }
        {
            let mut skipped = self.skipped_lookups.lock().unwrap();
            if *skipped > 0 {
                *skipped -= 1;
                return Ok(None);
            }
        }
        Ok(self
            .dialogs
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.is_open_for(pair))
            .cloned())
    }

    async fn insert(&self, dialog: &Dialog) -> Result<(), DialogStoreError> {
        let mut dialogs = self.dialogs.lock().unwrap();
        if !dialog.closed && dialogs.iter().any(|d| d.is_open_for(&dialog.pair())) {
            return Err(DialogStoreError::Conflict);
        }
        dialogs.push(dialog.clone());
        Ok(())
    }

    async fn find_by_id(&self, dialog_id: DialogId) -> Result<Option<Dialog>> {
        Ok(self
            .dialogs
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == dialog_id)
            .cloned())
    }

    async fn find_for_member(&self, member_id: MemberId) -> Result<Vec<Dialog>> {
        Ok(self
            .dialogs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.student_id == member_id || d.enrollee_id == member_id)
            .cloned()
            .collect())
    }

    async fn push_message(&self, dialog_id: DialogId, message: &Message) -> Result<bool> {
        let mut dialogs = self.dialogs.lock().unwrap();
        match dialogs.iter_mut().find(|d| d.id == dialog_id) {
            Some(dialog) => {
                dialog.messages.push(message.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn close(&self, dialog_id: DialogId) -> Result<bool> {
        let mut dialogs = self.dialogs.lock().unwrap();
        match dialogs.iter_mut().find(|d| d.id == dialog_id) {
            Some(dialog) => {
                dialog.closed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
