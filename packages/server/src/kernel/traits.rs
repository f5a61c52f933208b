// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE seams only - no business logic.
// Queue pairing and dialog lifecycle rules live in the domains and are
// written against these traits so tests can swap Postgres for memory.
//
// Naming convention: Base* for trait names (e.g., BaseClock, BaseDialogStore)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::{DialogId, MemberId, OrganizationId};
use crate::domains::chat_queue::DialogPair;
use crate::domains::dialogs::{Dialog, DialogStoreError, Message};
use crate::domains::member::StudentApproval;

// =============================================================================
// Clock Trait (Infrastructure - time source)
// =============================================================================

/// Source of timezone-aware "now". Every timestamp in the core comes from here.
pub trait BaseClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// =============================================================================
// Directory Trait (Infrastructure - organizations and members)
// =============================================================================

/// Read access to the organization/member records owned by other subsystems.
#[async_trait]
pub trait BaseDirectory: Send + Sync {
    /// Display name of an organization, `None` if it does not exist.
    async fn organization_name(&self, organization_id: OrganizationId) -> Result<Option<String>>;

    /// The member's student approval record, if they ever requested one.
    async fn student_approval(&self, member_id: MemberId) -> Result<Option<StudentApproval>>;

    /// Subset of `member_ids` whose approval record (any status) names the organization.
    async fn members_of_organization(
        &self,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> Result<Vec<MemberId>>;
}

// =============================================================================
// Dialog Store Trait (Infrastructure - dialog persistence)
// =============================================================================

#[async_trait]
pub trait BaseDialogStore: Send + Sync {
    /// The open (not closed) dialog for the pair's triple, if any.
    async fn find_open(&self, pair: &DialogPair) -> Result<Option<Dialog>>;

    /// Persist a new dialog. Fails with `DialogStoreError::Conflict` when an
    /// open dialog already exists for the same triple.
    async fn insert(&self, dialog: &Dialog) -> Result<(), DialogStoreError>;

    async fn find_by_id(&self, dialog_id: DialogId) -> Result<Option<Dialog>>;

    /// Dialogs where the member is the student or the enrollee.
    async fn find_for_member(&self, member_id: MemberId) -> Result<Vec<Dialog>>;

    /// Append a message. Returns `false` when the dialog does not exist.
    async fn push_message(&self, dialog_id: DialogId, message: &Message) -> Result<bool>;

    /// Mark a dialog closed. Returns `false` when the dialog does not exist.
    async fn close(&self, dialog_id: DialogId) -> Result<bool>;
}
