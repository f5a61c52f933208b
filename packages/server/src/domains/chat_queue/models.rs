use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::common::{MemberId, OrganizationId};

/// Entries whose last heartbeat is this old are never paired.
pub const DEFAULT_STALE_AFTER_SECS: i64 = 30;

/// Which side of an organization's queue a member waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueRole {
    Student,
    Enrollee,
}

impl QueueRole {
    pub fn opposite(self) -> Self {
        match self {
            QueueRole::Student => QueueRole::Enrollee,
            QueueRole::Enrollee => QueueRole::Student,
        }
    }
}

impl std::fmt::Display for QueueRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueRole::Student => write!(f, "student"),
            QueueRole::Enrollee => write!(f, "enrollee"),
        }
    }
}

/// A proposed match between one student and one enrollee of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogPair {
    pub organization_id: OrganizationId,
    pub student_id: MemberId,
    pub enrollee_id: MemberId,
}

impl DialogPair {
    /// Whether the member is one of the two parties.
    pub fn involves(&self, member_id: MemberId) -> bool {
        self.student_id == member_id || self.enrollee_id == member_id
    }

    /// The party that is not `member_id`.
    pub fn counterpart_of(&self, member_id: MemberId) -> MemberId {
        if self.student_id == member_id {
            self.enrollee_id
        } else {
            self.student_id
        }
    }
}

/// Result of a queue poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueUpdate {
    /// A counterpart was found (now, or on an earlier poll by the counterpart).
    Paired(DialogPair),
    /// Still waiting; live counts of both sides.
    Waiting { students: usize, enrollees: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct QueueSettings {
    pub stale_after: Duration,
}

impl QueueSettings {
    pub fn with_stale_after_secs(secs: i64) -> Self {
        Self {
            stale_after: Duration::seconds(secs),
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::with_stale_after_secs(DEFAULT_STALE_AFTER_SECS)
    }
}
