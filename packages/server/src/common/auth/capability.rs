use crate::common::{MemberId, OrganizationId};

/// Something a member wants to do that needs a relationship check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Wait in the student queue of an organization. Requires an approved
    /// student record for that exact organization.
    JoinStudentQueue(OrganizationId),

    /// Read, write to, or leave a dialog. Only its two parties may.
    ParticipateIn {
        student_id: MemberId,
        enrollee_id: MemberId,
    },
}
