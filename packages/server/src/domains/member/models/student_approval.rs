//! Student approval - a member's claim to be enrolled at an organization.
//!
//! Stored as one row per member with a `status` discriminator and read back
//! into a tagged union, so every consumer matches the three states exhaustively.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{MemberId, OrganizationId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StudentApproval {
    Pending {
        organization_id: OrganizationId,
        requested_at: DateTime<Utc>,
    },
    Approved {
        organization_id: OrganizationId,
        moderator_id: Option<MemberId>,
        at: DateTime<Utc>,
    },
    Rejected {
        organization_id: OrganizationId,
        moderator_id: MemberId,
        at: DateTime<Utc>,
        comment: String,
    },
}

impl StudentApproval {
    pub fn pending(organization_id: OrganizationId, requested_at: DateTime<Utc>) -> Self {
        Self::Pending {
            organization_id,
            requested_at,
        }
    }

    pub fn approved(
        organization_id: OrganizationId,
        moderator_id: Option<MemberId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self::Approved {
            organization_id,
            moderator_id,
            at,
        }
    }

    pub fn organization_id(&self) -> OrganizationId {
        match self {
            Self::Pending {
                organization_id, ..
            }
            | Self::Approved {
                organization_id, ..
            }
            | Self::Rejected {
                organization_id, ..
            } => *organization_id,
        }
    }

    /// True only for an approved record naming exactly this organization.
    pub fn is_approved_for(&self, organization_id: OrganizationId) -> bool {
        match self {
            Self::Approved {
                organization_id: approved_for,
                ..
            } => *approved_for == organization_id,
            Self::Pending { .. } | Self::Rejected { .. } => false,
        }
    }
}

/// Flat database row behind a `StudentApproval`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct StudentApprovalRow {
    status: String, // 'pending', 'approved', 'rejected'
    organization_id: OrganizationId,
    moderator_id: Option<MemberId>,
    comment: Option<String>,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<StudentApprovalRow> for StudentApproval {
    type Error = anyhow::Error;

    fn try_from(row: StudentApprovalRow) -> Result<Self> {
        match row.status.as_str() {
            "pending" => Ok(Self::Pending {
                organization_id: row.organization_id,
                requested_at: row.requested_at,
            }),
            "approved" => Ok(Self::Approved {
                organization_id: row.organization_id,
                moderator_id: row.moderator_id,
                at: row.decided_at.context("approved record without decided_at")?,
            }),
            "rejected" => Ok(Self::Rejected {
                organization_id: row.organization_id,
                moderator_id: row
                    .moderator_id
                    .context("rejected record without moderator_id")?,
                at: row.decided_at.context("rejected record without decided_at")?,
                comment: row.comment.unwrap_or_default(),
            }),
            other => Err(anyhow::anyhow!("Invalid approval status: {}", other)),
        }
    }
}

// =============================================================================
// Student Approval Queries
// =============================================================================

impl StudentApproval {
    /// Find the approval record of a member
    pub async fn find_for_member(member_id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let row = sqlx::query_as::<_, StudentApprovalRow>(
            r#"
            SELECT status, organization_id, moderator_id, comment, requested_at, decided_at
            FROM student_approvals
            WHERE member_id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

        row.map(StudentApproval::try_from).transpose()
    }

    /// Members among `member_ids` whose record (any status) names the organization
    pub async fn filter_members_of_organization(
        organization_id: OrganizationId,
        member_ids: &[MemberId],
        pool: &PgPool,
    ) -> Result<Vec<MemberId>> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = sqlx::query_scalar::<_, MemberId>(
            r#"
            SELECT member_id
            FROM student_approvals
            WHERE organization_id = $1 AND member_id = ANY($2)
            "#,
        )
        .bind(organization_id)
        .bind(member_ids)
        .fetch_all(pool)
        .await?;
        Ok(ids)
    }

    /// Insert or replace the member's approval record. A decision keeps the
    /// stored request time; a new pending request resets it.
    pub async fn save(&self, member_id: MemberId, pool: &PgPool) -> Result<()> {
        let (status, moderator_id, comment, requested_at, decided_at) = match self {
            Self::Pending { requested_at, .. } => ("pending", None, None, *requested_at, None),
            Self::Approved {
                moderator_id, at, ..
            } => ("approved", *moderator_id, None, *at, Some(*at)),
            Self::Rejected {
                moderator_id,
                at,
                comment,
                ..
            } => ("rejected", Some(*moderator_id), Some(comment.clone()), *at, Some(*at)),
        };

        sqlx::query(
            r#"
            INSERT INTO student_approvals
                (member_id, organization_id, status, moderator_id, comment, requested_at, decided_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (member_id) DO UPDATE SET
                organization_id = EXCLUDED.organization_id,
                status = EXCLUDED.status,
                moderator_id = EXCLUDED.moderator_id,
                comment = EXCLUDED.comment,
                requested_at = CASE
                    WHEN EXCLUDED.status = 'pending' THEN EXCLUDED.requested_at
                    ELSE student_approvals.requested_at
                END,
                decided_at = EXCLUDED.decided_at
            "#,
        )
        .bind(member_id)
        .bind(self.organization_id())
        .bind(status)
        .bind(moderator_id)
        .bind(comment)
        .bind(requested_at)
        .bind(decided_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}
