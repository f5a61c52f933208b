use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::{MemberId, OrganizationId};
use crate::domains::member::StudentApproval;
use crate::domains::organization::Organization;
use crate::kernel::BaseDirectory;

/// Directory lookups against the organization and member tables
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseDirectory for PgDirectory {
    async fn organization_name(&self, organization_id: OrganizationId) -> Result<Option<String>> {
        Ok(Organization::find_by_id(organization_id, &self.pool)
            .await?
            .map(|organization| organization.name))
    }

    async fn student_approval(&self, member_id: MemberId) -> Result<Option<StudentApproval>> {
        StudentApproval::find_for_member(member_id, &self.pool).await
    }

    async fn members_of_organization(
        &self,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> Result<Vec<MemberId>> {
        StudentApproval::filter_members_of_organization(organization_id, member_ids, &self.pool)
            .await
    }
}
