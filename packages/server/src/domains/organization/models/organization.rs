use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::OrganizationId;

/// Organization - a university or faculty
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Organization Queries
// =============================================================================

impl Organization {
    /// Find organization by ID
    pub async fn find_by_id(id: OrganizationId, pool: &PgPool) -> Result<Option<Self>> {
        let organization =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(organization)
    }

    /// Create a new organization
    pub async fn create(name: &str, pool: &PgPool) -> Result<Self> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (id, name)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(OrganizationId::new())
        .bind(name)
        .fetch_one(pool)
        .await?;
        Ok(organization)
    }
}
