use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::MemberId;

/// Member - any user account (enrollee, student, moderator, admin)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub login: String,
    pub name: String,
    pub role: String, // 'admin', 'moderator', 'default'
    pub created_at: DateTime<Utc>,
}

/// Member role enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Admin,
    Moderator,
    #[default]
    Default,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::Moderator => write!(f, "moderator"),
            MemberRole::Default => write!(f, "default"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(MemberRole::Admin),
            "moderator" => Ok(MemberRole::Moderator),
            "default" => Ok(MemberRole::Default),
            _ => Err(anyhow::anyhow!("Invalid member role: {}", s)),
        }
    }
}

// =============================================================================
// Member Queries
// =============================================================================

impl Member {
    /// Create a new member
    pub async fn create(login: &str, name: &str, role: MemberRole, pool: &PgPool) -> Result<Self> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (id, login, name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(MemberId::new())
        .bind(login)
        .bind(name)
        .bind(role.to_string())
        .fetch_one(pool)
        .await?;
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_its_display_form() {
        for role in [MemberRole::Admin, MemberRole::Moderator, MemberRole::Default] {
            assert_eq!(role.to_string().parse::<MemberRole>().unwrap(), role);
        }
        assert!("root".parse::<MemberRole>().is_err());
    }
}
