use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{DialogId, MemberId, MessageId, OrganizationId};
use crate::domains::chat_queue::DialogPair;
use crate::domains::dialogs::DialogStoreError;

/// SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Dialog - a conversation between one student and one enrollee of an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dialog {
    pub id: DialogId,
    pub organization_id: OrganizationId,
    pub student_id: MemberId,
    pub enrollee_id: MemberId,
    pub title: Option<String>,
    pub closed: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub messages: Vec<Message>,
}

impl Dialog {
    /// A fresh open dialog with no messages.
    pub fn open(pair: &DialogPair, title: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: DialogId::new(),
            organization_id: pair.organization_id,
            student_id: pair.student_id,
            enrollee_id: pair.enrollee_id,
            title,
            closed: false,
            created_at,
            messages: Vec::new(),
        }
    }

    pub fn pair(&self) -> DialogPair {
        DialogPair {
            organization_id: self.organization_id,
            student_id: self.student_id,
            enrollee_id: self.enrollee_id,
        }
    }

    pub fn is_open_for(&self, pair: &DialogPair) -> bool {
        !self.closed && self.pair() == *pair
    }
}

/// Message - one line of a dialog, immutable once appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub author_id: MemberId,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Message {
    pub fn new(author_id: MemberId, text: String, at: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            author_id,
            text,
            at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    dialog_id: DialogId,
    #[sqlx(flatten)]
    message: Message,
}

// =============================================================================
// Dialog Queries
// =============================================================================

impl Dialog {
    /// Find the open dialog for an organization/student/enrollee triple
    pub async fn find_open(pair: &DialogPair, pool: &PgPool) -> Result<Option<Self>> {
        let dialog = sqlx::query_as::<_, Dialog>(
            r#"
            SELECT * FROM dialogs
            WHERE organization_id = $1 AND student_id = $2 AND enrollee_id = $3
              AND NOT closed
            "#,
        )
        .bind(pair.organization_id)
        .bind(pair.student_id)
        .bind(pair.enrollee_id)
        .fetch_optional(pool)
        .await?;

        match dialog {
            Some(dialog) => Ok(Some(Self::with_messages(dialog, pool).await?)),
            None => Ok(None),
        }
    }

    /// Find dialog by ID, messages included
    pub async fn find_by_id(id: DialogId, pool: &PgPool) -> Result<Option<Self>> {
        let dialog = sqlx::query_as::<_, Dialog>("SELECT * FROM dialogs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match dialog {
            Some(dialog) => Ok(Some(Self::with_messages(dialog, pool).await?)),
            None => Ok(None),
        }
    }

    /// Find dialogs where the member is either party, messages included
    pub async fn find_for_member(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let mut dialogs = sqlx::query_as::<_, Dialog>(
            r#"
            SELECT * FROM dialogs
            WHERE student_id = $1 OR enrollee_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;

        let ids: Vec<DialogId> = dialogs.iter().map(|d| d.id).collect();
        let mut by_dialog = Message::find_by_dialogs(&ids, pool).await?;
        for dialog in &mut dialogs {
            dialog.messages = by_dialog.remove(&dialog.id).unwrap_or_default();
        }
        Ok(dialogs)
    }

    /// Insert a new dialog. A second open dialog for the same triple violates
    /// the partial unique index and comes back as `Conflict`.
    pub async fn insert(&self, pool: &PgPool) -> Result<(), DialogStoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO dialogs (id, organization_id, student_id, enrollee_id, title, closed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(self.id)
        .bind(self.organization_id)
        .bind(self.student_id)
        .bind(self.enrollee_id)
        .bind(&self.title)
        .bind(self.closed)
        .bind(self.created_at)
        .execute(pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(DialogStoreError::Conflict)
            }
            Err(e) => Err(DialogStoreError::Other(
                anyhow::Error::new(e).context("Failed to insert dialog"),
            )),
        }
    }

    /// Mark a dialog closed. Returns false if it does not exist.
    pub async fn close(id: DialogId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("UPDATE dialogs SET closed = TRUE WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn with_messages(mut dialog: Dialog, pool: &PgPool) -> Result<Self> {
        dialog.messages = Message::find_by_dialogs(&[dialog.id], pool)
            .await?
            .remove(&dialog.id)
            .unwrap_or_default();
        Ok(dialog)
    }
}

// =============================================================================
// Message Queries
// =============================================================================

impl Message {
    /// Messages of several dialogs, grouped by dialog in append order
    pub async fn find_by_dialogs(
        dialog_ids: &[DialogId],
        pool: &PgPool,
    ) -> Result<HashMap<DialogId, Vec<Self>>> {
        if dialog_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT dialog_id, id, author_id, text, at
            FROM dialog_messages
            WHERE dialog_id = ANY($1)
            ORDER BY seq
            "#,
        )
        .bind(dialog_ids)
        .fetch_all(pool)
        .await
        .context("Failed to load dialog messages")?;

        let mut grouped: HashMap<DialogId, Vec<Self>> = HashMap::new();
        for row in rows {
            grouped.entry(row.dialog_id).or_default().push(row.message);
        }
        Ok(grouped)
    }

    /// Append to a dialog. Returns false if the dialog does not exist.
    pub async fn append(&self, dialog_id: DialogId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO dialog_messages (id, dialog_id, author_id, text, at)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM dialogs WHERE id = $2)
            "#,
        )
        .bind(self.id)
        .bind(dialog_id)
        .bind(self.author_id)
        .bind(&self.text)
        .bind(self.at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
