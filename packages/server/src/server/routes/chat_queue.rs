//! Queue polling endpoints. Both clients poll about once per second.

use axum::{extract::Extension, http::StatusCode};
use serde::Serialize;
use tracing::info;

use crate::common::{Actor, Capability, DialogId, OrganizationId};
use crate::domains::chat_queue::{QueueRole, QueueUpdate};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::{Json, Path};
use crate::server::middleware::AuthUser;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateQueueResponse {
    Online {
        queue_students_online: usize,
        queue_enrollees_online: usize,
    },
    JoinDialog {
        dialog_id: DialogId,
    },
}

/// Enrollee heartbeat: keeps the caller queued and reports a match.
pub async fn update_enrollee_queue(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(organization_id): Path<OrganizationId>,
) -> Result<Json<UpdateQueueResponse>, ApiError> {
    poll_queue(&state, &user, organization_id, QueueRole::Enrollee).await
}

/// Student heartbeat. Only approved students of the organization may queue.
pub async fn update_students_queue(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(organization_id): Path<OrganizationId>,
) -> Result<Json<UpdateQueueResponse>, ApiError> {
    Actor::new(user.member_id)
        .can(Capability::JoinStudentQueue(organization_id))
        .check(state.deps.directory.as_ref())
        .await?;

    poll_queue(&state, &user, organization_id, QueueRole::Student).await
}

/// Leave both sides of the organization's queue.
pub async fn leave_queue(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(organization_id): Path<OrganizationId>,
) -> StatusCode {
    state.deps.chat_queue.leave_queue(user.member_id, organization_id);
    StatusCode::NO_CONTENT
}

async fn poll_queue(
    state: &AxumAppState,
    user: &AuthUser,
    organization_id: OrganizationId,
    role: QueueRole,
) -> Result<Json<UpdateQueueResponse>, ApiError> {
    let response = match state
        .deps
        .chat_queue
        .claim(user.member_id, organization_id, role)
    {
        QueueUpdate::Paired(pair) => {
            // The queue already dropped both entries; keep the pair reachable
            // so the next poll retries instead of matching someone else.
            let dialog = match state.deps.dialogs.create_or_reuse(&pair, None).await {
                Ok(dialog) => dialog,
                Err(e) => {
                    state.deps.chat_queue.restore_offer(user.member_id, pair);
                    return Err(e.into());
                }
            };
            info!(
                member_id = %user.member_id,
                dialog_id = %dialog.id,
                role = %role,
                "member matched"
            );
            UpdateQueueResponse::JoinDialog {
                dialog_id: dialog.id,
            }
        }
        QueueUpdate::Waiting {
            students,
            enrollees,
        } => UpdateQueueResponse::Online {
            queue_students_online: students,
            queue_enrollees_online: enrollees,
        },
    };

    Ok(Json(response))
}
