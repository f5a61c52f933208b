use axum::{extract::Extension, http::StatusCode};
use serde::Deserialize;

use crate::common::{Actor, Capability, DialogId};
use crate::domains::chat_queue::DialogPair;
use crate::domains::dialogs::{Dialog, Message};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::{Json, Path};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct PushMessageRequest {
    pub text: String,
}

/// Open (or reuse) the dialog for a pair and take both parties off the queue.
pub async fn join_dialog(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Json(pair): Json<DialogPair>,
) -> Result<Json<Dialog>, ApiError> {
    Actor::new(user.member_id)
        .can(Capability::ParticipateIn {
            student_id: pair.student_id,
            enrollee_id: pair.enrollee_id,
        })
        .check(state.deps.directory.as_ref())
        .await?;

    Actor::new(pair.student_id)
        .can(Capability::JoinStudentQueue(pair.organization_id))
        .check(state.deps.directory.as_ref())
        .await?;

    let dialog = state.deps.dialogs.create_or_reuse(&pair, None).await?;
    state.deps.chat_queue.consume_pair(&pair);

    Ok(Json(dialog))
}

pub async fn get_dialog(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(dialog_id): Path<DialogId>,
) -> Result<Json<Dialog>, ApiError> {
    let dialog = load_as_party(&state, &user, dialog_id).await?;
    Ok(Json(dialog))
}

/// Dialogs where the caller is either party, open or closed.
pub async fn list_dialogs(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<Json<Vec<Dialog>>, ApiError> {
    let dialogs = state.deps.dialogs.list_for_member(user.member_id).await?;
    Ok(Json(dialogs))
}

pub async fn leave_dialog(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(dialog_id): Path<DialogId>,
) -> Result<StatusCode, ApiError> {
    load_as_party(&state, &user, dialog_id).await?;
    state.deps.dialogs.close(dialog_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn push_message(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    Path(dialog_id): Path<DialogId>,
    Json(request): Json<PushMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Message text must not be empty".to_string()));
    }

    load_as_party(&state, &user, dialog_id).await?;
    let message = state
        .deps
        .dialogs
        .append_message(dialog_id, user.member_id, request.text, state.deps.clock.now())
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

async fn load_as_party(
    state: &AxumAppState,
    user: &AuthUser,
    dialog_id: DialogId,
) -> Result<Dialog, ApiError> {
    let dialog = state
        .deps
        .dialogs
        .get(dialog_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dialog not found".to_string()))?;

    Actor::new(user.member_id)
        .can(Capability::ParticipateIn {
            student_id: dialog.student_id,
            enrollee_id: dialog.enrollee_id,
        })
        .check(state.deps.directory.as_ref())
        .await?;

    Ok(dialog)
}
