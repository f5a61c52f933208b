use axum::{extract::Extension, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::common::{MemberId, OrganizationId};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::{Json, Query};
use crate::server::middleware::AuthUser;

#[derive(Debug, Deserialize)]
pub struct OnlineCountQuery {
    pub organization_id: Option<OrganizationId>,
}

#[derive(Debug, Serialize)]
pub struct OnlineCountResponse {
    pub count: usize,
}

pub async fn i_am_online(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> StatusCode {
    state.deps.presence.mark_online(user.member_id);
    StatusCode::NO_CONTENT
}

/// Members seen within the presence window, optionally only those whose
/// approval record names the organization.
pub async fn online_count(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<OnlineCountQuery>,
) -> Result<Json<OnlineCountResponse>, ApiError> {
    let online: Vec<MemberId> = state.deps.presence.list_online().into_iter().collect();

    let count = match query.organization_id {
        None => online.len(),
        Some(organization_id) => state
            .deps
            .directory
            .members_of_organization(organization_id, &online)
            .await?
            .len(),
    };

    Ok(Json(OnlineCountResponse { count }))
}
