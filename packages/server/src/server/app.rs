//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::auth::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{
    get_dialog, health_handler, i_am_online, join_dialog, leave_dialog, leave_queue,
    list_dialogs, online_count, push_message, update_enrollee_queue, update_students_queue,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: ServerDeps,
    /// `None` when running on in-memory collaborators.
    pub db_pool: Option<PgPool>,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router
///
/// An empty `allowed_origins` allows any origin.
pub fn build_app(state: AxumAppState, allowed_origins: &[String]) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let jwt_service = state.jwt_service.clone();

    let chatting = Router::new()
        .route(
            "/chat-queue/update-enrollee-queue/:organization_id",
            post(update_enrollee_queue),
        )
        .route(
            "/chat-queue/update-students-queue/:organization_id",
            post(update_students_queue),
        )
        .route("/chat-queue/leave/:organization_id", post(leave_queue))
        .route("/dialogs", get(list_dialogs))
        .route("/dialogs/join", post(join_dialog))
        .route("/dialogs/:dialog_id", get(get_dialog))
        .route("/dialogs/:dialog_id/leave", post(leave_dialog))
        .route("/dialogs/:dialog_id/messages", post(push_message));

    let online = Router::new()
        .route("/i-am-online", post(i_am_online))
        .route("/count", get(online_count));

    Router::new()
        .nest("/chatting", chatting)
        .nest("/online", online)
        .route("/health", get(health_handler))
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.is_empty() {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}
