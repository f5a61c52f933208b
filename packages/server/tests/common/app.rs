//! In-process HTTP test app.
//!
//! Wires the real router to in-memory collaborators and a manual clock, so
//! requests go through routing, JWT middleware and handlers without a database.

use std::sync::Arc;

use admissions_core::common::{MemberId, OrganizationId};
use admissions_core::domains::chat_queue::QueueSettings;
use admissions_core::domains::member::{MemberRole, StudentApproval};
use admissions_core::domains::presence::DEFAULT_PRESENCE_WINDOW_SECS;
use admissions_core::kernel::test_dependencies::{
    InMemoryDialogStore, InMemoryDirectory, ManualClock,
};
use admissions_core::kernel::{BaseClock, ServerDeps};
use admissions_core::server::auth::JwtService;
use admissions_core::server::{build_app, AxumAppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "admissions-test";

pub struct TestApp {
    pub router: Router,
    pub deps: ServerDeps,
    pub clock: Arc<ManualClock>,
    pub directory: Arc<InMemoryDirectory>,
    pub store: Arc<InMemoryDialogStore>,
    jwt_service: Arc<JwtService>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let directory = Arc::new(InMemoryDirectory::new());
        let store = Arc::new(InMemoryDialogStore::new());
        let deps = ServerDeps::new(
            clock.clone(),
            directory.clone(),
            store.clone(),
            QueueSettings::default(),
            chrono::Duration::seconds(DEFAULT_PRESENCE_WINDOW_SECS),
        );
        let jwt_service = Arc::new(JwtService::new(
            TEST_JWT_SECRET,
            TEST_JWT_ISSUER.to_string(),
        ));

        let state = AxumAppState {
            deps: deps.clone(),
            db_pool: None,
            jwt_service: jwt_service.clone(),
        };
        let router = build_app(state, &[]);

        Self {
            router,
            deps,
            clock,
            directory,
            store,
            jwt_service,
        }
    }

    /// An organization registered in the directory.
    pub fn organization(&self, name: &str) -> OrganizationId {
        let organization_id = OrganizationId::new();
        self.directory.add_organization(organization_id, name);
        organization_id
    }

    /// A member with an approved student record for `organization_id`.
    pub fn approved_student(&self, organization_id: OrganizationId) -> MemberId {
        let member_id = MemberId::new();
        self.directory.set_approval(
            member_id,
            StudentApproval::approved(organization_id, None, self.clock.now()),
        );
        member_id
    }

    pub fn token_for(&self, member_id: MemberId) -> String {
        self.jwt_service
            .create_token(member_id, MemberRole::Default)
            .expect("Failed to create test token")
    }

    pub async fn get(&self, uri: &str, member_id: Option<MemberId>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, member_id, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        member_id: Option<MemberId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(Method::POST, uri, member_id, body).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        member_id: Option<MemberId>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(member_id) = member_id {
            request = request.header("authorization", format!("Bearer {}", self.token_for(member_id)));
        }
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };

        (status, json)
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub fn enrollee_queue_uri(organization_id: OrganizationId) -> String {
    format!(
        "/chatting/chat-queue/update-enrollee-queue/{}",
        organization_id
    )
}

pub fn students_queue_uri(organization_id: OrganizationId) -> String {
    format!(
        "/chatting/chat-queue/update-students-queue/{}",
        organization_id
    )
}
