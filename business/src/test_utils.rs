//! Test utilities for business-layer testing with mock servers.
//!
//! Provides a [`TestContext`] that pairs a `wiremock` server with a fully
//! registered `StateCtx`, so scenario tests can drive the real commands
//! against mocked service endpoints without hitting the network.

#![cfg(test)]

use std::time::Duration;

use ustr::Ustr;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{
    AdminTableState, BlockUsersCommand, BulkActionCompute, BulkActionInput, BusinessConfig,
    DeleteUsersCommand, DirectoryCompute, PendingSessionToken, RefreshDirectoryCommand,
    SessionCompute, SignInCommand, SignInInput, SignOutCommand, UnblockUsersCommand,
    ValidateSessionCommand,
};
use roster_states::StateCtx;

/// Test context that holds a mock server and a configured `StateCtx`.
pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    /// Create a new test context with a fresh mock server.
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;

        let mut config = BusinessConfig::new(mock_server.uri());
        config.anon_key = Some("test-anon-key".to_owned());
        config.service_role_key = Some("test-service-key".to_owned());

        let ctx = build_test_state_ctx(config);

        Self { mock_server, ctx }
    }

    /// Mark the session as authenticated without going through sign-in.
    pub fn set_authenticated(&mut self, user_id: &str) {
        let updater = self.ctx.updater();
        updater.set(SessionCompute::new_authenticated(
            Ustr::from(user_id),
            "admin@example.com",
            "test-token",
        ));
        self.ctx.sync_computes();
    }

    /// Flush all pending commands and wait for their tasks to complete.
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_computes();
        self.ctx.flush_commands();

        let timeout = Duration::from_secs(5);
        let start = std::time::Instant::now();

        while self.ctx.task_count() > 0 {
            assert!(
                start.elapsed() <= timeout,
                "timed out waiting for pending tasks ({} still running)",
                self.ctx.task_count()
            );

            if self.ctx.task_set_mut().join_next().await.is_some() {
                self.ctx.sync_computes();
            }
        }

        self.ctx.sync_computes();
    }

    pub async fn shutdown(&mut self) {
        self.ctx.shutdown().await;
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    /// Mock the password sign-in endpoint.
    pub async fn mock_sign_in(&self, token: &str, user_id: &str, email: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "user": { "id": user_id, "email": email }
            })))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the sign-in endpoint rejecting credentials.
    pub async fn mock_sign_in_error(&self, status: u16, error_description: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": error_description
            })))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the current-session lookup.
    pub async fn mock_session(&self, user_id: &str, email: &str) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": user_id,
                "email": email
            })))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the current-session lookup rejecting the token.
    pub async fn mock_session_rejected(&self) {
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "msg": "invalid JWT"
            })))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the sign-out endpoint.
    pub async fn mock_sign_out(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the ordered directory read.
    pub async fn mock_list_users(&self, rows: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .and(query_param("order", "last_login.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the directory read failing.
    pub async fn mock_list_users_error(&self, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/users"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "message": message })),
            )
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the filtered status write, matching the exact id filter and
    /// status body. `expect` pins the call count, verified on drop.
    pub async fn mock_update_status(&self, id_filter: &str, status: &str, expect: u64) {
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/users"))
            .and(query_param("id", id_filter))
            .and(body_json(serde_json::json!({ "status": status })))
            .respond_with(ResponseTemplate::new(204))
            .expect(expect)
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the status write being rejected.
    pub async fn mock_update_status_error(&self, status: u16, message: &str) {
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/users"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "message": message })),
            )
            .mount(&self.mock_server)
            .await;
    }

    /// Mock the filtered row delete.
    pub async fn mock_delete_rows(&self, id_filter: &str) {
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/users"))
            .and(query_param("id", id_filter))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.mock_server)
            .await;
    }

    /// Mock one identity deletion with a pinned call count.
    pub async fn mock_delete_identity(&self, user_id: &str, status: u16, expect: u64) {
        let template = if (200..300).contains(&status) {
            ResponseTemplate::new(status)
        } else {
            ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "msg": "identity deletion failed"
            }))
        };
        Mock::given(method("DELETE"))
            .and(path(format!("/auth/v1/admin/users/{user_id}")))
            .respond_with(template)
            .expect(expect)
            .mount(&self.mock_server)
            .await;
    }
}

/// Initialize a `StateCtx` with every state, compute, and command the
/// console registers.
pub fn build_test_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    ctx.add_state(config);
    ctx.add_state(SignInInput::default());
    ctx.add_state(PendingSessionToken::default());
    ctx.add_state(BulkActionInput::default());
    ctx.add_state(AdminTableState::default());

    ctx.record_compute(SessionCompute::default());
    ctx.record_compute(DirectoryCompute::default());
    ctx.record_compute(BulkActionCompute::default());

    ctx.record_command(SignInCommand);
    ctx.record_command(ValidateSessionCommand);
    ctx.record_command(SignOutCommand);
    ctx.record_command(RefreshDirectoryCommand);
    ctx.record_command(BlockUsersCommand);
    ctx.record_command(UnblockUsersCommand);
    ctx.record_command(DeleteUsersCommand);

    ctx
}

/// A directory row as the service would serialize it.
pub fn sample_user(
    id: &str,
    email: &str,
    last_login: Option<&str>,
    status: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": null,
        "email": email,
        "last_login": last_login,
        "status": status
    })
}
