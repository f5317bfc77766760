//! Integration tests for the console wiring: context registration and the
//! bulk action dispatch path against a mocked service.

use roster_business::{
    BulkActionCompute, BulkActionKind, BusinessConfig, DirectoryCompute, SessionCompute,
};
use roster_cli::commands::actions::dispatch_bulk_action;
use roster_cli::context::{build_state_ctx, flush_and_await};
use roster_states::StateCtx;
use ustr::Ustr;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_ctx() -> (MockServer, StateCtx) {
    let mock_server = MockServer::start().await;

    let mut config = BusinessConfig::new(mock_server.uri());
    config.anon_key = Some("test-anon-key".to_owned());
    config.service_role_key = Some("test-service-key".to_owned());

    let ctx = build_state_ctx(config);
    (mock_server, ctx)
}

#[test]
fn context_registers_every_compute() {
    let ctx = build_state_ctx(BusinessConfig::default());

    assert!(ctx.try_compute::<SessionCompute>().is_ok());
    assert!(ctx.try_compute::<DirectoryCompute>().is_ok());
    assert!(ctx.try_compute::<BulkActionCompute>().is_ok());
}

#[tokio::test]
async fn block_dispatch_reports_sign_out_for_self_block() {
    let (mock_server, mut ctx) = mock_ctx().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "in.(u1,u2)"))
        .and(body_json(serde_json::json!({ "status": "blocked" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sign_out_acting = dispatch_bulk_action(
        &mut ctx,
        BulkActionKind::Block,
        vec![Ustr::from("u1"), Ustr::from("u2")],
        Some(Ustr::from("u1")),
    )
    .await
    .expect("block should succeed");

    assert!(sign_out_acting);
    ctx.shutdown().await;
}

#[tokio::test]
async fn failed_dispatch_surfaces_the_service_message() {
    let (mock_server, mut ctx) = mock_ctx().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({ "message": "permission denied" })),
        )
        .mount(&mock_server)
        .await;

    let outcome = dispatch_bulk_action(
        &mut ctx,
        BulkActionKind::Unblock,
        vec![Ustr::from("u1")],
        None,
    )
    .await;

    let message = outcome.expect_err("unblock should fail");
    assert!(message.contains("permission denied"));
    ctx.shutdown().await;
}

#[tokio::test]
async fn directory_refresh_lands_in_the_compute() {
    let (mock_server, mut ctx) = mock_ctx().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("order", "last_login.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "id": "u1",
                "name": "Ada",
                "email": "ada@example.com",
                "last_login": "2026-02-01T10:00:00Z",
                "status": "active"
            }
        ])))
        .mount(&mock_server)
        .await;

    ctx.enqueue_command::<roster_business::RefreshDirectoryCommand>();
    flush_and_await(&mut ctx).await;

    let directory = ctx.compute::<DirectoryCompute>();
    let rows = directory.users().expect("directory should be loaded");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, "ada@example.com");

    ctx.shutdown().await;
}
