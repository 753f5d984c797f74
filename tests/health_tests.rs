//! Health, version, OpenAPI and response header tests

use axum::http::StatusCode;
use tower::util::ServiceExt;

mod common;
use common::{build_test_context, get, send, send_json};

#[tokio::test]
async fn test_health_check() {
    let ctx = build_test_context().await;

    let (status, body) = send(ctx.router(), get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_version() {
    let ctx = build_test_context().await;

    let (status, body) = send_json(ctx.router(), get("/api/system/version")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["backend"], "rust");
}

#[tokio::test]
async fn test_openapi_document() {
    let ctx = build_test_context().await;

    let (status, body) = send_json(ctx.router(), get("/api/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/invitations/detail/{token}/"));
    assert!(paths.contains_key("/invitations/respond/{token}/"));
    assert!(paths.contains_key("/gamification/leaderboard/"));
    assert!(paths.contains_key("/api/invites"));
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let ctx = build_test_context().await;

    for uri in ["/api/health", "/invitations/detail/missing/"] {
        let response = ctx.router().oneshot(get(uri)).await.unwrap();
        let headers = response.headers();

        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(headers.contains_key("content-security-policy"));
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = build_test_context().await;

    let (status, _) = send(ctx.router(), get("/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
