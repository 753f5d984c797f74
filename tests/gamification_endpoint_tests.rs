//! Leaderboard and achievements endpoint tests

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

mod common;
use common::{build_test_context, create_guest, create_invite, get, post_json, send_json};

#[tokio::test]
async fn test_leaderboard_is_empty_without_ledgers() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    create_invite(&ctx.db, &guest).await;

    let (status, body) = send_json(ctx.router(), get("/gamification/leaderboard/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_leaderboard_ranks_guests() {
    let ctx = build_test_context().await;
    let ana = create_guest(&ctx.db, "Ana").await;
    let bruno = create_guest(&ctx.db, "Bruno").await;
    let ana_invite = create_invite(&ctx.db, &ana).await;
    let bruno_invite = create_invite(&ctx.db, &bruno).await;

    let service = &ctx.state.gamification;
    service.award_first_acceptance(ana_invite.id).await.unwrap();
    service.award_first_acceptance(bruno_invite.id).await.unwrap();
    service.add_points(bruno_invite.id, 5).await.unwrap();

    let (status, body) = send_json(ctx.router(), get("/gamification/leaderboard/")).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["guest_name"], "Bruno");
    assert_eq!(entries[0]["points"], 15);
    assert_eq!(entries[0]["invite_token"], bruno_invite.token);
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["guest_name"], "Ana");
    assert_eq!(entries[1]["badges"], json!(["first_acceptance"]));
}

#[tokio::test]
async fn test_achievements_redirect_without_ledger() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    let response = ctx
        .router()
        .oneshot(get(&format!("/gamification/achievements/{}/", invite.token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()["location"],
        format!("/invitations/detail/{}/", invite.token).as_str()
    );
}

#[tokio::test]
async fn test_achievements_after_acceptance() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    let (status, _) = send_json(
        ctx.router(),
        post_json(
            &format!("/invitations/respond/{}/", invite.token),
            json!({ "status": "accepted" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(
        ctx.router(),
        get(&format!("/gamification/achievements/{}/", invite.token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invite_token"], invite.token);
    assert_eq!(body["points"], 10);
    assert_eq!(body["badges"], json!(["first_acceptance"]));
    assert_eq!(body["completed_missions"], json!([]));
    assert!(body.get("id").is_none());
    assert!(body.get("invite_id").is_none());
}

#[tokio::test]
async fn test_achievements_unknown_invite() {
    let ctx = build_test_context().await;

    let (status, _) = send_json(ctx.router(), get("/gamification/achievements/missing/")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
