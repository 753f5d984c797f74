//! Gamification ledger tests

use chrono::Duration;
use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, Statement};

mod common;
use common::{build_test_context, create_guest, create_invite, test_start};

use digital_invite::error::AppError;
use digital_invite::models::gamification;
use digital_invite::services::gamification::{FIRST_ACCEPTANCE_BADGE, FIRST_ACCEPTANCE_POINTS};

#[tokio::test]
async fn test_get_or_create_creates_once() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    let (first, created) = ctx.state.gamification.get_or_create(invite.id).await.unwrap();
    assert!(created);
    assert_eq!(first.points, 0);
    assert!(first.badge_list().is_empty());
    assert_eq!(first.created_at, test_start());

    let (second, created) = ctx.state.gamification.get_or_create(invite.id).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(gamification::Entity::find().count(&ctx.db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_first_acceptance_reward_granted_once() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    assert!(ctx
        .state
        .gamification
        .award_first_acceptance(invite.id)
        .await
        .unwrap());
    assert!(!ctx
        .state
        .gamification
        .award_first_acceptance(invite.id)
        .await
        .unwrap());

    let ledger = ctx
        .state
        .gamification
        .find_by_invite(invite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.points, FIRST_ACCEPTANCE_POINTS);
    assert_eq!(ledger.badge_list(), vec![FIRST_ACCEPTANCE_BADGE.to_string()]);
}

#[tokio::test]
async fn test_starter_reward_written_with_ledger_creation() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    // Any follow-up write to the ledger fails; only the creating INSERT may succeed
    ctx.db
        .execute(Statement::from_string(
            DbBackend::Sqlite,
            "CREATE TRIGGER gamification_frozen BEFORE UPDATE ON gamification \
             BEGIN SELECT RAISE(ABORT, 'ledger is read-only'); END;"
                .to_string(),
        ))
        .await
        .unwrap();

    assert!(ctx
        .state
        .gamification
        .award_first_acceptance(invite.id)
        .await
        .unwrap());

    let ledger = ctx
        .state
        .gamification
        .find_by_invite(invite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.points, FIRST_ACCEPTANCE_POINTS);
    assert_eq!(ledger.badge_list(), vec![FIRST_ACCEPTANCE_BADGE.to_string()]);
    assert_eq!(ledger.created_at, test_start());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_acceptance_awards_once() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let invites = ctx.state.invites.clone();
            let invite = invite.clone();
            tokio::spawn(async move { invites.respond(&invite, "accepted", None).await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.ok);
    }

    let ledgers = gamification::Entity::find().all(&ctx.db).await.unwrap();
    assert_eq!(ledgers.len(), 1);
    assert_eq!(ledgers[0].points, FIRST_ACCEPTANCE_POINTS);
    assert_eq!(ledgers[0].badge_list(), vec![FIRST_ACCEPTANCE_BADGE.to_string()]);
}

#[tokio::test]
async fn test_existing_ledger_gets_no_starter_reward() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    ctx.state.gamification.get_or_create(invite.id).await.unwrap();

    assert!(!ctx
        .state
        .gamification
        .award_first_acceptance(invite.id)
        .await
        .unwrap());

    let ledger = ctx
        .state
        .gamification
        .find_by_invite(invite.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.points, 0);
}

#[tokio::test]
async fn test_spend_points_guards_balance() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    let service = &ctx.state.gamification;
    service.get_or_create(invite.id).await.unwrap();
    service.add_points(invite.id, 15).await.unwrap();

    assert!(service.spend_points(invite.id, 10).await.unwrap());
    assert!(!service.spend_points(invite.id, 6).await.unwrap());
    assert!(service.spend_points(invite.id, 5).await.unwrap());

    let ledger = service.find_by_invite(invite.id).await.unwrap().unwrap();
    assert_eq!(ledger.points, 0);
}

#[tokio::test]
async fn test_points_operations_require_ledger() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    let service = &ctx.state.gamification;

    assert!(matches!(
        service.add_points(invite.id, 5).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.spend_points(invite.id, 5).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service.add_badge(invite.id, "early_bird").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_negative_amounts_are_rejected() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    let service = &ctx.state.gamification;
    service.get_or_create(invite.id).await.unwrap();

    assert!(matches!(
        service.add_points(invite.id, -1).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.spend_points(invite.id, -1).await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_lists_are_deduplicated_in_insertion_order() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    let service = &ctx.state.gamification;
    service.get_or_create(invite.id).await.unwrap();

    assert!(service.add_badge(invite.id, "dancer").await.unwrap());
    assert!(service.add_badge(invite.id, "photographer").await.unwrap());
    assert!(!service.add_badge(invite.id, "dancer").await.unwrap());

    assert!(service.complete_mission(invite.id, "find_the_cake").await.unwrap());
    assert!(!service.complete_mission(invite.id, "find_the_cake").await.unwrap());
    assert!(service
        .unlock_secret_mission(invite.id, "bouquet_catch")
        .await
        .unwrap());

    let ledger = service.find_by_invite(invite.id).await.unwrap().unwrap();
    assert_eq!(
        ledger.badge_list(),
        vec!["dancer".to_string(), "photographer".to_string()]
    );
    assert_eq!(ledger.completed_mission_list(), vec!["find_the_cake".to_string()]);
    assert_eq!(ledger.secret_mission_list(), vec!["bouquet_catch".to_string()]);
}

#[tokio::test]
async fn test_empty_list_value_is_rejected() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    ctx.state.gamification.get_or_create(invite.id).await.unwrap();

    assert!(matches!(
        ctx.state.gamification.add_badge(invite.id, "  ").await,
        Err(AppError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_leaderboard_orders_by_points_and_limits() {
    let ctx = build_test_context().await;
    let service = &ctx.state.gamification;

    for n in 0..25 {
        let guest = create_guest(&ctx.db, &format!("Guest{:02}", n)).await;
        let invite = create_invite(&ctx.db, &guest).await;
        service.get_or_create(invite.id).await.unwrap();
        service.add_points(invite.id, n).await.unwrap();
    }

    let rows = service.leaderboard(20).await.unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].rank, 1);
    assert_eq!(rows[0].ledger.points, 24);
    assert_eq!(rows[0].guest.first_name, "Guest24");
    assert_eq!(rows[19].rank, 20);
    assert_eq!(rows[19].ledger.points, 5);
    assert!(rows.windows(2).all(|w| w[0].ledger.points >= w[1].ledger.points));
}

#[tokio::test]
async fn test_leaderboard_ties_keep_earlier_ledger_first() {
    let ctx = build_test_context().await;
    let service = &ctx.state.gamification;

    let first_guest = create_guest(&ctx.db, "First").await;
    let first = create_invite(&ctx.db, &first_guest).await;
    service.get_or_create(first.id).await.unwrap();

    ctx.clock.advance(Duration::minutes(5));
    let second_guest = create_guest(&ctx.db, "Second").await;
    let second = create_invite(&ctx.db, &second_guest).await;
    service.get_or_create(second.id).await.unwrap();

    let rows = service.leaderboard(20).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.guest.first_name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_ledger_removed_with_invite() {
    let ctx = build_test_context().await;
    let guest = create_guest(&ctx.db, "Ana").await;
    let invite = create_invite(&ctx.db, &guest).await;
    ctx.state.gamification.get_or_create(invite.id).await.unwrap();

    digital_invite::models::invite::Entity::delete_by_id(invite.id)
        .exec(&ctx.db)
        .await
        .unwrap();
    assert_eq!(gamification::Entity::find().count(&ctx.db).await.unwrap(), 0);
}
