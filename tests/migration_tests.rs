//! Migration tests - schema creation, rollback and referential integrity

use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait,
    PaginatorTrait, QueryResult, Set, Statement,
};
use sea_orm_migration::MigratorTrait;

mod common;
use common::{create_guest, create_invite, create_test_db, test_start};

use digital_invite::migrations::Migrator;
use digital_invite::models::{gamification, guest, invite};

/// Fresh in-memory SQLite database without migrations
async fn create_sqlite_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create SQLite test database")
}

async fn get_table_names(db: &DatabaseConnection) -> Vec<String> {
    let sql = "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE 'seaql_%' ORDER BY name";
    let result: Vec<QueryResult> = db
        .query_all(Statement::from_string(DbBackend::Sqlite, sql.to_string()))
        .await
        .expect("Failed to query tables");

    result
        .iter()
        .filter_map(|row| row.try_get::<String>("", "name").ok())
        .collect()
}

async fn get_column_names(db: &DatabaseConnection, table: &str) -> Vec<String> {
    let sql = format!("PRAGMA table_info({})", table);
    let result: Vec<QueryResult> = db
        .query_all(Statement::from_string(DbBackend::Sqlite, sql))
        .await
        .expect("Failed to query table info");

    result
        .iter()
        .filter_map(|row| row.try_get::<String>("", "name").ok())
        .collect()
}

fn empty_ledger(invite_id: i64) -> gamification::ActiveModel {
    gamification::ActiveModel {
        invite_id: Set(invite_id),
        points: Set(0),
        badges: Set("[]".to_string()),
        completed_missions: Set("[]".to_string()),
        secret_missions: Set("[]".to_string()),
        created_at: Set(test_start()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_migrations_up_creates_tables() {
    let db = create_sqlite_db().await;
    Migrator::up(&db, None).await.expect("Migration up failed");

    assert_eq!(
        get_table_names(&db).await,
        vec!["gamification", "guests", "invites"]
    );
}

#[tokio::test]
async fn test_migrations_down_drops_tables() {
    let db = create_sqlite_db().await;
    Migrator::up(&db, None).await.expect("Migration up failed");
    Migrator::down(&db, None).await.expect("Migration down failed");

    assert!(get_table_names(&db).await.is_empty());
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let db = create_sqlite_db().await;
    Migrator::up(&db, None).await.unwrap();
    Migrator::up(&db, None).await.expect("Second up should be a no-op");

    let status = Migrator::get_pending_migrations(&db).await.unwrap();
    assert!(status.is_empty());
}

#[tokio::test]
async fn test_invite_columns() {
    let db = create_test_db().await;
    let columns = get_column_names(&db, "invites").await;

    for expected in [
        "id",
        "guest_id",
        "token",
        "expiration_date",
        "is_active",
        "created_at",
        "invitation_status",
        "response_date",
        "last_access",
        "interactions_count",
        "decline_reason",
        "personalized_message",
        "pre_confirmation_video_url",
        "thank_you_video_url",
        "qr_code_id",
    ] {
        assert!(
            columns.iter().any(|c| c == expected),
            "missing column {}",
            expected
        );
    }
}

#[tokio::test]
async fn test_invite_token_is_unique() {
    let db = create_test_db().await;
    let guest = create_guest(&db, "Ana").await;
    let existing = create_invite(&db, &guest).await;

    let duplicate = invite::ActiveModel {
        guest_id: Set(guest.id),
        token: Set(existing.token.clone()),
        is_active: Set(true),
        created_at: Set(test_start()),
        invitation_status: Set("pending".to_string()),
        interactions_count: Set(0),
        ..Default::default()
    };

    assert!(duplicate.insert(&db).await.is_err());
}

#[tokio::test]
async fn test_one_ledger_per_invite() {
    let db = create_test_db().await;
    let guest = create_guest(&db, "Ana").await;
    let invite = create_invite(&db, &guest).await;

    empty_ledger(invite.id).insert(&db).await.unwrap();
    assert!(empty_ledger(invite.id).insert(&db).await.is_err());
}

#[tokio::test]
async fn test_invite_requires_existing_guest() {
    let db = create_test_db().await;

    let orphan = invite::ActiveModel {
        guest_id: Set(9999),
        token: Set("orphan".to_string()),
        is_active: Set(true),
        created_at: Set(test_start()),
        invitation_status: Set("pending".to_string()),
        interactions_count: Set(0),
        ..Default::default()
    };

    assert!(orphan.insert(&db).await.is_err());
}

#[tokio::test]
async fn test_guest_delete_cascades() {
    let db = create_test_db().await;
    let guest = create_guest(&db, "Ana").await;
    let invite = create_invite(&db, &guest).await;
    empty_ledger(invite.id).insert(&db).await.unwrap();

    guest::Entity::delete_by_id(guest.id).exec(&db).await.unwrap();

    assert_eq!(invite::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(gamification::Entity::find().count(&db).await.unwrap(), 0);
}
