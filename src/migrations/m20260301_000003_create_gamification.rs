//! Migration: Create gamification table
//!
//! One ledger per invite; the unique `invite_id` backs the insert-or-fetch
//! used when an invite is first accepted.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_create_invites::Invites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gamification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Gamification::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Gamification::InviteId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Gamification::Points)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Gamification::Badges)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Gamification::CompletedMissions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Gamification::SecretMissions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Gamification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Gamification::Table, Gamification::InviteId)
                            .to(Invites::Table, Invites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Gamification::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
pub enum Gamification {
    Table,
    Id,
    #[iden = "invite_id"]
    InviteId,
    Points,
    Badges,
    #[iden = "completed_missions"]
    CompletedMissions,
    #[iden = "secret_missions"]
    SecretMissions,
    #[iden = "created_at"]
    CreatedAt,
}
