//! Migration: Create invites table

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_guests::Guests;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invites::GuestId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Invites::Token)
                            .string_len(36)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Invites::ExpirationDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Invites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invites::QrCodeId).string_len(100).null())
                    .col(
                        ColumnDef::new(Invites::InvitationStatus)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Invites::ResponseDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::LastAccess)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::InteractionsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Invites::PersonalizedMessage).text().null())
                    .col(
                        ColumnDef::new(Invites::PreConfirmationVideoUrl)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::ThankYouVideoUrl).string().null())
                    .col(ColumnDef::new(Invites::DeclineReason).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Invites::Table, Invites::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invites_guest_id")
                    .table(Invites::Table)
                    .col(Invites::GuestId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invites::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Invites {
    Table,
    Id,
    #[iden = "guest_id"]
    GuestId,
    Token,
    #[iden = "expiration_date"]
    ExpirationDate,
    #[iden = "is_active"]
    IsActive,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "qr_code_id"]
    QrCodeId,
    #[iden = "invitation_status"]
    InvitationStatus,
    #[iden = "response_date"]
    ResponseDate,
    #[iden = "last_access"]
    LastAccess,
    #[iden = "interactions_count"]
    InteractionsCount,
    #[iden = "personalized_message"]
    PersonalizedMessage,
    #[iden = "pre_confirmation_video_url"]
    PreConfirmationVideoUrl,
    #[iden = "thank_you_video_url"]
    ThankYouVideoUrl,
    #[iden = "decline_reason"]
    DeclineReason,
}
