//! Migration: Create guests table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Guests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Guests::Token)
                            .string_len(36)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Guests::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Guests::LastName).string_len(100).null())
                    .col(ColumnDef::new(Guests::Nickname).string_len(50).null())
                    .col(ColumnDef::new(Guests::Gender).string_len(1).null())
                    .col(ColumnDef::new(Guests::AvatarId).string_len(100).null())
                    .col(ColumnDef::new(Guests::Emoji).string_len(10).null())
                    .col(
                        ColumnDef::new(Guests::Memories)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Guests::FavoriteDish).string_len(100).null())
                    .col(ColumnDef::new(Guests::FavoriteDrink).string_len(100).null())
                    .col(
                        ColumnDef::new(Guests::DietaryRestrictions)
                            .string_len(200)
                            .null(),
                    )
                    .col(ColumnDef::new(Guests::MusicSuggestion).string_len(200).null())
                    .col(
                        ColumnDef::new(Guests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Guests::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Guests {
    Table,
    Id,
    Token,
    #[iden = "first_name"]
    FirstName,
    #[iden = "last_name"]
    LastName,
    Nickname,
    Gender,
    #[iden = "avatar_id"]
    AvatarId,
    Emoji,
    Memories,
    #[iden = "favorite_dish"]
    FavoriteDish,
    #[iden = "favorite_drink"]
    FavoriteDrink,
    #[iden = "dietary_restrictions"]
    DietaryRestrictions,
    #[iden = "music_suggestion"]
    MusicSuggestion,
    #[iden = "created_at"]
    CreatedAt,
}
