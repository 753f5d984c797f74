pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_guests;
mod m20260301_000002_create_invites;
mod m20260301_000003_create_gamification;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_guests::Migration),
            Box::new(m20260301_000002_create_invites::Migration),
            Box::new(m20260301_000003_create_gamification::Migration),
        ]
    }
}
