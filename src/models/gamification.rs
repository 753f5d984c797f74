use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gamification")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub invite_id: i64,
    pub points: i32,
    pub badges: String,             // JSON array
    pub completed_missions: String, // JSON array
    pub secret_missions: String,    // JSON array
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invite::Entity",
        from = "Column::InviteId",
        to = "super::invite::Column::Id",
        on_delete = "Cascade"
    )]
    Invite,
}

impl Related<super::invite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn badge_list(&self) -> Vec<String> {
        decode_list(&self.badges)
    }

    pub fn completed_mission_list(&self) -> Vec<String> {
        decode_list(&self.completed_missions)
    }

    pub fn secret_mission_list(&self) -> Vec<String> {
        decode_list(&self.secret_missions)
    }
}

pub fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}
