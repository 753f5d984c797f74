use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    #[sea_orm(unique)]
    pub token: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>, // 'M', 'F'
    pub avatar_id: Option<String>,
    pub emoji: Option<String>,
    /// JSON array of storage ids; entries may be null or empty
    pub memories: String,
    pub favorite_dish: Option<String>,
    pub favorite_drink: Option<String>,
    pub dietary_restrictions: Option<String>,
    pub music_suggestion: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invite::Entity")]
    Invites,
}

impl Related<super::invite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Guest gender as stored in the `gender` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Accepts the stored codes as well as the spelled-out words, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Some(Gender::Male),
            "f" | "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Model {
    /// Memory ids in stored order, including null and empty entries
    pub fn memory_ids(&self) -> Vec<Option<String>> {
        parse_memories(&self.memories)
    }

    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().filter(|s| !s.is_empty()) {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Whether the post-acceptance questionnaire still lacks answers
    pub fn profile_incomplete(&self) -> bool {
        is_blank(&self.dietary_restrictions) || is_blank(&self.music_suggestion)
    }
}

/// Decode the `memories` column, treating malformed content as an empty list
pub fn parse_memories(raw: &str) -> Vec<Option<String>> {
    match serde_json::from_str::<Vec<Option<String>>>(raw) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!("Ignoring malformed memories column: {}", e);
            Vec::new()
        }
    }
}

pub fn encode_memories(ids: &[Option<String>]) -> String {
    serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(|v| v.trim().is_empty()).unwrap_or(true)
}
