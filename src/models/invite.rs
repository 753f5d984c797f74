use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(skip_serializing)]
    pub guest_id: i64,
    #[sea_orm(unique)]
    pub token: String,
    pub expiration_date: Option<DateTimeUtc>,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub qr_code_id: Option<String>,
    pub invitation_status: String, // 'pending', 'accepted', 'declined'
    pub response_date: Option<DateTimeUtc>,
    pub last_access: Option<DateTimeUtc>,
    pub interactions_count: i32,
    pub personalized_message: Option<String>,
    pub pre_confirmation_video_url: Option<String>,
    pub thank_you_video_url: Option<String>,
    pub decline_reason: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::guest::Entity",
        from = "Column::GuestId",
        to = "super::guest::Column::Id",
        on_delete = "Cascade"
    )]
    Guest,
    #[sea_orm(has_one = "super::gamification::Entity")]
    Gamification,
}

impl Related<super::guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guest.def()
    }
}

impl Related<super::gamification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gamification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// RSVP state of an invite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvitationStatus::Pending),
            "accepted" => Some(InvitationStatus::Accepted),
            "declined" => Some(InvitationStatus::Declined),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Model {
    /// Stored status; unknown values read as pending
    pub fn status(&self) -> InvitationStatus {
        InvitationStatus::parse(&self.invitation_status).unwrap_or(InvitationStatus::Pending)
    }
}
