use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::gamification;
use crate::services::gamification::LeaderboardRow;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct GamificationResponse {
    pub invite_token: String,
    pub points: i32,
    pub badges: Vec<String>,
    pub completed_missions: Vec<String>,
    pub secret_missions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl GamificationResponse {
    pub fn new(ledger: &gamification::Model, invite_token: &str) -> Self {
        Self {
            invite_token: invite_token.to_string(),
            points: ledger.points,
            badges: ledger.badge_list(),
            completed_missions: ledger.completed_mission_list(),
            secret_missions: ledger.secret_mission_list(),
            created_at: ledger.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub invite_token: String,
    pub guest_name: String,
    pub emoji: Option<String>,
    pub points: i32,
    pub badges: Vec<String>,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            rank: row.rank,
            invite_token: row.invite.token,
            guest_name: row.guest.display_name(),
            emoji: row.guest.emoji,
            points: row.ledger.points,
            badges: row.ledger.badge_list(),
        }
    }
}
