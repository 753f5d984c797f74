use std::collections::HashMap;

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::gamification::{self, decode_list, encode_list};
use crate::models::prelude::*;
use crate::models::{guest, invite};
use crate::services::clock::SharedClock;

/// Badge granted the first time an invite is accepted
pub const FIRST_ACCEPTANCE_BADGE: &str = "first_acceptance";
pub const FIRST_ACCEPTANCE_POINTS: i32 = 10;
pub const LEADERBOARD_SIZE: u64 = 20;

/// Optimistic retries for list appends racing with another writer
const APPEND_ATTEMPTS: usize = 5;

/// The three append-only lists of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerList {
    Badges,
    CompletedMissions,
    SecretMissions,
}

impl LedgerList {
    fn column(self) -> gamification::Column {
        match self {
            LedgerList::Badges => gamification::Column::Badges,
            LedgerList::CompletedMissions => gamification::Column::CompletedMissions,
            LedgerList::SecretMissions => gamification::Column::SecretMissions,
        }
    }

    fn raw(self, ledger: &gamification::Model) -> &str {
        match self {
            LedgerList::Badges => &ledger.badges,
            LedgerList::CompletedMissions => &ledger.completed_missions,
            LedgerList::SecretMissions => &ledger.secret_missions,
        }
    }
}

/// One leaderboard line, ranked from 1
#[derive(Debug, Clone)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub ledger: gamification::Model,
    pub invite: invite::Model,
    pub guest: guest::Model,
}

/// Per-invite points, badges and missions
#[derive(Clone)]
pub struct GamificationService {
    db: DbConn,
    clock: SharedClock,
}

impl GamificationService {
    pub fn new(db: DbConn, clock: SharedClock) -> Self {
        Self { db, clock }
    }

    pub async fn find_by_invite(&self, invite_id: i64) -> Result<Option<gamification::Model>> {
        Ok(Gamification::find()
            .filter(gamification::Column::InviteId.eq(invite_id))
            .one(&self.db)
            .await?)
    }

    async fn require(&self, invite_id: i64) -> Result<gamification::Model> {
        self.find_by_invite(invite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Gamification record not found".to_string()))
    }

    /// Fetch the ledger of an invite, creating an empty one when absent.
    ///
    /// Creation is a single `INSERT .. ON CONFLICT (invite_id) DO NOTHING`, so
    /// of several concurrent callers exactly one sees `created == true`.
    pub async fn get_or_create(&self, invite_id: i64) -> Result<(gamification::Model, bool)> {
        let created = self.insert_if_absent(invite_id, 0, &[]).await?;
        let ledger = self.require(invite_id).await?;
        Ok((ledger, created))
    }

    /// Create the ledger on first acceptance and grant the starter reward.
    ///
    /// The reward is written by the same statement that creates the ledger,
    /// so a ledger never exists without it. Returns whether this call
    /// created the ledger.
    pub async fn award_first_acceptance(&self, invite_id: i64) -> Result<bool> {
        let created = self
            .insert_if_absent(
                invite_id,
                FIRST_ACCEPTANCE_POINTS,
                &[FIRST_ACCEPTANCE_BADGE.to_string()],
            )
            .await?;

        if created {
            tracing::info!("Granted first acceptance reward to invite {}", invite_id);
        }
        Ok(created)
    }

    async fn insert_if_absent(&self, invite_id: i64, points: i32, badges: &[String]) -> Result<bool> {
        let ledger = gamification::ActiveModel {
            invite_id: Set(invite_id),
            points: Set(points),
            badges: Set(encode_list(badges)),
            completed_missions: Set("[]".to_string()),
            secret_missions: Set("[]".to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        };

        let inserted = Gamification::insert(ledger)
            .on_conflict(
                OnConflict::column(gamification::Column::InviteId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(inserted > 0)
    }

    pub async fn add_points(&self, invite_id: i64, amount: i32) -> Result<()> {
        if amount < 0 {
            return Err(AppError::BadRequest(
                "Points to add must not be negative".to_string(),
            ));
        }

        let result = Gamification::update_many()
            .col_expr(
                gamification::Column::Points,
                Expr::col(gamification::Column::Points).add(amount),
            )
            .filter(gamification::Column::InviteId.eq(invite_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(
                "Gamification record not found".to_string(),
            ));
        }
        Ok(())
    }

    /// Deduct points if the balance covers `amount`.
    ///
    /// The balance check and the decrement are one conditional UPDATE; on an
    /// insufficient balance nothing changes and `false` is returned.
    pub async fn spend_points(&self, invite_id: i64, amount: i32) -> Result<bool> {
        if amount < 0 {
            return Err(AppError::BadRequest(
                "Points to spend must not be negative".to_string(),
            ));
        }

        let result = Gamification::update_many()
            .col_expr(
                gamification::Column::Points,
                Expr::col(gamification::Column::Points).sub(amount),
            )
            .filter(gamification::Column::InviteId.eq(invite_id))
            .filter(gamification::Column::Points.gte(amount))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            // Distinguish a missing ledger from a short balance
            self.require(invite_id).await?;
            return Ok(false);
        }
        Ok(true)
    }

    pub async fn add_badge(&self, invite_id: i64, badge: &str) -> Result<bool> {
        self.append_unique(invite_id, LedgerList::Badges, badge).await
    }

    pub async fn complete_mission(&self, invite_id: i64, mission: &str) -> Result<bool> {
        self.append_unique(invite_id, LedgerList::CompletedMissions, mission)
            .await
    }

    pub async fn unlock_secret_mission(&self, invite_id: i64, mission: &str) -> Result<bool> {
        self.append_unique(invite_id, LedgerList::SecretMissions, mission)
            .await
    }

    /// Append `value` to a list unless already present.
    ///
    /// The write only applies if the column still holds what was read, so a
    /// concurrent append is retried instead of overwritten.
    async fn append_unique(&self, invite_id: i64, list: LedgerList, value: &str) -> Result<bool> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::BadRequest("Value must not be empty".to_string()));
        }

        for _ in 0..APPEND_ATTEMPTS {
            let ledger = self.require(invite_id).await?;
            let current_raw = list.raw(&ledger).to_string();
            let mut values = decode_list(&current_raw);
            if values.iter().any(|v| v == value) {
                return Ok(false);
            }
            values.push(value.to_string());

            let result = Gamification::update_many()
                .col_expr(list.column(), Expr::value(encode_list(&values)))
                .filter(gamification::Column::Id.eq(ledger.id))
                .filter(list.column().eq(current_raw))
                .exec(&self.db)
                .await?;

            if result.rows_affected == 1 {
                return Ok(true);
            }
            tracing::debug!(
                "Concurrent update of {:?} for invite {}, retrying",
                list,
                invite_id
            );
        }

        Err(AppError::Conflict(
            "Gamification record is being updated, please try again".to_string(),
        ))
    }

    /// Highest balances first; ties keep the earlier ledger ahead
    pub async fn leaderboard(&self, limit: u64) -> Result<Vec<LeaderboardRow>> {
        let ledgers = Gamification::find()
            .order_by_desc(gamification::Column::Points)
            .order_by_asc(gamification::Column::CreatedAt)
            .order_by_asc(gamification::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        let invite_ids: Vec<i64> = ledgers.iter().map(|l| l.invite_id).collect();
        let invites: HashMap<i64, invite::Model> = Invite::find()
            .filter(invite::Column::Id.is_in(invite_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let guest_ids: Vec<i64> = invites.values().map(|i| i.guest_id).collect();
        let guests: HashMap<i64, guest::Model> = Guest::find()
            .filter(guest::Column::Id.is_in(guest_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        let rows = ledgers
            .into_iter()
            .filter_map(|ledger| {
                let invite = invites.get(&ledger.invite_id)?.clone();
                let guest = guests.get(&invite.guest_id)?.clone();
                Some((ledger, invite, guest))
            })
            .enumerate()
            .map(|(idx, (ledger, invite, guest))| LeaderboardRow {
                rank: idx + 1,
                ledger,
                invite,
                guest,
            })
            .collect();

        Ok(rows)
    }
}
